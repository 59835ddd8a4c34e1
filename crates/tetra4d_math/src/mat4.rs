//! Column-major 4x4 matrix
//!
//! In 4D rendering this is a full linear map over the four spatial axes,
//! not a homogeneous 3D transform; translations are carried separately
//! (see `Transform4` in `tetra4d_core`).

use bytemuck::{Pod, Zeroable};

use crate::Vec4;

/// Column-major 4x4 matrix of f32.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Mat4 {
    pub cols: [Vec4; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    pub const ZERO: Self = Self {
        cols: [Vec4::ZERO; 4],
    };

    /// Build a matrix from four column vectors
    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self { cols: [c0, c1, c2, c3] }
    }

    /// Build a diagonal matrix
    #[inline]
    pub fn from_diagonal(d: Vec4) -> Self {
        Self::from_cols(
            Vec4::new(d.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, d.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, d.z, 0.0),
            Vec4::new(0.0, 0.0, 0.0, d.w),
        )
    }

    /// Rotation in the coordinate plane spanned by axes `i` and `j`.
    ///
    /// Counterclockwise, right-handed: `e_i` maps to `cos a * e_i + sin a * e_j`.
    /// This is the single rotation sign convention used across the workspace.
    pub fn plane_rotation(i: usize, j: usize, angle: f32) -> Self {
        assert!(i < 4 && j < 4 && i != j, "invalid rotation plane ({}, {})", i, j);
        let (s, c) = angle.sin_cos();
        let mut m = Self::IDENTITY;
        *m.cols[i].component_mut(i) = c;
        *m.cols[i].component_mut(j) = s;
        *m.cols[j].component_mut(i) = -s;
        *m.cols[j].component_mut(j) = c;
        m
    }

    /// Column accessor
    #[inline]
    pub fn col(&self, c: usize) -> Vec4 {
        self.cols[c]
    }

    /// Replace a column
    #[inline]
    pub fn set_col(&mut self, c: usize, v: Vec4) {
        self.cols[c] = v;
    }

    /// Element accessor (row, column)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.cols[col].component(row)
    }

    /// Transposed matrix
    pub fn transpose(&self) -> Self {
        let m = self;
        Self::from_cols(
            Vec4::new(m.get(0, 0), m.get(0, 1), m.get(0, 2), m.get(0, 3)),
            Vec4::new(m.get(1, 0), m.get(1, 1), m.get(1, 2), m.get(1, 3)),
            Vec4::new(m.get(2, 0), m.get(2, 1), m.get(2, 2), m.get(2, 3)),
            Vec4::new(m.get(3, 0), m.get(3, 1), m.get(3, 2), m.get(3, 3)),
        )
    }

    /// Flat column-major array, matching the GPU layout
    #[inline]
    pub fn to_cols_array(&self) -> [[f32; 4]; 4] {
        [
            self.cols[0].to_array(),
            self.cols[1].to_array(),
            self.cols[2].to_array(),
            self.cols[3].to_array(),
        ]
    }

    /// Flat column-major array of 16 floats, the layout GPU uniform and
    /// storage buffers expect.
    pub fn to_flat(self) -> [f32; 16] {
        bytemuck::cast(self)
    }

    fn from_flat(m: [f32; 16]) -> Self {
        bytemuck::cast(m)
    }

    /// Determinant by cofactor expansion
    pub fn determinant(&self) -> f32 {
        let m = self.to_flat();
        let (inv0, inv4, inv8, inv12) = Self::first_column_cofactors(&m);
        m[0] * inv0 + m[1] * inv4 + m[2] * inv8 + m[3] * inv12
    }

    fn first_column_cofactors(m: &[f32; 16]) -> (f32, f32, f32, f32) {
        let inv0 = m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
            + m[9] * m[7] * m[14] + m[13] * m[6] * m[11] - m[13] * m[7] * m[10];
        let inv4 = -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
            - m[8] * m[7] * m[14] - m[12] * m[6] * m[11] + m[12] * m[7] * m[10];
        let inv8 = m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
            + m[8] * m[7] * m[13] + m[12] * m[5] * m[11] - m[12] * m[7] * m[9];
        let inv12 = -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
            - m[8] * m[6] * m[13] - m[12] * m[5] * m[10] + m[12] * m[6] * m[9];
        (inv0, inv4, inv8, inv12)
    }

    /// Inverse by the adjugate method.
    ///
    /// Singular input yields non-finite entries; callers are expected to pass
    /// invertible matrices (all matrices produced by scale/rotate/look_at are).
    pub fn inverse(&self) -> Self {
        let m = self.to_flat();
        let mut inv = [0.0f32; 16];

        let (i0, i4, i8, i12) = Self::first_column_cofactors(&m);
        inv[0] = i0;
        inv[4] = i4;
        inv[8] = i8;
        inv[12] = i12;

        inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
            - m[9] * m[3] * m[14] - m[13] * m[2] * m[11] + m[13] * m[3] * m[10];
        inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
            + m[8] * m[3] * m[14] + m[12] * m[2] * m[11] - m[12] * m[3] * m[10];
        inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
            - m[8] * m[3] * m[13] - m[12] * m[1] * m[11] + m[12] * m[3] * m[9];
        inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
            + m[8] * m[2] * m[13] + m[12] * m[1] * m[10] - m[12] * m[2] * m[9];
        inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
            + m[5] * m[3] * m[14] + m[13] * m[2] * m[7] - m[13] * m[3] * m[6];
        inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
            - m[4] * m[3] * m[14] - m[12] * m[2] * m[7] + m[12] * m[3] * m[6];
        inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
            + m[4] * m[3] * m[13] + m[12] * m[1] * m[7] - m[12] * m[3] * m[5];
        inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
            - m[4] * m[2] * m[13] - m[12] * m[1] * m[6] + m[12] * m[2] * m[5];
        inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
            - m[5] * m[3] * m[10] - m[9] * m[2] * m[7] + m[9] * m[3] * m[6];
        inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
            + m[4] * m[3] * m[10] + m[8] * m[2] * m[7] - m[8] * m[3] * m[6];
        inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
            - m[4] * m[3] * m[9] - m[8] * m[1] * m[7] + m[8] * m[3] * m[5];
        inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
            + m[4] * m[2] * m[9] + m[8] * m[1] * m[6] - m[8] * m[2] * m[5];

        let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
        let rcp = 1.0 / det;
        for v in &mut inv {
            *v *= rcp;
        }
        Self::from_flat(inv)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul<Vec4> for Mat4 {
    type Output = Vec4;
    #[inline]
    fn mul(self, v: Vec4) -> Vec4 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z + self.cols[3] * v.w
    }
}

impl std::ops::Mul<Mat4> for Mat4 {
    type Output = Mat4;
    #[inline]
    fn mul(self, b: Mat4) -> Mat4 {
        Mat4::from_cols(
            self * b.cols[0],
            self * b.cols[1],
            self * b.cols[2],
            self * b.cols[3],
        )
    }
}

impl std::ops::Mul<f32> for Mat4 {
    type Output = Mat4;
    #[inline]
    fn mul(self, s: f32) -> Mat4 {
        Mat4 {
            cols: [
                self.cols[0] * s,
                self.cols[1] * s,
                self.cols[2] * s,
                self.cols[3] * s,
            ],
        }
    }
}
