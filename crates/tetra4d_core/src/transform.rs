//! 4D affine transform
//!
//! A [`Transform4`] is the affine map `v -> mat * v + pos` over the four
//! spatial axes. Unlike a homogeneous 3D transform there is no projective
//! row; the translation rides alongside the full 4x4 linear part.

use serde::{Deserialize, Serialize};
use tetra4d_math::{cross4, Mat4, Vec4};

/// The six coordinate planes of 4-space, used to pick the 2x2 block that a
/// [`Transform4::rotate`] overwrites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plane4 {
    Xy,
    Xz,
    Xw,
    Yz,
    Yw,
    Zw,
}

impl Plane4 {
    /// The two axis indices spanning this plane (0 = X .. 3 = W)
    #[inline]
    pub fn axes(self) -> (usize, usize) {
        match self {
            Plane4::Xy => (0, 1),
            Plane4::Xz => (0, 2),
            Plane4::Xw => (0, 3),
            Plane4::Yz => (1, 2),
            Plane4::Yw => (1, 3),
            Plane4::Zw => (2, 3),
        }
    }
}

/// Composable affine transform in 4D: linear part plus translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform4 {
    /// Linear component of the transform
    pub mat: Mat4,
    /// Translation component of the transform
    pub pos: Vec4,
}

impl Default for Transform4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform4 {
    pub const IDENTITY: Self = Self {
        mat: Mat4::IDENTITY,
        pos: Vec4::ZERO,
    };

    pub fn new(mat: Mat4, pos: Vec4) -> Self {
        Self { mat, pos }
    }

    pub fn from_position(pos: Vec4) -> Self {
        Self { mat: Mat4::IDENTITY, pos }
    }

    /// Applies this transform to a vector.
    #[inline]
    pub fn apply(&self, v: Vec4) -> Vec4 {
        self.mat * v + self.pos
    }

    /// Chains a transform to this one, resulting in a transform that applies
    /// this transform first, then `b`. Associative, not commutative.
    pub fn chain(&self, b: &Transform4) -> Transform4 {
        Transform4 {
            mat: b.mat * self.mat,
            pos: b.mat * self.pos + b.pos,
        }
    }

    /// Appends a per-axis scaling to the current transform.
    pub fn scale(&mut self, factor: Vec4) -> &mut Self {
        self.mat = Mat4::from_diagonal(factor) * self.mat;
        self
    }

    /// Appends a uniform scaling to the current transform. This scales the
    /// whole linear part, rotations included.
    pub fn scale_uniform(&mut self, factor: f32) -> &mut Self {
        self.mat = self.mat * factor;
        self
    }

    /// Appends a rotation in the given coordinate plane.
    ///
    /// Counterclockwise: for `rotate(Plane4::Xy, a)`, the X axis maps to
    /// `cos a * X + sin a * Y` and the Z/W coordinates are untouched.
    pub fn rotate(&mut self, plane: Plane4, angle: f32) -> &mut Self {
        let (i, j) = plane.axes();
        self.mat = Mat4::plane_rotation(i, j, angle) * self.mat;
        self
    }

    /// Replaces the linear part with a "look at" basis: aligns the Z axis
    /// with `at` while keeping the rotation confined to the hyperplane
    /// defined by `up` and `duth` (the w-ward analogue of the up vector).
    /// The translation is left untouched.
    ///
    /// The cross product arguments are ordered so the basis has determinant
    /// +1: `look_at(Z, Y, W)` reproduces the identity, with `up` along
    /// column 1 rather than against it.
    ///
    /// `at`, `up` and `duth` must be normalized and mutually non-coplanar;
    /// degenerate input leaves a non-orthogonal garbage basis behind (this is
    /// debug-asserted, not checked in release builds).
    pub fn look_at(&mut self, at: Vec4, up: Vec4, duth: Vec4) -> &mut Self {
        let col0 = cross4(up, at, duth);
        debug_assert!(col0.length_squared() > 1e-12, "look_at: up/at/duth are coplanar");
        let col0 = col0.normalized();
        let col1 = cross4(duth, at, col0);
        debug_assert!(col1.length_squared() > 1e-12, "look_at: degenerate basis");
        let col1 = col1.normalized();
        let col3 = cross4(col1, col0, at);
        debug_assert!(col3.length_squared() > 1e-12, "look_at: degenerate basis");
        let col3 = col3.normalized();
        self.mat = Mat4::from_cols(col0, col1, at, col3);
        self
    }

    /// Inverse of this transform under the assumption that `mat` is
    /// invertible: `{ mat^-1, -(mat^-1 * pos) }`. Used for view transforms.
    pub fn inverse(&self) -> Transform4 {
        let inv = self.mat.inverse();
        Transform4 {
            mat: inv,
            pos: -(inv * self.pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPSILON: f32 = 1e-4;

    fn vec_approx_eq(a: Vec4, b: Vec4) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_apply() {
        let mut t = Transform4::from_position(Vec4::new(0.0, 0.0, 0.0, 1.0));
        t.scale(Vec4::new(2.0, 2.0, 2.0, 2.0));
        assert!(vec_approx_eq(t.apply(Vec4::X), Vec4::new(2.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_chain_applies_in_order() {
        let mut a = Transform4::IDENTITY;
        a.rotate(Plane4::Xy, FRAC_PI_2);
        let b = Transform4::from_position(Vec4::new(10.0, 0.0, 0.0, 0.0));

        // apply a (X -> Y), then b (translate +10 X)
        let r = a.chain(&b).apply(Vec4::X);
        assert!(vec_approx_eq(r, Vec4::new(10.0, 1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_chain_associativity() {
        let mut a = Transform4::from_position(Vec4::new(1.0, 0.0, -2.0, 0.5));
        a.rotate(Plane4::Xw, 0.4);
        let mut b = Transform4::IDENTITY;
        b.scale(Vec4::new(2.0, 1.0, 0.5, 1.0)).rotate(Plane4::Yz, -1.1);
        let mut c = Transform4::from_position(Vec4::new(0.0, 3.0, 0.0, -1.0));
        c.rotate(Plane4::Zw, 2.0);

        let v = Vec4::new(0.3, -1.0, 2.0, 1.5);
        let left = a.chain(&b).chain(&c).apply(v);
        let right = a.chain(&b.chain(&c)).apply(v);
        let sequential = c.apply(b.apply(a.apply(v)));
        assert!(vec_approx_eq(left, right));
        assert!(vec_approx_eq(left, sequential));
    }

    #[test]
    fn test_rotate_is_pure_plane_rotation() {
        let mut t = Transform4::IDENTITY;
        t.rotate(Plane4::Xy, FRAC_PI_2);
        let v = Vec4::new(1.0, 0.0, 2.0, 3.0);
        let r = t.apply(v);
        // X rotates onto Y, Z and W coordinates are unchanged
        assert!(vec_approx_eq(r, Vec4::new(0.0, 1.0, 2.0, 3.0)));

        // rotation followed by its inverse is the identity
        let mut back = t;
        back.rotate(Plane4::Xy, -FRAC_PI_2);
        assert!(vec_approx_eq(back.apply(v), v));
    }

    #[test]
    fn test_rotate_full_turn() {
        let mut t = Transform4::IDENTITY;
        t.rotate(Plane4::Zw, PI).rotate(Plane4::Zw, PI);
        let v = Vec4::new(1.0, 2.0, 3.0, 4.0);
        assert!(vec_approx_eq(t.apply(v), v));
    }

    #[test]
    fn test_look_at_orthonormality() {
        let at = Vec4::new(1.0, 1.0, 1.0, 1.0).normalized();
        let up = Vec4::Y;
        let duth = Vec4::W;
        let mut t = Transform4::IDENTITY;
        t.look_at(at, up, duth);

        for i in 0..4 {
            let ci = t.mat.col(i);
            assert!((ci.length() - 1.0).abs() < EPSILON, "column {} not unit", i);
            for j in (i + 1)..4 {
                assert!(ci.dot(t.mat.col(j)).abs() < EPSILON, "columns {} {} not orthogonal", i, j);
            }
        }
        // third column is the look direction, and the basis is a proper
        // rotation, not a reflection
        assert!(vec_approx_eq(t.mat.col(2), at));
        assert!((t.mat.determinant() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_look_at_consistent_with_rotation_convention() {
        // Looking along +Z must reproduce the identity basis
        let mut t = Transform4::IDENTITY;
        t.look_at(Vec4::Z, Vec4::Y, Vec4::W);
        assert!(vec_approx_eq(t.mat.col(0), Vec4::X));
        assert!(vec_approx_eq(t.mat.col(1), Vec4::Y));
        assert!(vec_approx_eq(t.mat.col(2), Vec4::Z));
        assert!(vec_approx_eq(t.mat.col(3), Vec4::W));
    }

    #[test]
    fn test_look_at_leaves_translation() {
        let mut t = Transform4::from_position(Vec4::new(1.0, 2.0, 3.0, 4.0));
        t.look_at(Vec4::Z, Vec4::Y, Vec4::W);
        assert_eq!(t.pos, Vec4::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_inverse_roundtrip() {
        let mut t = Transform4::from_position(Vec4::new(0.5, -1.0, 2.0, 0.25));
        t.rotate(Plane4::Xz, 0.8).rotate(Plane4::Yw, -0.3);
        let v = Vec4::new(1.0, 2.0, 3.0, 4.0);
        let round = t.inverse().apply(t.apply(v));
        assert!(vec_approx_eq(round, v));
    }
}
