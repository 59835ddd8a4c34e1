//! Tetrahedral 4D geometry
//!
//! A [`Geometry4`] is a mesh of tetrahedral cells living in 4-space. Meshes
//! are authored once (promoted or extruded from 3D shells), then uploaded to
//! the GPU by the render crate; nothing here touches GPU state.

use tetra4d_math::{cross4, nearest_point, Vec4};

/// A tetrahedral mesh in 4D.
///
/// When `cells` is non-empty the mesh is indexed and every 4 consecutive
/// entries name one tetrahedron. When it is empty the mesh is "unindexed":
/// every 4 consecutive vertices form one tetrahedron by construction.
///
/// `normals` is parallel to `vertices` and is not maintained automatically;
/// call [`Geometry4::recompute_normals`] after any topology change.
#[derive(Clone, Debug, Default)]
pub struct Geometry4 {
    /// Vertices of the geometry
    pub vertices: Vec<Vec4>,
    /// Optional skeleton used to orient normal vectors: each cell's normal is
    /// checked against the nearest skeleton point (the origin if empty)
    pub skeleton: Vec<Vec4>,
    /// Tetrahedron indices, 4 per cell; empty for unindexed meshes
    pub cells: Vec<u32>,
    /// Per-vertex normal vectors, parallel to `vertices`
    pub normals: Vec<Vec4>,
}

impl Geometry4 {
    /// Builds a 4D geometry by promoting 3D vertices to 4D with `w = 0`.
    /// Does not compute normal vectors.
    pub fn from_3d(v3: &[[f32; 3]], tetras: &[u32]) -> Self {
        debug_assert!(tetras.len() % 4 == 0);
        debug_assert!(tetras.iter().all(|&i| (i as usize) < v3.len()));
        Self {
            vertices: v3.iter().map(|&v| Vec4::from_3d(v, 0.0)).collect(),
            skeleton: Vec::new(),
            cells: tetras.to_vec(),
            normals: Vec::new(),
        }
    }

    /// Builds a 4D geometry by extruding a 3D shell along the W axis by
    /// `depth`, splitting it evenly across `w = -depth/2` and `w = depth/2`.
    ///
    /// The tetrahedra are duplicated into both layers and every boundary
    /// triangle grows three "wall" tetrahedra closing the extruded volume
    /// (the prism-to-simplices decomposition, one dimension up).
    /// Does not compute normal vectors.
    pub fn extrude_3d(v3: &[[f32; 3]], tris: &[u32], tetras: &[u32], depth: f32) -> Self {
        debug_assert!(tris.len() % 3 == 0 && tetras.len() % 4 == 0);
        debug_assert!(tris.iter().chain(tetras).all(|&i| (i as usize) < v3.len()));

        let mut g = Self::default();
        let base = v3.len() as u32;
        let d = depth / 2.0;

        for &v in v3 {
            g.vertices.push(Vec4::from_3d(v, -d));
        }
        g.cells.extend_from_slice(tetras);
        for &t in tetras {
            g.cells.push(t + base);
        }
        for &v in v3 {
            g.vertices.push(Vec4::from_3d(v, d));
        }

        for tri in tris.chunks_exact(3) {
            let (a, b, c) = (tri[0], tri[1], tri[2]);
            let (e, f, h) = (a + base, b + base, c + base);
            g.push_cell(a, c, f, e);
            g.push_cell(b, f, c, a);
            g.push_cell(c, f, h, e);
        }

        g
    }

    /// Recomputes the per-vertex normal vectors, using solid angle weighting
    /// if the mesh is indexed.
    ///
    /// Each cell's normal comes from the 4D cross product of three edge
    /// vectors; its orientation is corrected so it faces away from (or, if
    /// `inwards`, toward) the nearest skeleton point, swapping the cell's
    /// vertex order to match. Cells lying in a hyperplane through the
    /// checker point carry no orientation relative to it; those fall back to
    /// the sign of the normal's dominant component, so flat meshes get a
    /// uniform orientation regardless of per-cell winding. Indexed meshes
    /// then distribute the normal to
    /// the four incident vertices weighted by the solid angle subtended at
    /// each vertex (Wirth & Dreiding 2014, theorem 2), since tetrahedron
    /// volume is one sixth of the cross product norm.
    pub fn recompute_normals(&mut self, inwards: bool) {
        self.normals.clear();

        if self.is_indexed() {
            debug_assert!(self.cells.len() % 4 == 0);
            self.normals.resize(self.vertices.len(), Vec4::ZERO);

            for c in (0..self.cells.len()).step_by(4) {
                let cell_n = self.oriented_cell_normal_at(c, inwards);
                let para_volume = cell_n.length();
                if para_volume == 0.0 {
                    continue; // degenerate cell contributes nothing
                }

                // Re-read indices after the orientation pass may have swapped them
                let idx = [
                    self.cells[c] as usize,
                    self.cells[c + 1] as usize,
                    self.cells[c + 2] as usize,
                    self.cells[c + 3] as usize,
                ];
                let sdist = |i: usize, j: usize| {
                    self.vertices[idx[i % 4]].distance_squared(self.vertices[idx[j % 4]])
                };

                for i in 0..4 {
                    let eij = sdist(i, i + 1).sqrt();
                    let eik = sdist(i, i + 2).sqrt();
                    let eil = sdist(i, i + 3).sqrt();
                    let sejk = sdist(i + 1, i + 2);
                    let sejl = sdist(i + 1, i + 3);
                    let sekl = sdist(i + 2, i + 3);
                    let ni = (eij + eik) * (eik + eil) * (eil + eij)
                        - (eij * sekl + eik * sejl + eil * sejk);
                    let phi = (para_volume * 2.0 / ni).atan();
                    self.normals[idx[i]] += cell_n * phi;
                }
            }
        } else {
            debug_assert!(self.vertices.len() % 4 == 0);
            for i in (0..self.vertices.len()).step_by(4) {
                let v0 = self.vertices[i];
                let mut n = cross4(
                    self.vertices[i + 1] - v0,
                    self.vertices[i + 2] - v0,
                    self.vertices[i + 3] - v0,
                );
                let checker = self.checker_for(v0);
                if faces_checker(n, v0, checker) != inwards {
                    self.vertices.swap(i + 2, i + 3);
                    n = -n;
                }
                for _ in 0..4 {
                    self.normals.push(n);
                }
            }
        }

        for n in &mut self.normals {
            *n = n.normalized();
        }
    }

    /// Cell normal at cell offset `c`, flipping the normal and the cell's
    /// vertex order so it faces the requested way relative to the checker.
    fn oriented_cell_normal_at(&mut self, c: usize, inwards: bool) -> Vec4 {
        let v0 = self.vertices[self.cells[c] as usize];
        let n = cross4(
            self.vertices[self.cells[c + 1] as usize] - v0,
            self.vertices[self.cells[c + 2] as usize] - v0,
            self.vertices[self.cells[c + 3] as usize] - v0,
        );
        let checker = self.checker_for(v0);
        if faces_checker(n, v0, checker) != inwards {
            self.cells.swap(c + 2, c + 3);
            -n
        } else {
            n
        }
    }

    /// Reference point the normal orientation is checked against: the nearest
    /// skeleton point, or the origin when no skeleton is set.
    fn checker_for(&self, v: Vec4) -> Vec4 {
        match nearest_point(v, &self.skeleton) {
            Some(i) => self.skeleton[i],
            None => Vec4::ZERO,
        }
    }

    /// Barycenter of the geometry.
    pub fn barycenter(&self) -> Vec4 {
        debug_assert!(!self.vertices.is_empty());
        if self.vertices.is_empty() {
            return Vec4::ZERO;
        }
        let sum = self.vertices.iter().fold(Vec4::ZERO, |acc, &v| acc + v);
        sum / self.vertices.len() as f32
    }

    /// Componentwise bounding box of the geometry as `(min, max)`.
    pub fn bounding_box(&self) -> (Vec4, Vec4) {
        debug_assert!(!self.vertices.is_empty());
        let mut min = self.vertices[0];
        let mut max = self.vertices[0];
        for &v in &self.vertices {
            min = min.min_components(v);
            max = max.max_components(v);
        }
        (min, max)
    }

    /// Unindexes the mesh: duplicates vertices per cell and clears the cells
    /// array. A no-op on already unindexed meshes. Normals are not updated;
    /// call [`Geometry4::recompute_normals`] afterwards.
    pub fn unindex(&mut self) {
        if !self.is_indexed() {
            return;
        }
        let flat: Vec<Vec4> = self
            .cells
            .iter()
            .map(|&i| self.vertices[i as usize])
            .collect();
        self.vertices = flat;
        self.cells.clear();
    }

    /// Pushes one tetrahedron onto the cells array.
    #[inline]
    pub fn push_cell(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.cells.extend_from_slice(&[a, b, c, d]);
    }

    /// Whether the geometry is indexed or uses vertex duplication.
    #[inline]
    pub fn is_indexed(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Number of tetrahedral cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        if self.is_indexed() {
            self.cells.len() / 4
        } else {
            self.vertices.len() / 4
        }
    }
}

/// Whether `n` points from `v0` toward the checker point. A vanishing dot
/// product means `v0` lies in a hyperplane through the checker and the
/// checker carries no orientation information; the sign of the normal's
/// dominant component decides instead, uniformly across all cells of a flat
/// mesh.
fn faces_checker(n: Vec4, v0: Vec4, checker: Vec4) -> bool {
    let d = n.dot(v0 - checker);
    if d != 0.0 {
        return d < 0.0;
    }
    let mut dominant = 0.0f32;
    for axis in 0..4 {
        let c = n.component(axis);
        if c.abs() > dominant.abs() {
            dominant = c;
        }
    }
    dominant < 0.0
}

/// The 8 corners of the unit cube, corner `i` at `((i & 1), (i >> 1 & 1), (i >> 2 & 1))`.
pub const CUBE_CORNERS: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
];

/// The 6-tetrahedron decomposition of the unit cube used by the demo scenes.
pub const CUBE_TETRAHEDRA: [u32; 24] = [
    0, 3, 5, 4, //
    1, 5, 3, 0, //
    3, 5, 7, 4, //
    1, 3, 6, 5, //
    2, 6, 3, 1, //
    3, 6, 7, 5, //
];

/// Boundary triangles of the unit cube (two per face), consistent with
/// [`CUBE_TETRAHEDRA`].
pub const CUBE_TRIANGLES: [u32; 36] = [
    0, 1, 3, 0, 3, 2, // z = 0
    4, 7, 5, 4, 6, 7, // z = 1
    0, 5, 1, 0, 4, 5, // y = 0
    2, 3, 7, 2, 7, 6, // y = 1
    0, 2, 6, 0, 6, 4, // x = 0
    1, 5, 7, 1, 7, 3, // x = 1
];

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn vec_approx_eq(a: Vec4, b: Vec4) -> bool {
        (a - b).length() < EPSILON
    }

    fn cube() -> Geometry4 {
        Geometry4::from_3d(&CUBE_CORNERS, &CUBE_TETRAHEDRA)
    }

    #[test]
    fn test_from_3d_promotes_with_zero_w() {
        let g = cube();
        assert_eq!(g.vertices.len(), 8);
        assert_eq!(g.cells.len(), 24);
        assert!(g.vertices.iter().all(|v| v.w == 0.0));
        assert!(g.normals.is_empty());
        assert!(g.is_indexed());
        assert_eq!(g.cell_count(), 6);
    }

    #[test]
    fn test_extrude_3d_counts() {
        let g = Geometry4::extrude_3d(&CUBE_CORNERS, &CUBE_TRIANGLES, &CUBE_TETRAHEDRA, 0.2);
        // two layers of vertices
        assert_eq!(g.vertices.len(), 16);
        assert!(g.vertices[..8].iter().all(|v| (v.w + 0.1).abs() < EPSILON));
        assert!(g.vertices[8..].iter().all(|v| (v.w - 0.1).abs() < EPSILON));
        // duplicated tetrahedra + 3 wall cells per boundary triangle
        assert_eq!(g.cell_count(), 6 * 2 + 12 * 3);
        // second layer of duplicated tetrahedra references offset indices
        assert_eq!(g.cells[24], CUBE_TETRAHEDRA[0] + 8);
    }

    #[test]
    fn test_recompute_normals_cube_inwards() {
        // All cells lie in the w = 0 hyperplane through the origin checker,
        // so orientation falls back to the dominant-component sign: every
        // cell ends up at -W for the inwards configuration.
        let mut g = cube();
        g.recompute_normals(true);
        assert_eq!(g.normals.len(), 8);
        for (i, n) in g.normals.iter().enumerate() {
            assert!(
                vec_approx_eq(*n, -Vec4::W),
                "normal {} should be -W, got {:?}",
                i,
                n
            );
        }
        // the flip also swapped each cell's last two vertices
        assert_eq!(&g.cells[..4], &[0, 3, 4, 5]);
    }

    #[test]
    fn test_recompute_normals_flat_cube_outwards_uniform() {
        // CUBE_TETRAHEDRA mixes cell windings and every cell lies in the
        // w = 0 hyperplane through the origin checker; the result must still
        // be one uniform orientation, not winding-dependent mixed signs.
        let mut g = cube();
        g.recompute_normals(false);
        for (i, n) in g.normals.iter().enumerate() {
            assert!(
                vec_approx_eq(*n, Vec4::W),
                "normal {} should be +W, got {:?}",
                i,
                n
            );
        }
    }

    #[test]
    fn test_recompute_normals_single_cell_outwards() {
        // A tetrahedron in the w = 1 hyperplane: its outward (away from the
        // origin) normal is +W at every vertex.
        let mut g = Geometry4::default();
        g.vertices = vec![
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 1.0, 0.0, 1.0),
            Vec4::new(0.0, 0.0, 1.0, 1.0),
        ];
        g.cells = vec![0, 1, 2, 3];
        g.recompute_normals(false);
        for n in &g.normals {
            assert!(vec_approx_eq(*n, Vec4::W), "expected +W, got {:?}", n);
        }

        // the inwards configuration points the other way
        g.recompute_normals(true);
        for n in &g.normals {
            assert!(vec_approx_eq(*n, -Vec4::W), "expected -W, got {:?}", n);
        }
    }

    #[test]
    fn test_recompute_normals_unindexed_path() {
        let mut g = cube();
        g.unindex();
        g.recompute_normals(true);
        assert_eq!(g.normals.len(), 24);
        // uniform normal per 4-vertex group
        for group in g.normals.chunks_exact(4) {
            assert!(vec_approx_eq(group[0], group[1]));
            assert!(vec_approx_eq(group[0], group[3]));
            assert!(vec_approx_eq(group[0], -Vec4::W));
        }
    }

    #[test]
    fn test_extruded_cube_normals_point_outwards() {
        // With an extruded cube centered on its own barycenter as skeleton,
        // outward normals at the two layers point away from the center in w.
        let mut g = Geometry4::extrude_3d(&CUBE_CORNERS, &CUBE_TRIANGLES, &CUBE_TETRAHEDRA, 0.2);
        g.skeleton = vec![g.barycenter()];
        g.recompute_normals(false);
        assert_eq!(g.normals.len(), g.vertices.len());
        for n in &g.normals {
            assert!((n.length() - 1.0).abs() < EPSILON || n.length() < EPSILON);
        }
    }

    #[test]
    fn test_unindex() {
        let mut g = cube();
        g.unindex();
        assert!(!g.is_indexed());
        assert_eq!(g.vertices.len(), 24);
        assert_eq!(g.cell_count(), 6);
        // idempotent on flat meshes
        let before = g.vertices.clone();
        g.unindex();
        assert_eq!(g.vertices, before);
    }

    #[test]
    fn test_barycenter_and_bounding_box() {
        let g = cube();
        assert!(vec_approx_eq(g.barycenter(), Vec4::new(0.5, 0.5, 0.5, 0.0)));
        let (min, max) = g.bounding_box();
        assert!(vec_approx_eq(min, Vec4::ZERO));
        assert!(vec_approx_eq(max, Vec4::new(1.0, 1.0, 1.0, 0.0)));
    }
}
