//! Index-arena scene graph
//!
//! The scene owns every node and every geometry; external references are
//! plain indices ([`NodeId`], [`GeometryId`]). A single traversal primitive,
//! [`Scene::visit`], fixes the node order once: the static shadow-geometry
//! buffers and the per-frame model-transform buffers are both collected
//! through it, so their object indexing agrees by construction.

use crate::{Geometry4, Transform4};
use tetra4d_math::{Mat4, Vec4};

/// Handle to a node in the scene arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw index of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a geometry owned by the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeometryId(usize);

impl GeometryId {
    /// Raw index of this geometry
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the 4D scene: a transform, render attributes, and children.
#[derive(Clone, Debug)]
pub struct Node4 {
    /// Local transform, chained onto the parent's accumulated transform
    pub transform: Transform4,
    /// RGBA color handed to the geometry pass
    pub color: [f32; 4],
    /// Whether the node's geometry is drawn
    pub visible: bool,
    /// Whether the node's geometry casts shadows
    pub cast_shadows: bool,
    /// Geometry rendered at this node, if any
    pub geometry: Option<GeometryId>,
    children: Vec<NodeId>,
}

impl Default for Node4 {
    fn default() -> Self {
        Self {
            transform: Transform4::IDENTITY,
            color: [1.0, 1.0, 1.0, 1.0],
            visible: true,
            cast_shadows: true,
            geometry: None,
            children: Vec::new(),
        }
    }
}

impl Node4 {
    /// Child nodes, in insertion order
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Static per-scene shadow-casting geometry, flattened for GPU upload.
///
/// `cells` holds 4 vertex indices per tetrahedron into `vertices`;
/// `object_indices` holds one node visit-index per tetrahedron, matching the
/// order of [`Scene::collect_model_transforms`].
#[derive(Clone, Debug, Default)]
pub struct ShadowGeometry {
    pub cells: Vec<u32>,
    pub object_indices: Vec<u32>,
    pub vertices: Vec<Vec4>,
}

impl ShadowGeometry {
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len() / 4
    }
}

/// The 4D scene: an arena of nodes plus the geometries they reference.
pub struct Scene {
    nodes: Vec<Node4>,
    geometries: Vec<Geometry4>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Root node of every scene
    pub const ROOT: NodeId = NodeId(0);

    /// Create a scene containing only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node4::default()],
            geometries: Vec::new(),
        }
    }

    /// Move a geometry into the scene, returning its handle.
    pub fn add_geometry(&mut self, geometry: Geometry4) -> GeometryId {
        let id = GeometryId(self.geometries.len());
        self.geometries.push(geometry);
        id
    }

    /// Add an empty node under `parent`, returning its handle.
    pub fn add_node(&mut self, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node4::default());
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Add a node under `parent` rendering `geometry`.
    pub fn add_model(&mut self, parent: NodeId, geometry: GeometryId) -> NodeId {
        let id = self.add_node(parent);
        self.nodes[id.0].geometry = Some(geometry);
        id
    }

    /// Duplicate a node's attributes (not its children) under `parent`.
    pub fn clone_node(&mut self, parent: NodeId, source: NodeId) -> NodeId {
        let mut node = self.nodes[source.0].clone();
        node.children.clear();
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node4 {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node4 {
        &mut self.nodes[id.0]
    }

    #[inline]
    pub fn geometry(&self, id: GeometryId) -> &Geometry4 {
        &self.geometries[id.0]
    }

    #[inline]
    pub fn geometry_mut(&mut self, id: GeometryId) -> &mut Geometry4 {
        &mut self.geometries[id.0]
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Geometries in handle order, for GPU upload.
    pub fn geometries(&self) -> impl Iterator<Item = &Geometry4> {
        self.geometries.iter()
    }

    /// Depth-first traversal, children in insertion order, calling `f` with
    /// each node and its accumulated world transform. This order is the
    /// object-index contract shared by every collector below.
    pub fn visit<F: FnMut(NodeId, &Node4, &Transform4)>(&self, mut f: F) {
        self.visit_from(Self::ROOT, &Transform4::IDENTITY, &mut f);
    }

    fn visit_from<F: FnMut(NodeId, &Node4, &Transform4)>(
        &self,
        id: NodeId,
        parent: &Transform4,
        f: &mut F,
    ) {
        let node = &self.nodes[id.0];
        let world = node.transform.chain(parent);
        f(id, node, &world);
        for &child in &node.children {
            self.visit_from(child, &world, f);
        }
    }

    /// Visit-order position of each node, i.e. the object index used by the
    /// shadow buffers. Computed once at setup.
    fn visit_indices(&self) -> Vec<u32> {
        let mut order = vec![0u32; self.nodes.len()];
        let mut next = 0u32;
        self.visit(|id, _, _| {
            order[id.index()] = next;
            next += 1;
        });
        order
    }

    /// Flattens all shadow-casting geometry into the static GPU buffers:
    /// cell indices (offset into the shared vertex array), one object index
    /// per cell, and the vertex positions themselves. Unindexed meshes
    /// contribute their implicit cells.
    pub fn collect_shadow_geometry(&self) -> ShadowGeometry {
        let mut out = ShadowGeometry::default();
        let mut object_index = 0u32;
        self.visit(|_, node, _| {
            let index = object_index;
            object_index += 1;
            let geometry = match node.geometry {
                Some(id) if node.cast_shadows => self.geometry(id),
                _ => return,
            };
            let base = out.vertices.len() as u32;
            if geometry.is_indexed() {
                for cell in geometry.cells.chunks_exact(4) {
                    out.cells.extend(cell.iter().map(|&i| i + base));
                    out.object_indices.push(index);
                }
            } else {
                for k in 0..geometry.vertices.len() as u32 {
                    out.cells.push(k + base);
                    if k % 4 == 0 {
                        out.object_indices.push(index);
                    }
                }
            }
            out.vertices.extend_from_slice(&geometry.vertices);
        });
        log::debug!(
            "collected {} shadow-casting cells over {} vertices",
            out.cell_count(),
            out.vertices.len()
        );
        out
    }

    /// Per-frame accumulated model transforms for every node, split into the
    /// matrix and translation arrays the shadow computer consumes. Indexed by
    /// the same visit order as [`Scene::collect_shadow_geometry`].
    pub fn collect_model_transforms(&self) -> (Vec<Mat4>, Vec<Vec4>) {
        let mut mats = Vec::with_capacity(self.nodes.len());
        let mut translations = Vec::with_capacity(self.nodes.len());
        self.visit(|_, _, world| {
            mats.push(world.mat);
            translations.push(world.pos);
        });
        (mats, translations)
    }

    /// Total number of tetrahedra attached to visible nodes, for debug
    /// overlays and logs.
    pub fn tetrahedron_count(&self) -> usize {
        let mut count = 0;
        self.visit(|_, node, _| {
            if let Some(id) = node.geometry {
                count += self.geometry(id).cell_count();
            }
        });
        count
    }

    /// Sanity helper for tests: object indices must refer to transform slots.
    pub fn validate_shadow_indices(&self, shadow: &ShadowGeometry) -> bool {
        let slots = self.visit_indices().len() as u32;
        shadow.object_indices.iter().all(|&i| i < slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Plane4, CUBE_CORNERS, CUBE_TETRAHEDRA};
    use tetra4d_math::Vec4;

    const EPSILON: f32 = 1e-5;

    fn cube_scene() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let geometry = scene.add_geometry(Geometry4::from_3d(&CUBE_CORNERS, &CUBE_TETRAHEDRA));
        let parent = scene.add_node(Scene::ROOT);
        scene.node_mut(parent).transform.pos = Vec4::new(1.0, 0.0, 0.0, 0.0);
        let child = scene.add_model(parent, geometry);
        scene.node_mut(child).transform.pos = Vec4::new(0.0, 2.0, 0.0, 0.0);
        (scene, parent, child)
    }

    #[test]
    fn test_world_transform_accumulates_top_down() {
        let (scene, _, child) = cube_scene();
        let mut seen = None;
        scene.visit(|id, _, world| {
            if id == child {
                seen = Some(*world);
            }
        });
        let world = seen.expect("child visited");
        // child local pos chained through the parent translation
        assert!((world.apply(Vec4::ZERO) - Vec4::new(1.0, 2.0, 0.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_visit_order_is_deterministic_depth_first() {
        let mut scene = Scene::new();
        let a = scene.add_node(Scene::ROOT);
        let b = scene.add_node(Scene::ROOT);
        let a1 = scene.add_node(a);
        let mut order = Vec::new();
        scene.visit(|id, _, _| order.push(id));
        assert_eq!(order, vec![Scene::ROOT, a, a1, b]);
    }

    #[test]
    fn test_shadow_and_transform_collections_agree() {
        let (scene, _, child) = cube_scene();
        let shadow = scene.collect_shadow_geometry();
        let (mats, translations) = scene.collect_model_transforms();

        // one transform slot per node, in visit order
        assert_eq!(mats.len(), scene.node_count());
        assert_eq!(translations.len(), mats.len());
        assert!(scene.validate_shadow_indices(&shadow));

        // all cube cells attribute to the child's visit index (root=0, parent=1, child=2)
        assert_eq!(shadow.cell_count(), 6);
        assert!(shadow.object_indices.iter().all(|&i| i == 2));
        // that slot holds the child's world translation
        assert!((translations[2] - Vec4::new(1.0, 2.0, 0.0, 0.0)).length() < EPSILON);
        let _ = child;
    }

    #[test]
    fn test_unindexed_geometry_contributes_implicit_cells() {
        let mut scene = Scene::new();
        let mut g = Geometry4::from_3d(&CUBE_CORNERS, &CUBE_TETRAHEDRA);
        g.unindex();
        let gid = scene.add_geometry(g);
        scene.add_model(Scene::ROOT, gid);

        let shadow = scene.collect_shadow_geometry();
        assert_eq!(shadow.cell_count(), 6);
        assert_eq!(shadow.vertices.len(), 24);
        // implicit cells are consecutive indices
        assert_eq!(&shadow.cells[..8], &[0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_non_casting_nodes_keep_their_transform_slot() {
        let (mut scene, _, child) = cube_scene();
        scene.node_mut(child).cast_shadows = false;
        let shadow = scene.collect_shadow_geometry();
        let (mats, _) = scene.collect_model_transforms();
        assert_eq!(shadow.cell_count(), 0);
        // slots are unaffected by casting flags
        assert_eq!(mats.len(), scene.node_count());
    }

    #[test]
    fn test_two_objects_offset_vertices() {
        let mut scene = Scene::new();
        let g = scene.add_geometry(Geometry4::from_3d(&CUBE_CORNERS, &CUBE_TETRAHEDRA));
        let first = scene.add_model(Scene::ROOT, g);
        let second = scene.add_model(Scene::ROOT, g);
        scene
            .node_mut(second)
            .transform
            .rotate(Plane4::Xw, std::f32::consts::FRAC_PI_2);

        let shadow = scene.collect_shadow_geometry();
        assert_eq!(shadow.cell_count(), 12);
        assert_eq!(shadow.vertices.len(), 16);
        // second object's cells index into its own vertex block
        assert!(shadow.cells[24..].iter().all(|&i| (8..16).contains(&i)));
        // object indices follow visit order: root=0, first=1, second=2
        assert!(shadow.object_indices[..6].iter().all(|&i| i == 1));
        assert!(shadow.object_indices[6..].iter().all(|&i| i == 2));
        let _ = first;
    }
}
