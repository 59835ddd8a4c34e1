//! Core types for the Tetra4D visualizer
//!
//! This crate provides the CPU side of the 4D scene:
//!
//! - [`Transform4`] - composable 4D affine transform (linear part + translation)
//! - [`Plane4`] - the six coordinate rotation planes of 4-space
//! - [`Geometry4`] - tetrahedral mesh with solid-angle-weighted vertex normals
//! - [`Scene`] - index-arena scene graph with a single traversal primitive

mod transform;
mod geometry;
mod scene;

pub use transform::{Plane4, Transform4};
pub use geometry::{Geometry4, CUBE_CORNERS, CUBE_TETRAHEDRA, CUBE_TRIANGLES};
pub use scene::{GeometryId, Node4, NodeId, Scene, ShadowGeometry};

// Re-export the math types for convenience
pub use tetra4d_math::{cross4, nearest_point, Mat4, Vec4};
