//! 4D Rendering Library
//!
//! wgpu pipelines for the Tetra4D visualizer: a deferred G-buffer pass over
//! projected tetrahedral meshes, and the 4D shadow hypervolume computer
//! (per-tetrahedron alias-free shadow volumes over a hierarchical screen
//! tiling, after Sintorn, Olsson & Assarsson 2011, generalized to 4D).
//!
//! ## Key Components
//!
//! - [`context::RenderContext`] - wgpu device, queue, and surface management
//! - [`camera4::Camera4`] - 4D camera built on `Transform4::look_at`
//! - [`hierarchy`] - the 5-level screen-tile layout shared with the shaders
//! - [`shadow::ShadowHypervolumes`] - two-phase compute dispatch building the
//!   per-pixel shadow-bit hierarchy
//! - [`deferred`] - G-buffer, geometry pass, and shading pass
//! - [`mesh::GpuMesh`] - uploads a `Geometry4` to GPU buffers

pub mod context;
pub mod camera4;
pub mod hierarchy;
pub mod shadow;
pub mod deferred;
pub mod mesh;

// Re-export core types for convenience
pub use tetra4d_core::{Geometry4, Plane4, Scene, ShadowGeometry, Transform4};
pub use tetra4d_core::{Mat4, Vec4};

pub use camera4::{Camera4, CameraInput};
pub use mesh::GpuMesh;
pub use shadow::{ShadowHypervolumes, ShadowUniforms};
