//! Tetra4D - interactive 4D scene visualizer
//!
//! Walks a camera through true 4D scenes built from tetrahedral meshes,
//! with per-tetrahedron alias-free shadow hypervolumes computed on the GPU.
//! The binary in `main.rs` wires these modules to a winit event loop.

pub mod config;
pub mod demo;
pub mod input;
