//! 4D Mathematics Library
//!
//! This crate provides the 4D linear algebra used by the Tetra4D visualizer.
//!
//! ## Core Types
//!
//! - [`Vec4`] - 4D vector with x, y, z, w components
//! - [`Mat4`] - column-major 4x4 matrix
//!
//! ## Free functions
//!
//! - [`cross4`] - the 4D cross product (Hodge dual of the wedge of three vectors)
//! - [`nearest_point`] - stable argmin over a point set

mod vec4;
mod mat4;
mod cross;

pub use vec4::Vec4;
pub use mat4::Mat4;
pub use cross::{cross4, nearest_point};
