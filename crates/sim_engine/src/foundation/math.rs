//! Math utilities and types
//!
//! Provides the fundamental math types used across the simulation core.

pub use nalgebra::{Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type (also used for RGBA colors in draw commands)
pub type Vec4 = Vector4<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// Squared distance between two positions
pub fn distance_squared(a: Vec2, b: Vec2) -> f32 {
    (b - a).norm_squared()
}

/// Distance between two positions
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).norm()
}
