//! Geometry

mod bounds3;
mod frame;
mod point2;
mod ray;
mod transform;
mod vector3;

// Re-export
pub use bounds3::*;
pub use frame::*;
pub use point2::*;
pub use ray::*;
pub use transform::*;
pub use vector3::*;
