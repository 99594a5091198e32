//! Rays

use super::{Point3f, Vector3f};
use crate::math::*;

/// A semi-infinite line parameterized by distance along a normalized direction.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    /// Origin.
    pub o: Point3f,

    /// Direction.
    pub d: Vector3f,
}

impl Ray {
    /// Returns a new ray.
    ///
    /// * `o` - Origin.
    /// * `d` - Direction.
    pub fn new(o: Point3f, d: Vector3f) -> Self {
        Self { o, d }
    }

    /// Returns true if either coordinate is NaN.
    pub fn has_nans(&self) -> bool {
        self.o.has_nans() || self.d.has_nans()
    }

    /// Get position along the ray at given parameter.
    ///
    /// * `t` - Parameter to evaluate.
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }

    /// Returns the component-wise reciprocal of the direction.
    pub fn inv_dir(&self) -> Vector3f {
        Vector3f::new(1.0 / self.d.x, 1.0 / self.d.y, 1.0 / self.d.z)
    }

    /// Returns 1 for each axis along which the direction is negative
    /// (including negative zero) and 0 otherwise.
    pub fn dir_is_neg(&self) -> [usize; 3] {
        let inv_dir = self.inv_dir();
        [
            (inv_dir.x < 0.0) as usize,
            (inv_dir.y < 0.0) as usize,
            (inv_dir.z < 0.0) as usize,
        ]
    }
}
