//! Shading Frames

use super::Vector3f;
use crate::math::*;

/// An orthonormal basis used to move directions between world space and the
/// local shading space where the normal is the z-axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame {
    /// First tangent.
    pub s: Vector3f,

    /// Second tangent.
    pub t: Vector3f,

    /// Normal.
    pub n: Vector3f,
}

impl Default for Frame {
    /// Returns the world axes.
    fn default() -> Self {
        Self {
            s: Vector3f::new(1.0, 0.0, 0.0),
            t: Vector3f::new(0.0, 1.0, 0.0),
            n: Vector3f::new(0.0, 0.0, 1.0),
        }
    }
}

impl Frame {
    /// Builds a frame around a unit normal. The tangents are chosen by zeroing
    /// the smaller of the x/y coordinates and swapping the remaining two.
    ///
    /// * `n` - Unit normal.
    pub fn from_normal(n: &Vector3f) -> Self {
        let t = if abs(n.x) > abs(n.y) {
            Vector3f::new(-n.z, 0.0, n.x) / (n.x * n.x + n.z * n.z).sqrt()
        } else {
            Vector3f::new(0.0, n.z, -n.y) / (n.y * n.y + n.z * n.z).sqrt()
        };
        let s = t.cross(n);
        Self { s, t, n: *n }
    }

    /// Transform a world space direction into local space.
    ///
    /// * `v` - World space direction.
    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.s), v.dot(&self.t), v.dot(&self.n))
    }

    /// Transform a local space direction into world space.
    ///
    /// * `v` - Local space direction.
    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.s * v.x + self.t * v.y + self.n * v.z
    }
}

/// Returns the cosine of the angle between a local direction and the normal.
///
/// * `v` - Local space direction.
#[inline(always)]
pub fn local_cos(v: &Vector3f) -> Float {
    v.z
}
