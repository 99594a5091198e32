//! 3-D Axis Aligned Bounding Boxes.

use super::{Point3f, Ray, Vector3f};
use crate::math::*;
use std::fmt;

/// 3-D Axis Aligned Bounding Box over `Float` coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3f {
    /// Minimum bounds.
    pub p_min: Point3f,

    /// Maximum bounds.
    pub p_max: Point3f,
}

impl Default for Bounds3f {
    /// Returns the "default value" for `Bounds3f`.
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds3f {
    /// Empty bounding box. Union with any point yields that point.
    pub const EMPTY: Self = Self {
        p_min: Point3f {
            x: INFINITY,
            y: INFINITY,
            z: INFINITY,
        },
        p_max: Point3f {
            x: -INFINITY,
            y: -INFINITY,
            z: -INFINITY,
        },
    };

    /// Creates a new bounding box enclosing two points.
    ///
    /// * `p1` - First corner.
    /// * `p2` - Second corner.
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        Self {
            p_min: p1.min(&p2),
            p_max: p1.max(&p2),
        }
    }

    /// Returns true if the box encloses nothing.
    pub fn is_empty(&self) -> bool {
        self.p_min.x > self.p_max.x || self.p_min.y > self.p_max.y || self.p_min.z > self.p_max.z
    }

    /// Returns the union with a point.
    ///
    /// * `p` - The point.
    pub fn union_point(&self, p: &Point3f) -> Self {
        Self {
            p_min: self.p_min.min(p),
            p_max: self.p_max.max(p),
        }
    }

    /// Returns the union with another bounding box.
    ///
    /// * `other` - The other bounding box.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            p_min: self.p_min.min(&other.p_min),
            p_max: self.p_max.max(&other.p_max),
        }
    }

    /// Returns the vector from the minimum to the maximum corner.
    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    /// Returns the centroid of the box.
    pub fn centroid(&self) -> Point3f {
        (self.p_min + self.p_max) * 0.5
    }

    /// Returns the axis along which the box is longest.
    pub fn maximum_extent(&self) -> Axis {
        self.diagonal().max_dimension()
    }

    /// Returns the surface area of the box. Empty boxes have zero area.
    pub fn surface_area(&self) -> Float {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    /// Returns the continuous position of a point relative to the corners of
    /// the box, where a point at the minimum corner has offset `(0, 0, 0)` and
    /// a point at the maximum corner has offset `(1, 1, 1)`.
    ///
    /// * `p` - The point.
    pub fn offset(&self, p: &Point3f) -> Vector3f {
        let mut o = *p - self.p_min;
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            if self.p_max[axis] > self.p_min[axis] {
                o[axis] /= self.p_max[axis] - self.p_min[axis];
            }
        }
        o
    }

    /// Returns true if a ray segment `(min_t, max_t)` overlaps the box.
    ///
    /// * `ray`        - The ray.
    /// * `inv_dir`    - Reciprocal of the ray direction.
    /// * `dir_is_neg` - Indicates whether each direction component is negative.
    /// * `min_t`      - Lower end of the segment.
    /// * `max_t`      - Upper end of the segment.
    pub fn intersect_p_inv(
        &self,
        ray: &Ray,
        inv_dir: &Vector3f,
        dir_is_neg: [usize; 3],
        min_t: Float,
        max_t: Float,
    ) -> bool {
        let mut t0 = min_t;
        let mut t1 = max_t;
        for axis in 0..3 {
            let near = if dir_is_neg[axis] == 1 { self.p_max[axis] } else { self.p_min[axis] };
            let far = if dir_is_neg[axis] == 1 { self.p_min[axis] } else { self.p_max[axis] };

            let t_near = (near - ray.o[axis]) * inv_dir[axis];
            // Widen the far slab to stay robust against rounding.
            let t_far = (far - ray.o[axis]) * inv_dir[axis] * (1.0 + 2.0 * gamma(3));

            // NaN arises for rays lying on a slab plane; treat it as a pass.
            if t_near > t0 {
                t0 = t_near;
            }
            if t_far < t1 {
                t1 = t_far;
            }
            if t0 > t1 {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for Bounds3f {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.p_min, self.p_max)
    }
}
