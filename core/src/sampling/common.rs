//! Common sampling functions.

use crate::geometry::*;
use crate::math::*;

/// Sample a point on a unit disk by mapping from a unit square to the unit
/// circle. The concentric mapping takes points in [-1, 1]^2 to unit disk by
/// uniformly mapping concentric squares to concentric circles.
///
/// * `u` - The random sample point.
pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    // Map uniform random numbers to [-1,1]^2.
    let u_offset = 2.0 * *u - Point2f::new(1.0, 1.0);

    // Handle degeneracy at the origin.
    if u_offset.x == 0.0 && u_offset.y == 0.0 {
        return Point2f::zero();
    }

    // Apply concentric mapping to point
    let (r, theta) = if abs(u_offset.x) > abs(u_offset.y) {
        (u_offset.x, PI_OVER_FOUR * (u_offset.y / u_offset.x))
    } else {
        (
            u_offset.y,
            PI_OVER_TWO - PI_OVER_FOUR * (u_offset.x / u_offset.y),
        )
    };

    r * Point2f::new(theta.cos(), theta.sin())
}

/// Sample a direction on a hemisphere using cosine-weighted sampling.
///
/// * `u` - The random sample point.
#[inline]
pub fn cosine_sample_hemisphere(u: &Point2f) -> Vector3f {
    let d = concentric_sample_disk(u);
    let z = max(0.0, 1.0 - d.x * d.x - d.y * d.y).sqrt();
    Vector3f::new(d.x, d.y, z)
}

/// Returns the PDF of cosine-weighted hemisphere sampling with respect to
/// projected solid angle, which is constant.
#[inline]
pub fn cosine_hemisphere_pdf_projected() -> Float {
    INV_PI
}

/// Uniformly sample barycentric coordinates on a triangle.
///
/// * `u` - The random sample point.
pub fn uniform_sample_triangle(u: &Point2f) -> Point2f {
    let su0 = u[0].sqrt();
    Point2f::new(1.0 - su0, u[1] * su0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn disk_samples_inside_unit_disk(x in 0.0..1.0f32, y in 0.0..1.0f32) {
            let d = concentric_sample_disk(&Point2f::new(x, y));
            prop_assert!(d.x * d.x + d.y * d.y <= 1.0 + 1e-5);
        }

        #[test]
        fn hemisphere_samples_are_unit_and_upper(x in 0.0..1.0f32, y in 0.0..1.0f32) {
            let w = cosine_sample_hemisphere(&Point2f::new(x, y));
            prop_assert!(w.z >= 0.0);
            prop_assert!((w.length() - 1.0).abs() < 1e-4);
        }

        #[test]
        fn triangle_barycentrics_are_valid(x in 0.0..1.0f32, y in 0.0..1.0f32) {
            let b = uniform_sample_triangle(&Point2f::new(x, y));
            prop_assert!(b.x >= 0.0 && b.y >= 0.0 && b.x + b.y <= 1.0 + 1e-6);
        }
    }
}
