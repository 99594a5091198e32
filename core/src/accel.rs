//! Acceleration Structures

use crate::geometry::*;
use crate::interaction::*;
use crate::math::*;
use crate::paramset::*;
use crate::primitive::*;
use crate::registry::*;

/// Spatial index over the triangles of a scene's primitives.
///
/// An accelerator is built once and then queried concurrently. It stores
/// only indices; queries take the primitive slice it was built from.
pub trait Accel: Send + Sync {
    /// Build the index from scratch, discarding any previous one. Fails when
    /// there are no triangles or a vertex is not finite; the structure is left
    /// empty then and reports no hits.
    ///
    /// * `primitives` - Scene primitives.
    fn build(&mut self, primitives: &[Primitive]) -> Result<(), String>;

    /// Returns the closest hit with distance strictly inside `(min_t, max_t)`.
    /// Hits at equal distance resolve to the triangle that came first in the
    /// build order.
    ///
    /// * `primitives` - The primitives passed to `build()`.
    /// * `ray`        - The ray; its direction must not be zero.
    /// * `min_t`      - Lower distance bound.
    /// * `max_t`      - Upper distance bound.
    fn intersect<'a>(
        &self,
        primitives: &'a [Primitive],
        ray: &Ray,
        min_t: Float,
        max_t: Float,
    ) -> Option<Intersection<'a>>;
}

/// Factory type for accelerators.
pub type AccelRegistry = Registry<dyn Accel>;

/// Create an accelerator by name, e.g. `accel::bvh`.
///
/// * `registry` - Registry filled with accelerator factories.
/// * `name`     - Component name.
/// * `params`   - Parameters.
pub fn create_accel(
    registry: &AccelRegistry,
    name: &str,
    params: &ParamSet,
) -> Result<Box<dyn Accel>, String> {
    registry.create(name, params)
}

/// Reference to one triangle of a primitive's mesh.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TriangleRef {
    /// Primitive index.
    pub primitive: u32,

    /// Face index within the primitive's mesh.
    pub face: u32,

    /// Position in build order, used to break ties.
    pub order: u32,
}

impl TriangleRef {
    /// Returns the triangle bounds.
    ///
    /// * `primitives` - Scene primitives.
    pub fn bounds(&self, primitives: &[Primitive]) -> Bounds3f {
        match &primitives[self.primitive as usize].mesh {
            Some(mesh) => mesh.triangle_bounds(self.face as usize),
            None => Bounds3f::EMPTY,
        }
    }

    /// Intersect the triangle; returns `(t, b1, b2)`.
    ///
    /// * `primitives` - Scene primitives.
    /// * `ray`        - The ray.
    /// * `min_t`      - Lower distance bound.
    /// * `max_t`      - Upper distance bound.
    #[inline]
    pub fn intersect(
        &self,
        primitives: &[Primitive],
        ray: &Ray,
        min_t: Float,
        max_t: Float,
    ) -> Option<(Float, Float, Float)> {
        primitives[self.primitive as usize]
            .mesh
            .as_ref()
            .and_then(|mesh| mesh.intersect_triangle(self.face as usize, ray, min_t, max_t))
    }
}

/// Enumerate the triangles of all primitives in order, validating that there
/// is at least one and that all vertices are finite.
///
/// * `primitives` - Scene primitives.
pub fn collect_triangles(primitives: &[Primitive]) -> Result<Vec<TriangleRef>, String> {
    let mut triangles = vec![];
    for (i, primitive) in primitives.iter().enumerate() {
        let Some(mesh) = &primitive.mesh else {
            continue;
        };
        if !mesh.is_finite() {
            return Err(format!("Primitive '{}' has non-finite vertices", primitive.id));
        }
        for face in 0..mesh.num_triangles() {
            triangles.push(TriangleRef {
                primitive: i as u32,
                face: face as u32,
                order: triangles.len() as u32,
            });
        }
    }

    if triangles.is_empty() {
        return Err(String::from("Scene contains no triangles"));
    }
    Ok(triangles)
}

/// Tracks the closest hit found so far during traversal.
#[derive(Copy, Clone, Debug)]
pub struct ClosestHit {
    best: Option<(TriangleRef, Float, Float, Float)>,
    max_t: Float,
}

impl ClosestHit {
    /// Start a query over `(min_t, max_t)`.
    ///
    /// * `max_t` - Upper distance bound.
    pub fn new(max_t: Float) -> Self {
        Self { best: None, max_t }
    }

    /// Returns the current exclusive upper bound for candidate hits. Once a
    /// hit exists the bound is nudged past it so equal distances are still
    /// tested for the tie rule.
    pub fn bound(&self) -> Float {
        match self.best {
            Some((_, t, _, _)) => next_float_up(t),
            None => self.max_t,
        }
    }

    /// Test a triangle and keep it if it is closer, or equally close and
    /// earlier in build order.
    ///
    /// * `tri`        - The triangle.
    /// * `primitives` - Scene primitives.
    /// * `ray`        - The ray.
    /// * `min_t`      - Lower distance bound.
    #[inline]
    pub fn test(&mut self, tri: &TriangleRef, primitives: &[Primitive], ray: &Ray, min_t: Float) {
        let bound = self.bound();
        if let Some((t, b1, b2)) = tri.intersect(primitives, ray, min_t, bound) {
            if t >= self.max_t {
                return;
            }
            let closer = match self.best {
                Some((best, best_t, _, _)) => t < best_t || (t == best_t && tri.order < best.order),
                None => true,
            };
            if closer {
                self.best = Some((*tri, t, b1, b2));
            }
        }
    }

    /// Returns true if a hit was found.
    pub fn is_hit(&self) -> bool {
        self.best.is_some()
    }

    /// Convert the closest hit into an intersection.
    ///
    /// * `primitives` - Scene primitives.
    pub fn into_intersection(self, primitives: &[Primitive]) -> Option<Intersection<'_>> {
        let (tri, t, b1, b2) = self.best?;
        let primitive = &primitives[tri.primitive as usize];
        let mesh = primitive.mesh.as_ref()?;
        Some(Intersection {
            geom: mesh.surface_geometry(tri.face as usize, b1, b2),
            primitive,
            t,
        })
    }
}

/// Returns false and trips a debug assertion for rays that cannot be traced.
///
/// * `ray` - The ray.
#[inline]
pub fn is_traceable(ray: &Ray) -> bool {
    let ok = ray.d.length_squared() > 0.0;
    debug_assert!(ok, "Ray with zero length direction");
    ok && !ray.has_nans()
}
