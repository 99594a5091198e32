//! Naive Accelerator

use lumen_core::accel::*;
use lumen_core::geometry::*;
use lumen_core::interaction::*;
use lumen_core::math::*;
use lumen_core::paramset::*;
use lumen_core::primitive::*;

/// Tests every triangle against every ray. Serves as the reference the
/// hierarchies are checked against.
#[derive(Clone, Default)]
pub struct NaiveAccel {
    /// All triangles in build order.
    triangles: Vec<TriangleRef>,
}

impl NaiveAccel {
    /// Create a new, unbuilt naive accelerator.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Accel for NaiveAccel {
    fn build(&mut self, primitives: &[Primitive]) -> Result<(), String> {
        self.triangles.clear();
        self.triangles = collect_triangles(primitives)?;
        debug!("Naive accelerator over {} triangles", self.triangles.len());
        Ok(())
    }

    fn intersect<'a>(
        &self,
        primitives: &'a [Primitive],
        ray: &Ray,
        min_t: Float,
        max_t: Float,
    ) -> Option<Intersection<'a>> {
        if !is_traceable(ray) {
            return None;
        }
        let mut closest = ClosestHit::new(max_t);
        for tri in &self.triangles {
            closest.test(tri, primitives, ray, min_t);
        }
        closest.into_intersection(primitives)
    }
}

/// Factory for `accel::naive`.
///
/// * `_params` - Parameter set.
pub fn create_naive_accel(_params: &ParamSet) -> Result<Box<dyn Accel>, String> {
    Ok(Box::new(NaiveAccel::new()))
}
