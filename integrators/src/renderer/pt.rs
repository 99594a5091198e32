//! Path Tracing Renderer

use super::*;
use crate::scheduler::*;
use crate::subpath::*;
use lumen_core::geometry::*;
use lumen_core::interaction::*;
use lumen_core::math::*;
use lumen_core::paramset::*;

/// Probability of continuing a path at each surface vertex.
const RR_PROB: Float = 0.5;

/// Path tracing: eye subpaths collect emission from the lights they hit.
#[derive(Copy, Clone, Debug)]
pub struct PTRenderer {
    /// Render loop settings.
    pub scheduler: RenderScheduler,

    /// Maximum number of path vertices; negative for unbounded.
    pub max_num_vertices: Int,
}

impl PTRenderer {
    /// Create a new `PTRenderer`.
    ///
    /// * `scheduler`        - Render loop settings.
    /// * `max_num_vertices` - Maximum number of path vertices.
    pub fn new(scheduler: RenderScheduler, max_num_vertices: Int) -> Self {
        Self {
            scheduler,
            max_num_vertices,
        }
    }
}

impl Renderer for PTRenderer {
    fn render(&self, scene: &Scene, init_rng: &mut Random, film: &mut dyn Film, parallel: &Parallel) -> Result<(), String> {
        require_sensor(scene)?;
        let max_num_vertices = self.max_num_vertices;

        self.scheduler.process(parallel, scene, film, init_rng, |scene, film, rng| {
            trace_subpath(
                scene,
                rng,
                max_num_vertices,
                TransportDirection::EL,
                |_num_vertices, raster_pos, pv, v, throughput, rng| {
                    let Some(raster_pos) = raster_pos else {
                        return false;
                    };
                    let Some(pv) = pv else {
                        return true;
                    };

                    if let Some(emitter) = &v.primitive.emitter {
                        if v.primitive.interaction_type().contains(SurfaceInteractionType::L) {
                            let le = v.primitive.evaluate_direction(
                                &v.geom,
                                SurfaceInteractionType::L,
                                &Vector3f::zero(),
                                &v.direction_to(pv),
                                TransportDirection::EL,
                                false,
                            ) * emitter.evaluate_position(&v.geom, false);
                            film.splat(&raster_pos, *throughput * le);
                        }
                    }

                    // Russian roulette.
                    if rng.next() > RR_PROB {
                        return false;
                    }
                    *throughput /= RR_PROB;
                    true
                },
            );
        })?;
        Ok(())
    }
}

/// Factory for `renderer::pt`. Reads `max_num_vertices` and the scheduler
/// parameters.
///
/// * `params` - Parameter set.
pub fn create_pt_renderer(params: &ParamSet) -> Result<Box<dyn Renderer>, String> {
    let scheduler = RenderScheduler::from_params(params)?;
    let max_num_vertices = params.find_one_int("max_num_vertices", -1);
    Ok(Box::new(PTRenderer::new(scheduler, max_num_vertices)))
}
