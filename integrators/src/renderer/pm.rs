//! Photon Mapping Renderer

use super::*;
use crate::photon_map::*;
use crate::photon_trace::*;
use crate::scheduler::*;
use crate::subpath::*;
use lumen_core::geometry::*;
use lumen_core::interaction::*;
use lumen_core::math::*;
use lumen_core::paramset::*;

/// Probability of continuing a light subpath at each surface vertex.
const RR_PROB: Float = 0.5;

/// Photon mapping. Light subpaths deposit photons on diffuse and glossy
/// surfaces; eye subpaths estimate radiance from the nearest photons where
/// they land on such a surface.
#[derive(Clone, Debug)]
pub struct PMRenderer {
    /// Render loop settings for the eye pass.
    pub scheduler: RenderScheduler,

    /// Maximum number of path vertices; negative for unbounded.
    pub max_num_vertices: Int,

    /// Number of traced light subpaths.
    pub num_photon_trace_samples: u64,

    /// Bounce once off the first diffuse or glossy surface before the
    /// density estimate.
    pub finalgather: bool,

    /// Photon map name, e.g. `kdtree`.
    pub photon_map: String,

    /// Number of photons used per density estimate.
    pub num_nn_query_photons: usize,

    /// Maximum search radius of a density estimate.
    pub max_dist: Float,
}

impl PMRenderer {
    /// Trace the light subpaths and return the recorded photons.
    ///
    /// * `scene`    - The scene.
    /// * `init_rng` - Source of the per-thread seeds.
    /// * `parallel` - Worker pool.
    fn trace_photons(&self, scene: &Scene, init_rng: &mut Random, parallel: &Parallel) -> Vec<Photon> {
        let max_num_vertices = self.max_num_vertices;
        process_photon_trace(
            parallel,
            init_rng,
            self.num_photon_trace_samples,
            |rng: &mut Random, photons: &mut Vec<Photon>| {
                trace_subpath(
                    scene,
                    rng,
                    max_num_vertices,
                    TransportDirection::LE,
                    |num_vertices, _raster_pos, pv, v, throughput, rng| {
                        let Some(pv) = pv else {
                            return true;
                        };

                        if v.interaction_type.intersects(SurfaceInteractionType::D | SurfaceInteractionType::G) {
                            photons.push(Photon {
                                p: v.geom.p,
                                throughput: *throughput,
                                wi: v.direction_to(pv),
                                num_vertices,
                            });
                        }

                        // Russian roulette.
                        if rng.next() > RR_PROB {
                            return false;
                        }
                        *throughput /= RR_PROB;
                        true
                    },
                );
            },
        )
    }
}

impl Renderer for PMRenderer {
    fn render(&self, scene: &Scene, init_rng: &mut Random, film: &mut dyn Film, parallel: &Parallel) -> Result<(), String> {
        require_sensor(scene)?;

        info!("Tracing photons");
        let photons = self.trace_photons(scene, init_rng, parallel);

        info!("Building photon map");
        let mut pm = create_photon_map(&self.photon_map)?;
        pm.build(photons);
        let pm = pm.as_ref();

        let traced_paths = self.num_photon_trace_samples as Float;
        let max_num_vertices = self.max_num_vertices;
        let query_dist2 = self.max_dist * self.max_dist;

        info!("Tracing eye subpaths");
        self.scheduler.process(parallel, scene, film, init_rng, |scene, film, rng| {
            let mut finalgather = !self.finalgather;
            trace_subpath(
                scene,
                rng,
                max_num_vertices,
                TransportDirection::EL,
                |num_vertices, raster_pos, pv, v, throughput, _rng| {
                    let Some(raster_pos) = raster_pos else {
                        return false;
                    };
                    let Some(pv) = pv else {
                        return true;
                    };
                    let wi = v.direction_to(pv);
                    let t = v.primitive.interaction_type();

                    // Emission seen directly.
                    if let Some(emitter) = &v.primitive.emitter {
                        if t.contains(SurfaceInteractionType::L) {
                            let le = v.primitive.evaluate_direction(
                                &v.geom,
                                SurfaceInteractionType::L,
                                &Vector3f::zero(),
                                &wi,
                                TransportDirection::EL,
                                false,
                            ) * emitter.evaluate_position(&v.geom, false);
                            film.splat(&raster_pos, *throughput * le);
                        }
                    }

                    if !t.intersects(SurfaceInteractionType::D | SurfaceInteractionType::G) {
                        return true;
                    }

                    if finalgather {
                        let (nearest, max_dist2) = pm.collect_nearest(&v.geom.p, self.num_nn_query_photons, query_dist2);
                        if max_dist2 > 0.0 {
                            for photon in &nearest {
                                if max_num_vertices >= 0
                                    && num_vertices - 1 + photon.num_vertices > max_num_vertices as usize
                                {
                                    continue;
                                }

                                let k = kernel(&v.geom.p, photon, max_dist2);
                                let density = k / (max_dist2 * traced_paths);
                                let f = v.primitive.evaluate_direction(
                                    &v.geom,
                                    SurfaceInteractionType::BSDF,
                                    &wi,
                                    &photon.wi,
                                    TransportDirection::EL,
                                    true,
                                );
                                film.splat(&raster_pos, *throughput * density * f * photon.throughput);
                            }
                        }

                        // Only specular surfaces continue the eye subpath.
                        if !t.contains(SurfaceInteractionType::S) {
                            return false;
                        }
                    }

                    finalgather = true;
                    true
                },
            );
        })?;
        Ok(())
    }
}

/// Epanechnikov-style kernel `3/π (1 - d²/r²)²`.
///
/// * `p`         - Query point.
/// * `photon`    - The photon.
/// * `max_dist2` - Squared kernel radius.
fn kernel(p: &Point3f, photon: &Photon, max_dist2: Float) -> Float {
    let s = 1.0 - photon.p.distance_squared(p) / max_dist2;
    3.0 * INV_PI * s * s
}

/// Factory for `renderer::pm`. Reads `max_num_vertices`,
/// `num_photon_trace_samples`, `finalgather`, `photonmap`,
/// `num_nn_query_photons`, `max_dist` and the scheduler parameters.
///
/// * `params` - Parameter set.
pub fn create_pm_renderer(params: &ParamSet) -> Result<Box<dyn Renderer>, String> {
    let scheduler = RenderScheduler::from_params(params)?;
    let max_num_vertices = params.find_one_int("max_num_vertices", -1);

    let num_photon_trace_samples = params.find_one_number("num_photon_trace_samples", 100_000.0);
    if !(num_photon_trace_samples > 0.0) {
        return Err(format!("Invalid num_photon_trace_samples {}", num_photon_trace_samples));
    }

    // Accept `true`/`false` as well as 0/1.
    let finalgather = match params.find_bool("finalgather").first() {
        Some(&b) => b,
        None => params.find_one_int("finalgather", 1) != 0,
    };

    let photon_map = params.find_one_string("photonmap", String::from("kdtree"));
    create_photon_map(&photon_map)?;

    let num_nn_query_photons = params.find_one_int("num_nn_query_photons", 20);
    if num_nn_query_photons <= 0 {
        return Err(format!("Invalid num_nn_query_photons {}", num_nn_query_photons));
    }
    let max_dist = params.find_one_number("max_dist", 0.1);
    if !(max_dist > 0.0) {
        return Err(format!("Invalid max_dist {}", max_dist));
    }

    info!("  max_num_vertices         = {}", max_num_vertices);
    info!("  num_photon_trace_samples = {}", num_photon_trace_samples);
    info!("  finalgather              = {}", finalgather);
    info!("  photonmap                = {}", photon_map);

    Ok(Box::new(PMRenderer {
        scheduler,
        max_num_vertices,
        num_photon_trace_samples: num_photon_trace_samples as u64,
        finalgather,
        photon_map,
        num_nn_query_photons: num_nn_query_photons as usize,
        max_dist,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use lumen_core::spectrum::*;

    #[test]
    fn kernel_falls_off_to_zero() {
        let photon = Photon {
            p: Point3f::new(0.1, 0.0, 0.0),
            throughput: Spectrum::ONE,
            wi: Vector3f::new(0.0, 0.0, 1.0),
            num_vertices: 2,
        };
        assert!(approx_eq!(Float, kernel(&Point3f::new(0.1, 0.0, 0.0), &photon, 0.01), 3.0 * INV_PI, ulps = 2));
        assert!(approx_eq!(Float, kernel(&Point3f::zero(), &photon, 0.01), 0.0, epsilon = 1e-6));
    }

    #[test]
    fn params_are_validated() {
        let mut params = ParamSet::new();
        params.add_from_str("finalgather=false").unwrap();
        params.add_from_str("photonmap=naive").unwrap();
        params.add_from_str("num_photon_trace_samples=500").unwrap();
        assert!(create_pm_renderer(&params).is_ok());

        params.add_from_str("photonmap=grid").unwrap();
        assert!(create_pm_renderer(&params).is_err());

        params.add_from_str("photonmap=kdtree").unwrap();
        params.add_from_str("max_dist=0").unwrap();
        assert!(create_pm_renderer(&params).is_err());
    }
}
