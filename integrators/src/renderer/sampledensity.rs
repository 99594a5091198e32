//! Sample Density Renderer

use super::*;
use crate::scheduler::*;
use lumen_core::paramset::*;

/// Splats the sensor's own position and direction samples. With a
/// normalized sensor the resulting image is uniform, which makes it a check
/// of the sensor sampling and the scheduler's normalization.
#[derive(Copy, Clone, Debug, Default)]
pub struct SampleDensityRenderer {
    /// Render loop settings.
    pub scheduler: RenderScheduler,
}

impl SampleDensityRenderer {
    /// Create a new `SampleDensityRenderer`.
    ///
    /// * `scheduler` - Render loop settings.
    pub fn new(scheduler: RenderScheduler) -> Self {
        Self { scheduler }
    }
}

impl Renderer for SampleDensityRenderer {
    fn render(&self, scene: &Scene, init_rng: &mut Random, film: &mut dyn Film, parallel: &Parallel) -> Result<(), String> {
        require_sensor(scene)?;

        self.scheduler.process(parallel, scene, film, init_rng, |scene, film, rng| {
            let Some(sensor) = scene.sensor_emitter() else {
                return;
            };
            let u_pos = rng.next_2d();
            let u_dir = rng.next_2d();
            let Some((geom, wo)) = sensor.sample_position_and_direction(&u_pos, &u_dir) else {
                return;
            };
            let pdf = sensor.evaluate_position_given_direction_pdf(&geom, &wo, false);
            if pdf <= 0.0 {
                return;
            }
            if let Some(raster) = scene.raster_position(&wo, &geom) {
                film.splat(&raster, sensor.evaluate_position(&geom, false) / pdf);
            }
        })?;
        Ok(())
    }
}

/// Factory for `renderer::sampledensity`.
///
/// * `params` - Parameter set.
pub fn create_sample_density_renderer(params: &ParamSet) -> Result<Box<dyn Renderer>, String> {
    Ok(Box::new(SampleDensityRenderer::new(RenderScheduler::from_params(params)?)))
}
