//! Renderers

use lumen_core::film::*;
use lumen_core::parallel::*;
use lumen_core::registry::*;
use lumen_core::rng::*;
use lumen_core::scene::*;

mod pm;
mod pt;
mod sampledensity;

// Re-export
pub use pm::*;
pub use pt::*;
pub use sampledensity::*;

/// Renders a scene into a film.
pub trait Renderer: Send + Sync {
    /// Render the scene. The film is overwritten with the normalized result.
    ///
    /// * `scene`    - The scene.
    /// * `init_rng` - Source of the per-thread seeds.
    /// * `film`     - Output film.
    /// * `parallel` - Worker pool.
    fn render(&self, scene: &Scene, init_rng: &mut Random, film: &mut dyn Film, parallel: &Parallel) -> Result<(), String>;
}

/// Factory type for renderers.
pub type RendererRegistry = Registry<dyn Renderer>;

/// Register the renderers of this crate.
///
/// * `registry` - Renderer registry.
pub fn register_renderers(registry: &mut RendererRegistry) {
    registry.register("renderer::sampledensity", create_sample_density_renderer);
    registry.register("renderer::pt", create_pt_renderer);
    registry.register("renderer::pm", create_pm_renderer);
}

/// Returns an error if the scene cannot be rendered from a sensor.
///
/// * `scene` - The scene.
fn require_sensor(scene: &Scene) -> Result<(), String> {
    match scene.sensor() {
        Some(_) => Ok(()),
        None => Err(String::from("Scene has no sensor")),
    }
}
