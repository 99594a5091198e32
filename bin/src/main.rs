#[macro_use]
extern crate log;

mod options;
mod scenes;

use accelerators::*;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use integrators::*;
use lumen_core::accel::*;
use lumen_core::film::*;
use lumen_core::parallel::*;
use lumen_core::paramset::*;
use lumen_core::rng::*;
use lumen_core::scene::*;
use options::*;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

fn main() {
    let options = Options::parse();

    // Initialize `env_logger`; `RUST_LOG` overrides the default level.
    let level = if options.quiet { "error" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&options) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(options: &Options) -> Result<()> {
    let start = Instant::now();

    // Collect component parameters.
    let mut params = ParamSet::new();
    params.add_int("width", &[options.width]);
    params.add_int("height", &[options.height]);
    params.add_string("photonmap", &[options.photonmap.clone()]);
    for pair in options.params.iter() {
        params.add_from_str(pair).map_err(|e| anyhow!(e))?;
    }
    debug!("Parameters:\n{}", params);

    // Register components.
    let mut accels = AccelRegistry::new();
    register_accels(&mut accels);
    let mut renderers = RendererRegistry::new();
    register_renderers(&mut renderers);

    // Build the scene.
    let mut film = create_hdr_film(&params).map_err(|e| anyhow!(e))?;
    let primitives = scenes::create_primitives(&options.scene, &params).map_err(|e| anyhow!(e))?;
    let accel = create_accel(&accels, &format!("accel::{}", options.accel), &params)
        .map_err(|e| anyhow!(e))
        .context("Failed to create accelerator")?;
    let scene = Scene::new(primitives, accel)
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("Failed to build scene '{}'", options.scene))?;

    let renderer = renderers
        .create(&format!("renderer::{}", options.renderer), &params)
        .map_err(|e| anyhow!(e))
        .context("Failed to create renderer")?;

    let mut parallel = Parallel::new(options.threads);
    parallel.set_show_progress(!options.quiet);

    let seed = options.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs() as u32)
    });
    info!("Rendering '{}' with {} threads, seed {}", options.scene, parallel.num_threads(), seed);
    let mut init_rng = Random::new(seed);

    renderer
        .render(&scene, &mut init_rng, film.as_mut(), &parallel)
        .map_err(|e| anyhow!(e))
        .context("Rendering failed")?;

    film.save(&options.output)
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("Failed to save '{}'", options.output))?;

    info!("Saved '{}' in {:.3}s", options.output, start.elapsed().as_secs_f64());
    Ok(())
}
