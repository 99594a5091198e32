//! Command line options

use clap::Parser;

/// Renders one of the built-in scenes.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Options {
    /// Number of threads to use for rendering. Values <= 0 are relative to
    /// the number of cores.
    #[arg(long = "nthreads", short = 't', value_name = "NUM", default_value_t = 0, allow_negative_numbers = true)]
    pub threads: i32,

    /// Seed of the initial random number generator. Defaults to the current
    /// time.
    #[arg(long, short = 's', value_name = "SEED")]
    pub seed: Option<u32>,

    /// Renderer name without the `renderer::` prefix.
    #[arg(long, short = 'r', value_name = "NAME", default_value = "pt")]
    pub renderer: String,

    /// Accelerator name without the `accel::` prefix.
    #[arg(long, short = 'a', value_name = "NAME", default_value = "bvh")]
    pub accel: String,

    /// Photon map used by the photon mapping renderer.
    #[arg(long, value_name = "NAME", default_value = "kdtree")]
    pub photonmap: String,

    /// Built-in scene: `cornell` or `quad`.
    #[arg(long, value_name = "NAME", default_value = "cornell")]
    pub scene: String,

    /// Image width in pixels.
    #[arg(long, value_name = "NUM", default_value_t = 256)]
    pub width: i32,

    /// Image height in pixels.
    #[arg(long, value_name = "NUM", default_value_t = 256)]
    pub height: i32,

    /// Path to the output image (.exr, .pfm, .png or .tga).
    #[arg(long = "outfile", short = 'o', value_name = "FILE", default_value = "result.exr")]
    pub output: String,

    /// Suppress all text output other than error messages.
    #[arg(long)]
    pub quiet: bool,

    /// Component parameter as `key=value`, e.g. `num_samples=100000`. May be
    /// repeated.
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}
