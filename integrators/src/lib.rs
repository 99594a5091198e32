//! Integrators

#[macro_use]
extern crate log;

mod photon_map;
mod photon_trace;
mod renderer;
mod scheduler;
mod subpath;

// Re-export.
pub use photon_map::*;
pub use photon_trace::*;
pub use renderer::*;
pub use scheduler::*;
pub use subpath::*;
