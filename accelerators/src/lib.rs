//! Ray intersection acceleration data structures.

#[macro_use]
extern crate log;

use lumen_core::accel::*;

mod bvh;
mod naive;

// Re-export
pub use bvh::*;
pub use naive::*;

/// Register the accelerators of this crate.
///
/// * `registry` - Accelerator registry.
pub fn register_accels(registry: &mut AccelRegistry) {
    registry.register("accel::naive", create_naive_accel);
    registry.register("accel::bvh", create_bvh_accel);
}
