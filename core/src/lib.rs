//! Core

extern crate bitflags;
#[macro_use]
extern crate hexf;
#[macro_use]
extern crate log;

// Re-export.
pub mod accel;
pub mod film;
pub mod geometry;
pub mod image_io;
pub mod interaction;
pub mod light;
pub mod math;
pub mod parallel;
pub mod paramset;
pub mod primitive;
pub mod reflection;
pub mod registry;
pub mod rng;
pub mod sampling;
pub mod scene;
pub mod sensor;
pub mod spectrum;
pub mod trianglemesh;
