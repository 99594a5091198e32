//! Sensors

mod pinhole;

// Re-export
pub use pinhole::*;
