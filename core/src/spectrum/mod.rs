//! Spectrum

mod rgb_spectrum;

// Re-export
pub use rgb_spectrum::*;

/// Rendering uses tristimulus RGB values throughout.
pub type Spectrum = RGBSpectrum;
