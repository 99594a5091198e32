//! Emitters

use crate::geometry::*;
use crate::interaction::*;
use crate::math::*;
use crate::reflection::*;
use crate::spectrum::*;

mod area;

// Re-export
pub use area::*;

/// A light source or sensor. The directional component is the `Bsdf`
/// interface; this adds the positional component. Densities over positions
/// are measured in area.
pub trait Emitter: Bsdf {
    /// Sample a position on the emitter.
    ///
    /// * `u` - 2D sample.
    fn sample_position(&self, u: &Point2f) -> SurfaceGeometry;

    /// Returns the area density of sampling a position.
    ///
    /// * `geom`       - Position on the emitter.
    /// * `eval_delta` - If true, delta positions evaluate to zero.
    fn evaluate_position_pdf(&self, geom: &SurfaceGeometry, eval_delta: bool) -> Float;

    /// Returns the positional component of emission.
    ///
    /// * `geom`       - Position on the emitter.
    /// * `eval_delta` - If true, delta positions evaluate to zero.
    fn evaluate_position(&self, geom: &SurfaceGeometry, eval_delta: bool) -> Spectrum;

    /// Sample a position and an outgoing direction from it.
    ///
    /// * `u_pos` - 2D sample for the position.
    /// * `u_dir` - 2D sample for the direction.
    fn sample_position_and_direction(
        &self,
        u_pos: &Point2f,
        u_dir: &Point2f,
    ) -> Option<(SurfaceGeometry, Vector3f)> {
        let geom = self.sample_position(u_pos);
        let query = self.interaction_type();
        let wo = self.sample_direction(u_dir, 0.0, query, &geom, &Vector3f::zero())?;
        Some((geom, wo))
    }

    /// Returns the area density of the position chosen by
    /// `sample_position_and_direction()` given the sampled direction.
    ///
    /// * `geom`       - Position on the emitter.
    /// * `wo`         - Sampled direction.
    /// * `eval_delta` - If true, delta positions evaluate to zero.
    fn evaluate_position_given_direction_pdf(
        &self,
        geom: &SurfaceGeometry,
        _wo: &Vector3f,
        eval_delta: bool,
    ) -> Float {
        self.evaluate_position_pdf(geom, eval_delta)
    }

    /// Returns the raster position in `[0, 1]²` a direction leaving the
    /// emitter maps to. Only sensors have a raster.
    ///
    /// * `wo`   - Outgoing direction.
    /// * `geom` - Position on the emitter.
    fn raster_position(&self, _wo: &Vector3f, _geom: &SurfaceGeometry) -> Option<Point2f> {
        None
    }
}
