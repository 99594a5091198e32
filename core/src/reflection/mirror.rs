//! Perfect Mirror

use super::*;

/// Perfect specular reflection.
#[derive(Clone, Debug)]
pub struct MirrorBsdf {
    /// Reflectance.
    r: Spectrum,
}

impl MirrorBsdf {
    /// Create a new `MirrorBsdf`.
    ///
    /// * `r` - Reflectance.
    pub fn new(r: Spectrum) -> Result<Self, String> {
        validate_reflectance(&r)?;
        Ok(Self { r })
    }
}

/// Reflect a local direction about the normal.
///
/// * `w` - Local direction.
#[inline]
fn reflect_local(w: &Vector3f) -> Vector3f {
    Vector3f::new(-w.x, -w.y, w.z)
}

impl Bsdf for MirrorBsdf {
    fn interaction_type(&self) -> SurfaceInteractionType {
        SurfaceInteractionType::S
    }

    fn sample_direction(
        &self,
        _u: &Point2f,
        _u_comp: Float,
        query_type: SurfaceInteractionType,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
    ) -> Option<Vector3f> {
        if !query_type.contains(SurfaceInteractionType::S) {
            return None;
        }
        let local_wi = geom.to_local(wi);
        if local_cos(&local_wi) <= 0.0 {
            return None;
        }
        Some(geom.to_world(&reflect_local(&local_wi)))
    }

    /// The density is a delta; without `eval_delta` it is reported as 1 so
    /// that sampled weights reduce to the reflectance.
    fn evaluate_direction_pdf(
        &self,
        geom: &SurfaceGeometry,
        query_type: SurfaceInteractionType,
        wi: &Vector3f,
        wo: &Vector3f,
        eval_delta: bool,
    ) -> Float {
        if !query_type.contains(SurfaceInteractionType::S) || eval_delta {
            return 0.0;
        }
        if local_cos(&geom.to_local(wi)) <= 0.0 || local_cos(&geom.to_local(wo)) <= 0.0 {
            return 0.0;
        }
        1.0
    }

    fn evaluate_direction(
        &self,
        geom: &SurfaceGeometry,
        types: SurfaceInteractionType,
        wi: &Vector3f,
        wo: &Vector3f,
        trans_dir: TransportDirection,
        eval_delta: bool,
    ) -> Spectrum {
        if !types.contains(SurfaceInteractionType::S) || eval_delta {
            return Spectrum::ZERO;
        }
        if local_cos(&geom.to_local(wi)) <= 0.0 || local_cos(&geom.to_local(wo)) <= 0.0 {
            return Spectrum::ZERO;
        }
        self.r * shading_normal_correction(geom, wi, wo, trans_dir)
    }
}
