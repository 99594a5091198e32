//! Diffuse Reflection

use super::*;
use crate::sampling::*;

/// Lambertian reflection.
#[derive(Clone, Debug)]
pub struct DiffuseBsdf {
    /// Reflectance.
    r: Spectrum,
}

impl DiffuseBsdf {
    /// Create a new `DiffuseBsdf`.
    ///
    /// * `r` - Reflectance.
    pub fn new(r: Spectrum) -> Result<Self, String> {
        validate_reflectance(&r)?;
        Ok(Self { r })
    }
}

impl Bsdf for DiffuseBsdf {
    fn interaction_type(&self) -> SurfaceInteractionType {
        SurfaceInteractionType::D
    }

    fn sample_direction(
        &self,
        u: &Point2f,
        _u_comp: Float,
        query_type: SurfaceInteractionType,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
    ) -> Option<Vector3f> {
        if !query_type.contains(SurfaceInteractionType::D) {
            return None;
        }
        if local_cos(&geom.to_local(wi)) <= 0.0 {
            return None;
        }
        Some(geom.to_world(&cosine_sample_hemisphere(u)))
    }

    fn evaluate_direction_pdf(
        &self,
        geom: &SurfaceGeometry,
        query_type: SurfaceInteractionType,
        wi: &Vector3f,
        wo: &Vector3f,
        _eval_delta: bool,
    ) -> Float {
        if !query_type.contains(SurfaceInteractionType::D) {
            return 0.0;
        }
        if local_cos(&geom.to_local(wi)) <= 0.0 || local_cos(&geom.to_local(wo)) <= 0.0 {
            return 0.0;
        }
        cosine_hemisphere_pdf_projected()
    }

    fn evaluate_direction(
        &self,
        geom: &SurfaceGeometry,
        types: SurfaceInteractionType,
        wi: &Vector3f,
        wo: &Vector3f,
        trans_dir: TransportDirection,
        _eval_delta: bool,
    ) -> Spectrum {
        if !types.contains(SurfaceInteractionType::D) {
            return Spectrum::ZERO;
        }
        if local_cos(&geom.to_local(wi)) <= 0.0 || local_cos(&geom.to_local(wo)) <= 0.0 {
            return Spectrum::ZERO;
        }
        let sf = shading_normal_correction(geom, wi, wo, trans_dir);
        if sf == 0.0 {
            return Spectrum::ZERO;
        }
        self.r * (INV_PI * sf)
    }
}
