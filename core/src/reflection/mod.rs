//! Reflection Models

use crate::geometry::*;
use crate::interaction::*;
use crate::math::*;
use crate::paramset::*;
use crate::registry::*;
use crate::spectrum::*;

mod diffuse;
mod mirror;

// Re-export
pub use diffuse::*;
pub use mirror::*;

/// Directional scattering at a surface point. Directions point away from the
/// surface; `wi` is the direction the path arrived from and `wo` the one it
/// leaves along. Densities are measured in projected solid angle.
///
/// Emitters implement the same interface for their directional component.
pub trait Bsdf: Send + Sync {
    /// Returns the interaction types this model handles.
    fn interaction_type(&self) -> SurfaceInteractionType;

    /// Sample an outgoing direction. Returns `None` if the query type is not
    /// handled or sampling is impossible.
    ///
    /// * `u`          - 2D sample.
    /// * `u_comp`     - Sample used to choose a component.
    /// * `query_type` - Requested interaction types.
    /// * `geom`       - Surface geometry.
    /// * `wi`         - Incoming direction.
    fn sample_direction(
        &self,
        u: &Point2f,
        u_comp: Float,
        query_type: SurfaceInteractionType,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
    ) -> Option<Vector3f>;

    /// Returns the density of sampling `wo` with `sample_direction()`.
    ///
    /// * `geom`       - Surface geometry.
    /// * `query_type` - Requested interaction types.
    /// * `wi`         - Incoming direction.
    /// * `wo`         - Outgoing direction.
    /// * `eval_delta` - If true, delta components evaluate to zero.
    fn evaluate_direction_pdf(
        &self,
        geom: &SurfaceGeometry,
        query_type: SurfaceInteractionType,
        wi: &Vector3f,
        wo: &Vector3f,
        eval_delta: bool,
    ) -> Float;

    /// Returns the scattering function value.
    ///
    /// * `geom`       - Surface geometry.
    /// * `types`      - Requested interaction types.
    /// * `wi`         - Incoming direction.
    /// * `wo`         - Outgoing direction.
    /// * `trans_dir`  - Transport direction.
    /// * `eval_delta` - If true, delta components evaluate to zero.
    fn evaluate_direction(
        &self,
        geom: &SurfaceGeometry,
        types: SurfaceInteractionType,
        wi: &Vector3f,
        wo: &Vector3f,
        trans_dir: TransportDirection,
        eval_delta: bool,
    ) -> Spectrum;
}

/// Returns the correction factor for the asymmetry shading normals introduce
/// into adjoint transport. Zero if either direction lies on opposite sides
/// of the geometric and shading surfaces.
///
/// * `geom`      - Surface geometry.
/// * `wi`        - Incoming direction.
/// * `wo`        - Outgoing direction.
/// * `trans_dir` - Transport direction.
pub fn shading_normal_correction(
    geom: &SurfaceGeometry,
    wi: &Vector3f,
    wo: &Vector3f,
    trans_dir: TransportDirection,
) -> Float {
    let wi_dot_ng = wi.dot(&geom.gn);
    let wo_dot_ng = wo.dot(&geom.gn);
    let wi_dot_ns = wi.dot(&geom.sn);
    let wo_dot_ns = wo.dot(&geom.sn);
    if wi_dot_ng * wi_dot_ns <= 0.0 || wo_dot_ng * wo_dot_ns <= 0.0 {
        return 0.0;
    }

    match trans_dir {
        TransportDirection::LE => wi_dot_ns * wo_dot_ng / (wo_dot_ns * wi_dot_ng),
        TransportDirection::EL => 1.0,
    }
}

/// Register the built-in BSDFs.
///
/// * `registry` - Registry to fill.
pub fn register_bsdfs(registry: &mut Registry<dyn Bsdf>) {
    registry.register("bsdf::diffuse", create_diffuse_bsdf);
    registry.register("bsdf::mirror", create_mirror_bsdf);
}

/// Create a diffuse BSDF from parameter `R` (default 0.5).
///
/// * `params` - Parameter set.
pub fn create_diffuse_bsdf(params: &ParamSet) -> Result<Box<dyn Bsdf>, String> {
    let r = params.find_one_spectrum("R", Spectrum::new(0.5));
    Ok(Box::new(DiffuseBsdf::new(r)?))
}

/// Create a mirror BSDF from parameter `R` (default 1).
///
/// * `params` - Parameter set.
pub fn create_mirror_bsdf(params: &ParamSet) -> Result<Box<dyn Bsdf>, String> {
    let r = params.find_one_spectrum("R", Spectrum::ONE);
    Ok(Box::new(MirrorBsdf::new(r)?))
}

/// Returns an error if a reflectance is negative or not finite.
///
/// * `r` - Reflectance.
fn validate_reflectance(r: &Spectrum) -> Result<(), String> {
    if r.to_rgb().iter().any(|v| !v.is_finite() || *v < 0.0) {
        Err(format!("Invalid reflectance {}", r))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tilted_geometry() -> SurfaceGeometry {
        let gn = Vector3f::new(0.0, 0.0, 1.0);
        let sn = Vector3f::new(0.3, 0.0, 1.0).normalize();
        SurfaceGeometry::new(Point3f::zero(), gn, sn, Point2f::zero())
    }

    #[test]
    fn correction_is_one_without_shading_normals() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let geom = SurfaceGeometry::new(Point3f::zero(), n, n, Point2f::zero());
        let wi = Vector3f::new(0.2, 0.1, 1.0).normalize();
        let wo = Vector3f::new(-0.5, 0.3, 0.7).normalize();
        for dir in [TransportDirection::LE, TransportDirection::EL] {
            assert!((shading_normal_correction(&geom, &wi, &wo, dir) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn correction_is_zero_on_sign_mismatch() {
        let geom = tilted_geometry();
        // Above the geometric surface but below the shading surface.
        let bad = Vector3f::new(-1.0, 0.0, 0.1).normalize();
        assert!(bad.dot(&geom.gn) > 0.0 && bad.dot(&geom.sn) < 0.0);
        let good = Vector3f::new(0.0, 0.0, 1.0);

        for dir in [TransportDirection::LE, TransportDirection::EL] {
            assert_eq!(shading_normal_correction(&geom, &bad, &good, dir), 0.0);
            assert_eq!(shading_normal_correction(&geom, &good, &bad, dir), 0.0);
        }
    }

    #[test]
    fn registry_creates_bsdfs() {
        let mut registry: Registry<dyn Bsdf> = Registry::new();
        register_bsdfs(&mut registry);
        let diffuse = registry.create("bsdf::diffuse", &ParamSet::new()).unwrap();
        assert_eq!(diffuse.interaction_type(), SurfaceInteractionType::D);
        let mirror = registry.create("bsdf::mirror", &ParamSet::new()).unwrap();
        assert_eq!(mirror.interaction_type(), SurfaceInteractionType::S);

        let mut params = ParamSet::new();
        params.add_spectrum("R", &[Spectrum::new(-1.0)]);
        assert!(registry.create("bsdf::diffuse", &params).is_err());
    }

    proptest! {
        #[test]
        fn correction_is_zero_when_any_direction_flips(
            x in -1.0..1.0f32,
            y in -1.0..1.0f32,
            z in -1.0..1.0f32,
        ) {
            let geom = tilted_geometry();
            let w = Vector3f::new(x, y, z);
            prop_assume!(w.length() > 1e-3);
            let w = w.normalize();
            let good = Vector3f::new(0.0, 0.0, 1.0);
            let mismatch = w.dot(&geom.gn) * w.dot(&geom.sn) <= 0.0;
            for dir in [TransportDirection::LE, TransportDirection::EL] {
                let a = shading_normal_correction(&geom, &w, &good, dir);
                let b = shading_normal_correction(&geom, &good, &w, dir);
                prop_assert_eq!(mismatch, a == 0.0);
                prop_assert_eq!(mismatch, b == 0.0);
            }
        }
    }
}
