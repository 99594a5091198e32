//! Area Lights

use super::*;
use crate::sampling::*;
use crate::trianglemesh::*;

/// Diffuse area light emitting constant radiance from the front side of a
/// triangle mesh given in world space.
#[derive(Clone, Debug)]
pub struct AreaLight {
    /// Emitted radiance.
    le: Spectrum,

    /// Emitting triangles.
    mesh: TriangleMesh,

    /// Distribution over triangle areas.
    dist: Distribution1D,

    /// 1 / total area.
    inv_area: Float,
}

impl AreaLight {
    /// Create a new `AreaLight`.
    ///
    /// * `le`   - Emitted radiance.
    /// * `mesh` - World space mesh.
    pub fn new(le: Spectrum, mesh: &TriangleMesh) -> Result<Self, String> {
        if le.to_rgb().iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(format!("Invalid area light radiance {}", le));
        }

        let mut dist = Distribution1D::new();
        for i in 0..mesh.num_triangles() {
            dist.add(mesh.triangle_area(i));
        }
        let area = dist.sum();
        if !(area > 0.0 && area.is_finite()) {
            return Err(format!("Area light mesh has invalid area {}", area));
        }
        dist.normalize();
        debug!("Area light with {} triangles, area {}", mesh.num_triangles(), area);

        Ok(Self {
            le,
            mesh: mesh.clone(),
            dist,
            inv_area: 1.0 / area,
        })
    }

    /// Returns the emitted radiance.
    pub fn radiance(&self) -> Spectrum {
        self.le
    }
}

impl Bsdf for AreaLight {
    fn interaction_type(&self) -> SurfaceInteractionType {
        SurfaceInteractionType::L
    }

    fn sample_direction(
        &self,
        u: &Point2f,
        _u_comp: Float,
        query_type: SurfaceInteractionType,
        geom: &SurfaceGeometry,
        _wi: &Vector3f,
    ) -> Option<Vector3f> {
        if !query_type.contains(SurfaceInteractionType::L) {
            return None;
        }
        Some(geom.to_world(&cosine_sample_hemisphere(u)))
    }

    fn evaluate_direction_pdf(
        &self,
        geom: &SurfaceGeometry,
        query_type: SurfaceInteractionType,
        _wi: &Vector3f,
        wo: &Vector3f,
        _eval_delta: bool,
    ) -> Float {
        if !query_type.contains(SurfaceInteractionType::L) {
            return 0.0;
        }
        if local_cos(&geom.to_local(wo)) <= 0.0 {
            return 0.0;
        }
        cosine_hemisphere_pdf_projected()
    }

    fn evaluate_direction(
        &self,
        geom: &SurfaceGeometry,
        types: SurfaceInteractionType,
        _wi: &Vector3f,
        wo: &Vector3f,
        _trans_dir: TransportDirection,
        _eval_delta: bool,
    ) -> Spectrum {
        if !types.contains(SurfaceInteractionType::L) {
            return Spectrum::ZERO;
        }
        if local_cos(&geom.to_local(wo)) <= 0.0 {
            return Spectrum::ZERO;
        }
        self.le
    }
}

impl Emitter for AreaLight {
    fn sample_position(&self, u: &Point2f) -> SurfaceGeometry {
        let (i, ux) = self.dist.sample_reuse(u.x);
        let b = uniform_sample_triangle(&Point2f::new(ux, u.y));
        let mut geom = self.mesh.surface_geometry(i, b.x, b.y);
        // Emission is defined with respect to the geometric normal.
        geom.sn = geom.gn;
        geom.frame = Frame::from_normal(&geom.gn);
        geom
    }

    fn evaluate_position_pdf(&self, _geom: &SurfaceGeometry, _eval_delta: bool) -> Float {
        self.inv_area
    }

    fn evaluate_position(&self, _geom: &SurfaceGeometry, _eval_delta: bool) -> Spectrum {
        Spectrum::ONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Random;
    use float_cmp::*;

    fn unit_quad() -> TriangleMesh {
        TriangleMesh::quad([
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(1.0, 2.0, 0.0),
            Point3f::new(0.0, 2.0, 0.0),
        ])
    }

    #[test]
    fn rejects_degenerate_mesh() {
        let flat = TriangleMesh::quad([Point3f::zero(); 4]);
        assert!(AreaLight::new(Spectrum::ONE, &flat).is_err());
        assert!(AreaLight::new(Spectrum::new(-1.0), &unit_quad()).is_err());
    }

    #[test]
    fn samples_lie_on_mesh_and_emit_forward() {
        let light = AreaLight::new(Spectrum::new(4.0), &unit_quad()).unwrap();
        let mut rng = Random::new(3);
        for _ in 0..256 {
            let (geom, wo) = light
                .sample_position_and_direction(&rng.next_2d(), &rng.next_2d())
                .unwrap();
            assert!(geom.p.z.abs() < 1e-6);
            assert!((0.0..=1.0).contains(&geom.p.x) && (0.0..=2.0).contains(&geom.p.y));
            assert!(wo.z >= 0.0);
            assert!(approx_eq!(
                f32,
                light.evaluate_position_given_direction_pdf(&geom, &wo, false),
                0.5,
                ulps = 2
            ));
            let le = light.evaluate_direction(
                &geom,
                SurfaceInteractionType::L,
                &Vector3f::zero(),
                &wo,
                TransportDirection::LE,
                false,
            );
            if wo.z > 0.0 {
                assert_eq!(le, Spectrum::new(4.0));
            }
        }
        assert!(light.raster_position(&Vector3f::new(0.0, 0.0, 1.0), &SurfaceGeometry::default()).is_none());
    }

    #[test]
    fn back_side_is_dark() {
        let light = AreaLight::new(Spectrum::ONE, &unit_quad()).unwrap();
        let geom = light.sample_position(&Point2f::new(0.5, 0.5));
        let down = Vector3f::new(0.0, 0.0, -1.0);
        let l = SurfaceInteractionType::L;
        assert_eq!(light.evaluate_direction_pdf(&geom, l, &Vector3f::zero(), &down, false), 0.0);
        assert!(light
            .evaluate_direction(&geom, l, &Vector3f::zero(), &down, TransportDirection::LE, false)
            .is_black());
    }
}
