//! Primitives

use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::math::*;
use crate::reflection::*;
use crate::spectrum::*;
use crate::trianglemesh::*;
use std::fmt;
use std::sync::Arc;

/// A scene element: optional world space geometry with its scattering and
/// emission bindings. Sensors are primitives without geometry.
#[derive(Clone)]
pub struct Primitive {
    /// Identifier used in log messages.
    pub id: String,

    /// Index in the scene's primitive list.
    pub index: usize,

    /// Object to world transformation.
    pub transform: Transform,

    /// World space mesh.
    pub mesh: Option<TriangleMesh>,

    /// Scattering model.
    pub bsdf: Option<Arc<dyn Bsdf>>,

    /// Light or sensor.
    pub emitter: Option<Arc<dyn Emitter>>,
}

impl Primitive {
    /// Create a new primitive. The mesh is transformed into world space.
    ///
    /// * `id`        - Identifier.
    /// * `transform` - Object to world transformation.
    /// * `mesh`      - Object space mesh.
    /// * `bsdf`      - Scattering model.
    pub fn new(
        id: &str,
        transform: Transform,
        mesh: Option<&TriangleMesh>,
        bsdf: Option<Arc<dyn Bsdf>>,
    ) -> Self {
        let mesh = mesh.map(|m| {
            if transform.is_identity() {
                m.clone()
            } else {
                m.transformed(&transform)
            }
        });
        Self {
            id: id.to_string(),
            index: 0,
            transform,
            mesh,
            bsdf,
            emitter: None,
        }
    }

    /// Attach an emitter.
    ///
    /// * `emitter` - Light or sensor.
    pub fn with_emitter(mut self, emitter: Arc<dyn Emitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Attach a diffuse area light covering the primitive's mesh.
    ///
    /// * `le` - Emitted radiance.
    pub fn with_area_light(self, le: Spectrum) -> Result<Self, String> {
        let mesh = self
            .mesh
            .as_ref()
            .ok_or_else(|| format!("Primitive '{}' has no mesh for an area light", self.id))?;
        let light = AreaLight::new(le, mesh).map_err(|e| format!("Primitive '{}': {}", self.id, e))?;
        Ok(self.with_emitter(Arc::new(light)))
    }

    /// Returns the union of the emitter and BSDF interaction types.
    pub fn interaction_type(&self) -> SurfaceInteractionType {
        let mut t = SurfaceInteractionType::empty();
        if let Some(emitter) = &self.emitter {
            t |= emitter.interaction_type();
        }
        if let Some(bsdf) = &self.bsdf {
            t |= bsdf.interaction_type();
        }
        t
    }

    /// Returns the number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.mesh.as_ref().map_or(0, |m| m.num_triangles())
    }

    /// Sample a direction, dispatching to the emitter for emitter queries
    /// and to the BSDF otherwise.
    ///
    /// * `u`          - 2D sample.
    /// * `u_comp`     - Component selection sample.
    /// * `query_type` - Requested interaction types.
    /// * `geom`       - Surface geometry.
    /// * `wi`         - Incoming direction.
    pub fn sample_direction(
        &self,
        u: &Point2f,
        u_comp: Float,
        query_type: SurfaceInteractionType,
        geom: &SurfaceGeometry,
        wi: &Vector3f,
    ) -> Option<Vector3f> {
        if is_emitter_query(query_type) {
            self.emitter
                .as_ref()
                .and_then(|e| e.sample_direction(u, u_comp, query_type, geom, wi))
        } else {
            self.bsdf
                .as_ref()
                .and_then(|b| b.sample_direction(u, u_comp, query_type, geom, wi))
        }
    }

    /// Returns the density of `sample_direction()`.
    ///
    /// * `geom`       - Surface geometry.
    /// * `query_type` - Requested interaction types.
    /// * `wi`         - Incoming direction.
    /// * `wo`         - Outgoing direction.
    /// * `eval_delta` - If true, delta components evaluate to zero.
    pub fn evaluate_direction_pdf(
        &self,
        geom: &SurfaceGeometry,
        query_type: SurfaceInteractionType,
        wi: &Vector3f,
        wo: &Vector3f,
        eval_delta: bool,
    ) -> Float {
        if is_emitter_query(query_type) {
            self.emitter.as_ref().map_or(0.0, |e| {
                e.evaluate_direction_pdf(geom, query_type, wi, wo, eval_delta)
            })
        } else {
            self.bsdf.as_ref().map_or(0.0, |b| {
                b.evaluate_direction_pdf(geom, query_type, wi, wo, eval_delta)
            })
        }
    }

    /// Evaluate the directional component.
    ///
    /// * `geom`       - Surface geometry.
    /// * `types`      - Requested interaction types.
    /// * `wi`         - Incoming direction.
    /// * `wo`         - Outgoing direction.
    /// * `trans_dir`  - Transport direction.
    /// * `eval_delta` - If true, delta components evaluate to zero.
    pub fn evaluate_direction(
        &self,
        geom: &SurfaceGeometry,
        types: SurfaceInteractionType,
        wi: &Vector3f,
        wo: &Vector3f,
        trans_dir: TransportDirection,
        eval_delta: bool,
    ) -> Spectrum {
        if is_emitter_query(types) {
            self.emitter.as_ref().map_or(Spectrum::ZERO, |e| {
                e.evaluate_direction(geom, types, wi, wo, trans_dir, eval_delta)
            })
        } else {
            self.bsdf.as_ref().map_or(Spectrum::ZERO, |b| {
                b.evaluate_direction(geom, types, wi, wo, trans_dir, eval_delta)
            })
        }
    }
}

/// Emitter queries go to the emitter, everything else to the BSDF.
///
/// * `query_type` - Requested interaction types.
#[inline]
fn is_emitter_query(query_type: SurfaceInteractionType) -> bool {
    query_type.intersects(SurfaceInteractionType::EMITTER)
}

impl fmt::Debug for Primitive {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Primitive")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("type", &format!("{}", self.interaction_type()))
            .field("triangles", &self.num_triangles())
            .finish()
    }
}
