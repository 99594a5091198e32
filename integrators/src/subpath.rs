//! Subpath Sampling

use lumen_core::geometry::*;
use lumen_core::interaction::*;
use lumen_core::primitive::*;
use lumen_core::rng::*;
use lumen_core::scene::*;
use lumen_core::spectrum::*;

/// A vertex of a light or eye subpath.
#[derive(Copy, Clone, Debug)]
pub struct PathVertex<'a> {
    /// Interaction type at the vertex. `L` or `E` for the first vertex,
    /// the primitive's scattering type otherwise.
    pub interaction_type: SurfaceInteractionType,

    /// Surface geometry.
    pub geom: SurfaceGeometry,

    /// The primitive the vertex lies on.
    pub primitive: &'a Primitive,
}

impl<'a> PathVertex<'a> {
    /// Returns the unit direction from this vertex towards another one.
    ///
    /// * `other` - The other vertex.
    pub fn direction_to(&self, other: &PathVertex<'_>) -> Vector3f {
        (other.geom.p - self.geom.p).normalize()
    }
}

/// Trace a subpath starting from a light (`LE`) or the sensor (`EL`).
///
/// `f` is called for every vertex with the number of vertices so far, the
/// raster position of the eye subpath (`None` for light subpaths), the
/// previous vertex, the new vertex, the path throughput and the RNG. It may
/// modify the throughput, e.g. for Russian roulette, and returns `false` to
/// stop. Tracing also stops when direction sampling fails, the throughput
/// turns black, the ray escapes or `max_num_vertices` is reached. A negative
/// `max_num_vertices` leaves the length unbounded.
///
/// * `scene`            - The scene.
/// * `rng`              - Random number generator.
/// * `max_num_vertices` - Maximum number of vertices.
/// * `trans_dir`        - Transport direction.
/// * `f`                - Vertex callback.
pub fn trace_subpath<'a, F>(
    scene: &'a Scene,
    rng: &mut Random,
    max_num_vertices: i32,
    trans_dir: TransportDirection,
    f: F,
) where
    F: FnMut(usize, Option<Point2f>, Option<&PathVertex<'a>>, &PathVertex<'a>, &mut Spectrum, &mut Random) -> bool,
{
    trace_subpath_from(scene, rng, max_num_vertices, trans_dir, None, f);
}

/// Trace an eye subpath whose first direction passes through a given raster
/// position.
///
/// * `scene`            - The scene.
/// * `rng`              - Random number generator.
/// * `max_num_vertices` - Maximum number of vertices.
/// * `trans_dir`        - Must be `EL`.
/// * `raster_pos`       - Raster position in `[0, 1]²`.
/// * `f`                - Vertex callback; see `trace_subpath()`.
pub fn trace_eye_subpath_fixed_raster_pos<'a, F>(
    scene: &'a Scene,
    rng: &mut Random,
    max_num_vertices: i32,
    trans_dir: TransportDirection,
    raster_pos: &Point2f,
    f: F,
) where
    F: FnMut(usize, Option<Point2f>, Option<&PathVertex<'a>>, &PathVertex<'a>, &mut Spectrum, &mut Random) -> bool,
{
    debug_assert!(trans_dir == TransportDirection::EL);
    trace_subpath_from(scene, rng, max_num_vertices, trans_dir, Some(*raster_pos), f);
}

fn trace_subpath_from<'a, F>(
    scene: &'a Scene,
    rng: &mut Random,
    max_num_vertices: i32,
    trans_dir: TransportDirection,
    init_raster_pos: Option<Point2f>,
    mut f: F,
) where
    F: FnMut(usize, Option<Point2f>, Option<&PathVertex<'a>>, &PathVertex<'a>, &mut Spectrum, &mut Random) -> bool,
{
    let within_limit = |num_vertices: usize| max_num_vertices < 0 || num_vertices <= max_num_vertices as usize;
    if !within_limit(1) {
        return;
    }

    // Sample an emitter.
    let emitter_type = match trans_dir {
        TransportDirection::LE => SurfaceInteractionType::L,
        TransportDirection::EL => SurfaceInteractionType::E,
    };
    let Some(primitive) = scene.sample_emitter(emitter_type, rng.next()) else {
        return;
    };
    let Some(emitter) = &primitive.emitter else {
        return;
    };

    // Sample a position on the emitter and the initial direction.
    let u_pos = init_raster_pos.unwrap_or_else(|| rng.next_2d());
    let u_dir = rng.next_2d();
    let Some((geom, init_wo)) = emitter.sample_position_and_direction(&u_pos, &u_dir) else {
        return;
    };

    let pdf_p = emitter.evaluate_position_given_direction_pdf(&geom, &init_wo, false);
    let pdf_e = scene.evaluate_emitter_pdf(emitter_type);
    if pdf_p <= 0.0 || pdf_e <= 0.0 {
        return;
    }
    let mut throughput = emitter.evaluate_position(&geom, false) / pdf_p / pdf_e;

    let raster_pos = match trans_dir {
        TransportDirection::EL => emitter.raster_position(&init_wo, &geom),
        TransportDirection::LE => None,
    };

    let mut pv = PathVertex {
        interaction_type: emitter_type,
        geom,
        primitive,
    };
    if !f(1, raster_pos, None, &pv, &mut throughput, rng) {
        return;
    }

    let mut ppv: Option<PathVertex<'a>> = None;
    let mut num_vertices = 1;
    while within_limit(num_vertices + 1) {
        // Sample the next direction.
        let (wi, wo) = match &ppv {
            None => (Vector3f::zero(), init_wo),
            Some(ppv) => {
                let wi = pv.direction_to(ppv);
                let u = rng.next_2d();
                let u_comp = rng.next();
                match pv.primitive.sample_direction(&u, u_comp, pv.interaction_type, &pv.geom, &wi) {
                    Some(wo) => (wi, wo),
                    None => break,
                }
            }
        };

        let fs = pv
            .primitive
            .evaluate_direction(&pv.geom, pv.interaction_type, &wi, &wo, trans_dir, false);
        if fs.is_black() {
            break;
        }
        let pdf_d = pv
            .primitive
            .evaluate_direction_pdf(&pv.geom, pv.interaction_type, &wi, &wo, false);
        if pdf_d <= 0.0 {
            break;
        }
        throughput *= fs / pdf_d;

        let ray = Ray::new(pv.geom.p, wo);
        let Some(isect) = scene.intersect(&ray) else {
            break;
        };

        let v = PathVertex {
            interaction_type: isect.primitive.interaction_type() - SurfaceInteractionType::EMITTER,
            geom: isect.geom,
            primitive: isect.primitive,
        };
        num_vertices += 1;
        if !f(num_vertices, raster_pos, Some(&pv), &v, &mut throughput, rng) {
            break;
        }

        ppv = Some(pv);
        pv = v;
    }
}
