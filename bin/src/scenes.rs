//! Built-in scenes

use lumen_core::geometry::*;
use lumen_core::math::*;
use lumen_core::paramset::*;
use lumen_core::primitive::*;
use lumen_core::reflection::*;
use lumen_core::registry::*;
use lumen_core::scene::*;
use lumen_core::sensor::*;
use lumen_core::spectrum::*;
use lumen_core::trianglemesh::*;
use std::sync::Arc;

/// Returns a quad with corners in counter-clockwise order as seen from the
/// side it faces.
fn quad(corners: [[Float; 3]; 4]) -> TriangleMesh {
    TriangleMesh::quad(corners.map(|c| Point3f::new(c[0], c[1], c[2])))
}

/// Scene assembly state: the BSDF factories and the film resolution.
struct SceneBuilder<'a> {
    bsdfs: Registry<dyn Bsdf>,
    params: &'a ParamSet,
}

impl<'a> SceneBuilder<'a> {
    fn new(params: &'a ParamSet) -> Self {
        let mut bsdfs = Registry::new();
        register_bsdfs(&mut bsdfs);
        Self { bsdfs, params }
    }

    /// Create a BSDF with reflectance `r`.
    ///
    /// * `name` - `diffuse` or `mirror`.
    /// * `r`    - Reflectance.
    fn bsdf(&self, name: &str, r: Spectrum) -> Result<Arc<dyn Bsdf>, String> {
        let mut params = ParamSet::new();
        params.add_spectrum("R", &[r]);
        Ok(Arc::from(self.bsdfs.create(&format!("bsdf::{}", name), &params)?))
    }

    fn diffuse(&self, r: Float, g: Float, b: Float) -> Result<Arc<dyn Bsdf>, String> {
        self.bsdf("diffuse", Spectrum::from_rgb(r, g, b))
    }

    /// Create the sensor primitive. The film resolution in `width` and
    /// `height` sets the aspect ratio.
    ///
    /// * `eye`    - Camera position.
    /// * `center` - Look-at target.
    /// * `up`     - Up vector.
    /// * `fov`    - Vertical field of view in degrees.
    fn sensor(&self, eye: Point3f, center: Point3f, up: Vector3f, fov: Float) -> Result<Primitive, String> {
        let mut params = ParamSet::new();
        params.add_point3f("eye", &[eye]);
        params.add_point3f("center", &[center]);
        params.add_point3f("up", &[up]);
        params.add_float("fov", &[fov]);
        for name in ["width", "height"] {
            let values = self.params.find_int(name);
            if !values.is_empty() {
                params.add_int(name, &values);
            }
        }
        let sensor = create_pinhole_sensor(&params)?;
        Ok(Primitive::new("sensor", Transform::default(), None, None).with_emitter(Arc::from(sensor)))
    }
}

fn surface(id: &str, mesh: &TriangleMesh, bsdf: Arc<dyn Bsdf>) -> Primitive {
    Primitive::new(id, Transform::default(), Some(mesh), Some(bsdf))
}

/// Returns the primitives of a built-in scene including its sensor.
///
/// * `name`   - `cornell` or `quad`.
/// * `params` - Parameter set holding the film `width` and `height`.
pub fn create_primitives(name: &str, params: &ParamSet) -> Result<Vec<Primitive>, String> {
    let builder = SceneBuilder::new(params);
    match name {
        "cornell" => cornell_box(&builder),
        "quad" => lit_quad(&builder),
        _ => Err(format!("Unknown scene '{}'. Available: cornell, quad", name)),
    }
}

/// A unit Cornell box open towards +z with a mirror panel on the floor.
///
/// * `builder` - Component factories.
fn cornell_box(builder: &SceneBuilder<'_>) -> Result<Vec<Primitive>, String> {
    let white = builder.diffuse(0.75, 0.75, 0.75)?;
    let red = builder.diffuse(0.75, 0.25, 0.25)?;
    let green = builder.diffuse(0.25, 0.75, 0.25)?;
    let mirror = builder.bsdf("mirror", Spectrum::new(0.9))?;

    let floor = quad([[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 0.0, 0.0]]);
    let ceiling = quad([[0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]]);
    let back = quad([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]);
    let left = quad([[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [0.0, 0.0, 1.0]]);
    let right = quad([[1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]]);
    let panel = quad([[0.55, 0.0, 0.3], [0.85, 0.0, 0.3], [0.85, 0.4, 0.3], [0.55, 0.4, 0.3]]);
    let light = quad([[0.35, 0.99, 0.35], [0.65, 0.99, 0.35], [0.65, 0.99, 0.65], [0.35, 0.99, 0.65]]);

    let sensor = builder.sensor(
        Point3f::new(0.5, 0.5, 2.5),
        Point3f::new(0.5, 0.5, 0.5),
        Vector3f::new(0.0, 1.0, 0.0),
        35.0,
    )?;

    Ok(vec![
        surface("floor", &floor, white.clone()),
        surface("ceiling", &ceiling, white.clone()),
        surface("back", &back, white.clone()),
        surface("left", &left, red),
        surface("right", &right, green),
        surface("mirror", &panel, mirror),
        surface("light", &light, white).with_area_light(Spectrum::new(10.0))?,
        sensor,
    ])
}

/// A diffuse floor under a single downward facing area light.
///
/// * `builder` - Component factories.
fn lit_quad(builder: &SceneBuilder<'_>) -> Result<Vec<Primitive>, String> {
    let floor = quad([[-2.0, -2.0, 0.0], [2.0, -2.0, 0.0], [2.0, 2.0, 0.0], [-2.0, 2.0, 0.0]]);
    let light = quad([[-0.5, -0.5, 1.5], [-0.5, 0.5, 1.5], [0.5, 0.5, 1.5], [0.5, -0.5, 1.5]]);
    let sensor = builder.sensor(
        Point3f::new(0.0, -4.0, 3.0),
        Point3f::new(0.0, 0.0, 0.5),
        Vector3f::new(0.0, 0.0, 1.0),
        45.0,
    )?;

    Ok(vec![
        surface("floor", &floor, builder.diffuse(0.8, 0.8, 0.8)?),
        Primitive::new("light", Transform::default(), Some(&light), None).with_area_light(Spectrum::new(5.0))?,
        sensor,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::interaction::*;
    use lumen_core::light::*;

    fn film_params(width: Int, height: Int) -> ParamSet {
        let mut params = ParamSet::new();
        params.add_int("width", &[width]);
        params.add_int("height", &[height]);
        params
    }

    #[test]
    fn scenes_have_one_sensor_and_a_light() {
        for name in ["cornell", "quad"] {
            let primitives = create_primitives(name, &film_params(64, 64)).unwrap();
            let sensors = primitives
                .iter()
                .filter(|p| p.interaction_type().contains(SurfaceInteractionType::E))
                .count();
            let lights = primitives
                .iter()
                .filter(|p| p.interaction_type().contains(SurfaceInteractionType::L))
                .count();
            assert_eq!((sensors, lights), (1, 1), "{}", name);
        }
        assert!(create_primitives("sponza", &film_params(64, 64)).is_err());
    }

    #[test]
    fn cornell_box_uses_registered_bsdfs() {
        let primitives = create_primitives("cornell", &film_params(64, 32)).unwrap();
        let mirror = primitives.iter().find(|p| p.id == "mirror").unwrap();
        assert_eq!(mirror.interaction_type(), SurfaceInteractionType::S);
        let floor = primitives.iter().find(|p| p.id == "floor").unwrap();
        assert_eq!(floor.interaction_type(), SurfaceInteractionType::D);
    }

    #[test]
    fn sensor_follows_film_aspect() {
        let primitives = create_primitives("quad", &film_params(200, 100)).unwrap();
        let sensor = primitives
            .iter()
            .find(|p| p.interaction_type().contains(SurfaceInteractionType::E))
            .and_then(|p| p.emitter.clone())
            .unwrap();
        let (_, left) = sensor
            .sample_position_and_direction(&Point2f::new(0.0, 0.5), &Point2f::zero())
            .unwrap();
        let (_, top) = sensor
            .sample_position_and_direction(&Point2f::new(0.5, 1.0), &Point2f::zero())
            .unwrap();
        // A 2:1 film spans twice the vertical angle horizontally.
        let forward = sensor
            .sample_position_and_direction(&Point2f::new(0.5, 0.5), &Point2f::zero())
            .unwrap()
            .1;
        let tan_h = left.cross(&forward).length() / left.dot(&forward);
        let tan_v = top.cross(&forward).length() / top.dot(&forward);
        assert!((tan_h / tan_v - 2.0).abs() < 1e-3);
    }

    #[test]
    fn missing_resolution_uses_sensor_defaults() {
        assert!(create_primitives("quad", &ParamSet::new()).is_ok());
        assert!(create_primitives("quad", &film_params(0, 10)).is_err());
    }
}
