//! Scene

use crate::accel::*;
use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::math::*;
use crate::primitive::*;
use crate::sensor::*;
use std::sync::Arc;

/// The primitives of a scene, the accelerator built over them and the
/// emitter bookkeeping used by the samplers.
pub struct Scene {
    /// All primitives in the scene.
    primitives: Vec<Primitive>,

    /// Indices of primitives carrying a light.
    lights: Vec<usize>,

    /// Index of the primitive carrying the sensor.
    sensor: Option<usize>,

    /// Accelerator built over `primitives`.
    accel: Box<dyn Accel>,

    /// The bounding box of the scene geometry.
    world_bound: Bounds3f,
}

impl Scene {
    /// Creates a new `Scene` and builds the accelerator.
    ///
    /// * `primitives` - Scene primitives.
    /// * `accel`      - Unbuilt accelerator.
    pub fn new(mut primitives: Vec<Primitive>, mut accel: Box<dyn Accel>) -> Result<Self, String> {
        let mut lights = vec![];
        let mut sensor = None;
        let mut world_bound = Bounds3f::EMPTY;

        for (i, primitive) in primitives.iter_mut().enumerate() {
            primitive.index = i;

            let t = primitive.interaction_type();
            let is_light = t.contains(SurfaceInteractionType::L);
            let is_sensor = t.contains(SurfaceInteractionType::E);
            if is_light && is_sensor {
                return Err(format!(
                    "Primitive '{}' cannot be both a light and a sensor",
                    primitive.id
                ));
            }
            if is_light {
                lights.push(i);
            }
            if is_sensor {
                if sensor.is_some() {
                    return Err(format!("Multiple sensors: '{}'", primitive.id));
                }
                sensor = Some(i);
            }

            if let Some(mesh) = &primitive.mesh {
                world_bound = world_bound.union(&mesh.bounds());
            }
        }

        accel.build(&primitives)?;

        info!(
            "Scene: {} primitives, {} lights, sensor: {}",
            primitives.len(),
            lights.len(),
            sensor.map_or("none", |i| primitives[i].id.as_str())
        );

        Ok(Self {
            primitives,
            lights,
            sensor,
            accel,
            world_bound,
        })
    }

    /// Returns all primitives.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Returns the bounding box of the scene geometry.
    pub fn world_bound(&self) -> Bounds3f {
        self.world_bound
    }

    /// Returns the number of lights.
    pub fn num_lights(&self) -> usize {
        self.lights.len()
    }

    /// Returns the primitive carrying the sensor.
    pub fn sensor(&self) -> Option<&Primitive> {
        self.sensor.map(|i| &self.primitives[i])
    }

    /// Returns the sensor's emitter.
    pub fn sensor_emitter(&self) -> Option<&Arc<dyn Emitter>> {
        self.sensor().and_then(|p| p.emitter.as_ref())
    }

    /// Traces the ray into the scene and returns the closest hit beyond
    /// `RAY_EPSILON`.
    ///
    /// * `ray` - The ray.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection<'_>> {
        self.intersect_range(ray, RAY_EPSILON, INFINITY)
    }

    /// Traces the ray into the scene over an explicit distance range.
    ///
    /// * `ray`   - The ray.
    /// * `min_t` - Lower distance bound.
    /// * `max_t` - Upper distance bound.
    pub fn intersect_range(&self, ray: &Ray, min_t: Float, max_t: Float) -> Option<Intersection<'_>> {
        self.accel.intersect(&self.primitives, ray, min_t, max_t)
    }

    /// Select an emitter. Lights are chosen uniformly; the sensor is returned
    /// for `E` queries.
    ///
    /// * `query_type` - `L` or `E`.
    /// * `u`          - Uniform sample.
    pub fn sample_emitter(&self, query_type: SurfaceInteractionType, u: Float) -> Option<&Primitive> {
        if query_type.contains(SurfaceInteractionType::E) {
            return self.sensor();
        }
        let n = self.lights.len();
        if n == 0 {
            return None;
        }
        let i = clamp((u * n as Float) as usize, 0, n - 1);
        Some(&self.primitives[self.lights[i]])
    }

    /// Returns the discrete probability of `sample_emitter()` selecting an
    /// emitter of the given type.
    ///
    /// * `query_type` - `L` or `E`.
    pub fn evaluate_emitter_pdf(&self, query_type: SurfaceInteractionType) -> Float {
        if query_type.contains(SurfaceInteractionType::E) {
            if self.sensor.is_some() {
                1.0
            } else {
                0.0
            }
        } else if self.lights.is_empty() {
            0.0
        } else {
            1.0 / self.lights.len() as Float
        }
    }

    /// Returns the raster position a direction leaving the sensor maps to.
    ///
    /// * `wo`   - Direction leaving the sensor.
    /// * `geom` - Sensor position.
    pub fn raster_position(&self, wo: &Vector3f, geom: &SurfaceGeometry) -> Option<Point2f> {
        self.sensor_emitter().and_then(|e| e.raster_position(wo, geom))
    }
}

/// Creates the sensor primitive for a pinhole camera.
///
/// * `sensor` - The camera.
pub fn sensor_primitive(sensor: PinholeSensor) -> Primitive {
    Primitive::new("sensor", Transform::default(), None, None).with_emitter(Arc::new(sensor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::*;
    use crate::trianglemesh::*;

    struct Linear {
        triangles: Vec<TriangleRef>,
    }

    impl Accel for Linear {
        fn build(&mut self, primitives: &[Primitive]) -> Result<(), String> {
            self.triangles = collect_triangles(primitives)?;
            Ok(())
        }

        fn intersect<'a>(
            &self,
            primitives: &'a [Primitive],
            ray: &Ray,
            min_t: Float,
            max_t: Float,
        ) -> Option<Intersection<'a>> {
            let mut closest = ClosestHit::new(max_t);
            for tri in &self.triangles {
                closest.test(tri, primitives, ray, min_t);
            }
            closest.into_intersection(primitives)
        }
    }

    fn linear() -> Box<dyn Accel> {
        Box::new(Linear { triangles: vec![] })
    }

    fn quad(z: Float) -> TriangleMesh {
        TriangleMesh::quad([
            Point3f::new(-1.0, -1.0, z),
            Point3f::new(1.0, -1.0, z),
            Point3f::new(1.0, 1.0, z),
            Point3f::new(-1.0, 1.0, z),
        ])
    }

    fn camera() -> Primitive {
        let s = PinholeSensor::new(
            Point3f::new(0.0, 0.0, 5.0),
            Point3f::zero(),
            Vector3f::new(0.0, 1.0, 0.0),
            45.0,
            1.0,
        )
        .unwrap();
        sensor_primitive(s)
    }

    fn light(z: Float) -> Primitive {
        Primitive::new("light", Transform::default(), Some(&quad(z)), None)
            .with_area_light(Spectrum::ONE)
            .unwrap()
    }

    #[test]
    fn emitter_bookkeeping() {
        let scene = Scene::new(vec![camera(), light(0.0), light(1.0)], linear()).unwrap();
        assert_eq!(scene.num_lights(), 2);
        assert_eq!(scene.evaluate_emitter_pdf(SurfaceInteractionType::L), 0.5);
        assert_eq!(scene.evaluate_emitter_pdf(SurfaceInteractionType::E), 1.0);
        assert_eq!(scene.sample_emitter(SurfaceInteractionType::L, 0.0).unwrap().index, 1);
        assert_eq!(scene.sample_emitter(SurfaceInteractionType::L, 0.999).unwrap().index, 2);
        assert_eq!(scene.sample_emitter(SurfaceInteractionType::L, 1.0).unwrap().index, 2);
        assert_eq!(scene.sample_emitter(SurfaceInteractionType::E, 0.3).unwrap().index, 0);
    }

    #[test]
    fn rejects_two_sensors() {
        assert!(Scene::new(vec![camera(), camera(), light(0.0)], linear()).is_err());
    }

    #[test]
    fn rejects_empty_geometry() {
        assert!(Scene::new(vec![camera()], linear()).is_err());
    }

    #[test]
    fn intersect_skips_origin_surface() {
        let scene = Scene::new(vec![light(0.0), light(1.0)], linear()).unwrap();
        let ray = Ray::new(Point3f::new(0.2, 0.1, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        let isect = scene.intersect(&ray).unwrap();
        assert_eq!(isect.primitive.index, 1);
        assert!((isect.t - 1.0).abs() < 1e-6);
        assert!(scene.sample_emitter(SurfaceInteractionType::E, 0.5).is_none());
    }
}
