use accelerators::*;
use float_cmp::approx_eq;
use integrators::*;
use lumen_core::geometry::*;
use lumen_core::interaction::*;
use lumen_core::math::*;
use lumen_core::primitive::*;
use lumen_core::reflection::*;
use lumen_core::rng::*;
use lumen_core::scene::*;
use lumen_core::sensor::*;
use lumen_core::spectrum::*;
use lumen_core::trianglemesh::*;
use std::sync::Arc;

const NUM_PATHS: usize = 2000;

fn quad(corners: [[Float; 3]; 4]) -> TriangleMesh {
    TriangleMesh::quad(corners.map(|c| Point3f::new(c[0], c[1], c[2])))
}

/// A diffuse floor under a downward facing light, seen from above.
fn lit_floor() -> Scene {
    let diffuse: Arc<dyn Bsdf> = Arc::new(DiffuseBsdf::new(Spectrum::new(0.8)).unwrap());
    let floor = Primitive::new(
        "floor",
        Transform::default(),
        Some(&quad([[-2.0, -2.0, 0.0], [2.0, -2.0, 0.0], [2.0, 2.0, 0.0], [-2.0, 2.0, 0.0]])),
        Some(diffuse),
    );
    let light = Primitive::new(
        "light",
        Transform::default(),
        Some(&quad([[-0.5, -0.5, 1.5], [-0.5, 0.5, 1.5], [0.5, 0.5, 1.5], [0.5, -0.5, 1.5]])),
        None,
    )
    .with_area_light(Spectrum::new(5.0))
    .unwrap();
    let sensor = PinholeSensor::new(
        Point3f::new(0.0, -4.0, 3.0),
        Point3f::new(0.0, 0.0, 0.5),
        Vector3f::new(0.0, 0.0, 1.0),
        45.0,
        1.0,
    )
    .unwrap();
    Scene::new(vec![floor, light, sensor_primitive(sensor)], Box::new(NaiveAccel::new())).unwrap()
}

/// Returns the largest vertex count seen over `NUM_PATHS` subpaths.
fn longest_subpath(scene: &Scene, max_num_vertices: i32, trans_dir: TransportDirection) -> usize {
    let mut rng = Random::new(11);
    let mut longest = 0;
    for _ in 0..NUM_PATHS {
        trace_subpath(scene, &mut rng, max_num_vertices, trans_dir, |n, _, _, _, _, _| {
            longest = longest.max(n);
            true
        });
    }
    longest
}

#[test]
fn vertex_count_respects_limit() {
    let scene = lit_floor();
    for trans_dir in [TransportDirection::LE, TransportDirection::EL] {
        assert_eq!(longest_subpath(&scene, 0, trans_dir), 0);
        assert_eq!(longest_subpath(&scene, 1, trans_dir), 1);
        assert_eq!(longest_subpath(&scene, 2, trans_dir), 2);
        assert!(longest_subpath(&scene, 3, trans_dir) <= 3);
    }
}

#[test]
fn light_subpaths_have_no_raster_position() {
    let scene = lit_floor();
    let mut rng = Random::new(3);
    let mut num_vertices = 0;
    for _ in 0..NUM_PATHS {
        trace_subpath(&scene, &mut rng, 3, TransportDirection::LE, |n, raster_pos, prev, v, throughput, _| {
            assert!(raster_pos.is_none());
            assert_eq!(prev.is_none(), n == 1);
            if n == 1 {
                assert_eq!(v.interaction_type, SurfaceInteractionType::L);
            }
            assert!(throughput.to_rgb().iter().all(|c| c.is_finite()));
            num_vertices += 1;
            true
        });
    }
    assert!(num_vertices > NUM_PATHS);
}

#[test]
fn eye_subpaths_keep_their_raster_position() {
    let scene = lit_floor();
    let mut rng = Random::new(5);
    let mut with_raster = 0;
    for _ in 0..NUM_PATHS {
        let mut first = None;
        trace_subpath(&scene, &mut rng, -1, TransportDirection::EL, |n, raster_pos, _, v, _, _| {
            if n == 1 {
                assert_eq!(v.interaction_type, SurfaceInteractionType::E);
                first = raster_pos;
                if raster_pos.is_some() {
                    with_raster += 1;
                }
            }
            assert_eq!(first, raster_pos);
            if let Some(raster_pos) = raster_pos {
                assert!((0.0..=1.0).contains(&raster_pos.x) && (0.0..=1.0).contains(&raster_pos.y));
            }
            true
        });
    }
    // Only samples on the raster border may round outside the unit square.
    assert!(with_raster >= NUM_PATHS - 10);
}

#[test]
fn callback_stops_tracing() {
    let scene = lit_floor();
    let mut rng = Random::new(9);
    for trans_dir in [TransportDirection::LE, TransportDirection::EL] {
        let mut calls = 0;
        for _ in 0..NUM_PATHS {
            trace_subpath(&scene, &mut rng, -1, trans_dir, |n, _, _, _, _, _| {
                calls += 1;
                n < 2
            });
        }
        // Each path reports at most the emitter vertex and the first hit.
        assert!(calls <= 2 * NUM_PATHS);
        assert!(calls > NUM_PATHS);
    }
}

#[test]
fn fixed_raster_position_is_reported() {
    let scene = lit_floor();
    let mut rng = Random::new(13);
    let target = Point2f::new(0.3, 0.3);
    let mut hits = 0;
    for _ in 0..16 {
        trace_eye_subpath_fixed_raster_pos(
            &scene,
            &mut rng,
            2,
            TransportDirection::EL,
            &target,
            |n, raster_pos, prev, v, _, _| {
                let raster_pos = raster_pos.unwrap();
                assert!(approx_eq!(f32, raster_pos.x, 0.3, epsilon = 1e-4));
                assert!(approx_eq!(f32, raster_pos.y, 0.3, epsilon = 1e-4));
                if let Some(prev) = prev {
                    // The first ray leaves the sensor through the target raster position.
                    let wo = prev.direction_to(v);
                    let back = scene.raster_position(&wo, &prev.geom).unwrap();
                    assert!(approx_eq!(f32, back.x, 0.3, epsilon = 1e-3));
                    assert!(approx_eq!(f32, back.y, 0.3, epsilon = 1e-3));
                    hits += 1;
                }
                n < 2
            },
        );
    }
    assert_eq!(hits, 16);
}
