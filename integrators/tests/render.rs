use accelerators::*;
use float_cmp::approx_eq;
use integrators::*;
use lumen_core::film::*;
use lumen_core::geometry::*;
use lumen_core::math::*;
use lumen_core::parallel::*;
use lumen_core::paramset::*;
use lumen_core::primitive::*;
use lumen_core::reflection::*;
use lumen_core::rng::*;
use lumen_core::scene::*;
use lumen_core::sensor::*;
use lumen_core::spectrum::*;
use lumen_core::trianglemesh::*;
use std::sync::Arc;

fn quad(corners: [[Float; 3]; 4]) -> TriangleMesh {
    TriangleMesh::quad(corners.map(|c| Point3f::new(c[0], c[1], c[2])))
}

/// A diffuse floor lit by a small downward facing area light.
fn lit_floor(with_sensor: bool) -> Scene {
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

    let mut primitives = vec![floor, light];
    if with_sensor {
        let sensor = PinholeSensor::new(
            Point3f::new(0.0, -4.0, 3.0),
            Point3f::new(0.0, 0.0, 0.5),
            Vector3f::new(0.0, 0.0, 1.0),
            45.0,
            1.0,
        )
        .unwrap();
        primitives.push(sensor_primitive(sensor));
    }
    Scene::new(primitives, Box::new(BVHAccel::new(4, SplitMethod::SAH))).unwrap()
}

fn renderer(name: &str, pairs: &[&str]) -> Box<dyn Renderer> {
    let mut registry = RendererRegistry::new();
    register_renderers(&mut registry);
    let mut params = ParamSet::new();
    for pair in pairs {
        params.add_from_str(pair).unwrap();
    }
    registry.create(name, &params).unwrap()
}

fn render(renderer: &dyn Renderer, scene: &Scene, seed: u32, threads: i32, size: usize) -> HDRFilm {
    let mut film = HDRFilm::new(size, size);
    let mut init_rng = Random::new(seed);
    renderer
        .render(scene, &mut init_rng, &mut film, &Parallel::new(threads))
        .unwrap();
    film
}

#[test]
fn registry_lists_renderers() {
    let mut registry = RendererRegistry::new();
    register_renderers(&mut registry);
    assert_eq!(
        registry.names(),
        vec!["renderer::pm", "renderer::pt", "renderer::sampledensity"]
    );
}

#[test]
fn same_seed_and_threads_give_identical_films() {
    let scene = lit_floor(true);
    let configs: [(&str, &[&str]); 3] = [
        ("renderer::sampledensity", &["num_samples=2000"]),
        ("renderer::pt", &["num_samples=2000", "max_num_vertices=5"]),
        (
            "renderer::pm",
            &["num_samples=2000", "num_photon_trace_samples=2000", "max_num_vertices=5"],
        ),
    ];
    for (name, pairs) in configs {
        let r = renderer(name, pairs);
        let a = render(r.as_ref(), &scene, 1234, 3, 8);
        let b = render(r.as_ref(), &scene, 1234, 3, 8);
        assert_eq!(a.data(), b.data(), "{}", name);
    }
}

#[test]
fn sample_density_is_uniform() {
    let scene = lit_floor(true);
    let r = renderer("renderer::sampledensity", &["num_samples=160000"]);
    let film = render(r.as_ref(), &scene, 5, 4, 4);
    for v in film.data() {
        assert!((v[0] - 1.0).abs() < 0.1, "pixel value {}", v);
    }
    assert!(approx_eq!(Float, film.total()[0], 16.0, epsilon = 0.01));
}

#[test]
fn path_tracing_and_photon_mapping_light_the_floor() {
    let scene = lit_floor(true);
    let pt = renderer("renderer::pt", &["num_samples=20000"]);
    let pm = renderer(
        "renderer::pm",
        &["num_samples=20000", "num_photon_trace_samples=20000", "photonmap=kdtree"],
    );
    for r in [pt, pm] {
        let film = render(r.as_ref(), &scene, 99, 2, 8);
        assert!(film.data().iter().all(|v| !v.has_nans()));
        assert!(film.total().max_component_value() > 0.0);
    }
}

#[test]
fn photon_maps_agree_on_the_estimate() {
    let scene = lit_floor(true);
    let pairs = ["num_samples=5000", "num_photon_trace_samples=5000", "finalgather=false"];
    let naive = renderer("renderer::pm", &[&pairs[..], &["photonmap=naive"][..]].concat());
    let kdtree = renderer("renderer::pm", &[&pairs[..], &["photonmap=kdtree"][..]].concat());
    let a = render(naive.as_ref(), &scene, 8, 2, 8);
    let b = render(kdtree.as_ref(), &scene, 8, 2, 8);
    for (x, y) in a.data().iter().zip(b.data()) {
        for c in 0..3 {
            assert!(approx_eq!(Float, x[c], y[c], epsilon = 1e-3, ulps = 8));
        }
    }
}

#[test]
fn rendering_requires_a_sensor() {
    let scene = lit_floor(false);
    for name in ["renderer::sampledensity", "renderer::pt", "renderer::pm"] {
        let r = renderer(name, &["num_samples=10"]);
        let mut film = HDRFilm::new(4, 4);
        let result = r.render(&scene, &mut Random::new(1), &mut film, &Parallel::new(1));
        assert!(result.is_err(), "{}", name);
    }
}

#[test]
fn time_bounded_render_is_normalized() {
    let scene = lit_floor(true);
    let mut params = ParamSet::new();
    params.add_from_str("render_time=0.05").unwrap();
    params.add_from_str("grain_size=1000").unwrap();
    let scheduler = RenderScheduler::from_params(&params).unwrap();

    let mut film = HDRFilm::new(2, 2);
    let processed = scheduler
        .process(&Parallel::new(2), &scene, &mut film, &mut Random::new(3), |_, film, rng| {
            film.splat(&rng.next_2d(), Spectrum::ONE);
        })
        .unwrap();
    assert!(processed > 0);
    assert_eq!(processed % 1000, 0);
    assert!(approx_eq!(Float, film.total()[0], 4.0, epsilon = 1e-2));
}
