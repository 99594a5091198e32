use accelerators::*;
use lumen_core::accel::*;
use lumen_core::geometry::*;
use lumen_core::math::*;
use lumen_core::paramset::*;
use lumen_core::primitive::*;
use lumen_core::rng::*;
use lumen_core::trianglemesh::*;
use proptest::prelude::*;

fn random_point(rng: &mut Random) -> Point3f {
    Point3f::new(rng.next(), rng.next(), rng.next()) * 2.0 - Vector3f::new(1.0, 1.0, 1.0)
}

/// Small random triangles spread over `[-1, 1]³`, split across a few
/// primitives.
fn random_scene(seed: u32, n_prims: usize, tris_per_prim: usize) -> Vec<Primitive> {
    let mut rng = Random::new(seed);
    (0..n_prims)
        .map(|p| {
            let mut positions = vec![];
            let mut faces = vec![];
            for i in 0..tris_per_prim {
                let c = random_point(&mut rng);
                for _ in 0..3 {
                    positions.push(c + random_point(&mut rng) * 0.2);
                }
                let b = 3 * i as u32;
                faces.push([b, b + 1, b + 2]);
            }
            let mesh = TriangleMesh::new(positions, vec![], vec![], faces).unwrap();
            Primitive::new(&format!("p{}", p), Transform::default(), Some(&mesh), None)
        })
        .collect()
}

fn variants() -> Vec<(String, Box<dyn Accel>)> {
    let mut out: Vec<(String, Box<dyn Accel>)> = vec![];
    for method in ["sah", "middle", "equal"] {
        for max_prims in [1, 4, 255] {
            let mut params = ParamSet::new();
            params.add_string("splitmethod", &[method.to_string()]);
            params.add_int("maxnodeprims", &[max_prims]);
            out.push((format!("bvh/{}/{}", method, max_prims), create_bvh_accel(&params).unwrap()));
        }
    }
    out
}

fn built(mut accel: Box<dyn Accel>, prims: &[Primitive]) -> Box<dyn Accel> {
    accel.build(prims).unwrap();
    accel
}

fn check_matches_naive(prims: &[Primitive], rays: &[Ray], min_t: Float, max_t: Float) {
    let naive = built(Box::new(NaiveAccel::new()), prims);
    for (name, accel) in variants() {
        let accel = built(accel, prims);
        for ray in rays {
            let expected = naive.intersect(prims, ray, min_t, max_t);
            let actual = accel.intersect(prims, ray, min_t, max_t);
            match (expected, actual) {
                (None, None) => {}
                (Some(e), Some(a)) => {
                    assert_eq!(e.t, a.t, "{}: distance differs for {:?}", name, ray);
                    assert_eq!(e.primitive.id, a.primitive.id, "{}: primitive differs for {:?}", name, ray);
                    assert_eq!(e.geom.p, a.geom.p, "{}: position differs for {:?}", name, ray);
                }
                (e, a) => panic!(
                    "{}: hit mismatch for {:?}: naive {:?}, accel {:?}",
                    name,
                    ray,
                    e.map(|i| i.t),
                    a.map(|i| i.t)
                ),
            }
        }
    }
}

fn random_rays(seed: u32, n: usize) -> Vec<Ray> {
    let mut rng = Random::new(seed);
    (0..n)
        .map(|_| {
            let o = random_point(&mut rng) * 2.0;
            let d = (random_point(&mut rng) - o * 0.5).normalize();
            Ray::new(o, d)
        })
        .collect()
}

#[test]
fn all_variants_agree_with_naive() {
    let prims = random_scene(7, 5, 60);
    let rays = random_rays(11, 500);
    check_matches_naive(&prims, &rays, RAY_EPSILON, INFINITY);
}

#[test]
fn bounded_queries_agree_with_naive() {
    let prims = random_scene(3, 3, 40);
    let rays = random_rays(5, 300);
    check_matches_naive(&prims, &rays, 0.5, 2.0);
}

#[test]
fn axis_aligned_rays_agree_with_naive() {
    let prims = random_scene(13, 2, 50);
    let mut rays = vec![];
    let mut rng = Random::new(17);
    for axis in 0..3 {
        for sign in [-1.0, 1.0] {
            for _ in 0..30 {
                let mut d = Vector3f::zero();
                d[axis] = sign;
                let mut o = random_point(&mut rng);
                o[axis] = -2.0 * sign;
                rays.push(Ray::new(o, d));
            }
        }
    }
    check_matches_naive(&prims, &rays, RAY_EPSILON, INFINITY);
}

#[test]
fn coincident_triangles_resolve_to_first_primitive() {
    let quad = TriangleMesh::quad([
        Point3f::new(-1.0, -1.0, 0.0),
        Point3f::new(1.0, -1.0, 0.0),
        Point3f::new(1.0, 1.0, 0.0),
        Point3f::new(-1.0, 1.0, 0.0),
    ]);
    let prims: Vec<Primitive> = (0..8)
        .map(|i| Primitive::new(&format!("q{}", i), Transform::default(), Some(&quad), None))
        .collect();
    let ray = Ray::new(Point3f::new(0.3, -0.4, 2.0), Vector3f::new(0.0, 0.0, -1.0));
    for (name, accel) in variants() {
        let accel = built(accel, &prims);
        let isect = accel.intersect(&prims, &ray, RAY_EPSILON, INFINITY).unwrap();
        assert_eq!(isect.primitive.id, "q0", "{}", name);
        assert_eq!(isect.t, 2.0, "{}", name);
    }
}

#[test]
fn build_fails_without_triangles() {
    let prims = vec![Primitive::new("sensor", Transform::default(), None, None)];
    let mut naive = NaiveAccel::new();
    assert!(naive.build(&prims).is_err());
    for (_, mut accel) in variants() {
        assert!(accel.build(&prims).is_err());
        assert!(accel.build(&[]).is_err());
    }
}

#[test]
fn build_fails_on_non_finite_vertices_and_stays_empty() {
    let good = random_scene(1, 1, 10);
    let mut bad_mesh = good[0].mesh.clone().unwrap();
    bad_mesh.positions[4].y = INFINITY;
    let bad = vec![Primitive::new("bad", Transform::default(), Some(&bad_mesh), None)];
    let ray = Ray::new(Point3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0));

    for (name, mut accel) in variants() {
        accel.build(&good).unwrap();
        assert!(accel.build(&bad).is_err(), "{}", name);
        assert!(accel.intersect(&good, &ray, RAY_EPSILON, INFINITY).is_none(), "{}", name);
    }
}

#[test]
fn rebuild_replaces_previous_structure() {
    let first = random_scene(21, 2, 30);
    let second = random_scene(22, 3, 30);
    let rays = random_rays(23, 200);
    let naive = built(Box::new(NaiveAccel::new()), &second);
    for (name, mut accel) in variants() {
        accel.build(&first).unwrap();
        accel.build(&second).unwrap();
        for ray in &rays {
            let e = naive.intersect(&second, ray, RAY_EPSILON, INFINITY).map(|i| i.t);
            let a = accel.intersect(&second, ray, RAY_EPSILON, INFINITY).map(|i| i.t);
            assert_eq!(e, a, "{}", name);
        }
    }
}

#[test]
fn registry_creates_both_accelerators() {
    let mut registry = AccelRegistry::new();
    register_accels(&mut registry);
    assert_eq!(registry.names(), vec!["accel::bvh", "accel::naive"]);
    assert!(create_accel(&registry, "accel::kdtree", &ParamSet::new()).is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn random_scenes_agree_with_naive(scene_seed in any::<u32>(), ray_seed in any::<u32>(), n in 1..80usize) {
        let prims = random_scene(scene_seed, 2, n);
        let rays = random_rays(ray_seed, 50);
        check_matches_naive(&prims, &rays, RAY_EPSILON, INFINITY);
    }
}
