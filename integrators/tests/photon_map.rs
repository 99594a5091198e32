use integrators::*;
use lumen_core::geometry::*;
use lumen_core::math::*;
use lumen_core::rng::*;
use lumen_core::spectrum::*;
use proptest::prelude::*;

fn random_photons(seed: u32, n: usize) -> Vec<Photon> {
    let mut rng = Random::new(seed);
    (0..n)
        .map(|i| Photon {
            p: Point3f::new(rng.next(), rng.next(), rng.next()),
            throughput: Spectrum::new(i as Float),
            wi: Vector3f::new(0.0, 0.0, 1.0),
            num_vertices: 2 + i % 3,
        })
        .collect()
}

fn maps(photons: &[Photon]) -> Vec<(&'static str, Box<dyn PhotonMap>)> {
    ["naive", "kdtree"]
        .into_iter()
        .map(|name| {
            let mut map = create_photon_map(name).unwrap();
            map.build(photons.to_vec());
            (name, map)
        })
        .collect()
}

fn collect(map: &dyn PhotonMap, p: &Point3f, radius: Float) -> Vec<(Float, Photon)> {
    let mut out = vec![];
    map.collect_photons(p, radius, &mut |photon, dist2| {
        out.push((dist2, *photon));
        true
    });
    out
}

/// Photon ids (encoded in the throughput) within the radius, sorted.
fn brute_force(photons: &[Photon], p: &Point3f, radius: Float) -> Vec<u32> {
    let mut ids: Vec<u32> = photons
        .iter()
        .filter(|photon| photon.p.distance_squared(p) <= radius * radius)
        .map(|photon| photon.throughput[0] as u32)
        .collect();
    ids.sort_unstable();
    ids
}

fn ids(collected: &[(Float, Photon)]) -> Vec<u32> {
    let mut ids: Vec<u32> = collected.iter().map(|(_, photon)| photon.throughput[0] as u32).collect();
    ids.sort_unstable();
    ids
}

#[test]
fn registry_lists_both_maps() {
    let mut registry = PhotonMapRegistry::new();
    register_photon_maps(&mut registry);
    assert_eq!(registry.names(), vec!["photonmap::kdtree", "photonmap::naive"]);
    assert!(create_photon_map("grid").is_err());
}

#[test]
fn callback_can_stop_the_query() {
    let photons = random_photons(7, 500);
    for (name, map) in maps(&photons) {
        let mut count = 0;
        map.collect_photons(&Point3f::new(0.5, 0.5, 0.5), 1.0, &mut |_, _| {
            count += 1;
            count < 5
        });
        assert_eq!(count, 5, "{}", name);
    }
}

#[test]
fn nearest_reports_shrunk_radius_only_when_full() {
    let photons = random_photons(3, 400);
    let p = Point3f::new(0.5, 0.5, 0.5);
    for (name, map) in maps(&photons) {
        let (nearest, d2) = map.collect_nearest(&p, 20, 1.0);
        assert_eq!(nearest.len(), 20, "{}", name);
        assert_eq!(d2, nearest[0].p.distance_squared(&p), "{}", name);

        let (few, d2) = map.collect_nearest(&Point3f::new(10.0, 10.0, 10.0), 20, 0.01);
        assert!(few.is_empty(), "{}", name);
        assert_eq!(d2, 0.01, "{}", name);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn range_query_matches_brute_force(
        seed in any::<u32>(),
        n in 0..300usize,
        x in -0.2..1.2f32,
        y in -0.2..1.2f32,
        z in -0.2..1.2f32,
        r1 in 0.0..0.5f32,
        dr in 0.0..0.5f32,
    ) {
        let photons = random_photons(seed, n);
        let p = Point3f::new(x, y, z);
        let r2 = r1 + dr;
        for (name, map) in maps(&photons) {
            let small = collect(map.as_ref(), &p, r1);
            let large = collect(map.as_ref(), &p, r2);

            prop_assert_eq!(ids(&small), brute_force(&photons, &p, r1), "{}", name);
            prop_assert_eq!(ids(&large), brute_force(&photons, &p, r2), "{}", name);

            // Most distant first.
            for w in large.windows(2) {
                prop_assert!(w[0].0 >= w[1].0, "{}", name);
            }
            for (dist2, photon) in &large {
                prop_assert_eq!(*dist2, photon.p.distance_squared(&p));
            }

            // Growing the radius only adds photons.
            let large_ids = ids(&large);
            for id in ids(&small) {
                prop_assert!(large_ids.binary_search(&id).is_ok(), "{}", name);
            }
        }
    }

    #[test]
    fn nearest_matches_brute_force(
        seed in any::<u32>(),
        n in 0..300usize,
        k in 1..30usize,
        max_dist in 0.01..1.0f32,
    ) {
        let photons = random_photons(seed, n);
        let p = Point3f::new(0.5, 0.5, 0.5);
        let max_dist2 = max_dist * max_dist;

        let mut expected: Vec<Float> = photons
            .iter()
            .map(|photon| photon.p.distance_squared(&p))
            .filter(|&d2| d2 < max_dist2)
            .collect();
        expected.sort_by(|a, b| b.partial_cmp(a).unwrap());
        let expected: Vec<Float> = expected.split_off(expected.len().saturating_sub(k));

        for (name, map) in maps(&photons) {
            let (nearest, d2) = map.collect_nearest(&p, k, max_dist2);
            let got: Vec<Float> = nearest.iter().map(|photon| photon.p.distance_squared(&p)).collect();
            prop_assert_eq!(&got, &expected, "{}", name);
            if got.len() == k {
                prop_assert_eq!(d2, got[0], "{}", name);
            } else {
                prop_assert_eq!(d2, max_dist2, "{}", name);
            }
        }
    }
}
