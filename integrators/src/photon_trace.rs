//! Photon Tracing

use super::photon_map::*;
use lumen_core::parallel::*;
use lumen_core::rng::*;

/// Per-thread state of a photon trace.
struct PhotonTraceContext {
    rng: Random,
    photons: Vec<Photon>,
}

/// Run `num_samples` photon trace samples on the pool and return all
/// recorded photons. Each thread gets an RNG seeded from `init_rng` in
/// thread order and its own photon list; the lists are concatenated in
/// thread order, so the result only depends on the seed and thread count.
///
/// * `parallel`    - Worker pool.
/// * `init_rng`    - Source of the per-thread seeds.
/// * `num_samples` - Number of samples.
/// * `f`           - Traces one sample, appending photons to the list.
pub fn process_photon_trace<F>(parallel: &Parallel, init_rng: &mut Random, num_samples: u64, f: F) -> Vec<Photon>
where
    F: Fn(&mut Random, &mut Vec<Photon>) + Sync,
{
    let params = ParallelForParams::samples(num_samples);
    let (contexts, processed) = parallel.for_each_with(
        &params,
        |_| PhotonTraceContext {
            rng: Random::new(init_rng.next_u32()),
            photons: vec![],
        },
        |ctx: &mut PhotonTraceContext, _index, _thread_id, _init| f(&mut ctx.rng, &mut ctx.photons),
    );

    let photons: Vec<Photon> = contexts.into_iter().flat_map(|ctx| ctx.photons).collect();
    info!("Traced {} photon samples; recorded {} photons", processed, photons.len());
    photons
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::geometry::*;
    use lumen_core::spectrum::*;

    fn trace(parallel: &Parallel, seed: u32) -> Vec<Photon> {
        let mut init_rng = Random::new(seed);
        process_photon_trace(parallel, &mut init_rng, 1000, |rng, photons| {
            if rng.next() < 0.5 {
                photons.push(Photon {
                    p: Point3f::new(rng.next(), rng.next(), rng.next()),
                    throughput: Spectrum::ONE,
                    wi: Vector3f::new(0.0, 0.0, 1.0),
                    num_vertices: 2,
                });
            }
        })
    }

    #[test]
    fn same_seed_same_photons() {
        let parallel = Parallel::new(4);
        let a = trace(&parallel, 42);
        let b = trace(&parallel, 42);
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn zero_samples_yield_no_photons() {
        let mut init_rng = Random::new(1);
        let photons = process_photon_trace(&Parallel::new(2), &mut init_rng, 0, |_, _| {
            panic!("no samples expected");
        });
        assert!(photons.is_empty());
    }
}
