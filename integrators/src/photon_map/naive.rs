//! Naive Photon Map

use super::*;

/// Stores photons in a list and scans all of them per query.
#[derive(Clone, Debug, Default)]
pub struct NaivePhotonMap {
    photons: Vec<Photon>,
}

impl NaivePhotonMap {
    /// Create an empty photon map.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PhotonMap for NaivePhotonMap {
    fn build(&mut self, photons: Vec<Photon>) {
        self.photons = photons;
    }

    fn len(&self) -> usize {
        self.photons.len()
    }

    fn collect_photons(&self, p: &Point3f, radius: Float, collect: &mut dyn FnMut(&Photon, Float) -> bool) {
        let radius2 = radius * radius;
        let candidates = self
            .photons
            .iter()
            .enumerate()
            .filter_map(|(index, photon)| {
                let dist2 = photon.p.distance_squared(p);
                (dist2 <= radius2).then_some(Candidate {
                    dist2: OrderedFloat(dist2),
                    index,
                })
            })
            .collect();
        emit_farthest_first(&self.photons, candidates, collect);
    }

    fn collect_nearest(&self, p: &Point3f, n: usize, max_dist2: Float) -> (Vec<Photon>, Float) {
        let mut nearest = NearestPhotons::new(n, max_dist2);
        for (index, photon) in self.photons.iter().enumerate() {
            nearest.offer(index, photon.p.distance_squared(p));
        }
        nearest.finish(&self.photons)
    }
}

/// Factory for `photonmap::naive`.
///
/// * `_params` - Parameter set.
pub fn create_naive_photon_map(_params: &ParamSet) -> Result<Box<dyn PhotonMap>, String> {
    Ok(Box::new(NaivePhotonMap::new()))
}
