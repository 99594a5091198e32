//! Photon Maps

use lumen_core::geometry::*;
use lumen_core::math::*;
use lumen_core::paramset::*;
use lumen_core::registry::*;
use lumen_core::spectrum::*;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

mod kdtree;
mod naive;

// Re-export
pub use kdtree::*;
pub use naive::*;

/// A light subpath vertex stored for density estimation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Photon {
    /// Position on the surface.
    pub p: Point3f,

    /// Throughput of the light subpath up to this vertex.
    pub throughput: Spectrum,

    /// Direction towards the previous vertex.
    pub wi: Vector3f,

    /// Number of vertices of the light subpath including this one.
    pub num_vertices: usize,
}

/// Spatial index over an immutable photon set.
pub trait PhotonMap: Send + Sync {
    /// Build the map from scratch, taking ownership of the photons.
    ///
    /// * `photons` - The photons.
    fn build(&mut self, photons: Vec<Photon>);

    /// Returns the number of stored photons.
    fn len(&self) -> usize;

    /// Returns true if no photons are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls `collect` once per photon with `|photon.p - p|² <= radius²`,
    /// from the most distant to the nearest. Returning `false` from `collect`
    /// stops the query.
    ///
    /// * `p`       - Query point.
    /// * `radius`  - Search radius.
    /// * `collect` - Receives each photon and its squared distance.
    fn collect_photons(&self, p: &Point3f, radius: Float, collect: &mut dyn FnMut(&Photon, Float) -> bool);

    /// Returns at most `n` photons nearest to `p` with squared distance below
    /// `max_dist2`, the most distant first, together with the squared search
    /// radius: the distance to the farthest collected photon once `n` were
    /// found and `max_dist2` otherwise.
    ///
    /// * `p`         - Query point.
    /// * `n`         - Maximum number of photons.
    /// * `max_dist2` - Squared search radius.
    fn collect_nearest(&self, p: &Point3f, n: usize, max_dist2: Float) -> (Vec<Photon>, Float);
}

/// Factory type for photon maps.
pub type PhotonMapRegistry = Registry<dyn PhotonMap>;

/// Register the photon maps of this crate.
///
/// * `registry` - Photon map registry.
pub fn register_photon_maps(registry: &mut PhotonMapRegistry) {
    registry.register("photonmap::naive", create_naive_photon_map);
    registry.register("photonmap::kdtree", create_kdtree_photon_map);
}

/// Create a photon map by short name, e.g. `kdtree`.
///
/// * `name` - `naive` or `kdtree`.
pub fn create_photon_map(name: &str) -> Result<Box<dyn PhotonMap>, String> {
    let mut registry = PhotonMapRegistry::new();
    register_photon_maps(&mut registry);
    registry.create(&format!("photonmap::{}", name), &ParamSet::new())
}

/// A photon found by a range query.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Candidate {
    /// Squared distance to the query point.
    pub dist2: OrderedFloat<Float>,

    /// Index into the photon list.
    pub index: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    /// Orders by distance, then by index so results are deterministic.
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist2.cmp(&other.dist2).then(self.index.cmp(&other.index))
    }
}

/// Sort range query results from the most distant to the nearest and feed
/// them to the callback.
///
/// * `photons`    - All photons.
/// * `candidates` - Photons within the radius.
/// * `collect`    - Query callback.
pub(crate) fn emit_farthest_first(
    photons: &[Photon],
    mut candidates: Vec<Candidate>,
    collect: &mut dyn FnMut(&Photon, Float) -> bool,
) {
    candidates.sort_unstable_by(|a, b| b.cmp(a));
    for c in candidates {
        if !collect(&photons[c.index], c.dist2.into_inner()) {
            break;
        }
    }
}

/// Bounded max-heap keeping the `n` nearest photons seen so far.
pub(crate) struct NearestPhotons {
    heap: BinaryHeap<Candidate>,
    n: usize,
    max_dist2: Float,
}

impl NearestPhotons {
    /// Start a k-nearest query.
    ///
    /// * `n`         - Maximum number of photons.
    /// * `max_dist2` - Squared search radius.
    pub fn new(n: usize, max_dist2: Float) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(n + 1),
            n,
            max_dist2,
        }
    }

    /// Returns the current squared search radius. It shrinks once the heap
    /// is full.
    pub fn max_dist2(&self) -> Float {
        self.max_dist2
    }

    /// Offer a photon.
    ///
    /// * `index` - Index into the photon list.
    /// * `dist2` - Squared distance to the query point.
    pub fn offer(&mut self, index: usize, dist2: Float) {
        if self.n == 0 || dist2 >= self.max_dist2 {
            return;
        }
        self.heap.push(Candidate {
            dist2: OrderedFloat(dist2),
            index,
        });
        if self.heap.len() > self.n {
            self.heap.pop();
        }
        if self.heap.len() == self.n {
            if let Some(top) = self.heap.peek() {
                self.max_dist2 = top.dist2.into_inner();
            }
        }
    }

    /// Finish the query.
    ///
    /// * `photons` - All photons.
    pub fn finish(self, photons: &[Photon]) -> (Vec<Photon>, Float) {
        let max_dist2 = self.max_dist2;
        // Reversing the ascending order puts the most distant first.
        let collected = self
            .heap
            .into_sorted_vec()
            .into_iter()
            .rev()
            .map(|c| photons[c.index])
            .collect();
        (collected, max_dist2)
    }
}
