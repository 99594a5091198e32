//! Kd-tree Photon Map

use super::*;

/// Nodes with fewer photons than this become leaves.
const LEAF_NUM_PHOTONS: usize = 10;

/// A node of the photon kd-tree.
#[derive(Copy, Clone, Debug)]
enum KdTreeNode {
    /// Photons `indices[begin..end]`.
    Leaf { begin: usize, end: usize },

    /// Photons with `p[axis] < split` are under `children[0]`.
    Interior {
        axis: Axis,
        split: Float,
        children: [usize; 2],
    },
}

/// Photon map splitting space at the centroid of the longest axis of each
/// node's bounds.
#[derive(Clone, Debug, Default)]
pub struct KdTreePhotonMap {
    photons: Vec<Photon>,
    indices: Vec<usize>,
    nodes: Vec<KdTreeNode>,
}

impl KdTreePhotonMap {
    /// Create an empty photon map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of tree nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Recursively build the tree over `indices[begin..end]`; returns the
    /// node index.
    ///
    /// * `begin` - Start of the range.
    /// * `end`   - End of the range, exclusive.
    fn build_node(&mut self, begin: usize, end: usize) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(KdTreeNode::Leaf { begin, end });

        if end - begin < LEAF_NUM_PHOTONS {
            return idx;
        }

        let mut bounds = Bounds3f::EMPTY;
        for &i in &self.indices[begin..end] {
            bounds = bounds.union_point(&self.photons[i].p);
        }

        // Select the longest axis and split at the centroid.
        let axis = bounds.maximum_extent();
        let split = bounds.centroid()[axis];

        let photons = &self.photons;
        let n_left = itertools::partition(self.indices[begin..end].iter_mut(), |&i| photons[i].p[axis] < split);
        let mid = begin + n_left;
        if mid == begin || mid == end {
            // Coincident photons cannot be separated.
            return idx;
        }

        let left = self.build_node(begin, mid);
        let right = self.build_node(mid, end);
        self.nodes[idx] = KdTreeNode::Interior {
            axis,
            split,
            children: [left, right],
        };
        idx
    }

    /// Visit the leaves that may hold photons within `sqrt(max_dist2)` of
    /// `p`, nearest side first. `max_dist2` is re-read after each leaf so the
    /// visitor can shrink it.
    ///
    /// * `idx`       - Node index.
    /// * `p`         - Query point.
    /// * `max_dist2` - Squared search radius.
    /// * `visit`     - Receives the photon indices of a leaf; returns the
    ///                 current squared radius or `None` to stop.
    fn traverse<F>(&self, idx: usize, p: &Point3f, max_dist2: &mut Float, visit: &mut F) -> bool
    where
        F: FnMut(&[usize]) -> Option<Float>,
    {
        match self.nodes[idx] {
            KdTreeNode::Leaf { begin, end } => match visit(&self.indices[begin..end]) {
                Some(d2) => {
                    *max_dist2 = d2;
                    true
                }
                None => false,
            },
            KdTreeNode::Interior { axis, split, children } => {
                let (near, far) = if p[axis] < split {
                    (children[0], children[1])
                } else {
                    (children[1], children[0])
                };
                if !self.traverse(near, p, max_dist2, visit) {
                    return false;
                }
                let d = p[axis] - split;
                if d * d <= *max_dist2 {
                    return self.traverse(far, p, max_dist2, visit);
                }
                true
            }
        }
    }
}

impl PhotonMap for KdTreePhotonMap {
    fn build(&mut self, photons: Vec<Photon>) {
        self.photons = photons;
        self.indices = (0..self.photons.len()).collect();
        self.nodes.clear();
        if !self.photons.is_empty() {
            self.build_node(0, self.photons.len());
        }
        debug!(
            "Photon kd-tree built with {} nodes for {} photons",
            self.nodes.len(),
            self.photons.len()
        );
    }

    fn len(&self) -> usize {
        self.photons.len()
    }

    fn collect_photons(&self, p: &Point3f, radius: Float, collect: &mut dyn FnMut(&Photon, Float) -> bool) {
        if self.nodes.is_empty() {
            return;
        }
        let radius2 = radius * radius;
        let mut candidates = vec![];
        let mut max_dist2 = radius2;
        self.traverse(0, p, &mut max_dist2, &mut |leaf: &[usize]| {
            for &index in leaf {
                let dist2 = self.photons[index].p.distance_squared(p);
                if dist2 <= radius2 {
                    candidates.push(Candidate {
                        dist2: OrderedFloat(dist2),
                        index,
                    });
                }
            }
            Some(radius2)
        });
        emit_farthest_first(&self.photons, candidates, collect);
    }

    fn collect_nearest(&self, p: &Point3f, n: usize, max_dist2: Float) -> (Vec<Photon>, Float) {
        let mut nearest = NearestPhotons::new(n, max_dist2);
        if !self.nodes.is_empty() {
            let mut bound = max_dist2;
            self.traverse(0, p, &mut bound, &mut |leaf: &[usize]| {
                for &index in leaf {
                    nearest.offer(index, self.photons[index].p.distance_squared(p));
                }
                Some(nearest.max_dist2())
            });
        }
        nearest.finish(&self.photons)
    }
}

/// Factory for `photonmap::kdtree`.
///
/// * `_params` - Parameter set.
pub fn create_kdtree_photon_map(_params: &ParamSet) -> Result<Box<dyn PhotonMap>, String> {
    Ok(Box::new(KdTreePhotonMap::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photon(x: Float, y: Float, z: Float) -> Photon {
        Photon {
            p: Point3f::new(x, y, z),
            throughput: Spectrum::ONE,
            wi: Vector3f::new(0.0, 0.0, 1.0),
            num_vertices: 2,
        }
    }

    #[test]
    fn coincident_photons_terminate() {
        let mut map = KdTreePhotonMap::new();
        map.build(vec![photon(1.0, 1.0, 1.0); 100]);
        assert_eq!(map.num_nodes(), 1);
        let mut count = 0;
        map.collect_photons(&Point3f::new(1.0, 1.0, 1.0), 0.0, &mut |_, _| {
            count += 1;
            true
        });
        assert_eq!(count, 100);
    }

    #[test]
    fn small_sets_are_a_single_leaf() {
        let mut map = KdTreePhotonMap::new();
        map.build((0..9).map(|i| photon(i as Float, 0.0, 0.0)).collect());
        assert_eq!(map.num_nodes(), 1);
        map.build((0..10).map(|i| photon(i as Float, 0.0, 0.0)).collect());
        assert_eq!(map.num_nodes(), 3);
    }

    #[test]
    fn empty_map_returns_nothing() {
        let mut map = KdTreePhotonMap::new();
        map.build(vec![]);
        assert!(map.is_empty());
        map.collect_photons(&Point3f::zero(), 10.0, &mut |_, _| panic!("no photons expected"));
        let (photons, d2) = map.collect_nearest(&Point3f::zero(), 5, 1.0);
        assert!(photons.is_empty());
        assert_eq!(d2, 1.0);
    }
}
