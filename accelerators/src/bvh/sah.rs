//! Surface Area Heuristic Algorithm

use super::common::*;
use lumen_core::accel::*;
use lumen_core::geometry::*;
use lumen_core::math::*;
use order_stat::kth_by;
use std::cmp::Ordering;

const N_BUCKETS: usize = 12;

/// Leaves larger than this cannot be encoded in a `LinearBVHNode`.
const MAX_LEAF_SIZE: usize = u16::MAX as usize;

/// Recursively build the BVH structure for either Middle, EqualCounts or SAH
/// algorithm.
///
/// * `triangles`         - The triangles collected from the primitives.
/// * `split_method`      - Middle|EqualCounts|SAH
/// * `max_prims_in_node` - Maximum number of triangles in the node.
/// * `primitive_info`    - Triangle information.
/// * `start`             - Starting index. For first call it should be 0.
/// * `end`               - Ending index + 1. For first call it should be number
///                         of triangles.
/// * `total_nodes`       - Used to return total number of nodes.
/// * `ordered_tris`      - Used to return a list of triangles ordered such that
///                         triangles in leaf nodes occupy contiguous ranges in
///                         the vector.
#[allow(clippy::too_many_arguments)]
pub fn build(
    triangles: &[TriangleRef],
    split_method: SplitMethod,
    max_prims_in_node: u8,
    primitive_info: &mut [BVHPrimitiveInfo],
    start: usize,
    end: usize,
    total_nodes: &mut usize,
    ordered_tris: &mut Vec<TriangleRef>,
) -> Box<BVHBuildNode> {
    // Compute bounds of all triangles in BVH node.
    let mut bounds = Bounds3f::EMPTY;
    for info in primitive_info.iter().take(end).skip(start) {
        bounds = bounds.union(&info.bounds);
    }

    let mut dim = Axis::default(); // Will be set if we need to make interior node.

    let n_primitives = end - start;

    let interior_midpoint = if n_primitives == 1 {
        // Create leaf BVHBuildNode.
        None
    } else {
        // Compute bound of triangle centroids, choose split dimension dim.
        let mut centroid_bounds = Bounds3f::EMPTY;
        for info in primitive_info.iter().take(end).skip(start) {
            centroid_bounds = centroid_bounds.union_point(&info.centroid);
        }
        dim = centroid_bounds.maximum_extent();

        if centroid_bounds.p_max[dim] == centroid_bounds.p_min[dim] {
            // All centroids coincide. Keep the leaf small enough to encode.
            if n_primitives > MAX_LEAF_SIZE {
                Some(start + n_primitives / 2)
            } else {
                None
            }
        } else {
            // Partition triangles based on split_method.
            match split_method {
                SplitMethod::Middle => Some(split_middle(
                    primitive_info,
                    start,
                    end,
                    dim,
                    &centroid_bounds,
                )),

                SplitMethod::EqualCounts => {
                    Some(split_equal_counts(primitive_info, start, end, dim))
                }

                SplitMethod::SAH => split_sah(
                    primitive_info,
                    start,
                    end,
                    n_primitives,
                    dim,
                    &centroid_bounds,
                    &bounds,
                    max_prims_in_node,
                ),
            }
        }
    };

    *total_nodes += 1;
    if let Some(mid) = interior_midpoint {
        // Create interior BVHBuildNode.
        let c0 = build(
            triangles,
            split_method,
            max_prims_in_node,
            primitive_info,
            start,
            mid,
            total_nodes,
            ordered_tris,
        );
        let c1 = build(
            triangles,
            split_method,
            max_prims_in_node,
            primitive_info,
            mid,
            end,
            total_nodes,
            ordered_tris,
        );
        Box::new(BVHBuildNode::new_interior_node(dim, c0, c1))
    } else {
        // Create leaf BVHBuildNode.
        let first_prim_offset = ordered_tris.len();
        for info in primitive_info.iter().take(end).skip(start) {
            ordered_tris.push(triangles[info.primitive_number]);
        }
        Box::new(BVHBuildNode::new_leaf_node(first_prim_offset, n_primitives, bounds))
    }
}

/// Returns the SAH bucket of a centroid.
///
/// * `centroid`        - The centroid.
/// * `centroid_bounds` - Bounding box of the centroids in the node.
/// * `dim`             - Axis used to partition triangles.
#[inline]
fn bucket_index(centroid: &Point3f, centroid_bounds: &Bounds3f, dim: Axis) -> usize {
    let b = (N_BUCKETS as Float * centroid_bounds.offset(centroid)[dim]) as usize;
    if b >= N_BUCKETS {
        N_BUCKETS - 1
    } else {
        b
    }
}

/// Bounding Volume Hierarchy using splitting planes that are midpoint of
/// each region of space.
///
/// * `primitive_info`  - Slice containing all triangle info.
/// * `start`           - Starting index in primitive_info.
/// * `end`             - Ending index + 1 in primitive_info.
/// * `dim`             - Axis used to partition triangles.
/// * `centroid_bounds` - Bounding box of triangle centroids in primitive_info
///                       from start to end.
fn split_middle(
    primitive_info: &mut [BVHPrimitiveInfo],
    start: usize,
    end: usize,
    dim: Axis,
    centroid_bounds: &Bounds3f,
) -> usize {
    let pmid = (centroid_bounds.p_min[dim] + centroid_bounds.p_max[dim]) / 2.0;
    let infos = primitive_info[start..end].iter_mut();
    let split = itertools::partition(infos, |pi| pi.centroid[dim] < pmid);
    let mid = start + split;

    if mid != start && mid != end {
        mid
    } else {
        // Lots of triangles with large overlapping bounding boxes may fail
        // to partition; fall back to EqualCounts.
        split_equal_counts(primitive_info, start, end, dim)
    }
}

/// Partition triangles into equally sized subsets such that the first half
/// have the smallest centroid coordinate values along the chosen axis, and
/// the second half have the largest centroid coordinate values.
///
/// * `primitive_info`  - Slice containing all triangle info.
/// * `start`           - Starting index in primitive_info.
/// * `end`             - Ending index + 1 in primitive_info.
/// * `dim`             - Axis used to partition triangles.
fn split_equal_counts(
    primitive_info: &mut [BVHPrimitiveInfo],
    start: usize,
    end: usize,
    dim: Axis,
) -> usize {
    let mid = (start + end) / 2;

    kth_element_by(primitive_info, start, mid, end, |a, b| {
        a.centroid[dim]
            .partial_cmp(&b.centroid[dim])
            .unwrap_or(Ordering::Equal)
    });

    mid
}

/// Partition a subset of items between start and end such that the k^th
/// element is in its sorted position with smaller elements before it and
/// larger elements after it; the k^th element is returned.
///
/// * `v`     - Slice to partition.
/// * `start` - Starting index.
/// * `k`     - Index of the element to place.
/// * `end`   - Ending index + 1.
/// * `f`     - Comparison used for partitioning.
fn kth_element_by<F, T>(v: &mut [T], start: usize, k: usize, end: usize, f: F) -> Option<T>
where
    F: Fn(&T, &T) -> Ordering,
    T: Copy,
{
    if start >= end || end > v.len() || k < start || k >= end {
        return None;
    }

    let w = &mut v[start..end];
    let i = *kth_by(w, k - start, |x, y| f(x, y));

    Some(i)
}

/// Partition triangles using Surface Area Heuristic.
///
/// If the algorithm is able to partition triangles it will return the pivot
/// index (mid) for interior node creation; otherwise None is returned to
/// indicate leaf node creation.
///
/// * `primitive_info`    - Slice containing all triangle info.
/// * `start`             - Start index in primitive_info.
/// * `end`               - End index in primitive_info.
/// * `n_primitives`      - Number of triangles between start and end.
/// * `dim`               - Axis used to partition triangles.
/// * `centroid_bounds`   - Bounding box of triangle centroids in primitive_info
///                         from start to end.
/// * `bounds`            - Bound box of all triangles in BVH node.
/// * `max_prims_in_node` - Maximum triangles allowed in node.
#[allow(clippy::too_many_arguments)]
fn split_sah(
    primitive_info: &mut [BVHPrimitiveInfo],
    start: usize,
    end: usize,
    n_primitives: usize,
    dim: Axis,
    centroid_bounds: &Bounds3f,
    bounds: &Bounds3f,
    max_prims_in_node: u8,
) -> Option<usize> {
    // Partition triangles using approximate SAH.
    if n_primitives <= 2 {
        // Partition triangles into equally-sized subsets.
        return Some(split_equal_counts(primitive_info, start, end, dim));
    }

    // Initialize BucketInfo for SAH partition buckets.
    let mut buckets = [BucketInfo::default(); N_BUCKETS];
    for info in primitive_info.iter().take(end).skip(start) {
        let b = bucket_index(&info.centroid, centroid_bounds, dim);
        buckets[b].count += 1;
        buckets[b].bounds = buckets[b].bounds.union(&info.bounds);
    }

    // Compute costs for splitting after each bucket.
    let mut cost = [0.0 as Float; N_BUCKETS - 1];
    for (i, cost_i) in cost.iter_mut().enumerate() {
        let (mut b0, mut b1) = (Bounds3f::EMPTY, Bounds3f::EMPTY);
        let (mut count0, mut count1) = (0, 0);

        for bucket in buckets.iter().take(i + 1) {
            b0 = b0.union(&bucket.bounds);
            count0 += bucket.count;
        }

        for bucket in buckets.iter().skip(i + 1) {
            b1 = b1.union(&bucket.bounds);
            count1 += bucket.count;
        }

        let area0 = if count0 > 0 { b0.surface_area() } else { 0.0 };
        let area1 = if count1 > 0 { b1.surface_area() } else { 0.0 };
        *cost_i = 1.0 + (count0 as Float * area0 + count1 as Float * area1) / bounds.surface_area();
    }

    // Find bucket to split at that minimizes SAH metric.
    let mut min_cost = cost[0];
    let mut min_cost_split_bucket = 0;
    for (i, cost_i) in cost.iter().enumerate().skip(1) {
        if *cost_i < min_cost {
            min_cost = *cost_i;
            min_cost_split_bucket = i;
        }
    }

    // Either create leaf or split triangles at selected SAH bucket.
    let leaf_cost = n_primitives as Float;
    if n_primitives > max_prims_in_node as usize || min_cost < leaf_cost {
        let infos = primitive_info[start..end].iter_mut();
        let split = itertools::partition(infos, |pi| {
            bucket_index(&pi.centroid, centroid_bounds, dim) <= min_cost_split_bucket
        });
        let mid = start + split;
        if mid != start && mid != end {
            Some(mid)
        } else {
            Some(split_equal_counts(primitive_info, start, end, dim))
        }
    } else {
        // No split occurred. Indicate creation of leaf node.
        None
    }
}
