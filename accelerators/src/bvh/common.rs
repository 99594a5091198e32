//! BVH Common

use lumen_core::geometry::*;
use lumen_core::math::*;

/// Splitting method to use to subdivide triangles.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SplitMethod {
    /// Surface Area Heuristic.
    SAH,

    /// Splitting planes at the midpoint of the centroid bounds.
    Middle,

    /// Partition triangles into equally sized subsets such that the first half
    /// have the smallest centroid coordinate values along the chosen axis.
    EqualCounts,
}

impl SplitMethod {
    /// Parse a split method name; unknown names fall back to SAH.
    ///
    /// * `name` - One of `sah`, `middle` or `equal`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "sah" => SplitMethod::SAH,
            "middle" => SplitMethod::Middle,
            "equal" => SplitMethod::EqualCounts,
            sm => {
                warn!("BVH split method '{}' unknown.  Using 'sah'.", sm);
                SplitMethod::SAH
            }
        }
    }
}

/// SAH bucket information.
#[derive(Copy, Clone, Debug)]
pub struct BucketInfo {
    /// Count of triangles.
    pub count: usize,

    /// Bounding box for the bucket.
    pub bounds: Bounds3f,
}

impl Default for BucketInfo {
    /// Returns the "default value" for `BucketInfo`.
    fn default() -> Self {
        Self {
            count: 0,
            bounds: Bounds3f::EMPTY,
        }
    }
}

/// Stores information about a triangle.
#[derive(Copy, Clone, Debug)]
pub struct BVHPrimitiveInfo {
    /// Index in the triangle list collected at build time.
    pub primitive_number: usize,

    /// The bounding box of the triangle.
    pub bounds: Bounds3f,

    /// The centroid of the bounding box.
    pub centroid: Point3f,
}

impl BVHPrimitiveInfo {
    /// Create a `BVHPrimitiveInfo`.
    ///
    /// * `primitive_number` - Index in the triangle list.
    /// * `bounds`           - The bounding box of the triangle.
    pub fn new(primitive_number: usize, bounds: Bounds3f) -> Self {
        Self {
            primitive_number,
            bounds,
            centroid: bounds.centroid(),
        }
    }
}

/// A node of the Bounding Volume Hierarchy during construction.
#[derive(Clone)]
pub struct BVHBuildNode {
    /// Bounding box of all children beneath this node.
    pub bounds: Bounds3f,

    /// Children of this node.
    pub children: [Option<Box<BVHBuildNode>>; 2],

    /// Coordinate axis along which triangles are partitioned between the
    /// two children.
    pub split_axis: Axis,

    /// Index of the first triangle stored at this node.
    pub first_prim_offset: usize,

    /// Number of triangles stored at this node. Zero for interior nodes.
    pub n_primitives: usize,
}

impl BVHBuildNode {
    /// Create a leaf BVH node.
    ///
    /// * `first`  - Index of the first triangle stored at this node.
    /// * `n`      - Number of triangles stored at this node.
    /// * `bounds` - Bounding box.
    pub fn new_leaf_node(first: usize, n: usize, bounds: Bounds3f) -> Self {
        Self {
            first_prim_offset: first,
            n_primitives: n,
            bounds,
            children: [None, None],
            split_axis: Axis::default(),
        }
    }

    /// Create an interior BVH node.
    ///
    /// * `axis` - Axis used for partitioning children.
    /// * `c0`   - First child.
    /// * `c1`   - Second child.
    pub fn new_interior_node(axis: Axis, c0: Box<BVHBuildNode>, c1: Box<BVHBuildNode>) -> Self {
        Self {
            first_prim_offset: 0,
            n_primitives: 0,
            bounds: c0.bounds.union(&c1.bounds),
            children: [Some(c0), Some(c1)],
            split_axis: axis,
        }
    }
}

/// Stores information needed to traverse the BVH.
#[derive(Copy, Clone, Debug)]
pub struct LinearBVHNode {
    /// Bounding box for the node.
    pub bounds: Bounds3f,

    /// For leaf nodes, offset for the triangles in the node. For interior nodes, offset to the second child.
    pub offset: u32,

    /// For leaf nodes, the number of triangles in the node. For interior nodes, 0.
    pub n_primitives: u16,

    /// For interior nodes, which coordinate axis was used for partitioning.
    pub axis: u8,

    /// Padding used to align everything to 32 byte total size.
    pub pad: u8,
}

impl Default for LinearBVHNode {
    /// Returns the "default value" for `LinearBVHNode`.
    fn default() -> Self {
        Self {
            bounds: Bounds3f::EMPTY,
            offset: 0,
            n_primitives: 0,
            axis: 0,
            pad: 0,
        }
    }
}

impl LinearBVHNode {
    /// Creates a leaf linear bvh node.
    ///
    /// * `bounds`       - Bounding box for the node.
    /// * `offset`       - Offset for triangles in the node.
    /// * `n_primitives` - Number of triangles in the node.
    pub fn new_leaf_node(bounds: Bounds3f, offset: u32, n_primitives: u16) -> Self {
        Self {
            bounds,
            offset,
            n_primitives,
            axis: 0,
            pad: 0,
        }
    }

    /// Creates an interior linear bvh node.
    ///
    /// * `bounds` - Bounding box for the node.
    /// * `offset` - Offset to the second child.
    /// * `axis`   - Axis used for partitioning.
    pub fn new_interior_node(bounds: Bounds3f, offset: u32, axis: u8) -> Self {
        Self {
            bounds,
            offset,
            axis,
            n_primitives: 0,
            pad: 0,
        }
    }
}
