//! Bounding Volume Hierarchy.

use lumen_core::accel::*;
use lumen_core::geometry::*;
use lumen_core::interaction::*;
use lumen_core::math::*;
use lumen_core::paramset::*;
use lumen_core::primitive::*;

mod common;
mod sah;

pub use common::*;

/// Bounding Volume Hierarchy Accelerator.
#[derive(Clone)]
pub struct BVHAccel {
    /// Maximum number of triangles in a leaf node. **NOTE**: `u8` limits maximum number to 255.
    pub max_prims_in_node: u8,

    /// Spliting method.
    pub split_method: SplitMethod,

    /// Triangles ordered so that each leaf covers a contiguous range.
    triangles: Vec<TriangleRef>,

    /// The list of nodes in depth-first order.
    nodes: Vec<LinearBVHNode>,
}

impl BVHAccel {
    /// Create a new, unbuilt Bounding Volume Hierarchy Accelerator.
    ///
    /// * `max_prims_in_node` - Maximum number of triangles in a node.
    /// * `split_method`      - The splitting method.
    pub fn new(max_prims_in_node: u8, split_method: SplitMethod) -> Self {
        Self {
            max_prims_in_node: max_prims_in_node.max(1),
            split_method,
            triangles: vec![],
            nodes: vec![],
        }
    }

    /// Returns the number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns a bounding box in the world space.
    pub fn world_bound(&self) -> Bounds3f {
        if !self.nodes.is_empty() {
            self.nodes[0].bounds
        } else {
            Bounds3f::EMPTY
        }
    }

    /// Flatten the tree to the linear representation.
    ///
    /// * `node`   - The node.
    /// * `nodes`  - The linear nodes.
    /// * `offset` - Tracks current offset into `nodes`.
    fn flatten_bvh_tree(node: &BVHBuildNode, nodes: &mut Vec<LinearBVHNode>, offset: &mut u32) -> u32 {
        let my_offset = *offset;
        *offset += 1;

        if node.n_primitives > 0 {
            debug_assert!(node.n_primitives < 65536);

            nodes[my_offset as usize] =
                LinearBVHNode::new_leaf_node(node.bounds, node.first_prim_offset as u32, node.n_primitives as u16);
        } else {
            // Create interior flattened BVH nodes.
            if let Some(child) = &node.children[0] {
                // Ignore first child offset for interior node.
                Self::flatten_bvh_tree(child, nodes, offset);
            }

            if let Some(child) = &node.children[1] {
                let second_child_offset = Self::flatten_bvh_tree(child, nodes, offset);
                nodes[my_offset as usize] =
                    LinearBVHNode::new_interior_node(node.bounds, second_child_offset, node.split_axis.into());
            }
        }

        my_offset
    }
}

impl Accel for BVHAccel {
    /// Build the hierarchy over all triangles of the primitives.
    ///
    /// * `primitives` - Scene primitives.
    fn build(&mut self, primitives: &[Primitive]) -> Result<(), String> {
        self.triangles.clear();
        self.nodes.clear();

        let triangles = collect_triangles(primitives)?;
        let n_triangles = triangles.len();

        // Initializes primitive_info array for triangles.
        let mut primitive_info: Vec<BVHPrimitiveInfo> = triangles
            .iter()
            .enumerate()
            .map(|(i, tri)| BVHPrimitiveInfo::new(i, tri.bounds(primitives)))
            .collect();

        // Build BVH tree for triangles using `primitive_info`.
        let mut total_nodes = 0;
        let mut ordered_tris = Vec::with_capacity(n_triangles);
        let root = sah::build(
            &triangles,
            self.split_method,
            self.max_prims_in_node,
            &mut primitive_info,
            0,
            n_triangles,
            &mut total_nodes,
            &mut ordered_tris,
        );

        info!(
            "BVH ({:?}) created with {} nodes for {} triangles ({:.2} MB)",
            self.split_method,
            total_nodes,
            n_triangles,
            (total_nodes * std::mem::size_of::<LinearBVHNode>()) as f32 / (1024.0 * 1024.0),
        );

        // Compute representation of depth-first traversal of BVH tree.
        let mut nodes = vec![LinearBVHNode::default(); total_nodes];
        let mut offset = 0_u32;
        Self::flatten_bvh_tree(&root, &mut nodes, &mut offset);

        debug_assert!(total_nodes == offset as usize);

        self.triangles = ordered_tris;
        self.nodes = nodes;
        Ok(())
    }

    /// Returns the closest hit in `(min_t, max_t)`.
    ///
    /// * `primitives` - The primitives passed to `build()`.
    /// * `ray`        - The ray.
    /// * `min_t`      - Lower distance bound.
    /// * `max_t`      - Upper distance bound.
    fn intersect<'a>(
        &self,
        primitives: &'a [Primitive],
        ray: &Ray,
        min_t: Float,
        max_t: Float,
    ) -> Option<Intersection<'a>> {
        if self.nodes.is_empty() || !is_traceable(ray) {
            return None;
        }

        let inv_dir = ray.inv_dir();
        let dir_is_neg = ray.dir_is_neg();
        let mut closest = ClosestHit::new(max_t);

        // Follow ray through BVH nodes to find triangle intersections.
        let mut current_node_index = 0;
        let mut nodes_to_visit: Vec<usize> = Vec::with_capacity(64);

        loop {
            // Check ray against BVH node.
            let node = &self.nodes[current_node_index];
            if node.bounds.intersect_p_inv(ray, &inv_dir, dir_is_neg, min_t, closest.bound()) {
                if node.n_primitives > 0 {
                    // Intersect ray with triangles in leaf BVH node.
                    let first = node.offset as usize;
                    for tri in &self.triangles[first..first + node.n_primitives as usize] {
                        closest.test(tri, primitives, ray, min_t);
                    }
                    match nodes_to_visit.pop() {
                        Some(next) => current_node_index = next,
                        None => break,
                    }
                } else if dir_is_neg[node.axis as usize] == 1 {
                    // Put far BVH node on nodes_to_visit stack, advance to near node.
                    nodes_to_visit.push(current_node_index + 1);
                    current_node_index = node.offset as usize;
                } else {
                    nodes_to_visit.push(node.offset as usize);
                    current_node_index += 1;
                }
            } else {
                match nodes_to_visit.pop() {
                    Some(next) => current_node_index = next,
                    None => break,
                }
            }
        }

        closest.into_intersection(primitives)
    }
}

impl From<&ParamSet> for BVHAccel {
    /// Create a `BVHAccel` from given parameter set.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        let split_method_name = params.find_one_string("splitmethod", String::from("sah"));
        let split_method = SplitMethod::from_name(&split_method_name);

        let max_prims = params.find_one_int("maxnodeprims", 4);
        let max_prims_in_node = clamp(max_prims, 1, 255) as u8;
        if max_prims_in_node as Int != max_prims {
            warn!("BVH maxnodeprims {} out of range; using {}.", max_prims, max_prims_in_node);
        }
        Self::new(max_prims_in_node, split_method)
    }
}

/// Factory for `accel::bvh`.
///
/// * `params` - Parameter set.
pub fn create_bvh_accel(params: &ParamSet) -> Result<Box<dyn Accel>, String> {
    Ok(Box::new(BVHAccel::from(params)))
}
