use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::partitioning::aabb_tree::build::merged_aabb;
use crate::partitioning::aabb_tree::{AabbTree, AabbTreeState, MAX_LEAF_PRIMITIVES};
use core::ops::Range;

impl AabbTree {
    /// Panics if the structure of this tree is inconsistent, or if a node doesn’t contain the
    /// bounds `aabbs` of the primitives of its subtree.
    ///
    /// This checks that:
    /// - the index array is a permutation of the primitive ids,
    /// - leaf ranges are non-empty, hold at most 15 primitives, and partition the index array,
    /// - children are allocated as pairs after their parent and link back to it,
    /// - every node is reachable from the root exactly once,
    /// - every node’s decompressed bounds contain the exact bounds of its subtree.
    ///
    /// Trees that aren’t built are only checked for emptiness.
    pub fn assert_well_formed(&self, aabbs: &[Aabb]) {
        match self.state() {
            AabbTreeState::Empty => {
                assert!(self.indices.is_empty());
                return;
            }
            AabbTreeState::Building => return,
            AabbTreeState::Built => {}
        }

        let num_primitives = self.indices.len();
        assert_eq!(num_primitives, aabbs.len(), "wrong number of primitive bounds");
        assert!(self.nodes.len() <= 2 * num_primitives - 1, "too many nodes");

        let mut seen = vec![false; num_primitives];
        for primitive in &self.indices {
            let seen = &mut seen[*primitive as usize];
            assert!(!*seen, "primitive {primitive} referenced twice");
            *seen = true;
        }

        assert_eq!(self.nodes[0].parent_index(), 0, "the root must be its own parent");

        let mut visited = vec![false; self.nodes.len()];
        let (range, _) = self.assert_subtree_well_formed(0, aabbs, &mut visited);
        assert_eq!(range, 0..num_primitives as u32, "leaves do not cover all primitives");
        assert!(visited.iter().all(|v| *v), "unreachable nodes in the pool");
    }

    fn assert_subtree_well_formed(
        &self,
        node_id: u32,
        aabbs: &[Aabb],
        visited: &mut [bool],
    ) -> (Range<u32>, Aabb) {
        assert!(!visited[node_id as usize], "node {node_id} reached twice");
        visited[node_id as usize] = true;

        let node = &self.nodes[node_id as usize];
        let (range, exact) = if node.is_leaf() {
            let count = node.primitive_count();
            assert!(count >= 1 && count <= MAX_LEAF_PRIMITIVES, "bad leaf size {count}");
            let start = node.primitive_offset();
            assert!((start + count) as usize <= self.indices.len());
            (
                start..start + count,
                merged_aabb(aabbs, node.primitives(&self.indices)),
            )
        } else {
            let pos = node.pos_index();
            assert!(pos > node_id, "children must be allocated after their parent");
            assert!((pos as usize) + 1 < self.nodes.len(), "child out of bounds");
            assert_eq!(self.nodes[pos as usize].parent_index(), node_id);
            assert_eq!(self.nodes[pos as usize + 1].parent_index(), node_id);

            let (pos_range, pos_aabb) = self.assert_subtree_well_formed(pos, aabbs, visited);
            let (neg_range, neg_aabb) = self.assert_subtree_well_formed(pos + 1, aabbs, visited);
            assert_eq!(pos_range.end, neg_range.start, "non-contiguous subtree ranges");
            (pos_range.start..neg_range.end, pos_aabb.merged(&neg_aabb))
        };

        if exact.is_valid() {
            assert!(
                node.aabb().contains(&exact),
                "node {} with bounds {:?} does not contain {:?}",
                node_id,
                node.aabb(),
                exact
            );
        }

        (range, exact)
    }
}
