use crate::partitioning::aabb_tree::{AabbTree, AabbTreeNode};
use smallvec::SmallVec;

// Enough for balanced trees over hundreds of millions of primitives before spilling.
const TRAVERSAL_STACK_SIZE: usize = 32;

impl AabbTree {
    /// Visits the nodes of this tree in depth-first order, the positive child first.
    ///
    /// The callback receives each node and its depth (zero for the root). Returning `false`
    /// skips the children of that node. Nothing is visited unless the tree is built.
    pub fn walk(&self, mut callback: impl FnMut(&AabbTreeNode, u32) -> bool) {
        if !self.is_built() {
            return;
        }

        let mut stack: SmallVec<[(u32, u32); TRAVERSAL_STACK_SIZE]> = SmallVec::new();
        stack.push((0, 0));

        while let Some((node_id, depth)) = stack.pop() {
            let node = &self.nodes[node_id as usize];

            if callback(node, depth) && !node.is_leaf() {
                stack.push((node.neg_index(), depth + 1));
                stack.push((node.pos_index(), depth + 1));
            }
        }
    }

    /// Visits every node of this tree in depth-first order, the positive child first.
    pub fn walk_all(&self, mut callback: impl FnMut(&AabbTreeNode, u32)) {
        self.walk(|node, depth| {
            callback(node, depth);
            true
        })
    }

    /// Visits every leaf of this tree, in the order of their primitive ranges.
    pub fn leaves(&self, mut callback: impl FnMut(&AabbTreeNode)) {
        self.walk_all(|node, _| {
            if node.is_leaf() {
                callback(node);
            }
        })
    }
}
