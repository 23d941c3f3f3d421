use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::partitioning::aabb_tree::build::merged_aabb;
use crate::partitioning::aabb_tree::{AabbTree, AabbTreeUpdateMap, CompressedBounds};
use std::collections::{BinaryHeap, HashMap};

/// The number of marked nodes tracked individually before refits fall back to scanning the
/// whole refit bitmask.
pub const REFIT_QUEUE_CAPACITY: usize = 32;

impl AabbTree {
    /// Marks the node at `node_id` as needing a refit.
    ///
    /// Marking a node several times is the same as marking it once. Marks are ignored if the
    /// tree isn’t built.
    pub fn mark_for_refit(&mut self, node_id: u32) {
        if !self.is_built() {
            log::warn!("ignoring a refit mark on an AABB tree that is not built");
            return;
        }

        assert!(node_id < self.node_count(), "node {node_id} is out of bounds");

        if self.refit_bitmask.is_set(node_id) {
            return;
        }

        self.refit_bitmask.set(node_id);
        self.refit_highest_marked = Some(
            self.refit_highest_marked
                .map_or(node_id, |highest| highest.max(node_id)),
        );

        if !self.refit_queue_overflowed && self.refit_queue.try_push(node_id).is_err() {
            log::debug!(
                "more than {REFIT_QUEUE_CAPACITY} nodes marked for refit, falling back to a bitmask scan"
            );
            self.refit_queue_overflowed = true;
        }
    }

    /// Marks the leaf holding `primitive` as needing a refit.
    ///
    /// Returns `false` if the map doesn’t know that primitive.
    pub fn mark_primitive_for_refit(&mut self, map: &AabbTreeUpdateMap, primitive: u32) -> bool {
        match map.leaf(primitive) {
            Some(leaf) => {
                self.mark_for_refit(leaf);
                true
            }
            None => false,
        }
    }

    /// Is the node at `node_id` currently marked for refit?
    pub fn is_marked_for_refit(&self, node_id: u32) -> bool {
        node_id < self.refit_bitmask.len() && self.refit_bitmask.is_set(node_id)
    }

    /// Recomputes the bounds of every marked node, and of the ancestors that need it, from the
    /// current primitive bounds `aabbs`, indexed by primitive id.
    ///
    /// Nodes are processed from the highest pool index down, so children are always refitted
    /// before their parent. Leaves merge the bounds of their primitives. Internal nodes merge
    /// the bounds computed for their children during this refit, or the decompressed bounds of
    /// children that weren’t refitted, so only the touched nodes and their siblings are read.
    /// Use [`AabbTree::full_refit`] to recompute exact bounds everywhere.
    ///
    /// A node whose compressed bounds changed marks its parent. A node
    /// whose compressed bounds didn’t change stops the propagation, unless one of its ancestors
    /// doesn’t contain its recomputed bounds anymore: that ancestor is marked instead.
    ///
    /// Returns the number of nodes recomputed. All marks are cleared afterwards.
    pub fn refit_marked(&mut self, aabbs: &[Aabb]) -> usize {
        let Some(highest) = self.refit_highest_marked.take() else {
            return 0;
        };

        let mut num_refitted = 0;
        let mut refitted = HashMap::new();

        if self.refit_queue_overflowed {
            let mut cursor = highest;
            while let Some(node_id) = self.refit_bitmask.last_set_at_or_below(cursor) {
                self.refit_bitmask.reset(node_id);
                num_refitted += 1;

                // Ancestors have lower indices, they will be reached by the scan.
                if let Some(ancestor) = self.refit_node(node_id, aabbs, &mut refitted) {
                    self.refit_bitmask.set(ancestor);
                }

                match node_id.checked_sub(1) {
                    Some(next) => cursor = next,
                    None => break,
                }
            }
        } else {
            let mut queue: BinaryHeap<u32> = self.refit_queue.iter().copied().collect();
            while let Some(node_id) = queue.pop() {
                if !self.refit_bitmask.is_set(node_id) {
                    continue;
                }

                self.refit_bitmask.reset(node_id);
                num_refitted += 1;

                if let Some(ancestor) = self.refit_node(node_id, aabbs, &mut refitted) {
                    if !self.refit_bitmask.is_set(ancestor) {
                        self.refit_bitmask.set(ancestor);
                        queue.push(ancestor);
                    }
                }
            }
        }

        self.clear_refit_marks();
        log::trace!("refitted {num_refitted} AABB tree nodes");
        num_refitted
    }

    /// Recomputes the bounds of every node from the current primitive bounds `aabbs`, in a
    /// single bottom-up pass.
    ///
    /// Every node ends up with the compression of the exact union of its subtree. Pending
    /// refit marks are cleared.
    pub fn full_refit(&mut self, aabbs: &[Aabb]) {
        if !self.is_built() {
            return;
        }

        let mut exact = vec![Aabb::new_invalid(); self.nodes.len()];
        for node_id in (0..self.nodes.len()).rev() {
            let node = self.nodes[node_id];
            let aabb = if node.is_leaf() {
                merged_aabb(aabbs, node.primitives(&self.indices))
            } else {
                let pos = node.pos_index() as usize;
                exact[pos].merged(&exact[pos + 1])
            };

            self.nodes[node_id].compress(&aabb);
            exact[node_id] = aabb;
        }

        self.clear_refit_marks();
        log::trace!("fully refitted {} AABB tree nodes", self.nodes.len());
    }

    /// Recomputes the bounds of a single node and returns the ancestor that must be refitted
    /// next, if any.
    ///
    /// `refitted` holds the uncompressed bounds computed so far during this refit, by node.
    fn refit_node(
        &mut self,
        node_id: u32,
        aabbs: &[Aabb],
        refitted: &mut HashMap<u32, Aabb>,
    ) -> Option<u32> {
        let node = self.nodes[node_id as usize];
        let aabb = if node.is_leaf() {
            merged_aabb(aabbs, node.primitives(&self.indices))
        } else {
            let pos = node.pos_index();
            let pos_aabb = self.refitted_child_aabb(pos, refitted);
            pos_aabb.merged(&self.refitted_child_aabb(pos + 1, refitted))
        };
        let _ = refitted.insert(node_id, aabb);
        let bounds = CompressedBounds::new(&aabb);

        let node = &mut self.nodes[node_id as usize];
        let changed = node.bounds() != bounds;
        node.set_bounds(bounds);

        if node_id == 0 {
            return None;
        }

        let parent = node.parent_index();
        if changed {
            return Some(parent);
        }

        let mut ancestor = parent;
        loop {
            if !self.nodes[ancestor as usize].aabb().contains(&aabb) {
                return Some(ancestor);
            }

            if ancestor == 0 {
                return None;
            }

            ancestor = self.nodes[ancestor as usize].parent_index();
        }
    }

    fn refitted_child_aabb(&self, child: u32, refitted: &mut HashMap<u32, Aabb>) -> Aabb {
        refitted
            .remove(&child)
            .unwrap_or_else(|| self.nodes[child as usize].aabb())
    }

    pub(super) fn clear_refit_marks(&mut self) {
        self.refit_bitmask.clear_all();
        self.refit_queue.clear();
        self.refit_queue_overflowed = false;
        self.refit_highest_marked = None;
    }
}
