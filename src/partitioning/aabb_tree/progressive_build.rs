use crate::partitioning::aabb_tree::build::{split_node, BuildCache, BuildTask};
use crate::partitioning::aabb_tree::{AabbTree, AabbTreeBuilder, AabbTreeError};
use std::collections::VecDeque;

/// The state of an unfinished progressive build.
#[derive(Clone, Debug)]
pub(super) struct ProgressiveBuildState {
    pub(super) cache: BuildCache,
    tasks: VecDeque<BuildTask>,
    processed_nodes: u32,
}

impl ProgressiveBuildState {
    fn new(cache: BuildCache) -> Self {
        let count = cache.primitive_count();
        let mut tasks = VecDeque::new();
        tasks.push_back(BuildTask {
            node: 0,
            range: 0..count,
        });

        Self {
            cache,
            tasks,
            processed_nodes: 0,
        }
    }

    /// An upper bound on the `limit` a single call needs to finish this build.
    ///
    /// A build over `n` primitives emits at most `2 * n - 1` nodes, and each unit of `limit`
    /// pays for two of them.
    fn remaining_work(&self) -> u32 {
        (2 * self.cache.primitive_count() - self.processed_nodes) / 2
    }

    pub(super) fn heap_memory_size(&self) -> usize {
        self.cache.heap_memory_size() + self.tasks.capacity() * size_of::<BuildTask>()
    }
}

impl AabbTree {
    /// Performs a bounded amount of work toward building this tree.
    ///
    /// The first call (from the empty or built state) starts a new build, any later call
    /// continues it. Each call emits up to `2 * limit` pending nodes in FIFO order (a `limit` of
    /// zero is treated as one). Since a build over `n` primitives emits at most `2 * n - 1`
    /// nodes, calls whose limits sum to `n` always complete it.
    ///
    /// Returns an upper bound on the `limit` still needed to finish the build in one call, or
    /// `0` once the tree is fully built. This value strictly decreases from one call to the next.
    ///
    /// The builder must report the same primitives on every call of a build. A changed
    /// primitive count is detected and cancels the build.
    ///
    /// Once finished, the node pool is identical to the one produced by [`AabbTree::build`].
    pub fn progressive_build(
        &mut self,
        builder: &impl AabbTreeBuilder,
        limit: u32,
    ) -> Result<u32, AabbTreeError> {
        let mut state = match self.progressive.take() {
            Some(state) => {
                let expected = state.cache.primitive_count();
                let found = builder.primitive_count();
                if found != expected {
                    log::warn!(
                        "cancelling a progressive AABB tree build: primitive count changed from {expected} to {found}"
                    );
                    self.release();
                    return Err(AabbTreeError::PrimitiveCountChanged { expected, found });
                }
                state
            }
            None => match self.prepare_build(builder)? {
                Some(cache) => ProgressiveBuildState::new(cache),
                None => return Ok(0),
            },
        };

        let mut budget = limit.max(1).saturating_mul(2);
        while budget > 0 {
            let Some(task) = state.tasks.pop_front() else {
                break;
            };

            budget -= 1;
            state.processed_nodes += 1;
            if let Some(children) =
                split_node(&mut self.nodes, &mut self.indices, &state.cache, task)
            {
                state.tasks.extend(children);
            }
        }

        if !state.tasks.is_empty() {
            let remaining = state.remaining_work();
            log::trace!(
                "progressive AABB tree build: {} pending nodes, {remaining} work left",
                state.tasks.len()
            );
            self.progressive = Some(state);
            return Ok(remaining);
        }

        if let Err(err) = self.relayout_depth_first() {
            log::warn!("{err}");
            self.release();
            return Err(err);
        }

        self.finish_build();
        Ok(0)
    }

    /// Reorders the node pool so each pair of children is allocated in depth-first order, the
    /// positive subtree first, as the recursive build does.
    ///
    /// Children pairs are allocated breadth-first by the progressive build, which yields the
    /// same subtrees but a different pool order.
    fn relayout_depth_first(&mut self) -> Result<(), AabbTreeError> {
        let old_nodes = core::mem::take(&mut self.nodes);
        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(old_nodes.len())
            .map_err(|_| AabbTreeError::AllocationFailed {
                primitives: self.indices.len() as u32,
            })?;

        nodes.push(old_nodes[0]);
        let mut stack = vec![(0u32, 0u32)];

        while let Some((old_id, new_id)) = stack.pop() {
            let old_node = &old_nodes[old_id as usize];

            // Leaves were copied along with their data when their pair was allocated.
            if old_node.is_leaf() {
                continue;
            }

            let old_pos = old_node.pos_index();
            let first_child = nodes.len() as u32;
            for old_child in [old_pos, old_pos + 1] {
                let mut child = old_nodes[old_child as usize];
                child.set_parent(new_id);
                nodes.push(child);
            }
            nodes[new_id as usize].set_internal(first_child);

            stack.push((old_pos + 1, first_child + 1));
            stack.push((old_pos, first_child));
        }

        self.nodes = nodes;
        Ok(())
    }
}
