use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Real, Vector};
use crate::partitioning::aabb_tree::{
    AabbTree, AabbTreeBuilder, AabbTreeError, AabbTreeNode, MAX_LEAF_PRIMITIVES, MAX_PRIMITIVES,
};
use core::ops::Range;

/// The primitive bounds of a build, queried once from the builder.
#[derive(Clone, Debug)]
pub(super) struct BuildCache {
    pub(super) aabbs: Vec<Aabb>,
    pub(super) leaf_limit: u32,
}

impl BuildCache {
    #[inline]
    pub(super) fn primitive_count(&self) -> u32 {
        self.aabbs.len() as u32
    }

    pub(super) fn translate(&mut self, translation: &Vector<Real>) {
        for aabb in &mut self.aabbs {
            *aabb = aabb.translated(translation);
        }
    }

    pub(super) fn heap_memory_size(&self) -> usize {
        self.aabbs.capacity() * size_of::<Aabb>()
    }
}

/// A subtree that still needs to be split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct BuildTask {
    pub(super) node: u32,
    pub(super) range: Range<u32>,
}

impl BuildTask {
    #[inline]
    pub(super) fn primitive_count(&self) -> u32 {
        self.range.end - self.range.start
    }
}

/// The union of the bounds of `primitives`.
pub(super) fn merged_aabb(aabbs: &[Aabb], primitives: &[u32]) -> Aabb {
    primitives
        .iter()
        .fold(Aabb::new_invalid(), |acc, id| acc.merged(&aabbs[*id as usize]))
}

/// Computes the bounds of the node described by `task` and either turns it into a leaf, or
/// splits its primitives in two and allocates its children at the end of the pool.
///
/// The split is made at the center of the node bounds, along their longest axis. Primitives
/// whose center lie strictly below the split value go to the positive child. If a side ends up
/// empty, the range is split at its middle instead.
pub(super) fn split_node(
    nodes: &mut Vec<AabbTreeNode>,
    indices: &mut [u32],
    cache: &BuildCache,
    task: BuildTask,
) -> Option<[BuildTask; 2]> {
    let primitives = &mut indices[task.range.start as usize..task.range.end as usize];
    let aabb = merged_aabb(&cache.aabbs, primitives);
    let node_id = task.node as usize;
    nodes[node_id].compress(&aabb);

    let count = task.primitive_count();
    if count <= cache.leaf_limit {
        nodes[node_id].set_leaf(task.range.start, count);
        return None;
    }

    let axis = aabb.extents().imax();
    let split_value = aabb.center()[axis];
    let mut num_pos = 0;

    for i in 0..primitives.len() {
        if cache.aabbs[primitives[i] as usize].center()[axis] < split_value {
            primitives.swap(i, num_pos);
            num_pos += 1;
        }
    }

    let mut num_pos = num_pos as u32;
    if num_pos == 0 || num_pos == count {
        num_pos = count / 2;
    }

    let first_child = nodes.len() as u32;
    nodes.push(AabbTreeNode::with_parent(task.node));
    nodes.push(AabbTreeNode::with_parent(task.node));
    nodes[node_id].set_internal(first_child);

    let mid = task.range.start + num_pos;
    Some([
        BuildTask {
            node: first_child,
            range: task.range.start..mid,
        },
        BuildTask {
            node: first_child + 1,
            range: mid..task.range.end,
        },
    ])
}

impl AabbTree {
    /// Builds this tree from scratch over the primitives of `builder`.
    ///
    /// Any previous content, including an unfinished progressive build, is released first.
    /// With zero primitives the tree stays empty. On error the tree is left empty.
    ///
    /// The resulting node pool is identical to the one produced by
    /// [`AabbTree::progressive_build`] for the same builder.
    pub fn build(&mut self, builder: &impl AabbTreeBuilder) -> Result<(), AabbTreeError> {
        let Some(cache) = self.prepare_build(builder)? else {
            return Ok(());
        };

        self.build_recursive(
            &cache,
            BuildTask {
                node: 0,
                range: 0..cache.primitive_count(),
            },
        );
        self.finish_build();
        Ok(())
    }

    fn build_recursive(&mut self, cache: &BuildCache, task: BuildTask) {
        if let Some([pos, neg]) = split_node(&mut self.nodes, &mut self.indices, cache, task) {
            self.build_recursive(cache, pos);
            self.build_recursive(cache, neg);
        }
    }

    /// Releases this tree, validates the builder, and allocates the storage of a new build.
    ///
    /// Returns `None` if the builder has no primitive. Otherwise the index array holds the
    /// identity permutation and the pool holds an uninitialized root.
    pub(super) fn prepare_build(
        &mut self,
        builder: &impl AabbTreeBuilder,
    ) -> Result<Option<BuildCache>, AabbTreeError> {
        self.release();

        let count = builder.primitive_count();
        let leaf_limit = builder.leaf_limit();

        if leaf_limit == 0 || leaf_limit > MAX_LEAF_PRIMITIVES {
            log::warn!("rejecting an AABB tree build with a leaf limit of {leaf_limit}");
            return Err(AabbTreeError::InvalidLeafLimit { limit: leaf_limit });
        }

        if count > MAX_PRIMITIVES {
            log::warn!("rejecting an AABB tree build over {count} primitives");
            return Err(AabbTreeError::TooManyPrimitives { count });
        }

        if count == 0 {
            return Ok(None);
        }

        match self.allocate_build_storage(builder, count, leaf_limit) {
            Ok(cache) => Ok(Some(cache)),
            Err(err) => {
                log::warn!("{err}");
                self.release();
                Err(err)
            }
        }
    }

    fn allocate_build_storage(
        &mut self,
        builder: &impl AabbTreeBuilder,
        count: u32,
        leaf_limit: u32,
    ) -> Result<BuildCache, AabbTreeError> {
        let allocation_failed = |_| AabbTreeError::AllocationFailed { primitives: count };
        let node_capacity = 2 * count as usize - 1;

        self.nodes
            .try_reserve_exact(node_capacity)
            .map_err(allocation_failed)?;
        self.indices
            .try_reserve_exact(count as usize)
            .map_err(allocation_failed)?;

        let mut aabbs = Vec::new();
        aabbs
            .try_reserve_exact(count as usize)
            .map_err(allocation_failed)?;
        aabbs.extend((0..count).map(|id| builder.primitive_aabb(id)));

        self.indices.extend(0..count);
        self.nodes.push(AabbTreeNode::with_parent(0));

        Ok(BuildCache { aabbs, leaf_limit })
    }
}
