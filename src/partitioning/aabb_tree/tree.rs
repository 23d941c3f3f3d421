use crate::bounding_volume::Aabb;
use crate::math::{Real, Vector};
use crate::partitioning::aabb_tree::progressive_build::ProgressiveBuildState;
use crate::partitioning::aabb_tree::refit::REFIT_QUEUE_CAPACITY;
use crate::partitioning::aabb_tree::AabbTreeNode;
use crate::utils::BitArray;
use arrayvec::ArrayVec;
use core::ops::Range;

/// The lifecycle state of an [`AabbTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AabbTreeState {
    /// The tree holds no node.
    Empty,
    /// A progressive build is in progress. Only the build and release operations are valid.
    Building,
    /// The tree is fully built and can be traversed, refitted, and queried.
    Built,
}

/// A bounding-volume hierarchy over 3D AABBs with quantized node bounds.
///
/// The tree doesn’t own its primitives: it references them by id through its index array, a
/// permutation of `0..primitive_count()` where every leaf owns a contiguous range. Nodes are
/// stored in a single pool where the two children of an internal node are always adjacent,
/// and where children always come after their parent.
///
/// The decompressed bounds of every node contain the bounds of every primitive of its subtree,
/// as they were at the last build or refit touching that node.
#[derive(Clone, Debug, Default)]
pub struct AabbTree {
    pub(super) nodes: Vec<AabbTreeNode>,
    pub(super) indices: Vec<u32>,
    pub(super) progressive: Option<ProgressiveBuildState>,
    pub(super) refit_bitmask: BitArray,
    pub(super) refit_queue: ArrayVec<u32, REFIT_QUEUE_CAPACITY>,
    pub(super) refit_queue_overflowed: bool,
    pub(super) refit_highest_marked: Option<u32>,
}

impl AabbTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// The lifecycle state of this tree.
    pub fn state(&self) -> AabbTreeState {
        if self.progressive.is_some() {
            AabbTreeState::Building
        } else if self.nodes.is_empty() {
            AabbTreeState::Empty
        } else {
            AabbTreeState::Built
        }
    }

    /// Is this tree fully built?
    #[inline]
    pub fn is_built(&self) -> bool {
        self.state() == AabbTreeState::Built
    }

    /// Releases all the memory of this tree, cancelling any progressive build.
    pub fn release(&mut self) {
        *self = Self::default();
    }

    /// The node pool. The root, if any, is at index 0.
    ///
    /// Nodes of an unfinished progressive build may not be initialized yet.
    #[inline]
    pub fn nodes(&self) -> &[AabbTreeNode] {
        &self.nodes
    }

    /// The primitive index array referenced by the leaves.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The number of nodes in the pool.
    #[inline]
    pub fn node_count(&self) -> u32 {
        self.nodes.len() as u32
    }

    /// The number of primitives referenced by this tree.
    #[inline]
    pub fn primitive_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// The root of this tree, if it is built.
    #[inline]
    pub fn root(&self) -> Option<&AabbTreeNode> {
        if self.is_built() {
            self.nodes.first()
        } else {
            None
        }
    }

    /// The decompressed bounds of the root, if this tree is built.
    #[inline]
    pub fn root_aabb(&self) -> Option<Aabb> {
        self.root().map(|root| root.aabb())
    }

    /// The node pool as raw bytes, for relocation or serialization.
    #[cfg(feature = "bytemuck-serialize")]
    pub fn nodes_as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    /// The range of the index array covered by the subtree rooted at `node_id`.
    ///
    /// Leaves of a subtree own contiguous ranges laid out from its leftmost (positive-most)
    /// leaf to its rightmost (negative-most) leaf.
    pub fn subtree_primitive_range(&self, node_id: u32) -> Range<usize> {
        let mut first = &self.nodes[node_id as usize];
        while !first.is_leaf() {
            first = first.pos(&self.nodes);
        }

        let mut last = &self.nodes[node_id as usize];
        while !last.is_leaf() {
            last = last.neg(&self.nodes);
        }

        let start = first.primitive_offset() as usize;
        let end = (last.primitive_offset() + last.primitive_count()) as usize;
        start..end
    }

    /// Moves the origin of the space to `shift`: every node center `c` becomes `c - shift`.
    ///
    /// Extent codes and scales are kept as-is, only the centers are re-packed. Primitive bounds
    /// supplied to later refits must be expressed relative to the new origin. A progressive
    /// build in progress is shifted along.
    pub fn shift_origin(&mut self, shift: &Vector<Real>) {
        let translation = -shift;
        for node in &mut self.nodes {
            node.set_bounds(node.bounds().translated(&translation));
        }

        if let Some(progressive) = &mut self.progressive {
            progressive.cache.translate(&translation);
        }

        log::trace!(
            "shifted the origin of an AABB tree with {} nodes by {:?}",
            self.nodes.len(),
            shift
        );
    }

    /// The depth of this tree. A single-leaf tree has depth 1 and an empty tree depth 0.
    pub fn depth(&self) -> u32 {
        let mut depth = 0;
        self.walk_all(|_, node_depth| depth = depth.max(node_depth + 1));
        depth
    }

    /// The heap memory used by this tree, in bytes.
    pub fn heap_memory_size(&self) -> usize {
        self.nodes.capacity() * size_of::<AabbTreeNode>()
            + self.indices.capacity() * size_of::<u32>()
            + self.refit_bitmask.heap_memory_size()
            + self
                .progressive
                .as_ref()
                .map(ProgressiveBuildState::heap_memory_size)
                .unwrap_or(0)
    }

    /// The total memory used by this tree, in bytes.
    pub fn total_memory_size(&self) -> usize {
        size_of::<Self>() + self.heap_memory_size()
    }

    /// Resets the refit bookkeeping to match a freshly built pool.
    pub(super) fn finish_build(&mut self) {
        self.refit_bitmask.resize_and_clear(self.nodes.len() as u32);
        self.clear_refit_marks();

        log::debug!(
            "built an AABB tree: {} primitives, {} nodes, depth {}",
            self.indices.len(),
            self.nodes.len(),
            self.depth()
        );
    }
}
