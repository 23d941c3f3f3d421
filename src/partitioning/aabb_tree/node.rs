use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::partitioning::aabb_tree::CompressedBounds;

/// The maximum number of primitives a single leaf can reference.
pub const MAX_LEAF_PRIMITIVES: u32 = 15;
/// The maximum number of primitives an [`AabbTree`](super::AabbTree) can hold.
pub const MAX_PRIMITIVES: u32 = (1 << 27) - 1;

const LEAF_FLAG: u32 = 0b1;
const LEAF_COUNT_SHIFT: u32 = 1;
const LEAF_COUNT_MASK: u32 = 0b1111;
const LEAF_OFFSET_SHIFT: u32 = 5;
const CHILD_SHIFT: u32 = 1;

/// A node of an [`AabbTree`](super::AabbTree).
///
/// Nodes live in a contiguous pool owned by the tree. Links between nodes are stored as pool
/// indices, which is why the accessors returning other nodes take the pool as argument.
///
/// The `data` word encodes the node kind in its lowest bit:
/// - a leaf stores `1 | count << 1 | offset << 5`, where `offset` is the position of its first
///   primitive in the tree’s index array and `count` is in `1..=15`,
/// - an internal node stores `first_child << 1`. Its two children are always allocated as a
///   pair: the positive child at `first_child` and the negative child at `first_child + 1`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "bytemuck-serialize",
    derive(bytemuck::Pod, bytemuck::Zeroable)
)]
#[repr(C)]
pub struct AabbTreeNode {
    bounds: CompressedBounds,
    data: u32,
    parent: u32,
}

static_assertions::assert_eq_size!(AabbTreeNode, [u32; 6]);

impl AabbTreeNode {
    /// A node with zero data whose parent is at the given index.
    #[inline]
    pub(crate) fn with_parent(parent: u32) -> Self {
        Self {
            parent,
            ..Default::default()
        }
    }

    /// Is this node a leaf?
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.data & LEAF_FLAG != 0
    }

    /// The raw `data` word of this node.
    #[inline]
    pub fn data(&self) -> u32 {
        self.data
    }

    /// Turns this node into a leaf referencing `count` primitives starting at `offset` in the
    /// index array.
    #[inline]
    pub(crate) fn set_leaf(&mut self, offset: u32, count: u32) {
        debug_assert!(count >= 1 && count <= MAX_LEAF_PRIMITIVES);
        debug_assert!(offset <= MAX_PRIMITIVES);
        self.data = LEAF_FLAG | (count << LEAF_COUNT_SHIFT) | (offset << LEAF_OFFSET_SHIFT);
    }

    /// Turns this node into an internal node whose children are at `first_child` and
    /// `first_child + 1`.
    #[inline]
    pub(crate) fn set_internal(&mut self, first_child: u32) {
        debug_assert!(first_child < u32::MAX >> CHILD_SHIFT);
        self.data = first_child << CHILD_SHIFT;
    }

    /// The pool index of the positive child of this internal node.
    #[inline]
    pub fn pos_index(&self) -> u32 {
        debug_assert!(!self.is_leaf());
        self.data >> CHILD_SHIFT
    }

    /// The pool index of the negative child of this internal node.
    #[inline]
    pub fn neg_index(&self) -> u32 {
        self.pos_index() + 1
    }

    /// The positive child of this internal node.
    #[inline]
    pub fn pos<'a>(&self, nodes: &'a [AabbTreeNode]) -> &'a AabbTreeNode {
        &nodes[self.pos_index() as usize]
    }

    /// The negative child of this internal node.
    #[inline]
    pub fn neg<'a>(&self, nodes: &'a [AabbTreeNode]) -> &'a AabbTreeNode {
        &nodes[self.neg_index() as usize]
    }

    /// The pool index of the parent of this node.
    ///
    /// The root is its own parent.
    #[inline]
    pub fn parent_index(&self) -> u32 {
        self.parent
    }

    /// The parent of this node.
    #[inline]
    pub fn parent<'a>(&self, nodes: &'a [AabbTreeNode]) -> &'a AabbTreeNode {
        &nodes[self.parent as usize]
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: u32) {
        self.parent = parent;
    }

    /// The number of primitives referenced by this leaf.
    #[inline]
    pub fn primitive_count(&self) -> u32 {
        debug_assert!(self.is_leaf());
        (self.data >> LEAF_COUNT_SHIFT) & LEAF_COUNT_MASK
    }

    /// The position of the first primitive of this leaf in the tree’s index array.
    #[inline]
    pub fn primitive_offset(&self) -> u32 {
        debug_assert!(self.is_leaf());
        self.data >> LEAF_OFFSET_SHIFT
    }

    /// The primitive ids referenced by this leaf.
    #[inline]
    pub fn primitives<'a>(&self, indices: &'a [u32]) -> &'a [u32] {
        let start = self.primitive_offset() as usize;
        &indices[start..start + self.primitive_count() as usize]
    }

    /// The compressed bounds of this node.
    #[inline]
    pub fn bounds(&self) -> CompressedBounds {
        self.bounds
    }

    /// Overwrites the compressed bounds of this node.
    #[inline]
    pub fn set_bounds(&mut self, bounds: CompressedBounds) {
        self.bounds = bounds;
    }

    /// Computes the compressed form of `aabb` without storing it.
    ///
    /// Use [`Self::set_bounds`] to write it into a node afterwards.
    #[inline]
    pub fn compressed_bounds(aabb: &Aabb) -> CompressedBounds {
        CompressedBounds::new(aabb)
    }

    /// Compresses `aabb` and stores it as the bounds of this node.
    #[inline]
    pub fn compress(&mut self, aabb: &Aabb) {
        self.bounds = CompressedBounds::new(aabb);
    }

    /// The decompressed center of this node.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        self.bounds.center()
    }

    /// The decompressed half-extents of this node.
    #[inline]
    pub fn half_extents(&self) -> Vector<Real> {
        self.bounds.decompress().1
    }

    /// The decompressed bounds of this node.
    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.bounds.aabb()
    }
}
