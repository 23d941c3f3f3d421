//! Spatial partitioning tools.

pub use self::aabb_tree::{
    AabbSliceBuilder, AabbTree, AabbTreeBuilder, AabbTreeError, AabbTreeNode, AabbTreeState,
    AabbTreeUpdateMap, CompressedBounds,
};

pub mod aabb_tree;
