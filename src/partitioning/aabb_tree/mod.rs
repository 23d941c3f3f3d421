//! A bounding-volume hierarchy with quantized node bounds and incremental refit.

pub use self::builder::{AabbSliceBuilder, AabbTreeBuilder, DEFAULT_LEAF_LIMIT};
pub use self::compression::{
    CompressedBounds, COMPRESSION_EPSILON, EXTENT_CODE_DIVISOR, MAX_COMPRESSED_MAGNITUDE,
};
pub use self::error::AabbTreeError;
pub use self::node::{AabbTreeNode, MAX_LEAF_PRIMITIVES, MAX_PRIMITIVES};
pub use self::refit::REFIT_QUEUE_CAPACITY;
pub use self::tree::{AabbTree, AabbTreeState};
pub use self::update_map::AabbTreeUpdateMap;

mod build;
mod builder;
mod compression;
mod error;
mod node;
mod progressive_build;
mod queries;
mod refit;
mod traversal;
mod tree;
mod update_map;
mod validation;
