use crate::partitioning::aabb_tree::{MAX_LEAF_PRIMITIVES, MAX_PRIMITIVES};

/// Errors that can occur while building an [`AabbTree`](super::AabbTree).
///
/// After any of these errors the tree is left in the empty state.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum AabbTreeError {
    /// The node pool, the index array, or the bounds cache could not be allocated.
    #[error("failed to allocate the storage of an AABB tree with {primitives} primitives")]
    AllocationFailed {
        /// The number of primitives the tree was built for.
        primitives: u32,
    },
    /// The builder reported more primitives than a tree can reference.
    #[error("an AABB tree cannot hold {count} primitives (the maximum is {max})", max = MAX_PRIMITIVES)]
    TooManyPrimitives {
        /// The number of primitives reported by the builder.
        count: u32,
    },
    /// The builder reported a leaf limit outside of `1..=15`.
    #[error("invalid leaf primitive limit {limit}: it must be in 1..={max}", max = MAX_LEAF_PRIMITIVES)]
    InvalidLeafLimit {
        /// The leaf limit reported by the builder.
        limit: u32,
    },
    /// The builder primitive count changed between two steps of a progressive build.
    #[error("the primitive count changed from {expected} to {found} during a progressive build")]
    PrimitiveCountChanged {
        /// The primitive count the build was started with.
        expected: u32,
        /// The primitive count reported by the builder afterwards.
        found: u32,
    },
}
