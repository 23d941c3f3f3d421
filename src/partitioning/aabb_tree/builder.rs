use crate::bounding_volume::Aabb;

/// The number of primitives per leaf used when a builder doesn’t specify one.
pub const DEFAULT_LEAF_LIMIT: u32 = 4;

/// Trait implemented by primitive sources an [`AabbTree`](super::AabbTree) is built from.
///
/// Primitives are identified by their index in `0..primitive_count()`.
pub trait AabbTreeBuilder {
    /// The number of primitives to insert into the tree.
    fn primitive_count(&self) -> u32;

    /// The bounds of the `primitive`-th primitive.
    ///
    /// Called exactly once per primitive and per build.
    fn primitive_aabb(&self, primitive: u32) -> Aabb;

    /// The maximum number of primitives stored in a single leaf, in `1..=15`.
    fn leaf_limit(&self) -> u32 {
        DEFAULT_LEAF_LIMIT
    }
}

/// A builder reading the primitive bounds from a slice.
#[derive(Copy, Clone, Debug)]
pub struct AabbSliceBuilder<'a> {
    aabbs: &'a [Aabb],
    leaf_limit: u32,
}

impl<'a> AabbSliceBuilder<'a> {
    /// A builder for one primitive per element of `aabbs`, with the default leaf limit.
    pub fn new(aabbs: &'a [Aabb]) -> Self {
        Self {
            aabbs,
            leaf_limit: DEFAULT_LEAF_LIMIT,
        }
    }

    /// Sets the maximum number of primitives per leaf.
    #[must_use]
    pub fn with_leaf_limit(mut self, leaf_limit: u32) -> Self {
        self.leaf_limit = leaf_limit;
        self
    }
}

impl AabbTreeBuilder for AabbSliceBuilder<'_> {
    fn primitive_count(&self) -> u32 {
        // Oversized slices are reported as such and rejected by the build.
        u32::try_from(self.aabbs.len()).unwrap_or(u32::MAX)
    }

    fn primitive_aabb(&self, primitive: u32) -> Aabb {
        self.aabbs[primitive as usize]
    }

    fn leaf_limit(&self) -> u32 {
        self.leaf_limit
    }
}
