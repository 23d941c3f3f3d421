use crate::partitioning::aabb_tree::AabbTree;

const NO_LEAF: u32 = u32::MAX;

/// Maps each primitive of an [`AabbTree`] to the leaf referencing it.
///
/// Used to turn a set of moved primitives into refit marks with
/// [`AabbTree::mark_primitive_for_refit`]. The map must be re-initialized after every build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct AabbTreeUpdateMap {
    leaves: Vec<u32>,
}

impl AabbTreeUpdateMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// A map initialized from `tree`.
    pub fn from_tree(tree: &AabbTree) -> Self {
        let mut result = Self::new();
        result.initialize(tree);
        result
    }

    /// Rebuilds this map from the leaves of `tree`.
    ///
    /// The map ends up empty if `tree` isn’t built.
    pub fn initialize(&mut self, tree: &AabbTree) {
        self.leaves.clear();
        if !tree.is_built() {
            return;
        }

        self.leaves.resize(tree.primitive_count() as usize, NO_LEAF);
        for (node_id, node) in tree.nodes().iter().enumerate() {
            if node.is_leaf() {
                for primitive in node.primitives(tree.indices()) {
                    self.leaves[*primitive as usize] = node_id as u32;
                }
            }
        }
    }

    /// The pool index of the leaf referencing `primitive`.
    pub fn leaf(&self, primitive: u32) -> Option<u32> {
        self.leaves
            .get(primitive as usize)
            .copied()
            .filter(|leaf| *leaf != NO_LEAF)
    }

    /// Forgets the leaf of `primitive`, typically after it was removed from the scene.
    pub fn invalidate(&mut self, primitive: u32) {
        if let Some(leaf) = self.leaves.get_mut(primitive as usize) {
            *leaf = NO_LEAF;
        }
    }

    /// The number of primitives covered by this map.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Does this map cover no primitive?
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Releases the memory of this map.
    pub fn release(&mut self) {
        self.leaves = Vec::new();
    }
}
