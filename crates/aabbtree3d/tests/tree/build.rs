use super::random_aabbs;
use aabbtree3d::bounding_volume::{Aabb, BoundingVolume};
use aabbtree3d::math::{Point, Vector};
use aabbtree3d::partitioning::aabb_tree::MAX_LEAF_PRIMITIVES;
use aabbtree3d::partitioning::{AabbSliceBuilder, AabbTree, AabbTreeState};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn empty_builder_yields_empty_tree() {
    let mut tree = AabbTree::new();
    tree.build(&AabbSliceBuilder::new(&[])).unwrap();

    assert_eq!(tree.state(), AabbTreeState::Empty);
    assert!(tree.nodes().is_empty());
    assert!(tree.root_aabb().is_none());
    assert_eq!(tree.depth(), 0);
}

#[test]
fn single_primitive_tree_is_a_leaf() {
    let aabb = Aabb::from_half_extents(Point::new(1.0, 2.0, 3.0), Vector::new(0.5, 1.0, 0.25));
    let mut tree = AabbTree::new();
    tree.build(&AabbSliceBuilder::new(&[aabb])).unwrap();

    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.depth(), 1);
    let root = tree.root().unwrap();
    assert!(root.is_leaf());
    assert_eq!(root.primitives(tree.indices()), &[0]);
    assert!(root.aabb().contains(&aabb));
    tree.assert_well_formed(&[aabb]);
}

#[test]
fn random_scene_builds_well_formed_tree() {
    let mut rng = StdRng::seed_from_u64(0);
    let aabbs = random_aabbs(&mut rng, 1000, 100.0);
    let mut tree = AabbTree::new();
    tree.build(&AabbSliceBuilder::new(&aabbs)).unwrap();

    tree.assert_well_formed(&aabbs);
    assert!(tree.node_count() <= 2 * 1000 - 1);

    let root = tree.root_aabb().unwrap();
    assert!(aabbs.iter().all(|aabb| root.contains(aabb)));

    // Splitting at the center of the node bounds keeps a random scene reasonably balanced.
    assert!(tree.depth() < 30, "depth: {}", tree.depth());
}

#[test]
fn leaves_respect_the_leaf_limit() {
    let mut rng = StdRng::seed_from_u64(1);
    let aabbs = random_aabbs(&mut rng, 500, 50.0);

    for leaf_limit in 1..=MAX_LEAF_PRIMITIVES {
        let mut tree = AabbTree::new();
        let builder = AabbSliceBuilder::new(&aabbs).with_leaf_limit(leaf_limit);
        tree.build(&builder).unwrap();
        tree.assert_well_formed(&aabbs);
        tree.leaves(|leaf| assert!(leaf.primitive_count() <= leaf_limit));
    }
}

#[test]
fn coincident_primitives_still_split() {
    let aabbs = vec![Aabb::from_half_extents(Point::origin(), Vector::repeat(1.0)); 100];
    let mut tree = AabbTree::new();
    tree.build(&AabbSliceBuilder::new(&aabbs)).unwrap();

    tree.assert_well_formed(&aabbs);
    // Middle splits on identical centers give a perfectly balanced tree.
    assert_eq!(tree.depth(), 6);
}

#[test]
fn rebuild_replaces_previous_content() {
    let mut rng = StdRng::seed_from_u64(2);
    let first = random_aabbs(&mut rng, 300, 10.0);
    let second = random_aabbs(&mut rng, 20, 10.0);

    let mut tree = AabbTree::new();
    tree.build(&AabbSliceBuilder::new(&first)).unwrap();
    tree.mark_for_refit(1);
    tree.build(&AabbSliceBuilder::new(&second)).unwrap();

    assert_eq!(tree.primitive_count(), 20);
    assert!(!tree.is_marked_for_refit(1));
    tree.assert_well_formed(&second);

    let mut fresh = AabbTree::new();
    fresh.build(&AabbSliceBuilder::new(&second)).unwrap();
    assert_eq!(tree.nodes(), fresh.nodes());
}

#[test]
fn memory_usage_is_reported() {
    let mut rng = StdRng::seed_from_u64(3);
    let aabbs = random_aabbs(&mut rng, 100, 10.0);
    let mut tree = AabbTree::new();
    let empty_size = tree.total_memory_size();
    tree.build(&AabbSliceBuilder::new(&aabbs)).unwrap();

    assert!(tree.heap_memory_size() >= tree.nodes().len() * 24 + 100 * 4);
    assert_eq!(tree.total_memory_size(), empty_size + tree.heap_memory_size());

    tree.release();
    assert_eq!(tree.state(), AabbTreeState::Empty);
    assert_eq!(tree.total_memory_size(), empty_size);
}

#[cfg(feature = "bytemuck-serialize")]
#[test]
fn node_pool_as_bytes() {
    let mut rng = StdRng::seed_from_u64(4);
    let aabbs = random_aabbs(&mut rng, 64, 10.0);
    let mut tree = AabbTree::new();
    tree.build(&AabbSliceBuilder::new(&aabbs)).unwrap();

    let bytes = tree.nodes_as_bytes();
    assert_eq!(bytes.len(), tree.nodes().len() * 24);
    let nodes: &[aabbtree3d::partitioning::AabbTreeNode] = bytemuck::cast_slice(bytes);
    assert_eq!(nodes, tree.nodes());
}
