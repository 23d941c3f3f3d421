use super::random_aabbs;
use aabbtree3d::bounding_volume::BoundingVolume;
use aabbtree3d::math::Vector;
use aabbtree3d::partitioning::{AabbSliceBuilder, AabbTree, AabbTreeUpdateMap};
use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn shifting_toward_the_data_keeps_the_tree_conservative() {
    let mut rng = StdRng::seed_from_u64(300);
    let offset = Vector::new(10_000.0, -12_000.0, 8_000.0);
    let aabbs: Vec<_> = random_aabbs(&mut rng, 500, 50.0)
        .into_iter()
        .map(|aabb| aabb.translated(&offset))
        .collect();

    let mut tree = AabbTree::new();
    tree.build(&AabbSliceBuilder::new(&aabbs)).unwrap();
    let original = tree.clone();

    tree.shift_origin(&offset);
    let shifted: Vec<_> = aabbs.iter().map(|aabb| aabb.translated(&-offset)).collect();
    tree.assert_well_formed(&shifted);

    for (node, before) in tree.nodes().iter().zip(original.nodes()) {
        assert_eq!(node.data(), before.data());
        assert_eq!(node.parent_index(), before.parent_index());
        assert_eq!(node.bounds().extent_codes(), before.bounds().extent_codes());
        assert_eq!(node.bounds().scale, before.bounds().scale);
        assert_relative_eq!(node.center(), before.center() - offset, epsilon = 0.1);
    }

    let root = tree.root_aabb().unwrap();
    assert!(shifted.iter().all(|aabb| root.contains(aabb)));
}

#[test]
fn refit_after_shift_uses_the_new_origin() {
    let mut rng = StdRng::seed_from_u64(301);
    let offset = Vector::new(-500.0, 250.0, 1000.0);
    let aabbs: Vec<_> = random_aabbs(&mut rng, 200, 20.0)
        .into_iter()
        .map(|aabb| aabb.translated(&offset))
        .collect();
    let mut tree = AabbTree::new();
    tree.build(&AabbSliceBuilder::new(&aabbs)).unwrap();
    let map = AabbTreeUpdateMap::from_tree(&tree);

    tree.shift_origin(&offset);
    let mut shifted: Vec<_> = aabbs.iter().map(|aabb| aabb.translated(&-offset)).collect();
    shifted[10] = shifted[10].translated(&Vector::new(2.0, 0.0, 0.0));

    assert!(tree.mark_primitive_for_refit(&map, 10));
    assert!(tree.refit_marked(&shifted) > 0);
    tree.assert_well_formed(&shifted);
}

#[test]
fn shifting_a_progressive_build() {
    let mut rng = StdRng::seed_from_u64(302);
    let offset = Vector::new(3.0, -4.0, 5.0);
    let aabbs = random_aabbs(&mut rng, 300, 30.0);
    let shifted: Vec<_> = aabbs.iter().map(|aabb| aabb.translated(&-offset)).collect();

    let mut tree = AabbTree::new();
    let builder = AabbSliceBuilder::new(&aabbs);
    assert!(tree.progressive_build(&builder, 50).unwrap() > 0);
    tree.shift_origin(&offset);
    while tree.progressive_build(&builder, 50).unwrap() != 0 {}

    tree.assert_well_formed(&shifted);
}
