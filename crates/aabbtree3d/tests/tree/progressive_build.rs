use super::random_aabbs;
use aabbtree3d::bounding_volume::Aabb;
use aabbtree3d::partitioning::{AabbSliceBuilder, AabbTree, AabbTreeBuilder, AabbTreeState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::Cell;

/// Counts how many times each primitive bounds are queried.
struct CountingBuilder<'a> {
    aabbs: &'a [Aabb],
    queries: Vec<Cell<u32>>,
}

impl AabbTreeBuilder for CountingBuilder<'_> {
    fn primitive_count(&self) -> u32 {
        self.aabbs.len() as u32
    }

    fn primitive_aabb(&self, primitive: u32) -> Aabb {
        let queries = &self.queries[primitive as usize];
        queries.set(queries.get() + 1);
        self.aabbs[primitive as usize]
    }
}

fn build_progressively(tree: &mut AabbTree, builder: &impl AabbTreeBuilder, limit: u32) -> usize {
    let mut calls = 1;
    let mut last_pending = u32::MAX;

    loop {
        let pending = tree.progressive_build(builder, limit).unwrap();
        if pending == 0 {
            return calls;
        }

        assert!(pending < last_pending, "remaining work must shrink on every call");
        last_pending = pending;
        calls += 1;
    }
}

#[test]
fn progressive_build_is_identical_to_build() {
    let mut rng = StdRng::seed_from_u64(100);
    let aabbs = random_aabbs(&mut rng, 1000, 100.0);

    for leaf_limit in [1, 4, 15] {
        let builder = AabbSliceBuilder::new(&aabbs).with_leaf_limit(leaf_limit);
        let mut expected = AabbTree::new();
        expected.build(&builder).unwrap();

        for limit in [1, 10, 77, 1000, 5000] {
            let mut tree = AabbTree::new();
            let _ = build_progressively(&mut tree, &builder, limit);

            assert_eq!(tree.state(), AabbTreeState::Built);
            assert_eq!(tree.nodes(), expected.nodes());
            assert_eq!(tree.indices(), expected.indices());
            tree.assert_well_formed(&aabbs);
        }
    }
}

#[test]
fn limits_summing_to_the_primitive_count_finish_the_build() {
    let mut rng = StdRng::seed_from_u64(105);
    let aabbs = random_aabbs(&mut rng, 1000, 100.0);

    for leaf_limit in [1, 4, 15] {
        let builder = AabbSliceBuilder::new(&aabbs).with_leaf_limit(leaf_limit);
        let mut expected = AabbTree::new();
        expected.build(&builder).unwrap();

        let mut tree = AabbTree::new();
        assert_eq!(tree.progressive_build(&builder, 1000), Ok(0));
        assert_eq!(tree.state(), AabbTreeState::Built);
        assert_eq!(tree.nodes(), expected.nodes());
        assert_eq!(tree.indices(), expected.indices());

        let mut tree = AabbTree::new();
        for call in 1..=10 {
            let remaining = tree.progressive_build(&builder, 100).unwrap();
            assert!(remaining <= 1000 - 100 * call);
            if remaining == 0 {
                break;
            }
            assert_eq!(tree.state(), AabbTreeState::Building);
        }

        assert_eq!(tree.state(), AabbTreeState::Built);
        assert_eq!(tree.nodes(), expected.nodes());
        assert_eq!(tree.indices(), expected.indices());
        tree.assert_well_formed(&aabbs);
    }
}

#[test]
fn larger_limits_take_fewer_calls() {
    let mut rng = StdRng::seed_from_u64(101);
    let aabbs = random_aabbs(&mut rng, 2000, 100.0);
    let builder = AabbSliceBuilder::new(&aabbs);

    let mut tree = AabbTree::new();
    let small_steps = build_progressively(&mut tree, &builder, 16);
    let large_steps = build_progressively(&mut tree, &builder, 4096);
    let single_step = build_progressively(&mut tree, &builder, u32::MAX);

    assert!(small_steps > large_steps);
    assert_eq!(single_step, 1);
}

#[test]
fn primitive_bounds_are_queried_once() {
    let mut rng = StdRng::seed_from_u64(102);
    let aabbs = random_aabbs(&mut rng, 200, 20.0);
    let builder = CountingBuilder {
        aabbs: &aabbs,
        queries: (0..200).map(|_| Cell::new(0)).collect(),
    };

    let mut tree = AabbTree::new();
    let _ = build_progressively(&mut tree, &builder, 8);
    assert!(builder.queries.iter().all(|q| q.get() == 1));

    tree.build(&builder).unwrap();
    assert!(builder.queries.iter().all(|q| q.get() == 2));
}

#[test]
fn build_cancels_progressive_build() {
    let mut rng = StdRng::seed_from_u64(103);
    let aabbs = random_aabbs(&mut rng, 300, 20.0);
    let builder = AabbSliceBuilder::new(&aabbs);

    let mut tree = AabbTree::new();
    assert!(tree.progressive_build(&builder, 5).unwrap() > 0);
    assert_eq!(tree.state(), AabbTreeState::Building);
    assert!(tree.root().is_none());

    // Nodes can't be traversed nor refitted mid-build.
    let mut visited = 0;
    tree.walk_all(|_, _| visited += 1);
    assert_eq!(visited, 0);
    tree.mark_for_refit(0);
    assert_eq!(tree.refit_marked(&aabbs), 0);

    tree.build(&builder).unwrap();
    assert_eq!(tree.state(), AabbTreeState::Built);
    tree.assert_well_formed(&aabbs);
}

#[test]
fn progressive_build_restarts_from_built_tree() {
    let mut rng = StdRng::seed_from_u64(104);
    let first = random_aabbs(&mut rng, 50, 20.0);
    let second = random_aabbs(&mut rng, 80, 20.0);

    let mut tree = AabbTree::new();
    tree.build(&AabbSliceBuilder::new(&first)).unwrap();

    let _ = build_progressively(&mut tree, &AabbSliceBuilder::new(&second), 3);
    assert_eq!(tree.primitive_count(), 80);
    tree.assert_well_formed(&second);
}

#[test]
fn progressive_build_without_primitives() {
    let mut tree = AabbTree::new();
    assert_eq!(tree.progressive_build(&AabbSliceBuilder::new(&[]), 10), Ok(0));
    assert_eq!(tree.state(), AabbTreeState::Empty);
}
