use aabbtree3d::bounding_volume::Aabb;
use aabbtree3d::math::{Point, Vector};
use aabbtree3d::partitioning::aabb_tree::{MAX_LEAF_PRIMITIVES, MAX_PRIMITIVES};
use aabbtree3d::partitioning::{
    AabbSliceBuilder, AabbTree, AabbTreeBuilder, AabbTreeError, AabbTreeState,
};
use std::cell::Cell;

/// A builder whose primitive count can change between calls.
struct ShrinkingBuilder {
    count: Cell<u32>,
}

impl AabbTreeBuilder for ShrinkingBuilder {
    fn primitive_count(&self) -> u32 {
        self.count.get()
    }

    fn primitive_aabb(&self, primitive: u32) -> Aabb {
        Aabb::from_half_extents(Point::new(primitive as f32, 0.0, 0.0), Vector::repeat(0.5))
    }
}

/// A builder claiming more primitives than a tree can hold.
struct HugeBuilder;

impl AabbTreeBuilder for HugeBuilder {
    fn primitive_count(&self) -> u32 {
        MAX_PRIMITIVES + 1
    }

    fn primitive_aabb(&self, _: u32) -> Aabb {
        unreachable!("oversized builds are rejected before reading any bounds")
    }
}

fn unit_boxes(len: usize) -> Vec<Aabb> {
    (0..len)
        .map(|i| Aabb::from_half_extents(Point::new(0.0, i as f32, 0.0), Vector::repeat(0.5)))
        .collect()
}

#[test]
fn invalid_leaf_limits_are_rejected() {
    let aabbs = unit_boxes(10);
    let mut tree = AabbTree::new();
    tree.build(&AabbSliceBuilder::new(&aabbs)).unwrap();

    for limit in [0, MAX_LEAF_PRIMITIVES + 1, u32::MAX] {
        let builder = AabbSliceBuilder::new(&aabbs).with_leaf_limit(limit);
        assert_eq!(
            tree.build(&builder),
            Err(AabbTreeError::InvalidLeafLimit { limit })
        );
        assert_eq!(tree.state(), AabbTreeState::Empty);
        assert_eq!(
            tree.progressive_build(&builder, 1),
            Err(AabbTreeError::InvalidLeafLimit { limit })
        );
        assert_eq!(tree.state(), AabbTreeState::Empty);
    }
}

#[test]
fn oversized_builders_are_rejected() {
    let mut tree = AabbTree::new();
    assert_eq!(
        tree.build(&HugeBuilder),
        Err(AabbTreeError::TooManyPrimitives {
            count: MAX_PRIMITIVES + 1
        })
    );
    assert_eq!(tree.state(), AabbTreeState::Empty);
}

#[test]
fn primitive_count_change_cancels_progressive_build() {
    let builder = ShrinkingBuilder {
        count: Cell::new(100),
    };
    let mut tree = AabbTree::new();
    assert!(tree.progressive_build(&builder, 10).unwrap() > 0);
    assert_eq!(tree.state(), AabbTreeState::Building);

    builder.count.set(99);
    assert_eq!(
        tree.progressive_build(&builder, 10),
        Err(AabbTreeError::PrimitiveCountChanged {
            expected: 100,
            found: 99
        })
    );
    assert_eq!(tree.state(), AabbTreeState::Empty);

    // The next call starts over with the new count.
    while tree.progressive_build(&builder, 10).unwrap() != 0 {}
    assert_eq!(tree.primitive_count(), 99);
}

#[test]
fn failed_builds_leave_the_tree_reusable() {
    let aabbs = unit_boxes(33);
    let mut tree = AabbTree::new();
    assert!(tree.build(&HugeBuilder).is_err());

    tree.build(&AabbSliceBuilder::new(&aabbs)).unwrap();
    tree.assert_well_formed(&aabbs);
}

#[test]
fn error_messages() {
    assert_eq!(
        AabbTreeError::InvalidLeafLimit { limit: 16 }.to_string(),
        "invalid leaf primitive limit 16: it must be in 1..=15"
    );
    assert_eq!(
        AabbTreeError::PrimitiveCountChanged {
            expected: 3,
            found: 2
        }
        .to_string(),
        "the primitive count changed from 3 to 2 during a progressive build"
    );
    assert!(AabbTreeError::AllocationFailed { primitives: 7 }
        .to_string()
        .contains('7'));
}
