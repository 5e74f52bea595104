// Tree Invariant Tests
// Concrete rebalancing scenarios for the three balanced-tree engines,
// with the full invariant set verified after every mutation.

use anyhow::Result;
use arboretum::{
    AvlTree, BTree, Color, DeleteOutcome, InsertOutcome, OrderedSet, RbTree,
};
use pretty_assertions::assert_eq;

fn engines() -> Vec<Box<dyn OrderedSet>> {
    vec![
        Box::new(AvlTree::new()),
        Box::new(RbTree::new()),
        Box::new(BTree::new(2).expect("degree 2 is valid")),
    ]
}

#[test]
fn test_avl_ll_case_rotates_to_balanced_root() -> Result<()> {
    let mut tree = AvlTree::new();
    for k in [30, 20, 10] {
        tree.insert(k)?;
        tree.check_invariants()?;
    }
    let root = tree.root().expect("tree is non-empty");
    assert_eq!(root.key, 20);
    assert_eq!(root.left().expect("left child").key, 10);
    assert_eq!(root.right().expect("right child").key, 30);
    assert_eq!(root.height, 1);
    assert_eq!(tree.height(), 1);
    Ok(())
}

#[test]
fn test_avl_rr_case_rotates_to_balanced_root() -> Result<()> {
    let mut tree = AvlTree::new();
    for k in [10, 20, 30] {
        tree.insert(k)?;
        tree.check_invariants()?;
    }
    let root = tree.root().expect("tree is non-empty");
    assert_eq!(root.key, 20);
    assert_eq!(root.left().expect("left child").key, 10);
    assert_eq!(root.right().expect("right child").key, 30);
    Ok(())
}

#[test]
fn test_avl_height_stays_logarithmic() -> Result<()> {
    let mut tree = AvlTree::new();
    for k in 0..1024 {
        tree.insert(k)?;
    }
    tree.check_invariants()?;
    // 1024 ascending keys in a plain BST would build a chain of depth
    // 1023; the AVL bound is 1.44 * log2(n).
    assert!(tree.height() <= 14, "height {} too large", tree.height());
    Ok(())
}

#[test]
fn test_rbtree_ascending_insertions_hold_invariants() -> Result<()> {
    let mut tree = RbTree::new();
    for k in 1..=10 {
        assert_eq!(tree.insert(k)?, InsertOutcome::Inserted);
        assert_eq!(tree.root_color(), Some(Color::Black));
        tree.check_invariants()?;
    }
    assert_eq!(tree.keys_in_order(), (1..=10).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_rbtree_black_leaf_delete_triggers_fixup() -> Result<()> {
    let mut tree = RbTree::new();
    for k in [10, 5, 15, 3, 7] {
        tree.insert(k)?;
    }
    // The shape is fixed: 10 at the root, 15 a black leaf.
    assert_eq!(tree.color_of(15), Some(Color::Black));

    assert_eq!(tree.delete(15)?, DeleteOutcome::Deleted);
    tree.check_invariants()?;
    assert_eq!(tree.keys_in_order(), vec![3, 5, 7, 10]);
    Ok(())
}

#[test]
fn test_btree_t2_insertion_shapes() -> Result<()> {
    let mut tree = BTree::new(2)?;
    for k in [10, 20, 5] {
        tree.insert(k)?;
        tree.check_invariants()?;
    }
    assert_eq!(tree.root().keys(), &[5, 10, 20]);

    tree.insert(15)?;
    tree.check_invariants()?;
    assert_eq!(tree.root().keys(), &[10]);
    assert_eq!(tree.root().child(0).expect("left child").keys(), &[5]);
    assert_eq!(tree.root().child(1).expect("right child").keys(), &[15, 20]);
    Ok(())
}

#[test]
fn test_btree_t2_underflow_borrows_through_parent() -> Result<()> {
    let mut tree = BTree::new(2)?;
    for k in [10, 20, 5, 15] {
        tree.insert(k)?;
    }
    assert_eq!(tree.delete(5)?, DeleteOutcome::Deleted);
    tree.check_invariants()?;
    assert_eq!(tree.root().keys(), &[15]);
    assert_eq!(tree.root().child(0).expect("left child").keys(), &[10]);
    assert_eq!(tree.root().child(1).expect("right child").keys(), &[20]);
    Ok(())
}

#[test]
fn test_miss_cases_leave_structures_unchanged() -> Result<()> {
    for mut engine in engines() {
        for k in [4, 2, 6, 1, 3, 5, 7] {
            engine.insert(k)?;
        }
        let before = engine.keys_in_order();

        assert_eq!(engine.insert(4)?, InsertOutcome::AlreadyExists);
        assert_eq!(engine.len(), 7, "{}", engine.structure_name());
        assert_eq!(engine.keys_in_order(), before);
        engine.check_invariants()?;

        assert_eq!(engine.delete(99)?, DeleteOutcome::NotFound);
        assert_eq!(engine.len(), 7);
        assert_eq!(engine.keys_in_order(), before);
        engine.check_invariants()?;
    }
    Ok(())
}

#[test]
fn test_inorder_is_strictly_increasing_for_all_engines() -> Result<()> {
    for mut engine in engines() {
        for k in [13, 8, 21, 3, 11, 17, 34, 1, 5, 9, 12] {
            engine.insert(k)?;
            engine.check_invariants()?;

            let keys = engine.keys_in_order();
            assert!(
                keys.windows(2).all(|w| w[0] < w[1]),
                "{} produced unsorted keys {keys:?}",
                engine.structure_name()
            );
        }
    }
    Ok(())
}

#[test]
fn test_size_tracks_every_mutation() -> Result<()> {
    for mut engine in engines() {
        assert!(engine.is_empty());
        for (i, k) in [7, 3, 11, 1, 5].into_iter().enumerate() {
            engine.insert(k)?;
            assert_eq!(engine.len(), i + 1);
        }
        for (i, k) in [3, 7, 1].into_iter().enumerate() {
            engine.delete(k)?;
            assert_eq!(engine.len(), 4 - i);
        }
    }
    Ok(())
}

#[test]
fn test_round_trip_returns_to_empty_for_all_engines() -> Result<()> {
    let keys = [15, 6, 23, 4, 7, 17, 42, 1, 5, 20, 16, 18];
    for mut engine in engines() {
        for &k in &keys {
            engine.insert(k)?;
            engine.check_invariants()?;
        }
        // Delete in a different order than insertion.
        let mut order = keys;
        order.reverse();
        for &k in &order {
            assert_eq!(engine.delete(k)?, DeleteOutcome::Deleted);
            engine.check_invariants()?;
        }
        assert!(engine.is_empty(), "{}", engine.structure_name());
        assert_eq!(engine.keys_in_order(), Vec::<i64>::new());
    }
    Ok(())
}

#[test]
fn test_negative_and_extreme_keys() -> Result<()> {
    for mut engine in engines() {
        for k in [0, -1, 1, i64::MIN, i64::MAX, -42, 42] {
            assert_eq!(engine.insert(k)?, InsertOutcome::Inserted);
            engine.check_invariants()?;
        }
        assert_eq!(
            engine.keys_in_order(),
            vec![i64::MIN, -42, -1, 0, 1, 42, i64::MAX]
        );
        assert_eq!(engine.delete(i64::MIN)?, DeleteOutcome::Deleted);
        engine.check_invariants()?;
    }
    Ok(())
}
