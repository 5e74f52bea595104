// Adversarial Tests
// Pathological operation orderings aimed at the repair machinery: sorted
// and zigzag insertions, deletion storms, duplicate floods, and the
// descent paths that force specific borrow/merge choices in the B-tree.

use anyhow::Result;
use arboretum::{
    AvlTree, BTree, Bst, CheckedSet, DeleteOutcome, InsertOutcome, OrderedSet, RbTree,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn engines() -> Vec<Box<dyn OrderedSet>> {
    vec![
        Box::new(AvlTree::new()),
        Box::new(RbTree::new()),
        Box::new(BTree::new(2).expect("degree 2 is valid")),
        Box::new(BTree::new(4).expect("degree 4 is valid")),
    ]
}

#[test]
fn test_ascending_then_descending_deletions() -> Result<()> {
    for mut engine in engines() {
        for k in 0..256 {
            engine.insert(k)?;
        }
        engine.check_invariants()?;
        for k in (0..256).rev() {
            assert_eq!(engine.delete(k)?, DeleteOutcome::Deleted);
            engine.check_invariants()?;
        }
        assert!(engine.is_empty());
    }
    Ok(())
}

#[test]
fn test_descending_insertions() -> Result<()> {
    for mut engine in engines() {
        for k in (0..256).rev() {
            engine.insert(k)?;
            engine.check_invariants()?;
        }
        assert_eq!(engine.len(), 256);
    }
    Ok(())
}

#[test]
fn test_zigzag_insertions() -> Result<()> {
    // Alternate ends of the key range: every insertion lands on the
    // opposite flank of the previous one.
    for mut engine in engines() {
        for i in 0..128 {
            let key = if i % 2 == 0 { i } else { 1000 - i };
            engine.insert(key)?;
            engine.check_invariants()?;
        }
        assert_eq!(engine.len(), 128);
    }
    Ok(())
}

#[test]
fn test_duplicate_flood() -> Result<()> {
    for mut engine in engines() {
        engine.insert(7)?;
        for _ in 0..100 {
            assert_eq!(engine.insert(7)?, InsertOutcome::AlreadyExists);
        }
        assert_eq!(engine.len(), 1);
        engine.check_invariants()?;
    }
    Ok(())
}

#[test]
fn test_delete_storm_on_absent_keys() -> Result<()> {
    for mut engine in engines() {
        for k in [10, 20, 30] {
            engine.insert(k)?;
        }
        for k in 100..200 {
            assert_eq!(engine.delete(k)?, DeleteOutcome::NotFound);
        }
        assert_eq!(engine.len(), 3);
        engine.check_invariants()?;
    }
    Ok(())
}

#[test]
fn test_interleaved_insert_delete_churn() -> Result<()> {
    // Sliding window: the structure stays small while every key passes
    // through it, cycling the repair machinery continuously.
    for mut engine in engines() {
        for k in 0..500 {
            engine.insert(k)?;
            if k >= 16 {
                assert_eq!(engine.delete(k - 16)?, DeleteOutcome::Deleted);
            }
            engine.check_invariants()?;
        }
        assert_eq!(engine.len(), 16);
    }
    Ok(())
}

#[test]
fn test_shuffled_round_trips() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(0xA1B2C3D4);
    let mut keys: Vec<i64> = (0..200).collect();

    for mut engine in engines() {
        keys.shuffle(&mut rng);
        for &k in &keys {
            engine.insert(k)?;
            engine.check_invariants()?;
        }
        keys.shuffle(&mut rng);
        for &k in &keys {
            assert_eq!(engine.delete(k)?, DeleteOutcome::Deleted);
            engine.check_invariants()?;
        }
        assert!(engine.is_empty());
    }
    Ok(())
}

#[test]
fn btree_descent_merge_left_sibling() -> Result<()> {
    // The rightmost child sits at minimum occupancy with a left sibling
    // also at minimum: descending into it must merge left and continue
    // at the shifted child index. Shape for t=2: root [10] over [5], [15].
    let mut tree = BTree::new(2)?;
    for k in [10, 5, 15, 20] {
        tree.insert(k)?;
    }
    tree.delete(20)?;
    assert_eq!(tree.root().keys(), &[10]);
    assert_eq!(tree.root().child(0).expect("left child").keys(), &[5]);
    assert_eq!(tree.root().child(1).expect("right child").keys(), &[15]);

    // 15 lives in the rightmost child; both children hold t-1 keys.
    assert_eq!(tree.delete(15)?, DeleteOutcome::Deleted);
    tree.check_invariants()?;
    assert_eq!(tree.keys_in_order(), vec![5, 10]);

    // Same shape again, deleting from the merged side's far end.
    let mut tree = BTree::new(2)?;
    for k in [10, 5, 15, 20] {
        tree.insert(k)?;
    }
    tree.delete(20)?;
    assert_eq!(tree.delete(5)?, DeleteOutcome::Deleted);
    tree.check_invariants()?;
    assert_eq!(tree.keys_in_order(), vec![10, 15]);
    Ok(())
}

#[test]
fn btree_deep_descent_merges() -> Result<()> {
    // Three-level tree at t=2, then delete everything in an order that
    // repeatedly drains the rightmost spine so descents keep meeting
    // minimum-occupancy children.
    let mut tree = BTree::new(2)?;
    for k in 0..64 {
        tree.insert(k)?;
    }
    for k in (0..64).rev() {
        assert_eq!(tree.delete(k)?, DeleteOutcome::Deleted);
        tree.check_invariants()?;
    }
    assert!(tree.is_empty());
    Ok(())
}

#[test]
fn test_bst_degenerates_but_stays_correct() -> Result<()> {
    // The unbalanced tree accepts the same adversarial input; only its
    // shape degrades.
    let mut tree = Bst::new();
    for k in 0..512 {
        tree.insert(k)?;
    }
    assert_eq!(tree.height(), 511);
    tree.check_invariants()?;
    for k in 0..512 {
        assert_eq!(tree.delete(k)?, DeleteOutcome::Deleted);
    }
    assert!(tree.is_empty());
    Ok(())
}

#[test]
fn test_checked_wrapper_survives_churn() -> Result<()> {
    // The checked wrapper re-verifies after every mutation; a silent
    // corruption anywhere in the engines turns into a hard error here.
    let mut set = CheckedSet::new(RbTree::new())?;
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut keys: Vec<i64> = (0..300).collect();
    keys.shuffle(&mut rng);

    for &k in &keys {
        set.insert(k)?;
    }
    keys.shuffle(&mut rng);
    for &k in &keys {
        if k % 3 != 0 {
            set.delete(k)?;
        }
    }
    assert_eq!(set.len(), 100);
    Ok(())
}
