// Binary Search Tree
// Plain unbalanced BST over integer keys. Same descent and deletion
// cases as the AVL engine, without the balance repair; worst-case depth
// is linear, which the balanced trees exist to avoid.

use anyhow::{bail, ensure, Result};

use crate::contracts::OrderedSet;
use crate::types::{DeleteOutcome, InsertOutcome, Key};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BstNode {
    pub key: Key,
    left: Option<Box<BstNode>>,
    right: Option<Box<BstNode>>,
}

impl BstNode {
    fn new(key: Key) -> Self {
        Self {
            key,
            left: None,
            right: None,
        }
    }

    pub fn left(&self) -> Option<&BstNode> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&BstNode> {
        self.right.as_deref()
    }
}

#[derive(Debug, Default, Clone)]
pub struct Bst {
    root: Option<Box<BstNode>>,
    size: usize,
}

fn min_key(node: &BstNode) -> Key {
    let mut current = node;
    while let Some(left) = current.left.as_deref() {
        current = left;
    }
    current.key
}

fn insert_node(node: Option<Box<BstNode>>, key: Key) -> (Box<BstNode>, InsertOutcome) {
    let Some(mut n) = node else {
        return (Box::new(BstNode::new(key)), InsertOutcome::Inserted);
    };
    let outcome;
    if key < n.key {
        let (child, out) = insert_node(n.left.take(), key);
        n.left = Some(child);
        outcome = out;
    } else if key > n.key {
        let (child, out) = insert_node(n.right.take(), key);
        n.right = Some(child);
        outcome = out;
    } else {
        outcome = InsertOutcome::AlreadyExists;
    }
    (n, outcome)
}

fn delete_node(
    node: Option<Box<BstNode>>,
    key: Key,
) -> Result<(Option<Box<BstNode>>, DeleteOutcome)> {
    let Some(mut n) = node else {
        return Ok((None, DeleteOutcome::NotFound));
    };

    let outcome;
    if key < n.key {
        let (child, out) = delete_node(n.left.take(), key)?;
        n.left = child;
        outcome = out;
    } else if key > n.key {
        let (child, out) = delete_node(n.right.take(), key)?;
        n.right = child;
        outcome = out;
    } else {
        match (n.left.take(), n.right.take()) {
            (None, None) => return Ok((None, DeleteOutcome::Deleted)),
            (Some(child), None) | (None, Some(child)) => {
                return Ok((Some(child), DeleteOutcome::Deleted))
            }
            (Some(left), Some(right)) => {
                let successor = min_key(&right);
                n.key = successor;
                n.left = Some(left);
                let (new_right, inner) = delete_node(Some(right), successor)?;
                if inner != DeleteOutcome::Deleted {
                    bail!("in-order successor {successor} vanished during delete");
                }
                n.right = new_right;
                outcome = DeleteOutcome::Deleted;
            }
        }
    }
    Ok((Some(n), outcome))
}

impl Bst {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: Key) -> Result<InsertOutcome> {
        let (new_root, outcome) = insert_node(self.root.take(), key);
        self.root = Some(new_root);
        if outcome == InsertOutcome::Inserted {
            self.size += 1;
        }
        Ok(outcome)
    }

    pub fn delete(&mut self, key: Key) -> Result<DeleteOutcome> {
        let (new_root, outcome) = delete_node(self.root.take(), key)?;
        self.root = new_root;
        if outcome == DeleteOutcome::Deleted {
            self.size -= 1;
        }
        Ok(outcome)
    }

    pub fn search(&self, key: Key) -> Option<&BstNode> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            if key == node.key {
                return Some(node);
            }
            current = if key < node.key {
                node.left.as_deref()
            } else {
                node.right.as_deref()
            };
        }
        None
    }

    pub fn min(&self) -> Option<Key> {
        self.root.as_deref().map(min_key)
    }

    pub fn max(&self) -> Option<Key> {
        let mut current = self.root.as_deref()?;
        while let Some(right) = current.right.as_deref() {
            current = right;
        }
        Some(current.key)
    }

    /// Height of the tree, computed on demand; -1 for an empty tree.
    pub fn height(&self) -> i32 {
        fn height_of(node: Option<&BstNode>) -> i32 {
            match node {
                None => -1,
                Some(n) => 1 + height_of(n.left.as_deref()).max(height_of(n.right.as_deref())),
            }
        }
        height_of(self.root.as_deref())
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn root(&self) -> Option<&BstNode> {
        self.root.as_deref()
    }

    pub fn for_each_in_order<F: FnMut(Key)>(&self, mut visit: F) {
        fn walk<F: FnMut(Key)>(node: Option<&BstNode>, visit: &mut F) {
            if let Some(n) = node {
                walk(n.left.as_deref(), visit);
                visit(n.key);
                walk(n.right.as_deref(), visit);
            }
        }
        walk(self.root.as_deref(), &mut visit);
    }

    pub fn for_each_pre_order<F: FnMut(Key)>(&self, mut visit: F) {
        fn walk<F: FnMut(Key)>(node: Option<&BstNode>, visit: &mut F) {
            if let Some(n) = node {
                visit(n.key);
                walk(n.left.as_deref(), visit);
                walk(n.right.as_deref(), visit);
            }
        }
        walk(self.root.as_deref(), &mut visit);
    }

    pub fn for_each_post_order<F: FnMut(Key)>(&self, mut visit: F) {
        fn walk<F: FnMut(Key)>(node: Option<&BstNode>, visit: &mut F) {
            if let Some(n) = node {
                walk(n.left.as_deref(), visit);
                walk(n.right.as_deref(), visit);
                visit(n.key);
            }
        }
        walk(self.root.as_deref(), &mut visit);
    }

    /// Verify BST ordering and size agreement.
    pub fn check_invariants(&self) -> Result<()> {
        fn check(
            node: Option<&BstNode>,
            lower: Option<Key>,
            upper: Option<Key>,
            count: &mut usize,
        ) -> Result<()> {
            let Some(n) = node else { return Ok(()) };
            *count += 1;
            if let Some(lo) = lower {
                ensure!(n.key > lo, "ordering violated: {} <= bound {}", n.key, lo);
            }
            if let Some(hi) = upper {
                ensure!(n.key < hi, "ordering violated: {} >= bound {}", n.key, hi);
            }
            check(n.left.as_deref(), lower, Some(n.key), count)?;
            check(n.right.as_deref(), Some(n.key), upper, count)
        }

        let mut count = 0;
        check(self.root.as_deref(), None, None, &mut count)?;
        ensure!(
            count == self.size,
            "size counter {} != reachable nodes {}",
            self.size,
            count
        );
        Ok(())
    }
}

impl OrderedSet for Bst {
    fn insert(&mut self, key: Key) -> Result<InsertOutcome> {
        Bst::insert(self, key)
    }

    fn delete(&mut self, key: Key) -> Result<DeleteOutcome> {
        Bst::delete(self, key)
    }

    fn contains(&self, key: Key) -> bool {
        self.search(key).is_some()
    }

    fn len(&self) -> usize {
        self.size
    }

    fn for_each_in_order(&self, visit: &mut dyn FnMut(Key)) {
        Bst::for_each_in_order(self, visit);
    }

    fn check_invariants(&self) -> Result<()> {
        Bst::check_invariants(self)
    }

    fn structure_name(&self) -> &'static str {
        "bst"
    }
}
