// B-Tree Engine
// Fixed-fanout ordered tree parameterized by minimum degree t. Insertion
// splits full nodes top-down so the descent never meets one; deletion
// refills deficient children (borrow through the parent, else merge)
// before descending, so the recursion never leaves a node below minimum
// occupancy.

use anyhow::{anyhow, ensure, Result};
use tracing::debug;

use crate::contracts::OrderedSet;
use crate::types::{DeleteOutcome, InsertOutcome, Key, ValidatedDegree};

/// A B-tree node: sorted keys, and one more child than keys when internal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BTreeNode {
    keys: Vec<Key>,
    children: Vec<Box<BTreeNode>>,
    leaf: bool,
}

impl BTreeNode {
    fn new_leaf() -> Self {
        Self {
            keys: Vec::new(),
            children: Vec::new(),
            leaf: true,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, index: usize) -> Option<&BTreeNode> {
        self.children.get(index).map(|c| c.as_ref())
    }

    /// First index whose key is >= `key`; equals `key_count()` when every
    /// key is smaller. The same scan drives search, insert, and delete.
    fn key_position(&self, key: Key) -> usize {
        self.keys.partition_point(|&k| k < key)
    }
}

/// Tree handle: owns the root, fixes the degree at creation.
#[derive(Debug, Clone)]
pub struct BTree {
    root: Box<BTreeNode>,
    degree: ValidatedDegree,
    size: usize,
}

impl BTree {
    /// Create an empty tree with the given minimum degree (`t >= 2`).
    pub fn new(degree: usize) -> Result<Self> {
        let degree = ValidatedDegree::new(degree)?;
        Ok(Self {
            root: Box::new(BTreeNode::new_leaf()),
            degree,
            size: 0,
        })
    }

    pub fn degree(&self) -> ValidatedDegree {
        self.degree
    }

    pub fn root(&self) -> &BTreeNode {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Per-node scan for the first key >= target, descending unless leaf.
    pub fn contains(&self, key: Key) -> bool {
        let mut node = self.root.as_ref();
        loop {
            let idx = node.key_position(key);
            if idx < node.keys.len() && node.keys[idx] == key {
                return true;
            }
            if node.leaf {
                return false;
            }
            node = &node.children[idx];
        }
    }

    /// Insert a key. A full root is split before the descent, growing the
    /// tree by one level; every other full node is split on the way down.
    pub fn insert(&mut self, key: Key) -> Result<InsertOutcome> {
        if self.contains(key) {
            debug!(key, "btree insert: key already present");
            return Ok(InsertOutcome::AlreadyExists);
        }

        let t = self.degree.get();
        if self.root.keys.len() == self.degree.max_keys() {
            let old_root = std::mem::replace(self.root.as_mut(), BTreeNode::new_leaf());
            self.root.leaf = false;
            self.root.children.push(Box::new(old_root));
            split_child(&mut self.root, 0, t)?;
        }
        insert_nonfull(&mut self.root, key, t)?;

        self.size += 1;
        debug!(key, size = self.size, "btree insert");
        Ok(InsertOutcome::Inserted)
    }

    /// Delete a key. A root emptied of keys but not of children collapses
    /// into its sole child, shrinking the tree by one level.
    pub fn delete(&mut self, key: Key) -> Result<DeleteOutcome> {
        if !self.contains(key) {
            debug!(key, "btree delete: key not found");
            return Ok(DeleteOutcome::NotFound);
        }

        let t = self.degree.get();
        delete_from(&mut self.root, key, t)?;

        if self.root.keys.is_empty() && !self.root.leaf {
            let child = self.root.children.remove(0);
            *self.root = *child;
        }

        self.size -= 1;
        debug!(key, size = self.size, "btree delete");
        Ok(DeleteOutcome::Deleted)
    }

    pub fn for_each_in_order<F: FnMut(Key)>(&self, mut visit: F) {
        fn walk<F: FnMut(Key)>(node: &BTreeNode, visit: &mut F) {
            if node.leaf {
                for &k in &node.keys {
                    visit(k);
                }
            } else {
                for i in 0..node.keys.len() {
                    walk(&node.children[i], visit);
                    visit(node.keys[i]);
                }
                if let Some(last) = node.children.last() {
                    walk(last, visit);
                }
            }
        }
        walk(&self.root, &mut visit);
    }

    /// Verify the full B-tree invariant set: per-node key ordering and
    /// occupancy bounds, fanout, uniform leaf depth, global BST ordering,
    /// and size agreement.
    pub fn check_invariants(&self) -> Result<()> {
        let t = self.degree.get();
        let mut leaf_depth = None;
        let mut count = 0;
        check_node(
            &self.root,
            t,
            true,
            0,
            &mut leaf_depth,
            None,
            None,
            &mut count,
        )?;
        ensure!(
            count == self.size,
            "size counter {} != reachable keys {}",
            self.size,
            count
        );
        Ok(())
    }
}

/// Split the full child at `index`. The median key (index `t-1`) moves up
/// to the parent; the upper `t-1` keys and upper `t` children move to a
/// new right sibling.
fn split_child(parent: &mut BTreeNode, index: usize, t: usize) -> Result<()> {
    let child = parent
        .children
        .get_mut(index)
        .ok_or_else(|| anyhow!("split_child: no child at index {index}"))?;
    ensure!(
        child.keys.len() == 2 * t - 1,
        "split_child called on a node with {} keys",
        child.keys.len()
    );

    let mut upper_keys = child.keys.split_off(t - 1);
    let median = upper_keys.remove(0);
    let upper_children = if child.leaf {
        Vec::new()
    } else {
        child.children.split_off(t)
    };

    let sibling = Box::new(BTreeNode {
        keys: upper_keys,
        children: upper_children,
        leaf: child.leaf,
    });

    parent.keys.insert(index, median);
    parent.children.insert(index + 1, sibling);
    Ok(())
}

fn insert_nonfull(node: &mut BTreeNode, key: Key, t: usize) -> Result<()> {
    if node.leaf {
        let pos = node.key_position(key);
        node.keys.insert(pos, key);
        return Ok(());
    }

    let mut idx = node.key_position(key);
    if node.children[idx].keys.len() == 2 * t - 1 {
        split_child(node, idx, t)?;
        // The promoted median may route the key into the new sibling.
        if key > node.keys[idx] {
            idx += 1;
        }
    }
    insert_nonfull(&mut node.children[idx], key, t)
}

/// Largest key in the subtree: rightmost key of the rightmost leaf.
fn predecessor_key(node: &BTreeNode) -> Result<Key> {
    let mut current = node;
    while !current.leaf {
        current = current
            .children
            .last()
            .ok_or_else(|| anyhow!("internal node with no children"))?;
    }
    current
        .keys
        .last()
        .copied()
        .ok_or_else(|| anyhow!("leaf with no keys while taking predecessor"))
}

/// Smallest key in the subtree: leftmost key of the leftmost leaf.
fn successor_key(node: &BTreeNode) -> Result<Key> {
    let mut current = node;
    while !current.leaf {
        current = current
            .children
            .first()
            .ok_or_else(|| anyhow!("internal node with no children"))?;
    }
    current
        .keys
        .first()
        .copied()
        .ok_or_else(|| anyhow!("leaf with no keys while taking successor"))
}

fn delete_from(node: &mut BTreeNode, key: Key, t: usize) -> Result<()> {
    let idx = node.key_position(key);

    if idx < node.keys.len() && node.keys[idx] == key {
        if node.leaf {
            node.keys.remove(idx);
            return Ok(());
        }

        // Key sits in an internal node: replace it with the predecessor
        // or successor if a flanking child can spare a key, otherwise
        // merge the two deficient children around it and recurse.
        if node.children[idx].keys.len() >= t {
            let pred = predecessor_key(&node.children[idx])?;
            node.keys[idx] = pred;
            delete_from(&mut node.children[idx], pred, t)
        } else if node.children[idx + 1].keys.len() >= t {
            let succ = successor_key(&node.children[idx + 1])?;
            node.keys[idx] = succ;
            delete_from(&mut node.children[idx + 1], succ, t)
        } else {
            merge_children(node, idx)?;
            delete_from(&mut node.children[idx], key, t)
        }
    } else {
        ensure!(
            !node.leaf,
            "delete descended to a leaf that does not hold {key}"
        );

        // Refill the target child before descending. The returned index
        // accounts for a merge with the left sibling having shifted it.
        let idx = fill_child(node, idx, t)?;
        delete_from(&mut node.children[idx], key, t)
    }
}

/// Ensure the child at `idx` holds at least `t` keys before a descent.
///
/// Returns the index of the child now covering the key's range:
/// borrowing and merging with the right sibling leave it at `idx`;
/// merging with the left sibling folds the child into `idx - 1`.
fn fill_child(node: &mut BTreeNode, idx: usize, t: usize) -> Result<usize> {
    if node.children[idx].keys.len() >= t {
        return Ok(idx);
    }

    if idx > 0 && node.children[idx - 1].keys.len() >= t {
        borrow_from_left_sibling(&mut node.keys, &mut node.children, idx)?;
        return Ok(idx);
    }
    if idx < node.keys.len() && node.children[idx + 1].keys.len() >= t {
        borrow_from_right_sibling(&mut node.keys, &mut node.children, idx)?;
        return Ok(idx);
    }

    if idx < node.keys.len() {
        merge_children(node, idx)?;
        Ok(idx)
    } else {
        merge_children(node, idx - 1)?;
        Ok(idx - 1)
    }
}

/// Rotate one key through the parent from the left sibling: the separator
/// drops into the child, the sibling's last key replaces the separator,
/// and (for internal nodes) the sibling's last child moves across.
fn borrow_from_left_sibling(
    parent_keys: &mut [Key],
    children: &mut [Box<BTreeNode>],
    idx: usize,
) -> Result<()> {
    let separator_index = idx - 1;

    let (left_part, right_part) = children.split_at_mut(idx);
    let left = left_part
        .last_mut()
        .ok_or_else(|| anyhow!("no left sibling to borrow from"))?;
    let child = right_part
        .first_mut()
        .ok_or_else(|| anyhow!("no child at index {idx}"))?;

    let borrowed_key = left
        .keys
        .pop()
        .ok_or_else(|| anyhow!("left sibling has no keys to lend"))?;
    child.keys.insert(0, parent_keys[separator_index]);
    parent_keys[separator_index] = borrowed_key;

    if !left.leaf {
        let borrowed_child = left
            .children
            .pop()
            .ok_or_else(|| anyhow!("left sibling has no children to lend"))?;
        child.children.insert(0, borrowed_child);
    }
    Ok(())
}

/// Mirror of `borrow_from_left_sibling` for the right sibling.
fn borrow_from_right_sibling(
    parent_keys: &mut [Key],
    children: &mut [Box<BTreeNode>],
    idx: usize,
) -> Result<()> {
    let separator_index = idx;

    let (left_part, right_part) = children.split_at_mut(idx + 1);
    let child = left_part
        .last_mut()
        .ok_or_else(|| anyhow!("no child at index {idx}"))?;
    let right = right_part
        .first_mut()
        .ok_or_else(|| anyhow!("no right sibling to borrow from"))?;

    ensure!(!right.keys.is_empty(), "right sibling has no keys to lend");
    let borrowed_key = right.keys.remove(0);
    child.keys.push(parent_keys[separator_index]);
    parent_keys[separator_index] = borrowed_key;

    if !right.leaf {
        ensure!(
            !right.children.is_empty(),
            "right sibling has no children to lend"
        );
        let borrowed_child = right.children.remove(0);
        child.children.push(borrowed_child);
    }
    Ok(())
}

/// Merge `children[idx + 1]` into `children[idx]`, pulling the separator
/// key at `idx` down between them.
fn merge_children(node: &mut BTreeNode, idx: usize) -> Result<()> {
    ensure!(
        idx < node.keys.len(),
        "merge_children: no separator at index {idx}"
    );
    let separator = node.keys.remove(idx);
    let right = *node.children.remove(idx + 1);
    let left = &mut node.children[idx];

    left.keys.push(separator);
    left.keys.extend(right.keys);
    left.children.extend(right.children);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn check_node(
    node: &BTreeNode,
    t: usize,
    is_root: bool,
    depth: usize,
    leaf_depth: &mut Option<usize>,
    lower: Option<Key>,
    upper: Option<Key>,
    count: &mut usize,
) -> Result<()> {
    let key_count = node.keys.len();

    if is_root {
        // The root may hold zero keys only while the tree is empty.
        if key_count == 0 {
            ensure!(node.leaf, "internal root with no keys");
            ensure!(node.children.is_empty(), "keyless root with children");
            return Ok(());
        }
    } else {
        ensure!(
            key_count >= t - 1,
            "non-root node has {} keys, minimum is {}",
            key_count,
            t - 1
        );
    }
    ensure!(
        key_count <= 2 * t - 1,
        "node has {} keys, maximum is {}",
        key_count,
        2 * t - 1
    );

    for window in node.keys.windows(2) {
        ensure!(
            window[0] < window[1],
            "keys not strictly increasing: {} then {}",
            window[0],
            window[1]
        );
    }
    if let Some(lo) = lower {
        ensure!(
            node.keys[0] > lo,
            "ordering violated: {} <= bound {}",
            node.keys[0],
            lo
        );
    }
    if let Some(hi) = upper {
        ensure!(
            node.keys[key_count - 1] < hi,
            "ordering violated: {} >= bound {}",
            node.keys[key_count - 1],
            hi
        );
    }

    *count += key_count;

    if node.leaf {
        ensure!(node.children.is_empty(), "leaf node with children");
        match *leaf_depth {
            None => *leaf_depth = Some(depth),
            Some(expected) => ensure!(
                depth == expected,
                "leaves at unequal depths: {} and {}",
                expected,
                depth
            ),
        }
    } else {
        ensure!(
            node.children.len() == key_count + 1,
            "internal node with {} keys has {} children",
            key_count,
            node.children.len()
        );
        for (i, child) in node.children.iter().enumerate() {
            let child_lower = if i == 0 { lower } else { Some(node.keys[i - 1]) };
            let child_upper = if i == key_count {
                upper
            } else {
                Some(node.keys[i])
            };
            check_node(
                child,
                t,
                false,
                depth + 1,
                leaf_depth,
                child_lower,
                child_upper,
                count,
            )?;
        }
    }

    Ok(())
}

impl OrderedSet for BTree {
    fn insert(&mut self, key: Key) -> Result<InsertOutcome> {
        BTree::insert(self, key)
    }

    fn delete(&mut self, key: Key) -> Result<DeleteOutcome> {
        BTree::delete(self, key)
    }

    fn contains(&self, key: Key) -> bool {
        BTree::contains(self, key)
    }

    fn len(&self) -> usize {
        self.size
    }

    fn for_each_in_order(&self, visit: &mut dyn FnMut(Key)) {
        BTree::for_each_in_order(self, visit);
    }

    fn check_invariants(&self) -> Result<()> {
        BTree::check_invariants(self)
    }

    fn structure_name(&self) -> &'static str {
        "btree"
    }
}
