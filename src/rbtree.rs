// Red-Black Tree Engine
// Classic CLRS red-black tree over an index arena. Slot 0 is the tree's
// shared sentinel: always BLACK, standing in for every absent child and
// the root's parent, so the rotation and fix-up code never branches on a
// missing node. Freed slots are recycled through a free list; dropping
// the handle releases every node, sentinel included, in one sweep.

use anyhow::{ensure, Result};
use tracing::debug;

use crate::contracts::OrderedSet;
use crate::types::{DeleteOutcome, InsertOutcome, Key};

/// Node color. The sentinel is permanently BLACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

/// Arena index of a node. Index 0 is the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeId(usize);

const NIL: NodeId = NodeId(0);

#[derive(Debug, Clone)]
struct RbNode {
    key: Key,
    color: Color,
    parent: NodeId,
    left: NodeId,
    right: NodeId,
}

/// Tree handle: arena, free list, root index, live key count.
#[derive(Debug, Clone)]
pub struct RbTree {
    nodes: Vec<RbNode>,
    free: Vec<NodeId>,
    root: NodeId,
    size: usize,
}

impl Default for RbTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RbTree {
    /// Create an empty tree. The sentinel occupies slot 0 from the start.
    pub fn new() -> Self {
        Self {
            nodes: vec![RbNode {
                key: 0,
                color: Color::Black,
                parent: NIL,
                left: NIL,
                right: NIL,
            }],
            free: Vec::new(),
            root: NIL,
            size: 0,
        }
    }

    fn node(&self, id: NodeId) -> &RbNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut RbNode {
        &mut self.nodes[id.0]
    }

    fn alloc(&mut self, key: Key) -> NodeId {
        let node = RbNode {
            key,
            color: Color::Red,
            parent: NIL,
            left: NIL,
            right: NIL,
        };
        if let Some(id) = self.free.pop() {
            self.nodes[id.0] = node;
            id
        } else {
            self.nodes.push(node);
            NodeId(self.nodes.len() - 1)
        }
    }

    fn release(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.parent = NIL;
        node.left = NIL;
        node.right = NIL;
        self.free.push(id);
    }

    fn left_rotate(&mut self, x: NodeId) {
        let y = self.node(x).right;
        let y_left = self.node(y).left;
        self.node_mut(x).right = y_left;
        if y_left != NIL {
            self.node_mut(y_left).parent = x;
        }
        let x_parent = self.node(x).parent;
        self.node_mut(y).parent = x_parent;
        if x_parent == NIL {
            self.root = y;
        } else if x == self.node(x_parent).left {
            self.node_mut(x_parent).left = y;
        } else {
            self.node_mut(x_parent).right = y;
        }
        self.node_mut(y).left = x;
        self.node_mut(x).parent = y;
    }

    fn right_rotate(&mut self, y: NodeId) {
        let x = self.node(y).left;
        let x_right = self.node(x).right;
        self.node_mut(y).left = x_right;
        if x_right != NIL {
            self.node_mut(x_right).parent = y;
        }
        let y_parent = self.node(y).parent;
        self.node_mut(x).parent = y_parent;
        if y_parent == NIL {
            self.root = x;
        } else if y == self.node(y_parent).left {
            self.node_mut(y_parent).left = x;
        } else {
            self.node_mut(y_parent).right = x;
        }
        self.node_mut(x).right = y;
        self.node_mut(y).parent = x;
    }

    /// Replace the subtree rooted at `u` with the one rooted at `v` in
    /// u's parent. `v` may be the sentinel; its parent link is still
    /// updated, which the delete fix-up relies on.
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let u_parent = self.node(u).parent;
        if u_parent == NIL {
            self.root = v;
        } else if u == self.node(u_parent).left {
            self.node_mut(u_parent).left = v;
        } else {
            self.node_mut(u_parent).right = v;
        }
        self.node_mut(v).parent = u_parent;
    }

    fn minimum(&self, mut node: NodeId) -> NodeId {
        while self.node(node).left != NIL {
            node = self.node(node).left;
        }
        node
    }

    fn find(&self, key: Key) -> NodeId {
        let mut current = self.root;
        while current != NIL {
            let node = self.node(current);
            if key == node.key {
                return current;
            }
            current = if key < node.key { node.left } else { node.right };
        }
        NIL
    }

    /// Insert a key. The new node starts RED; the fix-up walk restores
    /// the coloring invariants and forces the root BLACK on exit.
    pub fn insert(&mut self, key: Key) -> Result<InsertOutcome> {
        let mut y = NIL;
        let mut x = self.root;
        while x != NIL {
            y = x;
            let node = self.node(x);
            if key < node.key {
                x = node.left;
            } else if key > node.key {
                x = node.right;
            } else {
                debug!(key, "rbtree insert: key already present");
                return Ok(InsertOutcome::AlreadyExists);
            }
        }

        let z = self.alloc(key);
        self.node_mut(z).parent = y;
        if y == NIL {
            self.root = z;
        } else if key < self.node(y).key {
            self.node_mut(y).left = z;
        } else {
            self.node_mut(y).right = z;
        }

        self.insert_fixup(z);
        self.size += 1;
        debug!(key, size = self.size, "rbtree insert");
        Ok(InsertOutcome::Inserted)
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while self.node(self.node(z).parent).color == Color::Red {
            let parent = self.node(z).parent;
            let grandparent = self.node(parent).parent;
            if parent == self.node(grandparent).left {
                let uncle = self.node(grandparent).right;
                if self.node(uncle).color == Color::Red {
                    // Uncle RED: recolor and continue two levels up.
                    self.node_mut(parent).color = Color::Black;
                    self.node_mut(uncle).color = Color::Black;
                    self.node_mut(grandparent).color = Color::Red;
                    z = grandparent;
                } else {
                    if z == self.node(parent).right {
                        // Inner child: rotate into the outer case.
                        z = parent;
                        self.left_rotate(z);
                    }
                    let parent = self.node(z).parent;
                    let grandparent = self.node(parent).parent;
                    self.node_mut(parent).color = Color::Black;
                    self.node_mut(grandparent).color = Color::Red;
                    self.right_rotate(grandparent);
                }
            } else {
                let uncle = self.node(grandparent).left;
                if self.node(uncle).color == Color::Red {
                    self.node_mut(parent).color = Color::Black;
                    self.node_mut(uncle).color = Color::Black;
                    self.node_mut(grandparent).color = Color::Red;
                    z = grandparent;
                } else {
                    if z == self.node(parent).left {
                        z = parent;
                        self.right_rotate(z);
                    }
                    let parent = self.node(z).parent;
                    let grandparent = self.node(parent).parent;
                    self.node_mut(parent).color = Color::Black;
                    self.node_mut(grandparent).color = Color::Red;
                    self.left_rotate(grandparent);
                }
            }
        }
        let root = self.root;
        self.node_mut(root).color = Color::Black;
    }

    /// Delete a key. The color of the physically removed position, not of
    /// the key's node, decides whether the fix-up walk runs.
    pub fn delete(&mut self, key: Key) -> Result<DeleteOutcome> {
        let z = self.find(key);
        if z == NIL {
            debug!(key, "rbtree delete: key not found");
            return Ok(DeleteOutcome::NotFound);
        }

        let mut y = z;
        let mut original_color = self.node(y).color;
        let x;

        if self.node(z).left == NIL {
            x = self.node(z).right;
            self.transplant(z, x);
        } else if self.node(z).right == NIL {
            x = self.node(z).left;
            self.transplant(z, x);
        } else {
            y = self.minimum(self.node(z).right);
            original_color = self.node(y).color;
            x = self.node(y).right;
            if self.node(y).parent == z {
                // x may be the sentinel; its parent must still point at
                // the position the fix-up walks up from.
                self.node_mut(x).parent = y;
            } else {
                self.transplant(y, x);
                let z_right = self.node(z).right;
                self.node_mut(y).right = z_right;
                self.node_mut(z_right).parent = y;
            }
            self.transplant(z, y);
            let z_left = self.node(z).left;
            self.node_mut(y).left = z_left;
            self.node_mut(z_left).parent = y;
            let z_color = self.node(z).color;
            self.node_mut(y).color = z_color;
        }

        self.release(z);
        self.size -= 1;

        if original_color == Color::Black {
            self.delete_fixup(x);
        }
        debug!(key, size = self.size, "rbtree delete");
        Ok(DeleteOutcome::Deleted)
    }

    fn delete_fixup(&mut self, mut x: NodeId) {
        while x != self.root && self.node(x).color == Color::Black {
            let parent = self.node(x).parent;
            if x == self.node(parent).left {
                let mut w = self.node(parent).right;
                if self.node(w).color == Color::Red {
                    // Red sibling: rotate it out of the way.
                    self.node_mut(w).color = Color::Black;
                    self.node_mut(parent).color = Color::Red;
                    self.left_rotate(parent);
                    w = self.node(self.node(x).parent).right;
                }
                let w_left = self.node(w).left;
                let w_right = self.node(w).right;
                if self.node(w_left).color == Color::Black
                    && self.node(w_right).color == Color::Black
                {
                    self.node_mut(w).color = Color::Red;
                    x = self.node(x).parent;
                } else {
                    if self.node(w_right).color == Color::Black {
                        self.node_mut(w_left).color = Color::Black;
                        self.node_mut(w).color = Color::Red;
                        self.right_rotate(w);
                        w = self.node(self.node(x).parent).right;
                    }
                    let parent = self.node(x).parent;
                    let parent_color = self.node(parent).color;
                    self.node_mut(w).color = parent_color;
                    self.node_mut(parent).color = Color::Black;
                    let w_right = self.node(w).right;
                    self.node_mut(w_right).color = Color::Black;
                    self.left_rotate(parent);
                    x = self.root;
                }
            } else {
                let mut w = self.node(parent).left;
                if self.node(w).color == Color::Red {
                    self.node_mut(w).color = Color::Black;
                    self.node_mut(parent).color = Color::Red;
                    self.right_rotate(parent);
                    w = self.node(self.node(x).parent).left;
                }
                let w_left = self.node(w).left;
                let w_right = self.node(w).right;
                if self.node(w_right).color == Color::Black
                    && self.node(w_left).color == Color::Black
                {
                    self.node_mut(w).color = Color::Red;
                    x = self.node(x).parent;
                } else {
                    if self.node(w_left).color == Color::Black {
                        self.node_mut(w_right).color = Color::Black;
                        self.node_mut(w).color = Color::Red;
                        self.left_rotate(w);
                        w = self.node(self.node(x).parent).left;
                    }
                    let parent = self.node(x).parent;
                    let parent_color = self.node(parent).color;
                    self.node_mut(w).color = parent_color;
                    self.node_mut(parent).color = Color::Black;
                    let w_left = self.node(w).left;
                    self.node_mut(w_left).color = Color::Black;
                    self.right_rotate(parent);
                    x = self.root;
                }
            }
        }
        self.node_mut(x).color = Color::Black;
    }

    /// Whether a key is present.
    pub fn contains(&self, key: Key) -> bool {
        self.find(key) != NIL
    }

    /// Color of a key's node, if present. The sentinel never escapes.
    pub fn color_of(&self, key: Key) -> Option<Color> {
        let id = self.find(key);
        if id == NIL {
            None
        } else {
            Some(self.node(id).color)
        }
    }

    /// Color of the root node; `None` for an empty tree.
    pub fn root_color(&self) -> Option<Color> {
        if self.root == NIL {
            None
        } else {
            Some(self.node(self.root).color)
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn for_each_in_order<F: FnMut(Key)>(&self, mut visit: F) {
        self.walk_in_order(self.root, &mut visit);
    }

    fn walk_in_order<F: FnMut(Key)>(&self, id: NodeId, visit: &mut F) {
        if id != NIL {
            let node = self.node(id);
            self.walk_in_order(node.left, visit);
            visit(node.key);
            self.walk_in_order(node.right, visit);
        }
    }

    /// Verify the five red-black invariants plus BST ordering and size
    /// agreement: root BLACK, sentinel BLACK, no RED node with a RED
    /// child, and a uniform black-height over every root-to-sentinel path.
    pub fn check_invariants(&self) -> Result<()> {
        ensure!(
            self.node(NIL).color == Color::Black,
            "sentinel must be BLACK"
        );
        if self.root == NIL {
            ensure!(self.size == 0, "empty tree with nonzero size {}", self.size);
            return Ok(());
        }
        ensure!(
            self.node(self.root).color == Color::Black,
            "root must be BLACK"
        );

        let mut count = 0;
        self.check_node(self.root, None, None, &mut count)?;
        ensure!(
            count == self.size,
            "size counter {} != reachable nodes {}",
            self.size,
            count
        );
        Ok(())
    }

    /// Returns the black-height of the subtree at `id` (sentinel = 0).
    fn check_node(
        &self,
        id: NodeId,
        lower: Option<Key>,
        upper: Option<Key>,
        count: &mut usize,
    ) -> Result<usize> {
        if id == NIL {
            return Ok(0);
        }
        let node = self.node(id);
        *count += 1;

        if let Some(lo) = lower {
            ensure!(
                node.key > lo,
                "ordering violated: {} <= bound {}",
                node.key,
                lo
            );
        }
        if let Some(hi) = upper {
            ensure!(
                node.key < hi,
                "ordering violated: {} >= bound {}",
                node.key,
                hi
            );
        }

        if node.color == Color::Red {
            ensure!(
                self.node(node.left).color == Color::Black
                    && self.node(node.right).color == Color::Black,
                "RED node {} has a RED child",
                node.key
            );
        }

        let left_bh = self.check_node(node.left, lower, Some(node.key), count)?;
        let right_bh = self.check_node(node.right, Some(node.key), upper, count)?;
        ensure!(
            left_bh == right_bh,
            "black-height mismatch at key {}: left {}, right {}",
            node.key,
            left_bh,
            right_bh
        );

        Ok(left_bh + usize::from(node.color == Color::Black))
    }
}

impl OrderedSet for RbTree {
    fn insert(&mut self, key: Key) -> Result<InsertOutcome> {
        RbTree::insert(self, key)
    }

    fn delete(&mut self, key: Key) -> Result<DeleteOutcome> {
        RbTree::delete(self, key)
    }

    fn contains(&self, key: Key) -> bool {
        RbTree::contains(self, key)
    }

    fn len(&self) -> usize {
        self.size
    }

    fn for_each_in_order(&self, visit: &mut dyn FnMut(Key)) {
        RbTree::for_each_in_order(self, visit);
    }

    fn check_invariants(&self) -> Result<()> {
        RbTree::check_invariants(self)
    }

    fn structure_name(&self) -> &'static str {
        "rbtree"
    }
}
