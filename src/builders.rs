// Builder Patterns
// Fluent builder APIs for the structures whose construction takes more
// than a key: the B-tree (degree + seed keys) and the graph (vertex
// count, directedness, edge list).

use anyhow::{anyhow, Result};

use crate::btree::BTree;
use crate::graph::Graph;
use crate::types::Key;

/// Fluent builder for a B-tree seeded with keys.
pub struct BTreeBuilder {
    degree: Option<usize>,
    keys: Vec<Key>,
}

impl BTreeBuilder {
    pub fn new() -> Self {
        Self {
            degree: None,
            keys: Vec::new(),
        }
    }

    /// Set the minimum degree (validated at `build`).
    pub fn degree(mut self, t: usize) -> Self {
        self.degree = Some(t);
        self
    }

    /// Add one seed key.
    pub fn key(mut self, key: Key) -> Self {
        self.keys.push(key);
        self
    }

    /// Add several seed keys.
    pub fn keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.keys.extend(keys);
        self
    }

    /// Build the tree and insert every seed key. Duplicates among the
    /// seeds collapse silently, matching insert semantics.
    pub fn build(self) -> Result<BTree> {
        let degree = self
            .degree
            .ok_or_else(|| anyhow!("B-tree minimum degree is required"))?;
        let mut tree = BTree::new(degree)?;
        for key in self.keys {
            tree.insert(key)?;
        }
        Ok(tree)
    }
}

impl Default for BTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent builder for a graph with its edge list.
pub struct GraphBuilder {
    vertices: Option<usize>,
    directed: bool,
    edges: Vec<(usize, usize, i64)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            vertices: None,
            directed: false,
            edges: Vec::new(),
        }
    }

    /// Set the vertex count (validated at `build`).
    pub fn vertices(mut self, count: usize) -> Self {
        self.vertices = Some(count);
        self
    }

    pub fn directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    /// Add a weighted edge.
    pub fn edge(mut self, src: usize, dest: usize, weight: i64) -> Self {
        self.edges.push((src, dest, weight));
        self
    }

    /// Build the graph and add every recorded edge.
    pub fn build(self) -> Result<Graph> {
        let vertices = self
            .vertices
            .ok_or_else(|| anyhow!("Graph vertex count is required"))?;
        let mut graph = Graph::new(vertices, self.directed)?;
        for (src, dest, weight) in self.edges {
            graph.add_edge(src, dest, weight)?;
        }
        Ok(graph)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_btree_builder() {
        let tree = BTreeBuilder::new()
            .degree(2)
            .keys([10, 20, 5, 15])
            .build()
            .unwrap();
        assert_eq!(tree.len(), 4);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_btree_builder_requires_degree() {
        assert!(BTreeBuilder::new().key(1).build().is_err());
        assert!(BTreeBuilder::new().degree(1).build().is_err());
    }

    #[test]
    fn test_btree_builder_collapses_duplicates() {
        let tree = BTreeBuilder::new()
            .degree(2)
            .keys([1, 2, 2, 3, 3, 3])
            .build()
            .unwrap();
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_graph_builder() {
        let graph = GraphBuilder::new()
            .vertices(3)
            .directed(true)
            .edge(0, 1, 5)
            .edge(1, 2, 7)
            .build()
            .unwrap();
        assert_eq!(graph.num_vertices(), 3);
        assert!(graph.is_directed());
    }

    #[test]
    fn test_graph_builder_rejects_bad_edges() {
        let result = GraphBuilder::new().vertices(2).edge(0, 9, 1).build();
        assert!(result.is_err());
    }
}
