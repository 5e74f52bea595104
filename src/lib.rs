// Arboretum - A Teaching Collection of Classic Data Structures
// Root library module

pub mod observability;
pub mod contracts;
pub mod validation;
pub mod types;
pub mod builders;
pub mod wrappers;

pub mod avl;
pub mod bst;
pub mod btree;
pub mod rbtree;

pub mod graph;
pub mod huffman;
pub mod list;

// Re-export key types
pub use observability::{
    init_logging,
    Operation,
    MetricType,
    log_operation,
    record_metric,
    with_trace_id,
};

pub use contracts::OrderedSet;

// Re-export validated types
pub use types::{
    Key,
    InsertOutcome,
    DeleteOutcome,
    ValidatedDegree,
    ValidatedVertexCount,
};

// Re-export the tree engines
pub use avl::{AvlNode, AvlTree};
pub use bst::{Bst, BstNode};
pub use btree::{BTree, BTreeNode};
pub use rbtree::{Color, RbTree};

// Re-export the supplementary structures
pub use graph::{BellmanFordOutcome, Edge, Graph, ShortestPaths};
pub use huffman::{symbol_frequencies, EncodedData, HuffmanCodec};
pub use list::LinkedList;

// Re-export builders
pub use builders::{BTreeBuilder, GraphBuilder};

// Re-export wrappers
pub use wrappers::{CheckedSet, TracedSet};
