// Validated Types
// Strongly-typed wrappers that enforce invariants at construction time.
// These types cannot hold invalid data, eliminating boundary checks at
// every call site deeper in the engines.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The key type shared by every ordered structure in this crate.
///
/// Keys are fixed-width signed integers with their natural total order.
/// No structure permits duplicate keys.
pub type Key = i64;

/// Result of an insert operation.
///
/// A key that is already present is a normal negative result, not an
/// error; the tree is left untouched in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

impl InsertOutcome {
    pub fn is_inserted(self) -> bool {
        matches!(self, InsertOutcome::Inserted)
    }
}

/// Result of a delete operation.
///
/// An absent key is a normal negative result; the tree is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

impl DeleteOutcome {
    pub fn is_deleted(self) -> bool {
        matches!(self, DeleteOutcome::Deleted)
    }
}

/// A B-tree minimum degree that is guaranteed to be valid.
///
/// # Invariants
/// - `t >= 2` (a degree-1 tree cannot satisfy the occupancy bounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedDegree {
    inner: usize,
}

impl ValidatedDegree {
    /// Create a new validated minimum degree
    pub fn new(t: usize) -> Result<Self> {
        crate::validation::tree::validate_degree(t)?;
        Ok(Self { inner: t })
    }

    /// Get the inner degree value
    pub fn get(&self) -> usize {
        self.inner
    }

    /// Maximum keys a node may hold: `2t - 1`
    pub fn max_keys(&self) -> usize {
        2 * self.inner - 1
    }

    /// Minimum keys a non-root node must hold: `t - 1`
    pub fn min_keys(&self) -> usize {
        self.inner - 1
    }
}

impl fmt::Display for ValidatedDegree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// A graph vertex count that is guaranteed to be positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedVertexCount {
    inner: usize,
}

impl ValidatedVertexCount {
    /// Create a new validated vertex count
    pub fn new(count: usize) -> Result<Self> {
        ensure!(count > 0, "Graph must have at least one vertex");
        Ok(Self { inner: count })
    }

    /// Get the inner count
    pub fn get(&self) -> usize {
        self.inner
    }
}

impl fmt::Display for ValidatedVertexCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}
