// Validation Layer
// Runtime enforcement of boundary contracts: every invalid argument is
// rejected here with a structured error before it can reach an engine.

use anyhow::{bail, Result};
use std::collections::HashMap;

/// Validation errors with detailed context
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Precondition failed: {condition}")]
    PreconditionFailed { condition: String, context: String },

    #[error("Postcondition failed: {condition}")]
    PostconditionFailed { condition: String, context: String },

    #[error("Invariant violated: {invariant}")]
    InvariantViolated { invariant: String, state: String },

    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },
}

/// Validation context for better error messages
#[derive(Clone)]
pub struct ValidationContext {
    operation: String,
    attributes: HashMap<String, String>,
}

impl ValidationContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn validate(self, condition: bool, message: &str) -> Result<()> {
        if !condition {
            let context = format!(
                "Operation: {}, Attributes: {:?}",
                self.operation, self.attributes
            );
            bail!(ValidationError::PreconditionFailed {
                condition: message.to_string(),
                context,
            });
        }
        Ok(())
    }
}

/// Tree parameter validation
pub mod tree {
    use super::*;

    /// Validate a B-tree minimum degree.
    ///
    /// A degree below 2 cannot satisfy the occupancy bounds: a node would
    /// be required to hold between 0 and 1 keys, which makes splits and
    /// merges degenerate.
    pub fn validate_degree(t: usize) -> Result<()> {
        let ctx = ValidationContext::new("validate_degree").with_attribute("t", t.to_string());
        ctx.validate(t >= 2, "B-tree minimum degree must be at least 2")
    }
}

/// Graph parameter validation
pub mod graph {
    use super::*;

    /// Validate a vertex index against the graph's vertex count.
    pub fn validate_vertex(vertex: usize, num_vertices: usize) -> Result<()> {
        if vertex >= num_vertices {
            bail!(ValidationError::InvalidInput {
                field: "vertex".to_string(),
                reason: format!("index {vertex} out of range for {num_vertices} vertices"),
            });
        }
        Ok(())
    }
}
