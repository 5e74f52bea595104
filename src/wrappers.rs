// Wrapper Components
// High-level wrappers that layer cross-cutting behavior over any
// `OrderedSet`: tracing for every operation, and full invariant
// re-verification after every mutation.

use anyhow::{Context, Result};
use tracing::debug;
use uuid::Uuid;

use crate::contracts::OrderedSet;
use crate::observability::{log_operation, with_trace_id, Operation, OperationContext};
use crate::types::{DeleteOutcome, InsertOutcome, Key};

/// Wrapper that adds automatic tracing to all operations.
pub struct TracedSet<S: OrderedSet> {
    inner: S,
    trace_id: Uuid,
    operation_count: u64,
}

impl<S: OrderedSet> TracedSet<S> {
    /// Wrap an ordered set with tracing
    pub fn new(inner: S) -> Self {
        let trace_id = Uuid::new_v4();
        debug!("[{}] Tracing {} operations", trace_id, inner.structure_name());
        Self {
            inner,
            trace_id,
            operation_count: 0,
        }
    }

    /// Get the current trace ID
    pub fn trace_id(&self) -> Uuid {
        self.trace_id
    }

    /// Get the number of operations performed
    pub fn operation_count(&self) -> u64 {
        self.operation_count
    }

    /// Unwrap back into the inner structure
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: OrderedSet> OrderedSet for TracedSet<S> {
    fn insert(&mut self, key: Key) -> Result<InsertOutcome> {
        self.operation_count += 1;
        let name = self.inner.structure_name();
        let inner = &mut self.inner;

        with_trace_id("set.insert", || {
            let result = inner.insert(key);

            let mut ctx = OperationContext::new("set.insert");
            ctx.add_attribute("structure", name);
            ctx.add_attribute("key", key.to_string());
            log_operation(
                &ctx,
                &Operation::TreeInsert {
                    structure: name.to_string(),
                    key,
                    inserted: matches!(result, Ok(InsertOutcome::Inserted)),
                },
                &result.as_ref().map(|_| ()).map_err(|e| anyhow::anyhow!("{e}")),
            );

            result
        })
    }

    fn delete(&mut self, key: Key) -> Result<DeleteOutcome> {
        self.operation_count += 1;
        let name = self.inner.structure_name();
        let inner = &mut self.inner;

        with_trace_id("set.delete", || {
            let result = inner.delete(key);

            let mut ctx = OperationContext::new("set.delete");
            ctx.add_attribute("structure", name);
            ctx.add_attribute("key", key.to_string());
            log_operation(
                &ctx,
                &Operation::TreeDelete {
                    structure: name.to_string(),
                    key,
                    deleted: matches!(result, Ok(DeleteOutcome::Deleted)),
                },
                &result.as_ref().map(|_| ()).map_err(|e| anyhow::anyhow!("{e}")),
            );

            result
        })
    }

    fn contains(&self, key: Key) -> bool {
        let found = self.inner.contains(key);
        debug!(
            trace_id = %self.trace_id,
            structure = self.inner.structure_name(),
            key,
            found,
            "set.contains"
        );
        found
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn for_each_in_order(&self, visit: &mut dyn FnMut(Key)) {
        self.inner.for_each_in_order(visit);
    }

    fn check_invariants(&self) -> Result<()> {
        self.inner.check_invariants()
    }

    fn structure_name(&self) -> &'static str {
        self.inner.structure_name()
    }
}

/// Wrapper that re-verifies the wrapped structure's full invariant set
/// after every mutation, and checks the size/outcome postconditions.
/// A violation surfaces as `Err` at the mutation that introduced it.
pub struct CheckedSet<S: OrderedSet> {
    inner: S,
}

impl<S: OrderedSet> CheckedSet<S> {
    pub fn new(inner: S) -> Result<Self> {
        inner
            .check_invariants()
            .context("structure invalid before wrapping")?;
        Ok(Self { inner })
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: OrderedSet> OrderedSet for CheckedSet<S> {
    fn insert(&mut self, key: Key) -> Result<InsertOutcome> {
        let len_before = self.inner.len();
        let outcome = self.inner.insert(key)?;

        self.inner
            .check_invariants()
            .with_context(|| format!("invariants broken by insert({key})"))?;
        let expected = match outcome {
            InsertOutcome::Inserted => len_before + 1,
            InsertOutcome::AlreadyExists => len_before,
        };
        anyhow::ensure!(
            self.inner.len() == expected,
            "insert({key}) reported {outcome:?} but len went {len_before} -> {}",
            self.inner.len()
        );
        anyhow::ensure!(
            self.inner.contains(key),
            "insert({key}) completed but the key is absent"
        );
        Ok(outcome)
    }

    fn delete(&mut self, key: Key) -> Result<DeleteOutcome> {
        let len_before = self.inner.len();
        let outcome = self.inner.delete(key)?;

        self.inner
            .check_invariants()
            .with_context(|| format!("invariants broken by delete({key})"))?;
        let expected = match outcome {
            DeleteOutcome::Deleted => len_before - 1,
            DeleteOutcome::NotFound => len_before,
        };
        anyhow::ensure!(
            self.inner.len() == expected,
            "delete({key}) reported {outcome:?} but len went {len_before} -> {}",
            self.inner.len()
        );
        anyhow::ensure!(
            !self.inner.contains(key),
            "delete({key}) completed but the key is still present"
        );
        Ok(outcome)
    }

    fn contains(&self, key: Key) -> bool {
        self.inner.contains(key)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn for_each_in_order(&self, visit: &mut dyn FnMut(Key)) {
        self.inner.for_each_in_order(visit);
    }

    fn check_invariants(&self) -> Result<()> {
        self.inner.check_invariants()
    }

    fn structure_name(&self) -> &'static str {
        self.inner.structure_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avl::AvlTree;
    use crate::btree::BTree;
    use crate::rbtree::RbTree;

    #[test]
    fn test_traced_set_counts_operations() {
        let mut set = TracedSet::new(AvlTree::new());
        set.insert(1).unwrap();
        set.insert(2).unwrap();
        set.delete(1).unwrap();
        assert_eq!(set.operation_count(), 3);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_checked_set_passes_on_valid_engine() {
        let mut set = CheckedSet::new(RbTree::new()).unwrap();
        for k in [5, 1, 9, 3, 7] {
            assert!(set.insert(k).unwrap().is_inserted());
        }
        for k in [1, 9] {
            assert!(set.delete(k).unwrap().is_deleted());
        }
        assert_eq!(set.keys_in_order(), vec![3, 5, 7]);
    }

    #[test]
    fn test_checked_set_reports_misses() {
        let mut set = CheckedSet::new(BTree::new(2).unwrap()).unwrap();
        set.insert(4).unwrap();
        assert_eq!(set.insert(4).unwrap(), InsertOutcome::AlreadyExists);
        assert_eq!(set.delete(5).unwrap(), DeleteOutcome::NotFound);
    }

    #[test]
    fn test_wrappers_compose() {
        let mut set = TracedSet::new(CheckedSet::new(AvlTree::new()).unwrap());
        for k in 0..20 {
            set.insert(k).unwrap();
        }
        for k in (0..20).step_by(2) {
            set.delete(k).unwrap();
        }
        assert_eq!(set.len(), 10);
        set.check_invariants().unwrap();
    }
}
