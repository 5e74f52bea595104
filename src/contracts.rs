// Contracts Module - Contract-First Design
// Defines the shared interface every key-ordered structure in the crate
// honors, with its pre- and postconditions spelled out once.

use anyhow::Result;

use crate::types::{DeleteOutcome, InsertOutcome, Key};

/// Core contract for an ordered set of integer keys.
///
/// Every implementation guarantees, after any sequence of operations:
/// - the in-order key sequence is strictly increasing;
/// - `len()` equals the number of keys reachable from the root;
/// - `check_invariants()` passes (each structure adds its own balance,
///   coloring, or occupancy conditions on top of the two above).
///
/// Operations on an already-present key (insert) or an absent key
/// (delete) leave the structure unchanged and report the miss through
/// the outcome enum, never through `Err`. `Err` is reserved for invalid
/// arguments and internal defects.
pub trait OrderedSet {
    /// Insert a key. Postcondition: the key is present, and
    /// `len()` increased by one iff the outcome is `Inserted`.
    fn insert(&mut self, key: Key) -> Result<InsertOutcome>;

    /// Delete a key. Postcondition: the key is absent, and
    /// `len()` decreased by one iff the outcome is `Deleted`.
    fn delete(&mut self, key: Key) -> Result<DeleteOutcome>;

    /// Whether a key is present. Never mutates.
    fn contains(&self, key: Key) -> bool;

    /// Number of keys currently stored.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit every key in ascending order.
    fn for_each_in_order(&self, visit: &mut dyn FnMut(Key));

    /// Verify the structure's full invariant set.
    ///
    /// Returns `Err` describing the first violation found. This is the
    /// de facto specification of correctness: the test suites call it
    /// after every mutation.
    fn check_invariants(&self) -> Result<()>;

    /// Collect the in-order key sequence.
    fn keys_in_order(&self) -> Vec<Key> {
        let mut keys = Vec::with_capacity(self.len());
        self.for_each_in_order(&mut |k| keys.push(k));
        keys
    }

    /// Short structure name used in logs and metrics.
    fn structure_name(&self) -> &'static str;
}
