//! List synchronization.
//!
//! When a case is saved, any free-text value it introduces must appear in
//! the corresponding managed category list so pickers and reports see it
//! immediately. The synchronizer is pure: it takes the current list set
//! by reference and returns a new one, which keeps the caller's
//! rollback-on-failure discipline simple.

use crate::models::{CategoryKey, CategoryListSet, PatientCase};

/// Result of synchronizing one case against the list set.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    /// The (possibly updated) list set.
    pub lists: CategoryListSet,
    /// Keys of the lists that gained a value, in [`CategoryKey::ALL`]
    /// order. Empty when nothing changed.
    pub changed: Vec<CategoryKey>,
}

impl SyncOutcome {
    /// Whether any list changed.
    pub fn is_changed(&self) -> bool {
        !self.changed.is_empty()
    }
}

/// Ensure every non-empty free-text field of `case` is present in its
/// category list (case-insensitive). New values are appended as active
/// items and the affected lists re-sorted.
///
/// Idempotent: running the same case twice reports no change the second
/// time.
pub fn sync_case_into_lists(case: &PatientCase, lists: &CategoryListSet) -> SyncOutcome {
    let mut updated = lists.clone();
    let mut changed = Vec::new();
    for key in CategoryKey::ALL {
        let value = key.field_value(case);
        if updated.insert_value(key, value) {
            changed.push(key);
        }
    }
    SyncOutcome {
        lists: updated,
        changed,
    }
}
