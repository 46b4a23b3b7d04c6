//! Case store contract and the in-memory implementation.
//!
//! The store is the single persistence boundary: everything above it
//! (the [`Session`](crate::session::Session), the core engine) is
//! backend-agnostic. [`MemoryStore`] backs tests and offline use;
//! [`SheetStore`](crate::script::SheetStore) speaks the spreadsheet
//! script's wire protocol.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use oncotrack_core::models::{CategoryKey, CategoryListSet, ListItem, PatientCase};

/// Errors from store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The HTTP request itself failed (network, timeout, bad status).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered but reported a failure.
    #[error("store rejected the operation: {0}")]
    Rejected(String),

    /// The backend answered with a body we could not decode.
    #[error("failed to decode store response: {0}")]
    Decode(#[from] serde_json::Error),

    /// No endpoint has been configured for this store.
    #[error("store endpoint not configured")]
    NotConfigured,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the backend holds: the case collection and the nine
/// category lists, fetched in one round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub cases: Vec<PatientCase>,
    #[serde(default)]
    pub lists: CategoryListSet,
}

/// Outcome of backend provisioning.
#[derive(Debug, Clone, Deserialize)]
pub struct SetupOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// The persistence contract for case data.
///
/// No partial reads: [`fetch_all`](CaseStore::fetch_all) returns the
/// whole snapshot. Writes are last-writer-wins per record; callers that
/// need freshness re-fetch after writing.
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Fetch all cases and category lists.
    async fn fetch_all(&self) -> StoreResult<Snapshot>;

    /// Insert or replace one case, keyed by id.
    async fn save_case(&self, case: &PatientCase) -> StoreResult<()>;

    /// Delete one case by id. Deleting an unknown id is not an error.
    async fn delete_case(&self, id: &str) -> StoreResult<()>;

    /// Replace one category list wholesale.
    async fn update_list(&self, key: CategoryKey, items: &[ListItem]) -> StoreResult<()>;

    /// Provision the backend's storage structure.
    async fn setup_database(&self) -> StoreResult<SetupOutcome>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    snapshot: Snapshot,
    /// Ordered record of every write, for assertions on operation order.
    operations: Vec<String>,
    fail_save: bool,
    fail_delete: bool,
    fail_update_list: bool,
}

/// In-memory [`CaseStore`]. Writes can be made to fail on demand so
/// rollback behavior is testable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                snapshot,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current stored state.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot.clone()
    }

    /// Write operations seen so far, in order, as `"op:arg"` strings.
    pub fn operations(&self) -> Vec<String> {
        self.lock().operations.clone()
    }

    pub fn fail_next_save(&self, fail: bool) {
        self.lock().fail_save = fail;
    }

    pub fn fail_next_delete(&self, fail: bool) {
        self.lock().fail_delete = fail;
    }

    pub fn fail_list_updates(&self, fail: bool) {
        self.lock().fail_update_list = fail;
    }
}

#[async_trait]
impl CaseStore for MemoryStore {
    async fn fetch_all(&self) -> StoreResult<Snapshot> {
        Ok(self.lock().snapshot.clone())
    }

    async fn save_case(&self, case: &PatientCase) -> StoreResult<()> {
        let mut inner = self.lock();
        if inner.fail_save {
            inner.fail_save = false;
            return Err(StoreError::Rejected("save refused".into()));
        }
        inner.operations.push(format!("saveCase:{}", case.id));
        let cases = &mut inner.snapshot.cases;
        match cases.iter_mut().find(|c| c.id == case.id) {
            Some(existing) => *existing = case.clone(),
            None => cases.push(case.clone()),
        }
        Ok(())
    }

    async fn delete_case(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.lock();
        if inner.fail_delete {
            inner.fail_delete = false;
            return Err(StoreError::Rejected("delete refused".into()));
        }
        inner.operations.push(format!("deleteCase:{id}"));
        inner.snapshot.cases.retain(|c| c.id != id);
        Ok(())
    }

    async fn update_list(&self, key: CategoryKey, items: &[ListItem]) -> StoreResult<()> {
        let mut inner = self.lock();
        if inner.fail_update_list {
            return Err(StoreError::Rejected("list update refused".into()));
        }
        inner.operations.push(format!("updateList:{}", key.as_str()));
        inner.snapshot.lists.set_items(key, items.to_vec());
        Ok(())
    }

    async fn setup_database(&self) -> StoreResult<SetupOutcome> {
        self.lock().operations.push("setupDatabase".into());
        Ok(SetupOutcome {
            success: true,
            message: "memory store ready".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oncotrack_core::models::{CaseStatus, Sector};

    fn case(id: &str) -> PatientCase {
        PatientCase {
            id: id.into(),
            coordinator: "Ana".into(),
            city: "Lima".into(),
            physician: "Dr. Soto".into(),
            insurer: "Rimac".into(),
            sector: Sector::Public,
            institution: "INEN".into(),
            dispensing_point: "Farmacia".into(),
            distributor: "QS".into(),
            indication: "QSDB03".into(),
            dosage: "100mg".into(),
            enrollment_date: "2024-01".into(),
            discharge_date: None,
            status: CaseStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_save_inserts_then_replaces() {
        let store = MemoryStore::new();
        store.save_case(&case("1")).await.unwrap();

        let mut updated = case("1");
        updated.city = "Cusco".into();
        store.save_case(&updated).await.unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.cases.len(), 1);
        assert_eq!(snapshot.cases[0].city, "Cusco");
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_ok() {
        let store = MemoryStore::new();
        store.save_case(&case("1")).await.unwrap();
        store.delete_case("99").await.unwrap();
        assert_eq!(store.snapshot().cases.len(), 1);
    }

    #[tokio::test]
    async fn test_injected_save_failure_clears_after_firing() {
        let store = MemoryStore::new();
        store.fail_next_save(true);
        assert!(store.save_case(&case("1")).await.is_err());
        assert!(store.save_case(&case("1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_list_replaces_wholesale() {
        let store = MemoryStore::new();
        let items = vec![ListItem::new("Ana"), ListItem::new("Zoe")];
        store
            .update_list(CategoryKey::Coordinators, &items)
            .await
            .unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.lists.items(CategoryKey::Coordinators), &items[..]);
        assert_eq!(store.operations(), vec!["updateList:coordinators"]);
    }
}
