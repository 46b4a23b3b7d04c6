//! Client session: local working state over a [`CaseStore`].
//!
//! The session keeps the full snapshot in memory and applies writes
//! optimistically: local state changes first, the store call follows,
//! and a rejected store call rolls the local change back. Category-list
//! synchronization runs before the case itself is saved, so the lists
//! never lag the case data; a failed list write is logged and swallowed
//! because the case save matters more than picker freshness.

use oncotrack_core::dates::YearMonth;
use oncotrack_core::models::{CaseDraft, CategoryKey, CategoryListSet, ListItem, PatientCase};
use oncotrack_core::sync::sync_case_into_lists;

use crate::store::{CaseStore, SetupOutcome, Snapshot, StoreResult};

/// Local working state bound to one store.
#[derive(Debug)]
pub struct Session<S> {
    store: S,
    cases: Vec<PatientCase>,
    lists: CategoryListSet,
}

impl<S: CaseStore> Session<S> {
    /// An empty session; call [`refresh`](Self::refresh) to load data.
    pub fn new(store: S) -> Self {
        Self {
            store,
            cases: Vec::new(),
            lists: CategoryListSet::default(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current case collection, in store order.
    pub fn cases(&self) -> &[PatientCase] {
        &self.cases
    }

    /// Current category lists.
    pub fn lists(&self) -> &CategoryListSet {
        &self.lists
    }

    /// Whether the backend looks unprovisioned (every list empty).
    pub fn needs_setup(&self) -> bool {
        self.lists.is_unprovisioned()
    }

    /// Replace local state with the store's snapshot. Last writer wins:
    /// any local edits not yet persisted are discarded.
    pub async fn refresh(&mut self) -> StoreResult<()> {
        let Snapshot { cases, lists } = self.store.fetch_all().await?;
        self.cases = cases;
        self.lists = lists;
        Ok(())
    }

    /// Create a case from form data. Assigns the next id, enforces the
    /// discharge-date invariant, syncs the category lists, then persists.
    /// Returns the assigned id.
    pub async fn add_case(&mut self, draft: CaseDraft) -> StoreResult<String> {
        let id = PatientCase::next_id(&self.cases);
        let mut case = draft.into_case(id.clone());
        case.enforce_status_dates(YearMonth::now());

        self.sync_lists_for(&case).await;

        let snapshot = self.cases.clone();
        self.cases.push(case.clone());
        if let Err(err) = self.store.save_case(&case).await {
            self.cases = snapshot;
            return Err(err);
        }
        Ok(id)
    }

    /// Persist an edited case, replacing the record with the same id.
    pub async fn update_case(&mut self, mut case: PatientCase) -> StoreResult<()> {
        case.enforce_status_dates(YearMonth::now());

        self.sync_lists_for(&case).await;

        let snapshot = self.cases.clone();
        match self.cases.iter_mut().find(|c| c.id == case.id) {
            Some(existing) => *existing = case.clone(),
            None => self.cases.push(case.clone()),
        }
        if let Err(err) = self.store.save_case(&case).await {
            self.cases = snapshot;
            return Err(err);
        }
        Ok(())
    }

    /// Delete a case by id.
    pub async fn delete_case(&mut self, id: &str) -> StoreResult<()> {
        let snapshot = self.cases.clone();
        self.cases.retain(|c| c.id != id);
        if let Err(err) = self.store.delete_case(id).await {
            self.cases = snapshot;
            return Err(err);
        }
        Ok(())
    }

    /// Replace one category list wholesale.
    pub async fn update_list(
        &mut self,
        key: CategoryKey,
        items: Vec<ListItem>,
    ) -> StoreResult<()> {
        let snapshot = self.lists.clone();
        self.lists.set_items(key, items);
        if let Err(err) = self.store.update_list(key, self.lists.items(key)).await {
            self.lists = snapshot;
            return Err(err);
        }
        Ok(())
    }

    /// Hide a list value from pickers without losing it for historical
    /// cases.
    pub async fn deactivate_list_value(
        &mut self,
        key: CategoryKey,
        value: &str,
    ) -> StoreResult<()> {
        let snapshot = self.lists.clone();
        if !self.lists.deactivate_value(key, value) {
            return Ok(());
        }
        if let Err(err) = self.store.update_list(key, self.lists.items(key)).await {
            self.lists = snapshot;
            return Err(err);
        }
        Ok(())
    }

    /// Permanently remove a list value.
    pub async fn remove_list_value(&mut self, key: CategoryKey, value: &str) -> StoreResult<()> {
        let snapshot = self.lists.clone();
        if !self.lists.remove_value(key, value) {
            return Ok(());
        }
        if let Err(err) = self.store.update_list(key, self.lists.items(key)).await {
            self.lists = snapshot;
            return Err(err);
        }
        Ok(())
    }

    /// Provision the backend.
    pub async fn setup_database(&self) -> StoreResult<SetupOutcome> {
        self.store.setup_database().await
    }

    /// Push any list values the case introduces, before the case itself
    /// is saved. Per-list failures are logged and swallowed; the local
    /// lists keep the synced values either way.
    async fn sync_lists_for(&mut self, case: &PatientCase) {
        let outcome = sync_case_into_lists(case, &self.lists);
        if !outcome.is_changed() {
            return;
        }
        for key in &outcome.changed {
            if let Err(err) = self.store.update_list(*key, outcome.lists.items(*key)).await {
                tracing::warn!(list = %key, error = %err, "category list sync failed");
            }
        }
        self.lists = outcome.lists;
    }
}
