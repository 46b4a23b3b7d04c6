//! Managed category lists.
//!
//! Nine free-text case attributes are each backed by a managed list of
//! known values. Lists stay sorted ascending (case-insensitive) after
//! every mutation; values referenced by historical cases are deactivated
//! rather than deleted, except through the explicit permanent-removal
//! action.

use serde::{Deserialize, Serialize};

use crate::models::PatientCase;

/// A single entry in a category list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// The value, unique case-insensitively within its list.
    pub value: String,
    /// Inactive items are hidden from pickers but keep their meaning for
    /// historical cases.
    pub active: bool,
}

impl ListItem {
    /// A new active entry.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            active: true,
        }
    }
}

/// Identifies one of the nine managed category lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryKey {
    Coordinators,
    Cities,
    Physicians,
    Insurers,
    Institutions,
    DispensingPoints,
    Indications,
    Distributors,
    Dosages,
}

impl CategoryKey {
    /// All category keys, in wire order.
    pub const ALL: [CategoryKey; 9] = [
        CategoryKey::Coordinators,
        CategoryKey::Cities,
        CategoryKey::Physicians,
        CategoryKey::Insurers,
        CategoryKey::Institutions,
        CategoryKey::DispensingPoints,
        CategoryKey::Indications,
        CategoryKey::Distributors,
        CategoryKey::Dosages,
    ];

    /// Wire name of the list, as used by the store's `updateList` action.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKey::Coordinators => "coordinators",
            CategoryKey::Cities => "cities",
            CategoryKey::Physicians => "physicians",
            CategoryKey::Insurers => "insurers",
            CategoryKey::Institutions => "institutions",
            CategoryKey::DispensingPoints => "dispensingPoints",
            CategoryKey::Indications => "indications",
            CategoryKey::Distributors => "distributors",
            CategoryKey::Dosages => "dosages",
        }
    }

    /// The case field this list backs.
    pub fn field_value<'a>(&self, case: &'a PatientCase) -> &'a str {
        match self {
            CategoryKey::Coordinators => &case.coordinator,
            CategoryKey::Cities => &case.city,
            CategoryKey::Physicians => &case.physician,
            CategoryKey::Insurers => &case.insurer,
            CategoryKey::Institutions => &case.institution,
            CategoryKey::DispensingPoints => &case.dispensing_point,
            CategoryKey::Indications => &case.indication,
            CategoryKey::Distributors => &case.distributor,
            CategoryKey::Dosages => &case.dosage,
        }
    }
}

impl std::fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full set of nine managed category lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryListSet {
    pub coordinators: Vec<ListItem>,
    pub cities: Vec<ListItem>,
    pub physicians: Vec<ListItem>,
    pub insurers: Vec<ListItem>,
    pub institutions: Vec<ListItem>,
    pub dispensing_points: Vec<ListItem>,
    pub indications: Vec<ListItem>,
    pub distributors: Vec<ListItem>,
    pub dosages: Vec<ListItem>,
}

impl CategoryListSet {
    /// Items of one list.
    pub fn items(&self, key: CategoryKey) -> &[ListItem] {
        match key {
            CategoryKey::Coordinators => &self.coordinators,
            CategoryKey::Cities => &self.cities,
            CategoryKey::Physicians => &self.physicians,
            CategoryKey::Insurers => &self.insurers,
            CategoryKey::Institutions => &self.institutions,
            CategoryKey::DispensingPoints => &self.dispensing_points,
            CategoryKey::Indications => &self.indications,
            CategoryKey::Distributors => &self.distributors,
            CategoryKey::Dosages => &self.dosages,
        }
    }

    fn items_mut(&mut self, key: CategoryKey) -> &mut Vec<ListItem> {
        match key {
            CategoryKey::Coordinators => &mut self.coordinators,
            CategoryKey::Cities => &mut self.cities,
            CategoryKey::Physicians => &mut self.physicians,
            CategoryKey::Insurers => &mut self.insurers,
            CategoryKey::Institutions => &mut self.institutions,
            CategoryKey::DispensingPoints => &mut self.dispensing_points,
            CategoryKey::Indications => &mut self.indications,
            CategoryKey::Distributors => &mut self.distributors,
            CategoryKey::Dosages => &mut self.dosages,
        }
    }

    /// Replace one list wholesale, restoring the sort invariant.
    pub fn set_items(&mut self, key: CategoryKey, items: Vec<ListItem>) {
        let list = self.items_mut(key);
        *list = items;
        sort_items(list);
    }

    /// Case-insensitive presence check.
    pub fn contains_value(&self, key: CategoryKey, value: &str) -> bool {
        let needle = value.trim().to_lowercase();
        self.items(key)
            .iter()
            .any(|item| item.value.to_lowercase() == needle)
    }

    /// Add a new active value if absent (case-insensitive). Returns whether
    /// the list changed. The list is re-sorted after insertion.
    pub fn insert_value(&mut self, key: CategoryKey, value: &str) -> bool {
        let clean = value.trim();
        if clean.is_empty() || self.contains_value(key, clean) {
            return false;
        }
        let list = self.items_mut(key);
        list.push(ListItem::new(clean));
        sort_items(list);
        true
    }

    /// Mark a value inactive, preserving it for historical references.
    /// Returns whether anything changed.
    pub fn deactivate_value(&mut self, key: CategoryKey, value: &str) -> bool {
        let needle = value.trim().to_lowercase();
        let mut changed = false;
        for item in self.items_mut(key).iter_mut() {
            if item.value.to_lowercase() == needle && item.active {
                item.active = false;
                changed = true;
            }
        }
        changed
    }

    /// Permanently remove a value. Prefer [`Self::deactivate_value`];
    /// removal is the explicit destructive path only.
    pub fn remove_value(&mut self, key: CategoryKey, value: &str) -> bool {
        let needle = value.trim().to_lowercase();
        let list = self.items_mut(key);
        let before = list.len();
        list.retain(|item| item.value.to_lowercase() != needle);
        list.len() != before
    }

    /// True when every list is empty, which signals that the backing store
    /// has not been provisioned yet.
    pub fn is_unprovisioned(&self) -> bool {
        CategoryKey::ALL.iter().all(|k| self.items(*k).is_empty())
    }
}

/// Sort a list ascending by value, case-insensitively; original casing is
/// the tiebreaker so ordering stays deterministic.
fn sort_items(items: &mut [ListItem]) {
    items.sort_by(|a, b| {
        a.value
            .to_lowercase()
            .cmp(&b.value.to_lowercase())
            .then_with(|| a.value.cmp(&b.value))
    });
}
