//! Case filtering.
//!
//! A [`FilterCriteria`] is a set of independent optional predicates, each
//! defaulting to "no restriction". Active predicates combine with logical
//! AND; filtering preserves the original relative order and never mutates
//! the input. Everything is a linear scan, which is plenty at the
//! expected scale of hundreds to low thousands of records.

use crate::dates;
use crate::models::{CaseStatus, PatientCase, Sector};

/// Optional predicates over a case collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive substring match against coordinator, physician, or
    /// id. An empty term matches everything.
    pub text_search: Option<String>,
    /// Inclusive lower bound on the normalized enrollment year-month.
    /// Accepts any date-like value; it is normalized before comparison.
    pub date_range_start: Option<String>,
    /// Inclusive upper bound on the normalized enrollment year-month.
    pub date_range_end: Option<String>,
    pub sector: Option<Sector>,
    pub status: Option<CaseStatus>,
    pub coordinator: Option<String>,
    pub insurer: Option<String>,
    pub city: Option<String>,
    pub institution: Option<String>,
    pub physician: Option<String>,
}

impl FilterCriteria {
    /// Whether a case passes every active predicate.
    pub fn matches(&self, case: &PatientCase) -> bool {
        self.matches_text(case)
            && self.matches_date_range(case)
            && self.sector.map_or(true, |s| case.sector == s)
            && self.status.map_or(true, |s| case.status == s)
            && matches_category(self.coordinator.as_deref(), &case.coordinator)
            && matches_category(self.insurer.as_deref(), &case.insurer)
            && matches_category(self.city.as_deref(), &case.city)
            && matches_category(self.institution.as_deref(), &case.institution)
            && matches_category(self.physician.as_deref(), &case.physician)
    }

    fn matches_text(&self, case: &PatientCase) -> bool {
        let term = match self.text_search.as_deref() {
            Some(t) if !t.is_empty() => t.to_lowercase(),
            _ => return true,
        };
        case.coordinator.to_lowercase().contains(&term)
            || case.physician.to_lowercase().contains(&term)
            || case.id.contains(term.as_str())
    }

    fn matches_date_range(&self, case: &PatientCase) -> bool {
        let start = dates::normalize(self.date_range_start.as_deref());
        let end = dates::normalize(self.date_range_end.as_deref());
        if start.is_none() && end.is_none() {
            return true;
        }
        // A case whose enrollment date cannot be canonicalized is
        // suppressed from date-bounded views.
        let case_date = match case.normalized_enrollment() {
            Some(d) => d,
            None => return false,
        };
        // Lexicographic compare is valid: the canonical form is
        // zero-padded and fixed-width.
        start.map_or(true, |s| case_date >= s) && end.map_or(true, |e| case_date <= e)
    }
}

/// Trimmed, case-insensitive equality for a free-text categorical
/// predicate. `None` means no restriction.
fn matches_category(wanted: Option<&str>, actual: &str) -> bool {
    match wanted {
        Some(w) => actual.trim().to_lowercase() == w.trim().to_lowercase(),
        None => true,
    }
}

/// Apply criteria to a collection, returning the passing cases in their
/// original relative order.
pub fn filter_cases(cases: &[PatientCase], criteria: &FilterCriteria) -> Vec<PatientCase> {
    cases
        .iter()
        .filter(|c| criteria.matches(c))
        .cloned()
        .collect()
}
