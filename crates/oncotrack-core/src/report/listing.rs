//! Case listing reports (general and followup).

use serde::{Deserialize, Serialize};

use super::{escape_csv, ReportKind};
use crate::dates::{self, YearMonth};
use crate::models::PatientCase;

/// One case, flattened for tabular rendering. Dates are canonicalized
/// with the display fallback: unparseable values appear as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRow {
    pub id: String,
    pub coordinator: String,
    pub city: String,
    pub enrollment: String,
    pub discharge: String,
    /// Whole months of treatment; `None` when indeterminate.
    pub months: Option<u32>,
    pub physician: String,
    pub institution: String,
    pub insurer: String,
    pub status: String,
}

impl ListingRow {
    fn from_case(case: &PatientCase, now: YearMonth) -> Self {
        Self {
            id: case.id.clone(),
            coordinator: case.coordinator.clone(),
            city: case.city.clone(),
            enrollment: dates::normalize_for_display(Some(&case.enrollment_date)),
            discharge: dates::normalize_for_display(case.discharge_date.as_deref()),
            months: case.duration_months_at(now),
            physician: case.physician.clone(),
            institution: case.institution.clone(),
            insurer: case.insurer.clone(),
            status: case.status.to_string(),
        }
    }

    fn months_display(&self) -> String {
        match self.months {
            Some(m) => m.to_string(),
            None => "-".to_string(),
        }
    }
}

/// A tabular report over a filtered case collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseListingReport {
    pub title: String,
    /// Export timestamp, RFC 3339.
    pub generated_at: String,
    pub record_count: usize,
    pub rows: Vec<ListingRow>,
    #[serde(skip)]
    kind: ReportKind,
}

impl CaseListingReport {
    /// General listing, durations evaluated at `now`.
    pub fn general_at(cases: &[PatientCase], now: YearMonth) -> Self {
        Self::build(ReportKind::General, cases, now)
    }

    /// General listing against the current calendar month.
    pub fn general(cases: &[PatientCase]) -> Self {
        Self::general_at(cases, YearMonth::now())
    }

    /// Followup listing, durations evaluated at `now`.
    pub fn followup_at(cases: &[PatientCase], now: YearMonth) -> Self {
        Self::build(ReportKind::Followup, cases, now)
    }

    /// Followup listing against the current calendar month.
    pub fn followup(cases: &[PatientCase]) -> Self {
        Self::followup_at(cases, YearMonth::now())
    }

    fn build(kind: ReportKind, cases: &[PatientCase], now: YearMonth) -> Self {
        Self {
            title: kind.title().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            record_count: cases.len(),
            rows: cases.iter().map(|c| ListingRow::from_case(c, now)).collect(),
            kind,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV. The general listing carries the full institutional
    /// columns; the followup listing focuses on the duration track.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        match self.kind {
            ReportKind::Followup => {
                csv.push_str("id,coordinator,physician,enrollment,discharge,months,status\n");
                for row in &self.rows {
                    csv.push_str(&format!(
                        "{},{},{},{},{},{},{}\n",
                        escape_csv(&row.id),
                        escape_csv(&row.coordinator),
                        escape_csv(&row.physician),
                        escape_csv(&row.enrollment),
                        escape_csv(&row.discharge),
                        row.months_display(),
                        escape_csv(&row.status),
                    ));
                }
            }
            _ => {
                csv.push_str(
                    "id,coordinator,city,enrollment,months,physician,institution,insurer,status\n",
                );
                for row in &self.rows {
                    csv.push_str(&format!(
                        "{},{},{},{},{},{},{},{},{}\n",
                        escape_csv(&row.id),
                        escape_csv(&row.coordinator),
                        escape_csv(&row.city),
                        escape_csv(&row.enrollment),
                        row.months_display(),
                        escape_csv(&row.physician),
                        escape_csv(&row.institution),
                        escape_csv(&row.insurer),
                        escape_csv(&row.status),
                    ));
                }
            }
        }
        csv
    }
}
