//! Patient case models.

use serde::{Deserialize, Serialize};

use crate::dates::YearMonth;

/// Treatment status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStatus {
    /// Patient is currently in treatment.
    #[serde(rename = "ACTIVE", alias = "ACTIVO")]
    Active,
    /// Patient has been discharged.
    #[serde(rename = "DISCHARGED", alias = "BAJA")]
    Discharged,
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseStatus::Active => write!(f, "ACTIVE"),
            CaseStatus::Discharged => write!(f, "DISCHARGED"),
        }
    }
}

/// Healthcare sector of the treating institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    #[serde(rename = "Public", alias = "Público")]
    Public,
    #[serde(rename = "Private", alias = "Privado")]
    Private,
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sector::Public => write!(f, "Public"),
            Sector::Private => write!(f, "Private"),
        }
    }
}

/// One patient's treatment episode.
///
/// Date fields are raw strings as stored by the spreadsheet backend; the
/// store's historical data mixes formats, so canonicalization happens on
/// demand via [`crate::dates`] rather than at the type boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientCase {
    /// Unique opaque id, numeric-looking, assigned by the client on create.
    pub id: String,
    /// Assigned treatment coordinator.
    pub coordinator: String,
    pub city: String,
    pub physician: String,
    pub insurer: String,
    /// Public or Private sector.
    pub sector: Sector,
    pub institution: String,
    /// Location where medication is dispensed.
    pub dispensing_point: String,
    pub distributor: String,
    /// Indication code (e.g. "QSDB03").
    pub indication: String,
    pub dosage: String,
    /// Enrollment date, conceptually a year-month. Required.
    pub enrollment_date: String,
    /// Discharge date; present if and only if status is Discharged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge_date: Option<String>,
    pub status: CaseStatus,
}

impl PatientCase {
    /// Next id for a new case: max existing numeric id + 1.
    ///
    /// Non-numeric ids are ignored; an empty collection starts at "1".
    pub fn next_id(cases: &[PatientCase]) -> String {
        let max = cases
            .iter()
            .filter_map(|c| c.id.trim().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (max + 1).to_string()
    }

    /// Enforce the discharge-date invariant: `discharge_date` is set if and
    /// only if the case is Discharged.
    ///
    /// A transition to Discharged without an explicit discharge date
    /// defaults to the given year-month (the caller passes "now").
    pub fn enforce_status_dates(&mut self, now: YearMonth) {
        match self.status {
            CaseStatus::Discharged => {
                let missing = self
                    .discharge_date
                    .as_deref()
                    .map_or(true, |d| d.trim().is_empty());
                if missing {
                    self.discharge_date = Some(now.token());
                }
            }
            CaseStatus::Active => {
                self.discharge_date = None;
            }
        }
    }

    /// Canonical enrollment year-month token, if parseable.
    pub fn normalized_enrollment(&self) -> Option<String> {
        crate::dates::normalize(Some(&self.enrollment_date))
    }

    /// Whole months of treatment as of `now`. `None` when indeterminate.
    pub fn duration_months_at(&self, now: YearMonth) -> Option<u32> {
        crate::dates::months_elapsed_at(
            &self.enrollment_date,
            self.discharge_date.as_deref(),
            self.status,
            now,
        )
    }

    /// Whole months of treatment as of the current calendar month.
    pub fn duration_months(&self) -> Option<u32> {
        self.duration_months_at(YearMonth::now())
    }
}

/// Case data as submitted from the entry form, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDraft {
    pub coordinator: String,
    pub city: String,
    pub physician: String,
    pub insurer: String,
    pub sector: Sector,
    pub institution: String,
    pub dispensing_point: String,
    pub distributor: String,
    pub indication: String,
    pub dosage: String,
    pub enrollment_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge_date: Option<String>,
    pub status: CaseStatus,
}

impl CaseDraft {
    /// Attach an id, producing a full case record.
    pub fn into_case(self, id: String) -> PatientCase {
        PatientCase {
            id,
            coordinator: self.coordinator,
            city: self.city,
            physician: self.physician,
            insurer: self.insurer,
            sector: self.sector,
            institution: self.institution,
            dispensing_point: self.dispensing_point,
            distributor: self.distributor,
            indication: self.indication,
            dosage: self.dosage,
            enrollment_date: self.enrollment_date,
            discharge_date: self.discharge_date,
            status: self.status,
        }
    }
}
