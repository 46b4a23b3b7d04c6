//! Executive summary report.

use serde::{Deserialize, Serialize};

use super::escape_csv;
use crate::aggregate::{self, CaseAttribute, CountEntry};
use crate::models::PatientCase;

/// Values shown per grouped section.
const SECTION_LIMIT: usize = 10;

/// One grouped breakdown of the executive report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub entries: Vec<CountEntry>,
}

/// Grouped frequency summaries over a filtered case collection: status,
/// coordinator, physician, city, institution, and insurer breakdowns,
/// each limited to the top [`SECTION_LIMIT`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveReport {
    /// Export timestamp, RFC 3339.
    pub generated_at: String,
    pub total_cases: usize,
    pub sections: Vec<ReportSection>,
}

impl ExecutiveReport {
    /// Build the report from an already-filtered collection.
    pub fn build(cases: &[PatientCase]) -> Self {
        let breakdowns = [
            ("By Status", CaseAttribute::Status),
            ("By Coordinator", CaseAttribute::Coordinator),
            ("By Physician", CaseAttribute::Physician),
            ("By City", CaseAttribute::City),
            ("By Institution", CaseAttribute::Institution),
            ("By Insurer", CaseAttribute::Insurer),
        ];
        let sections = breakdowns
            .into_iter()
            .map(|(title, attr)| ReportSection {
                title: title.to_string(),
                entries: aggregate::top_by_attribute(cases, attr, SECTION_LIMIT),
            })
            .collect();
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            total_cases: cases.len(),
            sections,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV, one `section,value,count` line per entry.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("section,value,count\n");
        for section in &self.sections {
            for entry in &section.entries {
                csv.push_str(&format!(
                    "{},{},{}\n",
                    escape_csv(&section.title),
                    escape_csv(&entry.value),
                    entry.count,
                ));
            }
        }
        csv
    }
}
