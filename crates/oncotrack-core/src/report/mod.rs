//! Report building.
//!
//! Turns an already-filtered case collection into the structured documents
//! the export surface renders: a general case listing, an executive
//! grouped summary, and a treatment-duration followup listing. Page
//! layout is the renderer's concern; these types carry the data and offer
//! JSON/CSV serializations.

mod executive;
mod listing;

pub use executive::*;
pub use listing::*;

/// The three report presentations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportKind {
    /// Full case listing.
    #[default]
    General,
    /// Grouped frequency summaries.
    Executive,
    /// Enrollment/discharge/duration tracking.
    Followup,
}

impl ReportKind {
    /// Human-readable report title.
    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::General => "General Report",
            ReportKind::Executive => "Executive Report",
            ReportKind::Followup => "Followup Report",
        }
    }
}

/// Escape a string for CSV output.
pub(crate) fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
