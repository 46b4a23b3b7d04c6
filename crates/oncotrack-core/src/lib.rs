//! OncoTrack Core Library
//!
//! Shared engine for the oncology case-tracking dashboard: date
//! normalization, treatment-duration calculation, filtering, aggregation,
//! list synchronization, and report building. The list view, dashboard
//! analytics, and report generator are all thin consumers of this crate.
//!
//! # Data flow
//!
//! ```text
//! Case Store snapshot
//!        │
//!        ▼
//!   DateNormalizer ──► DurationCalculator
//!        │                     │
//!        ▼                     ▼
//!   CaseFilterEngine ──► Aggregator ──► presentation / reports
//!
//!   ListSynchronizer runs independently on every case save,
//!   before the case record itself is persisted.
//! ```
//!
//! # Core principle
//!
//! Everything here is pure and synchronous. Parsing never errors:
//! unparseable dates yield sentinel values (`None` in computation
//! contexts, the raw string in display contexts) because the store's
//! historical data is known to contain mixed formats. "Now" is
//! injectable so every computation is testable.
//!
//! # Modules
//!
//! - [`models`]: Domain types (PatientCase, CategoryListSet, etc.)
//! - [`dates`]: Year-month normalization and elapsed-months calculation
//! - [`filter`]: Optional-predicate filtering over case collections
//! - [`aggregate`]: Frequency tables, trend line, average duration
//! - [`sync`]: Category-list synchronization on case save
//! - [`report`]: Listing and executive report documents

pub mod aggregate;
pub mod dates;
pub mod filter;
pub mod models;
pub mod report;
pub mod sync;

// Re-export commonly used types
pub use aggregate::{CaseAttribute, CountEntry, TrendPoint, NO_DATA_LABEL};
pub use dates::YearMonth;
pub use filter::{filter_cases, FilterCriteria};
pub use models::{
    CaseDraft, CaseStatus, CategoryKey, CategoryListSet, ListItem, PatientCase, Sector,
};
pub use report::{CaseListingReport, ExecutiveReport, ReportKind};
pub use sync::{sync_case_into_lists, SyncOutcome};
