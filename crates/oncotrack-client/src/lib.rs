//! OncoTrack Client Library
//!
//! Persistence layer for the oncology case-tracking dashboard. The core
//! engine (`oncotrack-core`) is pure; this crate owns the async
//! boundary:
//!
//! - [`store::CaseStore`]: the persistence contract (full-snapshot
//!   reads, last-writer-wins writes)
//! - [`script::SheetStore`]: HTTP implementation speaking the
//!   spreadsheet script's `{"action", ...}` wire protocol
//! - [`store::MemoryStore`]: in-memory implementation for tests and
//!   offline use, with injectable write failures
//! - [`session::Session`]: optimistic local state with
//!   rollback-on-failure and save-time category-list synchronization

pub mod script;
pub mod session;
pub mod store;

pub use script::SheetStore;
pub use session::Session;
pub use store::{CaseStore, MemoryStore, SetupOutcome, Snapshot, StoreError, StoreResult};
