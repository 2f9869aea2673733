//! # Backup Reconciliation Engine
//!
//! Verifies that every granule file the primary store (Cumulus) believes is
//! backed up actually exists in the ORCA backup catalog, and that nothing
//! exists in the catalog that a collection's exclusion policy says should
//! not be there.
//!
//! ## Architecture
//!
//! ```text
//! run_reconciliation
//!   ├── ReportStore::put (Pending placeholder)
//!   ├── ExclusionPolicy::load (collection config cursor)
//!   ├── reconcile_granules (merge-join over two sorted queues)
//!   │     ├── Cumulus granule queue  (Postgres cursor)
//!   │     ├── ORCA granule queue     (catalog search API)
//!   │     └── granule_report         (per-granule comparator)
//!   └── ReportStore::put (SUCCESS or Failed, final)
//! ```
//!
//! The driver walks both queues in lockstep by `(granuleId, collectionId)`
//! key, classifying every granule exactly once: matched, only in Cumulus, or
//! only in ORCA. All collaborators are constructor-injected so the engine is
//! tested end to end against in-memory fakes.

pub mod compare;
pub mod db;
pub mod driver;
pub mod exclusion;
pub mod lifecycle;
pub mod params;
pub mod store;

// Re-export main types
pub use compare::{granule_report, orca_only_granule_report};
pub use db::{PgCollectionSource, PgGranuleSource};
pub use driver::reconcile_granules;
pub use exclusion::{CollectionConfigRecord, ExclusionPolicy};
pub use lifecycle::run_reconciliation;
pub use params::ReconciliationParams;
pub use store::{MemoryReportStore, ReportStore, S3ReportStore};
