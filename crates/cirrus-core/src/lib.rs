//! cirrus Core Library
//!
//! Shared types for the cirrus granule backup reconciliation service.
//!
//! # Modules
//!
//! - [`granule`] - Granule and file records for both holdings (Cumulus and ORCA)
//! - [`report`] - Discrepancy reports and the persisted reconciliation report
//! - [`queue`] - The sorted, paginated record queue abstraction
//! - [`error`] - Standardized error types ([`CirrusError`])
//!
//! # Example
//!
//! ```
//! use cirrus_core::GranuleKey;
//!
//! let a = GranuleKey::new("granule-1", "MOD09GQ___006");
//! let b = GranuleKey::new("granule-2", "MOD09GQ___006");
//! assert!(a < b);
//! ```

pub mod error;
pub mod granule;
pub mod queue;
pub mod report;

// Re-export main types for convenient access
pub use error::{CirrusError, CirrusResult};
pub use granule::{
    construct_collection_id, deconstruct_collection_id, CumulusFile, CumulusGranuleRecord,
    GranuleKey, OrcaFile, OrcaGranuleRecord,
};
pub use queue::{Page, PageSource, SortedRecordQueue, VecPageSource};
pub use report::{
    ConflictFile, ConflictReason, GranuleReport, GranulesReport, ReconciliationReport,
    ReportStatus,
};
