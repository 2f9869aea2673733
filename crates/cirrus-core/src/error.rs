//! Error types shared across the cirrus workspace.
//!
//! Variants carry string renderings of the underlying driver errors so that
//! this crate does not need to depend on the HTTP or database stacks.

use thiserror::Error;

/// Error that can occur during a reconciliation run.
#[derive(Debug, Error)]
pub enum CirrusError {
    /// The backup catalog returned a non-success response. Fatal for the run;
    /// a failed report is persisted and the run must be re-triggered.
    #[error("backup catalog request failed with status {status}: {message}")]
    Catalog { status: u16, message: String },

    /// Transport-level HTTP failure (connect, timeout, body decode).
    #[error("http error: {0}")]
    Http(String),

    /// Relational store failure while paging granules or collections.
    #[error("database error: {0}")]
    Database(String),

    /// Durable object store failure while persisting a report.
    #[error("report storage error: {0}")]
    Storage(String),

    /// Report could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Report parameters failed validation.
    #[error("invalid report parameters: {0}")]
    InvalidParams(String),
}

/// Result type for reconciliation operations.
pub type CirrusResult<T> = Result<T, CirrusError>;
