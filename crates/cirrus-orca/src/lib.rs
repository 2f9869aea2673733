//! # ORCA Backup Catalog Client
//!
//! Client for the ORCA backup catalog search endpoint, plus a paginated
//! search queue implementing the workspace's sorted-record-queue contract.
//!
//! The catalog is queried with `POST { ...filters, pageIndex }` and answers
//! `{ anotherPage, granules }`. Any non-success response is fatal for the
//! reconciliation run: it is logged with the request parameters and raised
//! as [`cirrus_core::CirrusError::Catalog`].
//!
//! ## Example
//!
//! ```ignore
//! use cirrus_orca::{OrcaCatalogClient, OrcaConfig, OrcaSearchParams, OrcaSearchQueue};
//!
//! let client = OrcaCatalogClient::new(OrcaConfig::new("https://orca.example.com/catalog/granules"))?;
//! let mut queue = OrcaSearchQueue::new(client, OrcaSearchParams::default()).into_queue();
//! while let Some(granule) = queue.shift().await? {
//!     // granules arrive sorted by (granuleId, collectionId)
//! }
//! ```

pub mod client;
pub mod config;
pub mod queue;

// Re-exports
pub use client::{OrcaCatalogClient, OrcaCatalogPage, OrcaSearchParams};
pub use config::OrcaConfig;
pub use queue::OrcaSearchQueue;
