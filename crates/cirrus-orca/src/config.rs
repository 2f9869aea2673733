//! ORCA catalog client configuration.

use cirrus_core::{CirrusError, CirrusResult};

const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 10;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;

/// Configuration for [`crate::OrcaCatalogClient`].
#[derive(Debug, Clone)]
pub struct OrcaConfig {
    /// Full URI of the catalog search endpoint.
    pub api_uri: String,
    /// Connection timeout in seconds.
    pub connection_timeout_secs: u64,
    /// Read timeout in seconds.
    pub read_timeout_secs: u64,
}

impl OrcaConfig {
    /// Create a configuration for the given search endpoint.
    #[must_use]
    pub fn new(api_uri: impl Into<String>) -> Self {
        Self {
            api_uri: api_uri.into(),
            connection_timeout_secs: DEFAULT_CONNECTION_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }

    /// Override the connection timeout.
    #[must_use]
    pub fn with_connection_timeout_secs(mut self, secs: u64) -> Self {
        self.connection_timeout_secs = secs;
        self
    }

    /// Override the read timeout.
    #[must_use]
    pub fn with_read_timeout_secs(mut self, secs: u64) -> Self {
        self.read_timeout_secs = secs;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> CirrusResult<()> {
        if self.api_uri.trim().is_empty() {
            return Err(CirrusError::InvalidParams(
                "ORCA catalog api_uri must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
