//! ORCA catalog search client.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use cirrus_core::{CirrusError, CirrusResult, OrcaGranuleRecord};

use crate::config::OrcaConfig;

/// Filter parameters for a catalog search.
///
/// Timestamps are epoch milliseconds on the wire, matching the catalog API.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrcaSearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granule_id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<i64>,
}

/// One page of catalog search results.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrcaCatalogPage {
    pub another_page: bool,
    pub granules: Vec<OrcaGranuleRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    #[serde(flatten)]
    params: &'a OrcaSearchParams,
    page_index: usize,
}

/// HTTP client for the ORCA backup catalog search endpoint.
#[derive(Debug, Clone)]
pub struct OrcaCatalogClient {
    client: Client,
    config: OrcaConfig,
}

impl OrcaCatalogClient {
    /// Create a client from the given configuration.
    pub fn new(config: OrcaConfig) -> CirrusResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connection_timeout_secs))
            .timeout(Duration::from_secs(config.read_timeout_secs))
            .build()
            .map_err(|e| CirrusError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Fetch one page of the catalog, zero-based `page_index`.
    ///
    /// A non-success response is fatal: logged with the request parameters
    /// and returned as [`CirrusError::Catalog`]. No retry; the report run is
    /// expected to be re-triggered instead.
    pub async fn search_catalog(
        &self,
        params: &OrcaSearchParams,
        page_index: usize,
    ) -> CirrusResult<OrcaCatalogPage> {
        debug!(
            uri = %self.config.api_uri,
            page_index,
            "searching ORCA catalog"
        );

        let body = SearchRequest { params, page_index };
        let response = self
            .client
            .post(&self.config.api_uri)
            .json(&body)
            .send()
            .await
            .map_err(|e| CirrusError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                params = ?params,
                page_index,
                "ORCA catalog search failed"
            );
            return Err(CirrusError::Catalog {
                status: status.as_u16(),
                message,
            });
        }

        let page: OrcaCatalogPage = response
            .json()
            .await
            .map_err(|e| CirrusError::Http(format!("failed to decode catalog page: {e}")))?;

        debug!(
            page_index,
            granules = page.granules.len(),
            another_page = page.another_page,
            "received ORCA catalog page"
        );
        Ok(page)
    }
}
