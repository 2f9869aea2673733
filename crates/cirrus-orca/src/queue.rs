//! Paginated search queue over the ORCA catalog.

use async_trait::async_trait;

use cirrus_core::{CirrusResult, OrcaGranuleRecord, Page, PageSource, SortedRecordQueue};

use crate::client::{OrcaCatalogClient, OrcaSearchParams};

/// Page source over the catalog search endpoint.
///
/// The catalog returns granules sorted by `(granuleId, collectionId)`;
/// wrapping this source in a [`SortedRecordQueue`] gives the merge-join
/// driver its lookahead cursor.
#[derive(Debug)]
pub struct OrcaSearchQueue {
    client: OrcaCatalogClient,
    params: OrcaSearchParams,
}

impl OrcaSearchQueue {
    #[must_use]
    pub fn new(client: OrcaCatalogClient, params: OrcaSearchParams) -> Self {
        Self { client, params }
    }

    /// Wrap this source in a queue.
    #[must_use]
    pub fn into_queue(self) -> SortedRecordQueue<Self> {
        SortedRecordQueue::new(self)
    }
}

#[async_trait]
impl PageSource for OrcaSearchQueue {
    type Item = OrcaGranuleRecord;

    async fn fetch_page(&mut self, page_index: usize) -> CirrusResult<Page<OrcaGranuleRecord>> {
        let page = self.client.search_catalog(&self.params, page_index).await?;
        Ok(Page {
            items: page.granules,
            another_page: page.another_page,
        })
    }
}
