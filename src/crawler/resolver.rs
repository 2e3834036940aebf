//! Page range resolution
//!
//! Determines which listing pages a run covers. When no end page is given,
//! the first listing page is fetched once and its pagination controls
//! supply the last page number.

use crate::catalog::PageRange;
use crate::crawler::fetcher::ResourceClient;
use crate::crawler::parser::last_page_number;
use crate::url::CatalogEndpoints;
use crate::CatalogError;

/// Resolves the listing pages to crawl
#[derive(Debug, Clone)]
pub struct PageRangeResolver {
    client: ResourceClient,
    endpoints: CatalogEndpoints,
}

impl PageRangeResolver {
    pub fn new(client: ResourceClient, endpoints: CatalogEndpoints) -> Self {
        Self { client, endpoints }
    }

    /// Resolves the page range for a run
    ///
    /// # Arguments
    ///
    /// * `explicit_start` - First page, defaults to 1
    /// * `explicit_end` - Exclusive end page; `None` or 0 means "through the
    ///   last page of the catalog"
    ///
    /// # Returns
    ///
    /// * `Ok(PageRange)` - The explicit range, or one ending after the last
    ///   page listed in the pagination controls
    /// * `Err(CatalogError::ResolverFatal)` - Page 1 could not be fetched or
    ///   redirected away; no range can be established
    pub async fn resolve(
        &self,
        explicit_start: Option<u32>,
        explicit_end: Option<u32>,
    ) -> Result<PageRange, CatalogError> {
        let start = explicit_start.unwrap_or(1);

        if let Some(end) = explicit_end.filter(|&end| end != 0) {
            tracing::debug!("Using explicit page range {}..{}", start, end);
            return Ok(PageRange::explicit(start, end));
        }

        let last_page = self
            .fetch_last_page()
            .await
            .map_err(|e| CatalogError::ResolverFatal(Box::new(e)))?;

        let range = PageRange::through_last_page(start, last_page);
        tracing::info!(
            "Catalog has {} listing pages, crawling {}..{}",
            last_page,
            range.start,
            range.end
        );
        Ok(range)
    }

    /// Fetches listing page 1 and reads its last pagination number
    async fn fetch_last_page(&self) -> Result<u32, CatalogError> {
        let url = self.endpoints.listing_page(1)?;
        let page = self.client.fetch(&url).await?;

        // A catalog without pagination controls has exactly one page
        Ok(last_page_number(&page.text()).unwrap_or(1))
    }
}
