//! Listing page traversal
//!
//! Walks the listing pages of a [`PageRange`] in ascending order and
//! collects every book reference. Failures are recorded per page and never
//! abort the walk.

use crate::catalog::{CrawlResult, PageRange};
use crate::crawler::fetcher::ResourceClient;
use crate::crawler::parser::parse_listing_page;
use crate::url::CatalogEndpoints;
use crate::CatalogError;
use std::time::Duration;

/// Collects book references from listing pages
#[derive(Debug, Clone)]
pub struct CatalogCrawler {
    client: ResourceClient,
    endpoints: CatalogEndpoints,
    cooldown: Duration,
}

impl CatalogCrawler {
    /// Creates a crawler that pauses for `cooldown` after connection failures
    pub fn new(client: ResourceClient, endpoints: CatalogEndpoints, cooldown: Duration) -> Self {
        Self {
            client,
            endpoints,
            cooldown,
        }
    }

    /// Crawls every page in `range`
    ///
    /// # Failure Handling
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Redirect, explicit end page | Record error, next page |
    /// | Redirect, resolved end page | Catalog shrank, stop quietly |
    /// | Other HTTP error | Record error, next page |
    /// | Connection error | Record error, cool down, next page |
    /// | Table without a book link | Record error, next table |
    pub async fn crawl(&self, range: &PageRange) -> CrawlResult {
        let mut result = CrawlResult::default();

        for page in range.pages() {
            let url = match self.endpoints.listing_page(page) {
                Ok(url) => url,
                Err(e) => {
                    result
                        .errors
                        .push(format!("Listing page {}: invalid URL: {}", page, e));
                    continue;
                }
            };

            match self.client.fetch(&url).await {
                Ok(resource) => {
                    let listing = parse_listing_page(&resource.text(), &resource.url);
                    tracing::info!(
                        "Listing page {}: {} books",
                        page,
                        listing.references.len()
                    );

                    result.pages_crawled += 1;
                    result.references.extend(listing.references);
                    result.errors.extend(
                        listing
                            .problems
                            .into_iter()
                            .map(|problem| format!("Listing page {}: {}", page, problem)),
                    );
                }
                Err(e @ CatalogError::Redirect { .. }) if !range.is_explicit() => {
                    tracing::info!(
                        "Listing page {} no longer exists ({}), stopping",
                        page,
                        e
                    );
                    break;
                }
                Err(e) => {
                    let cool_down = e.is_connection();
                    result.errors.push(format!("Listing page {}: {}", page, e));

                    if cool_down {
                        tracing::debug!("Cooling down for {:?}", self.cooldown);
                        tokio::time::sleep(self.cooldown).await;
                    }
                }
            }
        }

        result
    }
}
