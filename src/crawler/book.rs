//! Book detail page processing

use crate::catalog::{BookReference, ParsedBook};
use crate::crawler::fetcher::ResourceClient;
use crate::crawler::parser::parse_book_page;
use crate::CatalogError;

/// Fetches detail pages and extracts book fields
///
/// Resources are not downloaded here so that text-only or image-only runs
/// work from the same parsed value.
#[derive(Debug, Clone)]
pub struct BookRecordBuilder {
    client: ResourceClient,
}

impl BookRecordBuilder {
    pub fn new(client: ResourceClient) -> Self {
        Self { client }
    }

    /// Fetches and parses the detail page of `reference`
    ///
    /// Fails with `Fetch`, `Redirect` (the book no longer exists),
    /// `Connection` or `Parse`.
    pub async fn build(&self, reference: &BookReference) -> Result<ParsedBook, CatalogError> {
        let page = self.client.fetch(&reference.detail_url).await?;
        let book = parse_book_page(&page.text(), &page.url)?;

        tracing::debug!(
            "Parsed book {}: '{}' by {}",
            reference.id,
            book.title,
            book.author
        );
        Ok(book)
    }
}
