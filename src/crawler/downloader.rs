//! Text and cover image downloads
//!
//! Each download is a separate stage that can be skipped on its own. A
//! resource is fully received before anything touches the disk, and files
//! are written through a temporary sibling so a failure never leaves a
//! truncated file under the final name.

use crate::catalog::ParsedBook;
use crate::crawler::fetcher::ResourceClient;
use crate::output::{write_atomically, PARTIAL_SUFFIX};
use crate::url::{
    fit_filename, image_filename, sanitize_filename, CatalogEndpoints, MAX_FILENAME_BYTES,
};
use crate::CatalogError;
use std::path::PathBuf;

/// Extension of downloaded book texts
pub const TEXT_EXTENSION: &str = "txt";

/// Longest final file name that still leaves room for the partial suffix
const MAX_DOWNLOAD_NAME_BYTES: usize = MAX_FILENAME_BYTES - PARTIAL_SUFFIX.len();

/// Downloads book texts and covers into their folders
#[derive(Debug, Clone)]
pub struct ResourceDownloader {
    client: ResourceClient,
    endpoints: CatalogEndpoints,
    books_dir: PathBuf,
    images_dir: PathBuf,
}

impl ResourceDownloader {
    pub fn new(
        client: ResourceClient,
        endpoints: CatalogEndpoints,
        books_dir: PathBuf,
        images_dir: PathBuf,
    ) -> Self {
        Self {
            client,
            endpoints,
            books_dir,
            images_dir,
        }
    }

    /// Downloads the book text to `{books_dir}/{sanitized title}.txt`
    ///
    /// Long titles are shortened so the name and its `.part` sibling both
    /// fit the filesystem's name limit.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(path))` - The text was written to `path`
    /// * `Ok(None)` - `skip` was set; nothing was requested
    /// * `Err(CatalogError)` - The text could not be fetched or written;
    ///   `Redirect` means the catalog has no text for this book
    pub async fn download_text(
        &self,
        book: &ParsedBook,
        book_id: u32,
        skip: bool,
    ) -> Result<Option<PathBuf>, CatalogError> {
        if skip {
            return Ok(None);
        }

        let url = self.endpoints.text_resource(book_id)?;
        let resource = self.client.fetch(&url).await?;

        let stem = match sanitize_filename(&book.title) {
            stem if stem.is_empty() => book_id.to_string(),
            stem => stem,
        };
        let filename = fit_filename(
            &format!("{}.{}", stem, TEXT_EXTENSION),
            MAX_DOWNLOAD_NAME_BYTES,
        );
        let path = self.books_dir.join(filename);

        write_atomically(&path, &resource.body).await?;
        tracing::debug!("Saved text of book {} to {}", book_id, path.display());
        Ok(Some(path))
    }

    /// Downloads the cover to `{images_dir}/{server-side file name}`
    ///
    /// The file name is the percent-decoded last segment of the image URL.
    pub async fn download_image(
        &self,
        book: &ParsedBook,
        skip: bool,
    ) -> Result<Option<PathBuf>, CatalogError> {
        if skip {
            return Ok(None);
        }

        let filename = image_filename(&book.image_url).ok_or_else(|| CatalogError::Parse {
            url: book.image_url.to_string(),
            message: "image URL has no file name".to_string(),
        })?;

        let resource = self.client.fetch(&book.image_url).await?;
        let path = self
            .images_dir
            .join(fit_filename(&filename, MAX_DOWNLOAD_NAME_BYTES));

        write_atomically(&path, &resource.body).await?;
        tracing::debug!("Saved cover {} to {}", book.image_url, path.display());
        Ok(Some(path))
    }
}
