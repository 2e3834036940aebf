//! Catalog data model
//!
//! This module defines the values that flow through the pipeline:
//! - Book references discovered on listing pages
//! - Parsed book details and their download outcomes
//! - The final catalog records and page ranges
//!
//! It also hosts the in-memory catalog and the error collector.

mod assembler;
mod error_sink;

pub use assembler::CatalogAssembler;
pub use error_sink::ErrorSink;

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;
use url::Url;

/// A book link found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookReference {
    /// Numeric book id taken from the detail URL
    pub id: u32,

    /// Absolute URL of the book's detail page
    pub detail_url: Url,
}

/// Fields extracted from a book's detail page
///
/// This is the immutable output of the parse stage. Local file paths are
/// attached later through [`BookRecord::assemble`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBook {
    pub title: String,
    pub author: String,

    /// Cover image URL, resolved against the detail page URL
    pub image_url: Url,

    /// Reader comments in document order
    pub comments: Vec<String>,

    /// Genre names in document order
    pub genres: Vec<String>,
}

/// Paths produced by the download stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub text_path: Option<String>,
    pub image_path: Option<String>,
}

impl DownloadOutcome {
    /// Records the location of a downloaded text file
    pub fn with_text(mut self, path: &Path) -> Self {
        self.text_path = Some(path.to_string_lossy().into_owned());
        self
    }

    /// Records the location of a downloaded image file
    pub fn with_image(mut self, path: &Path) -> Self {
        self.image_path = Some(path.to_string_lossy().into_owned());
        self
    }
}

/// One entry of the output catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub image_url: String,
    pub comments: Vec<String>,
    pub genres: Vec<String>,
    #[serde(default)]
    pub local_text_path: Option<String>,
    #[serde(default)]
    pub local_image_path: Option<String>,
}

impl BookRecord {
    /// Merges a parsed book with the outcome of its downloads
    pub fn assemble(book: ParsedBook, outcome: DownloadOutcome) -> Self {
        Self {
            title: book.title,
            author: book.author,
            image_url: book.image_url.to_string(),
            comments: book.comments,
            genres: book.genres,
            local_text_path: outcome.text_path,
            local_image_path: outcome.image_path,
        }
    }
}

/// How the upper bound of a [`PageRange`] was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    /// The caller supplied the end page
    Explicit,

    /// The end page was read from the catalog's pagination controls
    Resolved,
}

/// Listing pages to crawl, `start` inclusive and `end` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
    pub bound: RangeBound,
}

impl PageRange {
    /// Creates a range with a caller-supplied exclusive end
    pub fn explicit(start: u32, end: u32) -> Self {
        Self {
            start,
            end,
            bound: RangeBound::Explicit,
        }
    }

    /// Creates a range that includes `last_page`
    pub fn through_last_page(start: u32, last_page: u32) -> Self {
        Self {
            start,
            end: last_page.saturating_add(1),
            bound: RangeBound::Resolved,
        }
    }

    /// Iterates the page numbers in ascending order
    pub fn pages(&self) -> Range<u32> {
        self.start..self.end
    }

    /// Returns true if the range contains no pages
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns true if the end page was supplied by the caller
    pub fn is_explicit(&self) -> bool {
        self.bound == RangeBound::Explicit
    }
}

/// Output of a listing crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    /// Book references in page order, then document order
    pub references: Vec<BookReference>,

    /// Messages for pages or tables that could not be processed
    pub errors: Vec<String>,

    /// Number of listing pages fetched successfully
    pub pages_crawled: u32,
}
