//! Crawler module for catalog fetching and processing
//!
//! This module contains the core pipeline, including:
//! - HTTP fetching with redirect-as-absence detection
//! - HTML parsing of listing and detail pages
//! - Page range resolution and listing traversal
//! - Per-book parsing and resource downloads
//! - Overall run coordination

mod book;
mod coordinator;
mod downloader;
mod fetcher;
mod listing;
mod parser;
mod resolver;

pub use book::BookRecordBuilder;
pub use coordinator::{run_book_ids, run_catalog, Coordinator};
pub use downloader::{ResourceDownloader, TEXT_EXTENSION};
pub use fetcher::{build_http_client, FetchedResource, ResourceClient};
pub use listing::CatalogCrawler;
pub use parser::{
    last_page_number, parse_book_page, parse_listing_page, ParsedListing, TITLE_AUTHOR_SEPARATOR,
};
pub use resolver::PageRangeResolver;
