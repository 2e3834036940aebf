//! Tululu-Catalog: a batch scraper for the tululu.org online library
//!
//! This crate walks a range of catalog listing pages, resolves every book's
//! detail page, downloads its text and cover image, and assembles the results
//! into a single JSON catalog. Per-item failures are collected and reported
//! without aborting the run.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Tululu-Catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP {status} for {url}")]
    Fetch { url: String, status: u16 },

    #[error("Redirected from {url} (HTTP {status}{})", location_suffix(.location))]
    Redirect {
        url: String,
        status: u16,
        location: Option<String>,
    },

    #[error("Connection error for {url}: {source}")]
    Connection { url: String, source: reqwest::Error },

    #[error("HTML parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Could not resolve the page range: {0}")]
    ResolverFatal(Box<CatalogError>),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn location_suffix(location: &Option<String>) -> String {
    match location {
        Some(location) => format!(" to {}", location),
        None => String::new(),
    }
}

impl CatalogError {
    /// Returns true if the target resource does not exist at its identifier
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    /// Returns true for transport-level failures that warrant a cooldown
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Tululu-Catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{
    BookRecord, BookReference, CatalogAssembler, CrawlResult, DownloadOutcome, ErrorSink,
    PageRange, ParsedBook, RangeBound,
};
pub use config::Config;
