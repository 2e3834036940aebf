//! Configuration module for Tululu-Catalog
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section and key is optional, so an absent file is equivalent to
//! [`Config::default`].
//!
//! # Example
//!
//! ```no_run
//! use tululu_catalog::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("tululu.toml")).unwrap();
//! println!("Crawling from page {}", config.crawler.start_page);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CatalogConfig, Config, CrawlerConfig, OutputConfig, DEFAULT_CATALOG_FILE};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
