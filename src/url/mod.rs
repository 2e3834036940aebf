//! URL handling module for Tululu-Catalog
//!
//! This module builds the catalog's endpoint URLs, derives book ids from
//! detail URLs, and turns titles and resource URLs into safe file names.

mod endpoints;
mod filename;

// Re-export main functions
pub use endpoints::{book_id_from_url, CatalogEndpoints};
pub use filename::{fit_filename, image_filename, sanitize_filename, MAX_FILENAME_BYTES};
