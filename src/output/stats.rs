//! Run statistics and the end-of-run report
//!
//! This module provides the counters collected during a run and prints
//! them, together with every recorded failure, once the run finishes.

use std::path::PathBuf;

/// Counters collected during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    /// Listing pages fetched successfully
    pub pages_crawled: u32,

    /// Book references discovered (or ids requested in book-id mode)
    pub books_found: u32,

    /// Books whose detail page was parsed and added to the catalog
    pub books_saved: u32,

    /// Texts written to disk
    pub texts_downloaded: u32,

    /// Cover images written to disk
    pub images_downloaded: u32,
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub statistics: RunStatistics,

    /// Failure messages in the order they occurred
    pub errors: Vec<String>,

    /// Where the catalog was written
    pub catalog_path: PathBuf,
}

/// Prints a run report to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report to display
pub fn print_statistics(report: &RunReport) {
    let stats = &report.statistics;

    println!("=== Run Statistics ===\n");

    println!("Overview:");
    println!("  Listing pages crawled: {}", stats.pages_crawled);
    println!("  Books found: {}", stats.books_found);
    println!("  Books saved: {}", stats.books_saved);
    println!("  Texts downloaded: {}", stats.texts_downloaded);
    println!("  Images downloaded: {}", stats.images_downloaded);
    println!();

    if !report.errors.is_empty() {
        println!("Failures ({}):", report.errors.len());
        for message in &report.errors {
            println!("  - {}", message);
        }
        println!();
    }

    let success_rate = if stats.books_found > 0 {
        (stats.books_saved as f64 / stats.books_found as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} books saved)",
        success_rate, stats.books_saved, stats.books_found
    );
    println!("Catalog: {}", report.catalog_path.display());
}
