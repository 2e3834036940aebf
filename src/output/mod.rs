//! Output module for run reporting
//!
//! This module handles:
//! - Counting pages, books and downloads during a run
//! - Printing the end-of-run summary with all recorded failures
//! - Writing files through a temporary sibling and a rename
//!
//! The JSON catalog itself is produced by [`crate::catalog::CatalogAssembler`].

pub mod files;
pub mod stats;

pub use files::{write_atomically, PARTIAL_SUFFIX};
pub use stats::{print_statistics, RunReport, RunStatistics};
