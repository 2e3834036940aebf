//! In-memory catalog and its JSON serialization

use crate::catalog::BookRecord;
use crate::output::write_atomically;
use crate::CatalogError;
use std::path::Path;

/// Ordered, append-only collection of finished book records
#[derive(Debug, Default)]
pub struct CatalogAssembler {
    records: Vec<BookRecord>,
}

impl CatalogAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record to the end of the catalog
    pub fn append(&mut self, record: BookRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in the order they were appended
    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    /// Serializes the catalog as an indented JSON array
    ///
    /// Non-ASCII text is emitted verbatim as UTF-8.
    pub fn serialize(&self) -> Result<Vec<u8>, CatalogError> {
        Ok(serde_json::to_vec_pretty(&self.records)?)
    }

    /// Writes the serialized catalog to `path`, creating parent directories
    ///
    /// The file is replaced in one rename, so an interrupted write keeps the
    /// previous catalog intact.
    pub async fn write_to(&self, path: &Path) -> Result<(), CatalogError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        write_atomically(path, &self.serialize()?).await?;
        tracing::info!(
            "Catalog with {} books written to {}",
            self.records.len(),
            path.display()
        );
        Ok(())
    }
}
