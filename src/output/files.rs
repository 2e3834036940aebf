//! File writes shared by downloads and the catalog

use crate::CatalogError;
use std::path::{Path, PathBuf};

/// Suffix of the temporary sibling a file is written to before the rename
pub const PARTIAL_SUFFIX: &str = ".part";

/// Writes `body` to a `.part` sibling of `path`, then renames it into place
///
/// A failed write or rename removes the partial file, so `path` either holds
/// the complete body or is left as it was.
pub async fn write_atomically(path: &Path, body: &[u8]) -> Result<(), CatalogError> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(PARTIAL_SUFFIX);
    let partial = PathBuf::from(partial);

    if let Err(e) = tokio::fs::write(&partial, body).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }

    if let Err(e) = tokio::fs::rename(&partial, path).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }

    Ok(())
}
