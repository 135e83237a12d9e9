// Local output staging. Each document owns `<root>/<documentId>`; before any
// preview is written the directory is brought to a known-empty state so no
// files from a previous run can linger next to fresh ones.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Guarantee `<root>/<document_id>` exists and is empty. The clear is
/// unconditional; the directory is always present when this returns.
pub async fn ensure(root: &Path, document_id: &str) -> Result<PathBuf> {
    let dir = root.join(document_id);
    match tokio::fs::remove_dir_all(&dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to clear {}", dir.display()));
        }
    }
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir)
}
