//! Filesystem locations used by the CLI.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

/// Default violations log: `<data dir>/phiscan/violations.log`.
pub fn default_log_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| anyhow!("Could not determine the user data directory; pass --log"))?;
    Ok(data_dir.join("phiscan").join("violations.log"))
}

/// The `.txt` files directly inside `dir`, sorted by file name.
pub fn list_text_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read document directory {}", dir.display()))?;

    let mut documents = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list document directory {}", dir.display()))?
            .path();
        let is_txt = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("txt"));
        if path.is_file() && is_txt {
            documents.push(path);
        }
    }
    documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(documents)
}

/// The name a document is logged under: its file name.
pub fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
