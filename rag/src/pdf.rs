use std::path::Path;

use tracing::{debug, warn};

use crate::error::{RagError, Result};

/// Extracts the text of a PDF, one page after another.
pub fn extract_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| RagError::io(format!("reading {}", path.display()), e))?;
    let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| RagError::Pdf {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let text = normalize_page_breaks(&text);
    if text.trim().is_empty() {
        warn!("no text extracted from {}; it may be a scanned document", path.display());
        return Err(RagError::EmptyDocument(path.to_path_buf()));
    }
    debug!(chars = text.chars().count(), "extracted text from {}", path.display());
    Ok(text)
}

fn normalize_page_breaks(text: &str) -> String {
    text.replace('\x0c', "\n")
}
