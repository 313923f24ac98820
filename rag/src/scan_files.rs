use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{RagError, Result};

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Every PDF under `dir`, in path order.
pub fn scan_pdfs(dir: &Path) -> Vec<PathBuf> {
    let mut results: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_pdf(e.path()))
        .map(|e| e.into_path())
        .collect();
    results.sort();
    results
}

/// File names of the PDFs stored in the upload directory, sorted.
pub fn list_documents(cfg: &Config) -> Vec<String> {
    if !cfg.upload_dir.is_dir() {
        return vec![];
    }
    let mut names: Vec<String> = WalkDir::new(&cfg.upload_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_pdf(e.path()))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Copies a PDF into the upload directory and returns its stored file name.
pub fn save_upload(cfg: &Config, source: &Path) -> Result<String> {
    if !is_pdf(source) {
        return Err(RagError::UnsupportedFile(source.to_path_buf()));
    }
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| RagError::UnsupportedFile(source.to_path_buf()))?;

    fs::create_dir_all(&cfg.upload_dir)
        .map_err(|e| RagError::io(format!("creating {}", cfg.upload_dir.display()), e))?;
    let dest = cfg.upload_dir.join(&name);

    if same_file(source, &dest) {
        debug!("{} already in upload directory", name);
        return Ok(name);
    }
    fs::copy(source, &dest)
        .map_err(|e| RagError::io(format!("copying {} to {}", source.display(), dest.display()), e))?;
    Ok(name)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
