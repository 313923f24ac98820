mod bank;
mod build_prompt;
mod chunk_text;
mod config;
mod embed_chunks;
mod embed_query;
mod error;
mod exam;
mod generate;
mod http;
mod pdf;
mod questions;
mod render;
mod retrieve_chunks;
mod scan_files;
mod store_qdrant;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

pub use bank::{bank_path, load_bank, save_bank, save_questions, QuestionBank};
pub use build_prompt::{build_generation_prompt, retrieval_query, template, Message};
pub use chunk_text::chunk_text;
pub use config::Config;
pub use error::{RagError, Result};
pub use exam::{create_exam, create_exam_for_document, ExamCounts, ExamPaper, ExamSection};
pub use generate::{generate_questions, Generation, GenerationRequest};
pub use questions::{split_questions, topic_from_filename, Difficulty, QuestionType};
pub use render::{format_bank, format_exam, format_question, format_questions};
pub use scan_files::{is_pdf, list_documents};

use embed_chunks::embed_texts;
use pdf::extract_text;
use scan_files::{save_upload, scan_pdfs};
use store_qdrant::{collection_exists, list_collections, recreate_collection, store_points, Point, PointPayload};

#[derive(Clone, Debug)]
pub struct IngestReport {
    pub document: String,
    pub chunks: usize,
    pub dimensions: usize,
}

/// Stores a PDF in the upload directory and (re)builds its vector index.
pub fn ingest_document(cfg: &Config, path: &Path) -> Result<IngestReport> {
    let document = save_upload(cfg, path)?;
    let stored = cfg.upload_dir.join(&document);

    let text = extract_text(&stored)?;
    let chunks = chunk_text(&text, cfg);
    if chunks.is_empty() {
        return Err(RagError::EmptyDocument(stored));
    }
    let vectors = embed_texts(cfg, &chunks)?;
    let dimensions = vectors.first().map(Vec::len).unwrap_or(0);
    if dimensions == 0 {
        return Err(RagError::Embedding("embedding model returned empty vectors".to_string()));
    }

    let collection = cfg.collection_for(&document);
    recreate_collection(cfg, &collection, dimensions)?;

    let points: Vec<Point> = chunks
        .into_iter()
        .zip(vectors)
        .enumerate()
        .map(|(idx, (chunk, vector))| Point {
            id: idx as u64 + 1,
            vector,
            payload: PointPayload {
                document: document.clone(),
                index: idx,
                chunk,
            },
        })
        .collect();
    let count = points.len();
    for batch in points.chunks(cfg.embed_batch_size.max(1) * 4) {
        store_points(cfg, &collection, batch)?;
    }

    info!(document = %document, chunks = count, dimensions, "indexed document");
    Ok(IngestReport {
        document,
        chunks: count,
        dimensions,
    })
}

/// Ingests one PDF, or every PDF beneath a directory. Per-file failures in a
/// directory are logged and returned alongside the successes.
pub fn ingest_path(cfg: &Config, path: &Path) -> Vec<(PathBuf, Result<IngestReport>)> {
    if !path.is_dir() {
        return vec![(path.to_path_buf(), ingest_document(cfg, path))];
    }
    scan_pdfs(path)
        .into_iter()
        .map(|file| {
            let result = ingest_document(cfg, &file);
            if let Err(err) = &result {
                warn!("skipping {}: {}", file.display(), err);
            }
            (file, result)
        })
        .collect()
}

/// Uploaded documents that have a vector index.
pub fn indexed_documents(cfg: &Config) -> Vec<String> {
    let collections = match list_collections(cfg) {
        Ok(names) => names,
        Err(err) => {
            warn!("cannot list vector stores: {}", err);
            return vec![];
        }
    };
    list_documents(cfg)
        .into_iter()
        .filter(|doc| collections.contains(&cfg.collection_for(doc)))
        .collect()
}

pub fn is_indexed(cfg: &Config, document: &str) -> bool {
    collection_exists(cfg, &cfg.collection_for(document))
}
