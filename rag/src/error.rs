use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by ingestion, generation and question-bank storage.
#[derive(Error, Debug)]
pub enum RagError {
    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("{method} {url} failed: {message}")]
    Http {
        method: &'static str,
        url: String,
        message: String,
    },

    #[error("{url} decode failed: {message}")]
    Decode { url: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to extract text from {path}: {message}")]
    Pdf { path: PathBuf, message: String },

    #[error("no extractable text in {0}")]
    EmptyDocument(PathBuf),

    #[error("not a PDF file: {0}")]
    UnsupportedFile(PathBuf),

    #[error("document is not indexed: {0}")]
    NotIndexed(String),

    #[error("unsupported question type: {0}")]
    UnknownQuestionType(String),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("No questions found for {topic} at {difficulty} level.")]
    NoQuestions { topic: String, difficulty: String },

    #[error("embedding error: {0}")]
    Embedding(String),
}

impl RagError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        RagError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RagError>;
