use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::{RagError, Result};

const DEFAULT_CONFIG_FILE: &str = "qbank.toml";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub upload_dir: PathBuf,
    pub bank_dir: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub embed_batch_size: usize,
    pub ollama_url: String,
    pub embed_model: String,
    pub chat_model: String,
    pub qdrant_url: String,
    pub collection_prefix: String,
    pub distance: String,
    pub top_k: usize,
    pub request_timeout_secs: u64,
    pub system_prompt: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            bank_dir: PathBuf::from("question_banks"),
            chunk_size: 1000,
            chunk_overlap: 200,
            embed_batch_size: 32,
            ollama_url: "http://localhost:11434".to_string(),
            embed_model: "qwen2.5:1.5b".to_string(),
            chat_model: "qwen2.5:1.5b".to_string(),
            qdrant_url: "http://localhost:6333".to_string(),
            collection_prefix: "qbank".to_string(),
            distance: "Cosine".to_string(),
            top_k: 3,
            request_timeout_secs: 120,
            system_prompt: "You are an experienced examiner. Write clear, unambiguous exam questions grounded in the material you are given.".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads `.env`, then the TOML file named by `QBANK_CONFIG` (or
    /// `./qbank.toml`) when present, then environment overrides.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::load_from(Self::default_path())
    }

    /// Config file consulted by [`Config::load`].
    pub fn default_path() -> PathBuf {
        env::var("QBANK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Missing files are not an error: defaults plus env overrides apply.

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut cfg = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| RagError::io(format!("reading {}", path.display()), e))?;
            Self::from_toml_str(&contents)?
        } else {
            Self::default()
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn apply_env_overrides(&mut self) {
        override_path(&mut self.upload_dir, "QBANK_UPLOAD_DIR");
        override_path(&mut self.bank_dir, "QBANK_BANK_DIR");
        override_parsed(&mut self.chunk_size, "RAG_CHUNK_SIZE");
        override_parsed(&mut self.chunk_overlap, "RAG_CHUNK_OVERLAP");
        override_parsed(&mut self.embed_batch_size, "RAG_EMBED_BATCH");
        override_string(&mut self.ollama_url, "OLLAMA_URL");
        override_string(&mut self.embed_model, "OLLAMA_EMBED_MODEL");
        override_string(&mut self.chat_model, "OLLAMA_CHAT_MODEL");
        override_string(&mut self.qdrant_url, "QDRANT_URL");
        override_string(&mut self.collection_prefix, "QDRANT_COLLECTION_PREFIX");
        override_string(&mut self.distance, "QDRANT_DISTANCE");
        override_parsed(&mut self.top_k, "RAG_TOP_K");
        override_parsed(&mut self.request_timeout_secs, "RAG_TIMEOUT_SECS");
        override_string(&mut self.system_prompt, "RAG_SYSTEM_PROMPT");
        override_string(&mut self.log_level, "QBANK_LOG_LEVEL");
    }

    /// Qdrant collection holding the chunks of one uploaded document.
    ///
    /// The sanitized stem keeps the name readable; the suffix is derived from
    /// the full file name so that names which sanitize alike still get
    /// separate collections.
    pub fn collection_for(&self, document: &str) -> String {
        let stem = Path::new(document)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(document);
        format!(
            "{}_{}_{}",
            sanitize_collection_name(&self.collection_prefix),
            sanitize_collection_name(stem),
            name_digest(document)
        )
    }
}

fn override_string(field: &mut String, key: &str) {
    if let Ok(val) = env::var(key) {
        *field = val;
    }
}

fn override_path(field: &mut PathBuf, key: &str) {
    if let Ok(val) = env::var(key) {
        *field = PathBuf::from(val);
    }
}

fn override_parsed<T: std::str::FromStr>(field: &mut T, key: &str) {
    if let Some(val) = env::var(key).ok().and_then(|v| v.parse().ok()) {
        *field = val;
    }
}

fn name_digest(name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..12].to_string()
}

fn sanitize_collection_name(name: &str) -> String {
    let mut out = String::new();
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
        } else if c.is_ascii_whitespace() || c == '.' {
            out.push('_');
        }
    }
    if out.is_empty() { "default".to_string() } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_expected_values() {
        let cfg = Config::default();
        assert_eq!(cfg.chunk_size, 1000);
        assert_eq!(cfg.chunk_overlap, 200);
        assert_eq!(cfg.top_k, 3);
        assert_eq!(cfg.upload_dir, PathBuf::from("uploads"));
        assert_eq!(cfg.bank_dir, PathBuf::from("question_banks"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_toml_str(
            r#"
chat_model = "llama3.2"
top_k = 6
upload_dir = "/tmp/pdfs"
"#,
        )
        .unwrap();
        assert_eq!(cfg.chat_model, "llama3.2");
        assert_eq!(cfg.top_k, 6);
        assert_eq!(cfg.upload_dir, PathBuf::from("/tmp/pdfs"));
        assert_eq!(cfg.embed_model, "qwen2.5:1.5b");
        assert_eq!(cfg.chunk_size, 1000);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(tmp.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.collection_prefix, "qbank");
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(Config::from_toml_str("top_k = \"many\"").is_err());
    }

    #[test]
    fn collection_names_are_sanitized() {
        let cfg = Config::default();
        let name = cfg.collection_for("Operating Systems.pdf");
        assert!(name.starts_with("qbank_Operating_Systems_"), "{}", name);
        assert!(cfg.collection_for("§§.pdf").starts_with("qbank_default_"));
        assert!(
            name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
            "{}",
            name
        );
    }

    #[test]
    fn collection_names_are_stable() {
        let cfg = Config::default();
        assert_eq!(
            cfg.collection_for("intro to rust.pdf"),
            cfg.collection_for("intro to rust.pdf")
        );
        let suffix = cfg.collection_for("notes.pdf").rsplit('_').next().unwrap().to_string();
        assert_eq!(suffix.len(), 12);
    }

    #[test]
    fn similar_file_names_get_distinct_collections() {
        let cfg = Config::default();
        let names = [
            "intro to rust.pdf",
            "intro_to_rust.pdf",
            "intro.to.rust.pdf",
            "notes(1).pdf",
            "notes1.pdf",
        ];
        let collections: std::collections::BTreeSet<String> =
            names.iter().map(|doc| cfg.collection_for(doc)).collect();
        assert_eq!(collections.len(), names.len());
        assert_ne!(cfg.collection_for("notes(1).pdf"), cfg.collection_for("notes1.pdf"));
    }
}
