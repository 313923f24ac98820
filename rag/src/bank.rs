use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{RagError, Result};
use crate::questions::{Difficulty, QuestionType};

pub type TypeMap = BTreeMap<QuestionType, Vec<String>>;
pub type DifficultyMap = BTreeMap<Difficulty, TypeMap>;

/// Saved questions, keyed topic → difficulty → question type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    topics: BTreeMap<String, DifficultyMap>,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends questions, creating missing levels. Blank questions are
    /// skipped; returns how many were added.
    pub fn add(
        &mut self,
        topic: &str,
        difficulty: Difficulty,
        q_type: QuestionType,
        questions: &[String],
    ) -> usize {
        let fresh: Vec<String> = questions
            .iter()
            .filter(|q| !q.trim().is_empty())
            .cloned()
            .collect();
        if fresh.is_empty() {
            return 0;
        }
        let added = fresh.len();
        self.topics
            .entry(topic.to_string())
            .or_default()
            .entry(difficulty)
            .or_default()
            .entry(q_type)
            .or_default()
            .extend(fresh);
        added
    }

    pub fn get(&self, topic: &str, difficulty: Difficulty, q_type: QuestionType) -> &[String] {
        self.topics
            .get(topic)
            .and_then(|d| d.get(&difficulty))
            .and_then(|t| t.get(&q_type))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn level(&self, topic: &str, difficulty: Difficulty) -> Option<&TypeMap> {
        self.topics.get(topic).and_then(|d| d.get(&difficulty))
    }

    pub fn topics(&self) -> impl Iterator<Item = (&String, &DifficultyMap)> {
        self.topics.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of stored questions.
    pub fn len(&self) -> usize {
        self.topics
            .values()
            .flat_map(|d| d.values())
            .flat_map(|t| t.values())
            .map(Vec::len)
            .sum()
    }
}

pub fn bank_path(cfg: &Config, document: &str) -> PathBuf {
    let stem = Path::new(document)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(document);
    cfg.bank_dir.join(format!("{stem}_questions.json"))
}

/// Loads a document's bank. A missing or unreadable file yields an empty bank.
pub fn load_bank(cfg: &Config, document: &str) -> QuestionBank {
    let path = bank_path(cfg, document);
    if !path.exists() {
        return QuestionBank::new();
    }
    match read_bank(&path) {
        Ok(bank) => bank,
        Err(err) => {
            warn!("ignoring question bank {}: {}", path.display(), err);
            QuestionBank::new()
        }
    }
}

fn read_bank(path: &Path) -> Result<QuestionBank> {
    let contents = fs::read_to_string(path)
        .map_err(|e| RagError::io(format!("reading {}", path.display()), e))?;
    if contents.trim().is_empty() {
        return Ok(QuestionBank::new());
    }
    Ok(serde_json::from_str(&contents)?)
}

pub fn save_bank(cfg: &Config, document: &str, bank: &QuestionBank) -> Result<PathBuf> {
    fs::create_dir_all(&cfg.bank_dir)
        .map_err(|e| RagError::io(format!("creating {}", cfg.bank_dir.display()), e))?;
    let path = bank_path(cfg, document);
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(bank)?;
    fs::write(&tmp, json).map_err(|e| RagError::io(format!("writing {}", tmp.display()), e))?;
    fs::rename(&tmp, &path)
        .map_err(|e| RagError::io(format!("replacing {}", path.display()), e))?;
    Ok(path)
}

/// Appends questions to a document's bank on disk, returning how many were
/// added. Nothing is written when there is nothing to add, and an existing
/// bank file that cannot be read is an error rather than being replaced.
pub fn save_questions(
    cfg: &Config,
    document: &str,
    topic: &str,
    difficulty: Difficulty,
    q_type: QuestionType,
    questions: &[String],
) -> Result<usize> {
    if questions.iter().all(|q| q.trim().is_empty()) {
        return Ok(0);
    }
    let path = bank_path(cfg, document);
    let mut bank = if path.exists() {
        read_bank(&path)?
    } else {
        QuestionBank::new()
    };
    let added = bank.add(topic, difficulty, q_type, questions);
    let path = save_bank(cfg, document, &bank)?;
    info!(added, "saved {} questions to {}", q_type, path.display());
    Ok(added)
}
