use chrono::Local;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bank::{load_bank, QuestionBank};
use crate::config::Config;
use crate::error::{RagError, Result};
use crate::questions::{topic_from_filename, Difficulty, QuestionType};

/// How many questions of each type an exam asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExamCounts {
    pub mcq: usize,
    pub true_false: usize,
    pub short: usize,
    pub long: usize,
}

impl Default for ExamCounts {
    fn default() -> Self {
        Self {
            mcq: 5,
            true_false: 3,
            short: 2,
            long: 1,
        }
    }
}

impl ExamCounts {
    pub fn get(&self, q_type: QuestionType) -> usize {
        match q_type {
            QuestionType::Mcq => self.mcq,
            QuestionType::TrueFalse => self.true_false,
            QuestionType::Short => self.short,
            QuestionType::Long => self.long,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExamSection {
    #[serde(rename = "type")]
    pub q_type: QuestionType,
    pub questions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExamPaper {
    pub title: String,
    pub date: String,
    pub sections: Vec<ExamSection>,
}

/// Samples an exam from a bank. Types missing from the bank or asked for
/// zero times get no section.
pub fn create_exam<R: Rng + ?Sized>(
    bank: &QuestionBank,
    topic: &str,
    difficulty: Difficulty,
    counts: ExamCounts,
    rng: &mut R,
) -> Result<ExamPaper> {
    let level = bank
        .level(topic, difficulty)
        .ok_or_else(|| RagError::NoQuestions {
            topic: topic.to_string(),
            difficulty: difficulty.to_string(),
        })?;

    let mut sections = Vec::new();
    for q_type in QuestionType::ALL {
        let wanted = counts.get(q_type);
        let Some(available) = level.get(&q_type) else {
            continue;
        };
        if wanted == 0 || available.is_empty() {
            continue;
        }
        let questions: Vec<String> = available
            .choose_multiple(rng, wanted.min(available.len()))
            .cloned()
            .collect();
        sections.push(ExamSection { q_type, questions });
    }

    Ok(ExamPaper {
        title: format!("{topic} Exam ({difficulty} Level)"),
        date: Local::now().format("%Y-%m-%d").to_string(),
        sections,
    })
}

pub fn create_exam_for_document(
    cfg: &Config,
    document: &str,
    difficulty: Difficulty,
    counts: ExamCounts,
) -> Result<ExamPaper> {
    let bank = load_bank(cfg, document);
    let topic = topic_from_filename(document);
    create_exam(&bank, &topic, difficulty, counts, &mut rand::rng())
}
