use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RagError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    TrueFalse,
    Short,
    Long,
}

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [
        QuestionType::Mcq,
        QuestionType::TrueFalse,
        QuestionType::Short,
        QuestionType::Long,
    ];

    pub fn key(self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::TrueFalse => "true_false",
            QuestionType::Short => "short",
            QuestionType::Long => "long",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Mcq => "Multiple Choice Questions",
            QuestionType::TrueFalse => "True/False Questions",
            QuestionType::Short => "Short Answer Questions",
            QuestionType::Long => "Long Answer Questions",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for QuestionType {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.key() == s.trim())
            .ok_or_else(|| RagError::UnknownQuestionType(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Difficulty {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.key() == wanted)
            .ok_or_else(|| RagError::UnknownDifficulty(s.to_string()))
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    all[(idx + 1) % all.len()]
}

/// Topic derived from an uploaded file name: the stem, underscores as spaces.
pub fn topic_from_filename(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    stem.replace('_', " ")
}

static NUMBERED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:#+[ \t]*)?(?:\*\*)?[ \t]*(?:Q(?:uestion)?[ \t]*)?\d+[ \t]*(?:\*\*)?[.):](?:\*\*)?(?:[ \t]|$)")
        .expect("numbered item pattern is valid")
});

static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("blank line pattern is valid"));

/// Splits a model response into individual question items.
///
/// Numbered headings delimit items when present and any preamble before the
/// first one is dropped. Only headings at the shallowest indentation count,
/// so indented numbered lists stay inside the question they belong to.
/// Otherwise blank-line separated blocks are used, and a single block falls
/// back to one item per non-empty line.
pub fn split_questions(response: &str) -> Vec<String> {
    let text = response.replace("\r\n", "\n");
    let headings: Vec<(usize, usize)> = NUMBERED_ITEM
        .find_iter(&text)
        .map(|m| (m.start(), indent_width(&text[m.start()..])))
        .collect();
    let outer = headings.iter().map(|&(_, indent)| indent).min().unwrap_or(0);
    let starts: Vec<usize> = headings
        .into_iter()
        .filter(|&(_, indent)| indent <= outer)
        .map(|(start, _)| start)
        .collect();

    let items: Vec<String> = if !starts.is_empty() {
        starts
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = starts.get(i + 1).copied().unwrap_or(text.len());
                text[start..end].to_string()
            })
            .collect()
    } else {
        let blocks: Vec<String> = BLANK_LINE.split(&text).map(str::to_string).collect();
        if blocks.iter().filter(|b| !b.trim().is_empty()).count() > 1 {
            blocks
        } else {
            text.lines().map(str::to_string).collect()
        }
    };

    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}
