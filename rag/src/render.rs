//! Plain-text views of generated questions, question banks and exams.

use crate::bank::QuestionBank;
use crate::exam::ExamPaper;
use crate::questions::QuestionType;

const MCQ_MARKERS: [(&str, &str); 6] = [
    ("**Question**:", "Question:"),
    ("**Option A**:", "A:"),
    ("**Option B**:", "B:"),
    ("**Option C**:", "C:"),
    ("**Option D**:", "D:"),
    ("**Answer**:", "Answer:"),
];

const WRITTEN_MARKERS: [(&str, &str); 3] = [
    ("**Question:**", "Question:"),
    ("**Short Answer Answer:**", "Answer:"),
    ("**Answer:**", "Answer:"),
];

/// Strips the markdown emphasis models tend to put around question parts.
pub fn format_question(question: &str, q_type: QuestionType) -> String {
    let mut text = question.trim().to_string();
    match q_type {
        QuestionType::Mcq => {
            for (from, to) in MCQ_MARKERS {
                text = text.replace(from, to);
            }
        }
        QuestionType::TrueFalse => {
            if text.contains("- True") {
                text = text.replace("- True", "Answer: True");
            } else if text.contains("- False") {
                text = text.replace("- False", "Answer: False");
            }
        }
        QuestionType::Short | QuestionType::Long => {
            for (from, to) in WRITTEN_MARKERS {
                text = text.replace(from, to);
            }
        }
    }
    text
}

pub fn format_questions(questions: &[String], q_type: QuestionType) -> String {
    if questions.is_empty() {
        return "No questions generated yet.".to_string();
    }
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("({}) {}", i + 1, format_question(q, q_type)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_bank(document: &str, bank: &QuestionBank) -> String {
    if bank.is_empty() {
        return format!("No questions saved for {document} yet.");
    }
    let mut out = vec![format!("Question Bank for {document}")];
    for (topic, levels) in bank.topics() {
        out.push(format!("\n== Topic: {topic}"));
        for (difficulty, types) in levels {
            out.push(format!("\n-- Difficulty: {difficulty}"));
            for (q_type, questions) in types {
                out.push(format!("\n{} ({})", q_type.label(), count_label(questions.len())));
                for q in questions.iter().filter(|q| !q.trim().is_empty()) {
                    out.push(format!("\n{}", format_question(q, *q_type)));
                }
            }
        }
    }
    out.join("\n")
}

fn count_label(n: usize) -> String {
    if n == 1 {
        "1 question".to_string()
    } else {
        format!("{n} questions")
    }
}

pub fn format_exam(exam: &ExamPaper) -> String {
    let mut out = vec![exam.title.clone(), format!("Date: {}", exam.date)];
    for (idx, section) in exam.sections.iter().enumerate() {
        out.push(format!("\nSection {}: {}", idx + 1, section.q_type.label()));
        for (i, q) in section.questions.iter().enumerate() {
            out.push(format!("\n{}. {}", i + 1, format_question(q, section.q_type)));
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exam::ExamSection;
    use crate::questions::Difficulty;

    #[test]
    fn mcq_markers_are_normalised() {
        let q = "**Question**: Pick one\n**Option A**: x\n**Option B**: y\n**Answer**: A";
        assert_eq!(
            format_question(q, QuestionType::Mcq),
            "Question: Pick one\nA: x\nB: y\nAnswer: A"
        );
    }

    #[test]
    fn true_false_answers_are_labelled() {
        assert_eq!(
            format_question("Rust has a GC - False", QuestionType::TrueFalse),
            "Rust has a GC Answer: False"
        );
        assert_eq!(
            format_question("Cargo builds crates\n- True", QuestionType::TrueFalse),
            "Cargo builds crates\nAnswer: True"
        );
    }

    #[test]
    fn written_answers_are_normalised() {
        let q = "**Question:** Why?\n**Short Answer Answer:** Because.";
        assert_eq!(format_question(q, QuestionType::Short), "Question: Why?\nAnswer: Because.");
    }

    #[test]
    fn empty_views_have_placeholders() {
        assert_eq!(format_questions(&[], QuestionType::Mcq), "No questions generated yet.");
        assert_eq!(
            format_bank("cells.pdf", &QuestionBank::new()),
            "No questions saved for cells.pdf yet."
        );
    }

    #[test]
    fn bank_view_lists_labels_and_counts() {
        let mut bank = QuestionBank::new();
        bank.add("cells", Difficulty::Beginner, QuestionType::Long, &["Describe mitosis.".to_string()]);
        let text = format_bank("cells.pdf", &bank);
        assert!(text.starts_with("Question Bank for cells.pdf"));
        assert!(text.contains("== Topic: cells"));
        assert!(text.contains("-- Difficulty: beginner"));
        assert!(text.contains("Long Answer Questions (1 question)"));
        assert!(text.contains("Describe mitosis."));

        bank.add("cells", Difficulty::Beginner, QuestionType::Long, &["Describe meiosis.".to_string()]);
        assert!(format_bank("cells.pdf", &bank).contains("Long Answer Questions (2 questions)"));
    }

    #[test]
    fn exam_view_numbers_sections() {
        let exam = ExamPaper {
            title: "cells Exam (beginner Level)".to_string(),
            date: "2026-01-02".to_string(),
            sections: vec![
                ExamSection { q_type: QuestionType::Mcq, questions: vec!["q1".to_string()] },
                ExamSection { q_type: QuestionType::Short, questions: vec!["q2".to_string()] },
            ],
        };
        let text = format_exam(&exam);
        assert!(text.starts_with("cells Exam (beginner Level)\nDate: 2026-01-02"));
        assert!(text.contains("Section 1: Multiple Choice Questions\n\n1. q1"));
        assert!(text.contains("Section 2: Short Answer Questions"));
    }
}
