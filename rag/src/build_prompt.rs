use crate::config::Config;
use crate::questions::{Difficulty, QuestionType};
use crate::retrieve_chunks::Hit;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    fn new(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content,
        }
    }
}

/// The task instruction for one batch of questions.
pub fn template(q_type: QuestionType, topic: &str, difficulty: Difficulty, num: usize) -> String {
    match q_type {
        QuestionType::Mcq => format!(
            "Generate {num} multiple choice questions about {topic} for {difficulty} level. Each question should have 4 options and one correct answer. Use the provided context information when applicable."
        ),
        QuestionType::TrueFalse => format!(
            "Generate {num} true/false questions about {topic} for {difficulty} level, including correct answers. Use the provided context information when applicable."
        ),
        QuestionType::Short => format!(
            "Generate {num} short answer questions about {topic} for {difficulty} level, with brief model answers. Use the provided context information when applicable."
        ),
        QuestionType::Long => format!(
            "Generate {num} long answer questions about {topic} for {difficulty} level, including key points. Use the provided context information when applicable."
        ),
    }
}

pub fn retrieval_query(q_type: QuestionType, topic: &str, difficulty: Difficulty) -> String {
    format!("I need to create {q_type} questions about {topic} at {difficulty} level.")
}

pub fn build_generation_prompt(
    cfg: &Config,
    document: &str,
    task: &str,
    context: Option<&str>,
) -> Vec<Message> {
    let user_content = match context {
        Some(context) => format!(
            "Context information from {}:\n{}\n\nTask:\n{}\n\nFormat each question clearly and include answers.",
            document, context, task
        ),
        None => task.to_string(),
    };

    let mut messages = Vec::with_capacity(2);
    if !cfg.system_prompt.trim().is_empty() {
        messages.push(Message::new("system", cfg.system_prompt.clone()));
    }
    messages.push(Message::new("user", user_content));
    messages
}

pub fn format_context_from_hits(hits: &[Hit]) -> String {
    let mut context_lines = Vec::new();
    for (i, hit) in hits.iter().enumerate() {
        let Some(payload) = hit.payload.as_ref() else {
            continue;
        };
        context_lines.push(format!(
            "[{}] {} (chunk {})\n{}",
            i + 1,
            payload.document,
            payload.index,
            payload.chunk
        ));
    }

    if context_lines.is_empty() {
        "(no context found)".to_string()
    } else {
        context_lines.join("\n\n")
    }
}
