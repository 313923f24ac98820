use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::build_prompt::{
    build_generation_prompt, format_context_from_hits, retrieval_query, template, Message,
};
use crate::config::Config;
use crate::embed_query::embed_query;
use crate::error::{RagError, Result};
use crate::http::post_json;
use crate::questions::{split_questions, topic_from_filename, Difficulty, QuestionType};
use crate::retrieve_chunks::retrieve_top;
use crate::store_qdrant::collection_exists;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

pub fn generate_answer(cfg: &Config, messages: &[Message]) -> Result<String> {
    let url = format!("{}/api/chat", cfg.ollama_url);
    let req = ChatRequest {
        model: &cfg.chat_model,
        messages,
        stream: false,
    };
    let res = post_json::<ChatResponse, _>(cfg, &url, &req)?;
    Ok(res.message.and_then(|m| m.content).unwrap_or_default())
}

#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub document: String,
    pub difficulty: Difficulty,
    pub q_type: QuestionType,
    pub count: usize,
}

#[derive(Clone, Debug)]
pub struct Generation {
    pub document: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub q_type: QuestionType,
    /// Retrieved passages, `None` when the bare template was used.
    pub context: Option<String>,
    pub questions: Vec<String>,
}

/// Generates questions for a document, grounding the prompt in retrieved
/// passages when the document has an index. Retrieval problems degrade to
/// the bare template. A failed grounded chat call is retried once with the
/// bare template; any other model error is returned.
pub fn generate_questions(cfg: &Config, req: &GenerationRequest) -> Result<Generation> {
    let topic = topic_from_filename(&req.document);
    let task = template(req.q_type, &topic, req.difficulty, req.count.max(1));

    let mut context = match retrieve_context(cfg, req, &topic) {
        Ok(context) => Some(context),
        Err(err) => {
            warn!(document = %req.document, "generating without context: {}", err);
            None
        }
    };

    let messages = build_generation_prompt(cfg, &req.document, &task, context.as_deref());
    let raw = match generate_answer(cfg, &messages) {
        Ok(raw) => raw,
        Err(err) if context.is_some() => {
            warn!(document = %req.document, "grounded generation failed, retrying without context: {}", err);
            context = None;
            let bare = build_generation_prompt(cfg, &req.document, &task, None);
            generate_answer(cfg, &bare)?
        }
        Err(err) => return Err(err),
    };
    let questions = split_questions(&raw);
    info!(
        document = %req.document,
        q_type = %req.q_type,
        difficulty = %req.difficulty,
        count = questions.len(),
        "generated questions"
    );

    Ok(Generation {
        document: req.document.clone(),
        topic,
        difficulty: req.difficulty,
        q_type: req.q_type,
        context,
        questions,
    })
}

fn retrieve_context(cfg: &Config, req: &GenerationRequest, topic: &str) -> Result<String> {
    let collection = cfg.collection_for(&req.document);
    if !collection_exists(cfg, &collection) {
        return Err(RagError::NotIndexed(req.document.clone()));
    }
    let query = retrieval_query(req.q_type, topic, req.difficulty);
    let vector = embed_query(cfg, &query)?;
    let hits = retrieve_top(cfg, &collection, &vector)?;
    Ok(format_context_from_hits(&hits))
}
