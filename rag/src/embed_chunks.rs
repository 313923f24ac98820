use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{RagError, Result};
use crate::http::post_json;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Serialize)]
struct EmbedLegacyRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Embeds every text, `embed_batch_size` texts per request.
pub fn embed_texts(cfg: &Config, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(vec![]);
    }
    let batch = cfg.embed_batch_size.max(1);
    let mut out = Vec::with_capacity(texts.len());
    for (i, slice) in texts.chunks(batch).enumerate() {
        debug!(batch = i, size = slice.len(), "embedding batch");
        out.extend(embed_batch(cfg, slice)?);
    }
    if out.len() != texts.len() {
        return Err(RagError::Embedding(format!(
            "expected {} vectors, got {}",
            texts.len(),
            out.len()
        )));
    }
    Ok(out)
}

fn embed_batch(cfg: &Config, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let url = format!("{}/api/embed", cfg.ollama_url);
    let req = EmbedRequest {
        model: &cfg.embed_model,
        input: texts,
    };
    match post_json::<Value, _>(cfg, &url, &req) {
        Ok(res) => parse_embeddings(res),
        Err(err) => {
            // Older Ollama builds only expose the single-prompt endpoint.
            warn!("{}; falling back to /api/embeddings", err);
            let url = format!("{}/api/embeddings", cfg.ollama_url);
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                let req = EmbedLegacyRequest {
                    model: &cfg.embed_model,
                    prompt: text,
                };
                let res = post_json::<Value, _>(cfg, &url, &req)?;
                out.extend(parse_embeddings(res)?);
            }
            Ok(out)
        }
    }
}

pub(crate) fn parse_embeddings(value: Value) -> Result<Vec<Vec<f32>>> {
    if let Some(embeddings) = value.get("embeddings") {
        return parse_embeddings_value(embeddings);
    }
    if let Some(embedding) = value.get("embedding") {
        return parse_embeddings_value(embedding);
    }
    Err(RagError::Embedding("no embeddings in response".to_string()))
}

fn parse_embeddings_value(value: &Value) -> Result<Vec<Vec<f32>>> {
    if let Some(arr) = value.as_array() {
        if arr.is_empty() {
            return Ok(vec![]);
        }
        if arr[0].is_array() {
            return arr.iter().map(parse_vec).collect();
        }
        return Ok(vec![parse_vec(value)?]);
    }
    Err(RagError::Embedding("invalid embeddings format".to_string()))
}

fn parse_vec(value: &Value) -> Result<Vec<f32>> {
    let arr = value
        .as_array()
        .ok_or_else(|| RagError::Embedding("embedding is not an array".to_string()))?;
    arr.iter()
        .map(|v| {
            v.as_f64()
                .map(|n| n as f32)
                .ok_or_else(|| RagError::Embedding("embedding value is not a number".to_string()))
        })
        .collect()
}
