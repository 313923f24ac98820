use serde::Deserialize;

use crate::config::Config;
use crate::error::Result;
use crate::http::post_json;
use crate::store_qdrant::PointPayload;

#[derive(Deserialize, Clone, Debug)]
pub struct Hit {
    #[serde(default)]
    pub score: f32,
    pub payload: Option<PointPayload>,
}

#[derive(Deserialize)]
struct QueryResponse {
    result: Option<QueryResult>,
}

#[derive(Deserialize)]
struct QueryResult {
    points: Vec<Hit>,
}

#[derive(serde::Serialize)]
struct QueryRequest<'a> {
    query: &'a [f32],
    limit: usize,
    with_payload: bool,
}

/// Nearest `top_k` chunks of one document's collection, best first.
pub fn retrieve_top(cfg: &Config, collection: &str, vector: &[f32]) -> Result<Vec<Hit>> {
    if vector.is_empty() {
        return Ok(vec![]);
    }
    let url = format!("{}/collections/{}/points/query", cfg.qdrant_url, collection);
    let req = QueryRequest {
        query: vector,
        limit: cfg.top_k,
        with_payload: true,
    };
    let res = post_json::<QueryResponse, _>(cfg, &url, &req)?;
    Ok(res.result.map(|r| r.points).unwrap_or_default())
}
