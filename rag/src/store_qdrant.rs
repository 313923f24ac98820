use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::http::{delete_json, get_json, put_json};

#[derive(Serialize)]
struct CreateCollection {
    vectors: VectorParams,
}

#[derive(Serialize)]
struct VectorParams {
    size: usize,
    distance: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PointPayload {
    pub document: String,
    pub index: usize,
    pub chunk: String,
}

#[derive(Serialize)]
pub struct Point {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

#[derive(Serialize)]
struct UpsertPoints<'a> {
    points: &'a [Point],
}

#[derive(Deserialize)]
struct CollectionsResponse {
    result: Option<CollectionsResult>,
}

#[derive(Deserialize)]
struct CollectionsResult {
    #[serde(default)]
    collections: Vec<CollectionDescription>,
}

#[derive(Deserialize)]
struct CollectionDescription {
    name: String,
}

fn collection_url(cfg: &Config, collection: &str) -> String {
    format!("{}/collections/{}", cfg.qdrant_url, collection)
}

pub fn collection_exists(cfg: &Config, collection: &str) -> bool {
    get_json::<Value>(cfg, &collection_url(cfg, collection)).is_ok()
}

pub fn list_collections(cfg: &Config) -> Result<Vec<String>> {
    let url = format!("{}/collections", cfg.qdrant_url);
    let res = get_json::<CollectionsResponse>(cfg, &url)?;
    Ok(res
        .result
        .map(|r| r.collections.into_iter().map(|c| c.name).collect())
        .unwrap_or_default())
}

/// Drops any previous index of the collection and creates an empty one.
pub fn recreate_collection(cfg: &Config, collection: &str, vector_size: usize) -> Result<()> {
    let url = collection_url(cfg, collection);
    if collection_exists(cfg, collection) {
        info!(collection, "replacing existing collection");
        delete_json::<Value>(cfg, &url)?;
    }
    let body = CreateCollection {
        vectors: VectorParams {
            size: vector_size,
            distance: cfg.distance.clone(),
        },
    };
    put_json::<Value, _>(cfg, &url, &body)?;
    Ok(())
}

pub fn store_points(cfg: &Config, collection: &str, points: &[Point]) -> Result<()> {
    if points.is_empty() {
        return Ok(());
    }
    let url = format!("{}/points?wait=true", collection_url(cfg, collection));
    let body = UpsertPoints { points };
    put_json::<Value, _>(cfg, &url, &body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server_config(server: &MockServer) -> Config {
        Config {
            qdrant_url: server.uri(),
            ..Config::default()
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn existing_collection_is_dropped_before_create() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections/qbank_cells"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"status": "green"}})))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/collections/qbank_cells"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/collections/qbank_cells"))
            .and(body_partial_json(json!({"vectors": {"size": 3, "distance": "Cosine"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = server_config(&server);
        tokio::task::spawn_blocking(move || recreate_collection(&cfg, "qbank_cells", 3))
            .await
            .unwrap()
            .unwrap();

        let methods: Vec<String> = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| r.method.to_string())
            .collect();
        assert_eq!(methods, ["GET", "DELETE", "PUT"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn new_collection_is_created_without_delete() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections/qbank_cells"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"status": {"error": "Not found"}})))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/collections/qbank_cells"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = server_config(&server);
        tokio::task::spawn_blocking(move || recreate_collection(&cfg, "qbank_cells", 3))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn points_are_upserted_with_wait() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/collections/qbank_cells/points"))
            .and(body_partial_json(json!({"points": [{"id": 1, "payload": {"document": "cells.pdf", "index": 0}}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"status": "completed"}})))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = server_config(&server);
        let points = vec![Point {
            id: 1,
            vector: vec![0.1, 0.2, 0.3],
            payload: PointPayload {
                document: "cells.pdf".to_string(),
                index: 0,
                chunk: "Cells divide.".to_string(),
            },
        }];
        tokio::task::spawn_blocking(move || store_points(&cfg, "qbank_cells", &points))
            .await
            .unwrap()
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), Some("wait=true"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn collection_names_are_listed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/collections"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"collections": [{"name": "qbank_a"}, {"name": "qbank_b"}]}
            })))
            .mount(&server)
            .await;

        let cfg = server_config(&server);
        let names = tokio::task::spawn_blocking(move || list_collections(&cfg))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(names, ["qbank_a", "qbank_b"]);
    }
}
