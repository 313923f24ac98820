use std::fs;

use rag::{generate_questions, indexed_documents, Config, Difficulty, GenerationRequest, QuestionType, RagError};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOCUMENT: &str = "cells.pdf";

fn server_config(server: &MockServer) -> Config {
    Config {
        ollama_url: server.uri(),
        qdrant_url: server.uri(),
        request_timeout_secs: 5,
        ..Config::default()
    }
}

fn request() -> GenerationRequest {
    GenerationRequest {
        document: DOCUMENT.to_string(),
        difficulty: Difficulty::Beginner,
        q_type: QuestionType::Short,
        count: 2,
    }
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "message": {"role": "assistant", "content": content}
    }))
}

async fn mount_indexed_collection(server: &MockServer, cfg: &Config) {
    let collection = cfg.collection_for(DOCUMENT);
    Mock::given(method("GET"))
        .and(path(format!("/collections/{}", collection)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"status": "green"}})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embeddings": [[0.1, 0.2, 0.3]]})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/collections/{}/points/query", collection)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"points": [
                {"id": 1, "score": 0.92, "payload": {"document": DOCUMENT, "index": 0, "chunk": "Mitochondria make ATP."}}
            ]}
        })))
        .mount(server)
        .await;
}

async fn generate(cfg: Config) -> rag::Result<rag::Generation> {
    tokio::task::spawn_blocking(move || generate_questions(&cfg, &request()))
        .await
        .unwrap()
}

async fn chat_bodies(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/api/chat")
        .map(|r| String::from_utf8_lossy(&r.body).to_string())
        .collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn grounded_generation_uses_retrieved_passages() {
    let server = MockServer::start().await;
    let cfg = server_config(&server);
    mount_indexed_collection(&server, &cfg).await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(chat_reply("1. What do mitochondria make?\nAnswer: ATP\n2. Name an organelle.\nAnswer: Nucleus"))
        .expect(1)
        .mount(&server)
        .await;

    let generation = generate(cfg).await.unwrap();
    assert_eq!(generation.topic, "cells");
    assert_eq!(generation.questions.len(), 2);
    let context = generation.context.unwrap();
    assert!(context.contains("Mitochondria make ATP."), "{}", context);

    let bodies = chat_bodies(&server).await;
    assert!(bodies[0].contains("Context information from cells.pdf"));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_collection_falls_back_to_bare_prompt() {
    let server = MockServer::start().await;
    let cfg = server_config(&server);
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(chat_reply("1. What is a cell?\n2. What is a membrane?"))
        .expect(1)
        .mount(&server)
        .await;

    let generation = generate(cfg).await.unwrap();
    assert!(generation.context.is_none());
    assert_eq!(generation.questions.len(), 2);

    let bodies = chat_bodies(&server).await;
    assert!(!bodies[0].contains("Context information"));
}

#[tokio::test(flavor = "multi_thread")]
async fn embedding_failure_falls_back_to_bare_prompt() {
    let server = MockServer::start().await;
    let cfg = server_config(&server);
    Mock::given(method("GET"))
        .and(path(format!("/collections/{}", cfg.collection_for(DOCUMENT))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {}})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(chat_reply("1. Define osmosis."))
        .expect(1)
        .mount(&server)
        .await;

    let generation = generate(cfg).await.unwrap();
    assert!(generation.context.is_none());
    assert_eq!(generation.questions, vec!["1. Define osmosis.".to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_grounded_chat_is_retried_without_context() {
    let server = MockServer::start().await;
    let cfg = server_config(&server);
    mount_indexed_collection(&server, &cfg).await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_string_contains("Context information"))
        .respond_with(ResponseTemplate::new(500).set_body_string("context window exceeded"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(chat_reply("1. What is ATP?"))
        .expect(1)
        .mount(&server)
        .await;

    let generation = generate(cfg).await.unwrap();
    assert!(generation.context.is_none());
    assert_eq!(generation.questions.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn model_error_without_context_is_returned() {
    let server = MockServer::start().await;
    let cfg = server_config(&server);
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let err = generate(cfg).await.unwrap_err();
    match err {
        RagError::Http { method, message, .. } => {
            assert_eq!(method, "POST");
            assert!(message.contains("500"), "{}", message);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn indexed_documents_match_listed_collections() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    let cfg = Config {
        upload_dir: tmp.path().to_path_buf(),
        ..server_config(&server)
    };
    fs::write(tmp.path().join("cells.pdf"), b"%PDF").unwrap();
    fs::write(tmp.path().join("cells 2.pdf"), b"%PDF").unwrap();
    Mock::given(method("GET"))
        .and(path("/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"collections": [
                {"name": cfg.collection_for("cells.pdf")},
                {"name": "unrelated"}
            ]}
        })))
        .mount(&server)
        .await;

    let indexed = tokio::task::spawn_blocking(move || indexed_documents(&cfg))
        .await
        .unwrap();
    assert_eq!(indexed, vec!["cells.pdf".to_string()]);
}
