use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use ns_core::{Error, NewsSource, RawArticle, Result, SpeechSynthesizer};
use ns_inference::{models::DummyModel, Aggregator, Annotator, Narrator, StructuredClient};
use ns_scrappers::{AnalysisManager, FixedSource, ManagerConfig};
use ns_storage::{AudioConfig, AudioStore};
use ns_web::{create_app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

struct StaticSpeech;

#[async_trait]
impl SpeechSynthesizer for StaticSpeech {
    fn name(&self) -> &str {
        "Static"
    }

    async fn synthesize(&self, _text: &str, _language: &str) -> Result<Vec<u8>> {
        Ok(b"ID3 fake audio".to_vec())
    }
}

struct DownSource;

#[async_trait]
impl NewsSource for DownSource {
    fn name(&self) -> &str {
        "Down"
    }

    async fn fetch(&self, _company: &str, _limit: usize) -> Result<Vec<RawArticle>> {
        Err(Error::Scraping("search page unavailable".to_string()))
    }
}

fn app(source: Arc<dyn NewsSource>, audio_dir: &Path) -> Router {
    let client = StructuredClient::new(Arc::new(DummyModel::new()));
    let narrator = Narrator::new(
        client.clone(),
        Arc::new(StaticSpeech),
        AudioStore::new(AudioConfig::new(audio_dir)),
        "hi",
    );
    let manager = AnalysisManager::new(
        source,
        Annotator::new(client.clone()),
        Aggregator::new(client),
        Some(narrator),
        ManagerConfig::default(),
    );
    create_app(AppState {
        manager: Arc::new(manager),
        audio_dir: audio_dir.to_path_buf(),
    })
}

fn two_articles() -> Arc<dyn NewsSource> {
    Arc::new(FixedSource::new(vec![
        RawArticle::new("Acme opens a new plant", "The plant will employ 500 people."),
        RawArticle::new("Acme recalls scooters", "A battery fault triggered the recall."),
    ]))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(two_articles(), dir.path())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_analyze_returns_report_and_serves_audio() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(two_articles(), dir.path());

    let response = app
        .clone()
        .oneshot(post_json("/analyze", json!({"company_name": "Acme", "article_limit": 5})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["Company"], "Acme");
    assert_eq!(body["Articles"].as_array().unwrap().len(), 2);
    assert_eq!(body["Articles"][0]["title"], "Acme opens a new plant");
    let distribution = &body["Comparative Sentiment Score"]["sentiment_distribution"];
    let total: u64 = ["Positive", "Negative", "Neutral"]
        .iter()
        .map(|label| distribution[*label].as_u64().unwrap())
        .sum();
    assert_eq!(total, 2);
    assert!(body["Final Sentiment Analysis"].is_string());
    let audio_path = body["audio_path"].as_str().unwrap();
    assert!(audio_path.ends_with("Acme.mp3"));

    let response = app
        .oneshot(Request::builder().uri("/audio/Acme.mp3").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ID3 fake audio");
}

#[tokio::test]
async fn test_article_limit_defaults_when_omitted() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(two_articles(), dir.path())
        .oneshot(post_json("/analyze", json!({"company_name": "Acme"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["Articles"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_input_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(two_articles(), dir.path());

    for body in [
        json!({"company_name": "   "}),
        json!({"company_name": "Acme", "article_limit": 0}),
        json!({"company_name": "Acme", "article_limit": 51}),
    ] {
        let response = app.clone().oneshot(post_json("/analyze", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(read_json(response).await["error"].is_string());
    }
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(two_articles(), dir.path())
        .oneshot(post_json("/analyze", json!({"company": "Acme"})))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_source_failure_is_bad_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(Arc::new(DownSource), dir.path())
        .oneshot(post_json("/analyze", json!({"company_name": "Acme"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("search page unavailable"));
}
