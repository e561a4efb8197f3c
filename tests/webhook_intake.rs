//! Intake behavior through the real router: filtering, acknowledgments,
//! and the detached hand-off to the pipeline.

#![cfg(feature = "server")]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use incident_enrich::server::{IntakeConfig, build_router};
use incident_enrich::{
    EmbeddingIntent, EmbeddingProvider, EnrichError, EnrichOptions, EnrichmentPipeline,
    IncidentStore, SamplingConfig, SimilarIncident, SimilarityIndex, TextGenerator,
};

/// Embedding fake that counts invocations, so tests can assert the
/// pipeline was never entered.
struct CountingEmbeddings {
    calls: Arc<Mutex<usize>>,
}

#[async_trait]
impl EmbeddingProvider for CountingEmbeddings {
    async fn embed(&self, _text: &str, _intent: EmbeddingIntent) -> Result<Vec<f32>, EnrichError> {
        *self.calls.lock().unwrap() += 1;
        Ok(vec![0.1, 0.2, 0.3])
    }
}

struct StaticIndex;

#[async_trait]
impl SimilarityIndex for StaticIndex {
    async fn search(
        &self,
        _vector: &[f32],
        _top_k: usize,
    ) -> Result<Vec<SimilarIncident>, EnrichError> {
        Ok(vec![SimilarIncident {
            incident_id: "INC-101".into(),
            section: "summary".into(),
            score: 0.9,
            ..Default::default()
        }])
    }
}

struct StaticGenerator;

#[async_trait]
impl TextGenerator for StaticGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _sampling: &SamplingConfig,
    ) -> Result<String, EnrichError> {
        Ok("Generated triage note.".into())
    }
}

/// Store fake that signals each posted note over a channel so tests can
/// await the detached run deterministically.
struct SignallingStore {
    tx: tokio::sync::mpsc::UnboundedSender<(String, String)>,
}

#[async_trait]
impl IncidentStore for SignallingStore {
    async fn append_note(&self, incident_id: &str, text: &str) -> Result<(), EnrichError> {
        let _ = self.tx.send((incident_id.to_string(), text.to_string()));
        Ok(())
    }
}

struct Harness {
    router: Router,
    embed_calls: Arc<Mutex<usize>>,
    posted: tokio::sync::mpsc::UnboundedReceiver<(String, String)>,
}

fn harness() -> Harness {
    let embed_calls = Arc::new(Mutex::new(0));
    let (tx, posted) = tokio::sync::mpsc::unbounded_channel();

    let pipeline = Arc::new(EnrichmentPipeline::new(
        Arc::new(CountingEmbeddings {
            calls: embed_calls.clone(),
        }),
        Arc::new(StaticIndex),
        Arc::new(StaticGenerator),
        Arc::new(SignallingStore { tx }),
        EnrichOptions {
            embedding_dim: 3,
            ..EnrichOptions::default()
        },
    ));

    Harness {
        router: build_router(pipeline, &IntakeConfig::default()),
        embed_calls,
        posted,
    }
}

fn post_webhook(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn triggered_event(incident_id: &str) -> String {
    serde_json::json!({
        "event": {
            "id": "evt-1",
            "event_type": "incident.triggered",
            "resource_type": "incident",
            "occurred_at": "2025-06-01T12:00:00Z",
            "data": {
                "id": incident_id,
                "type": "incident",
                "title": "DB pool exhausted",
                "description": "connection pool saturated",
                "service": { "summary": "payments-api" },
                "urgency": "high",
                "status": "triggered"
            }
        }
    })
    .to_string()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn triggered_event_is_accepted_with_incident_id() {
    let mut h = harness();

    let response = h.router.clone().oneshot(post_webhook(&triggered_event("PABC123"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["incident_id"], "PABC123");

    // The run completes after the acknowledgment; await the posted note.
    let (incident_id, note) = tokio::time::timeout(Duration::from_secs(1), h.posted.recv())
        .await
        .expect("run should post a note")
        .unwrap();
    assert_eq!(incident_id, "PABC123");
    assert!(note.contains("AI ENRICHMENT"));
    assert!(note.contains("Generated triage note."));
}

#[tokio::test]
async fn other_event_types_are_ignored_and_pipeline_is_not_invoked() {
    let h = harness();

    let body = serde_json::json!({
        "event": {
            "event_type": "incident.acknowledged",
            "data": { "id": "PABC123" }
        }
    })
    .to_string();

    let response = h.router.clone().oneshot(post_webhook(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["reason"], "not an incident.triggered event");
    assert_eq!(*h.embed_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn malformed_json_is_rejected_and_pipeline_is_not_invoked() {
    let h = harness();

    let response = h
        .router
        .clone()
        .oneshot(post_webhook("{not valid json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(*h.embed_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn non_post_method_is_rejected() {
    let h = harness();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/webhook")
        .body(Body::empty())
        .unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn options_preflight_is_answered() {
    let h = harness();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/webhook")
        .header(header::ORIGIN, "https://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let h = harness();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "incident-enrich");
}

#[tokio::test]
async fn sparse_triggered_event_still_accepted() {
    let mut h = harness();

    let response = h
        .router
        .clone()
        .oneshot(post_webhook(
            r#"{"event":{"event_type":"incident.triggered"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["incident_id"], "");

    // Sparse fields still flow through; a note is posted for the empty id.
    let (incident_id, _note) = tokio::time::timeout(Duration::from_secs(1), h.posted.recv())
        .await
        .expect("run should post a note")
        .unwrap();
    assert_eq!(incident_id, "");
}
