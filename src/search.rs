//! Similarity index contract and the Qdrant REST adapter.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::EnrichConfig;
use crate::error::EnrichError;
use crate::incident::SimilarIncident;

/// Nearest-neighbour lookup over the historical-incident collection.
///
/// An empty hit list is a valid, non-error result.
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SimilarIncident>, EnrichError>;
}

/// Search client for a Qdrant collection's `points/search` endpoint.
pub struct QdrantSearch {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    collection: String,
}

impl QdrantSearch {
    pub fn new(client: reqwest::Client, cfg: &EnrichConfig) -> Self {
        Self {
            client,
            base_url: normalize_base_url(&cfg.qdrant_url),
            api_key: cfg.qdrant_api_key.clone(),
            collection: cfg.collection_name.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/collections/{}/points/search",
            self.base_url, self.collection
        )
    }
}

#[async_trait]
impl SimilarityIndex for QdrantSearch {
    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SimilarIncident>, EnrichError> {
        let body = search_request_body(vector, top_k);

        let response = self
            .client
            .post(self.endpoint())
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| EnrichError::Search(format!("request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(EnrichError::Search(format!(
                "qdrant returned status {status}: {detail}"
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|err| EnrichError::Search(format!("invalid JSON response: {err}")))?;

        parse_search_response(value)
    }
}

/// Managed-cloud URLs often arrive without a scheme and with the gRPC port
/// appended; the REST endpoint wants neither.
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/').trim_end_matches(":6333");
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Build the `points/search` request payload.
fn search_request_body(vector: &[f32], limit: usize) -> Value {
    json!({
        "vector": vector,
        "limit": limit,
        "with_payload": true,
    })
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    payload: HitPayload,
}

/// Stored metadata on each point. Every field is optional in the
/// collection; absence decodes to an empty string.
#[derive(Debug, Default, Deserialize)]
struct HitPayload {
    #[serde(default)]
    incident_id: String,
    #[serde(default)]
    section: String,
    #[serde(default)]
    service: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    text: String,
}

/// Decode a `points/search` response into hits, preserving the returned
/// (descending-score) order.
fn parse_search_response(value: Value) -> Result<Vec<SimilarIncident>, EnrichError> {
    let response: SearchResponse = serde_json::from_value(value)
        .map_err(|err| EnrichError::Search(format!("unexpected response shape: {err}")))?;

    Ok(response
        .result
        .into_iter()
        .map(|point| SimilarIncident {
            incident_id: point.payload.incident_id,
            section: point.payload.section,
            service: point.payload.service,
            severity: point.payload.severity,
            date: point.payload.date,
            text: point.payload.text,
            score: point.score,
        })
        .collect())
}
