//! Embedding provider contract and the Gemini REST adapter.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::config::EnrichConfig;
use crate::error::EnrichError;

/// Hint distinguishing a search query from document text being indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingIntent {
    Query,
    Document,
}

impl EmbeddingIntent {
    /// Task-type string expected by the embedding API.
    pub fn task_type(self) -> &'static str {
        match self {
            EmbeddingIntent::Query => "RETRIEVAL_QUERY",
            EmbeddingIntent::Document => "RETRIEVAL_DOCUMENT",
        }
    }
}

/// Converts text to a fixed-length vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str, intent: EmbeddingIntent) -> Result<Vec<f32>, EnrichError>;
}

/// Embedding client for the Gemini `embedContent` endpoint.
pub struct GeminiEmbeddings {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiEmbeddings {
    pub fn new(client: reqwest::Client, cfg: &EnrichConfig) -> Self {
        Self {
            client,
            api_base: cfg.gemini_api_base.trim_end_matches('/').to_string(),
            api_key: cfg.gemini_api_key.clone(),
            model: cfg.embedding_model.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/{}:embedContent", self.api_base, self.model)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddings {
    async fn embed(&self, text: &str, intent: EmbeddingIntent) -> Result<Vec<f32>, EnrichError> {
        let body = embed_request_body(&self.model, text, intent);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| EnrichError::Embedding(format!("request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(EnrichError::Embedding(format!(
                "provider returned status {status}: {detail}"
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|err| EnrichError::Embedding(format!("invalid JSON response: {err}")))?;

        parse_embedding_response(&value)
    }
}

/// Build the `embedContent` request payload.
fn embed_request_body(model: &str, text: &str, intent: EmbeddingIntent) -> Value {
    json!({
        "model": model,
        "content": { "parts": [{ "text": text }] },
        "taskType": intent.task_type(),
    })
}

/// Pull the vector out of an `embedContent` response.
fn parse_embedding_response(value: &Value) -> Result<Vec<f32>, EnrichError> {
    let values = value
        .get("embedding")
        .and_then(|e| e.get("values"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            EnrichError::Embedding("response did not contain embedding.values".into())
        })?;

    values
        .iter()
        .map(|entry| {
            entry
                .as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| EnrichError::Embedding("non-numeric embedding value".into()))
        })
        .collect()
}
