//! Language generator contract and the Gemini REST adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::EnrichConfig;
use crate::error::EnrichError;

/// Sampling settings for triage-note generation. Low-moderate randomness:
/// enough variation to phrase advice naturally, bounded enough to stay on
/// task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 1024,
        }
    }
}

/// Turns a prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, EnrichError>;
}

/// Generation client for the Gemini `generateContent` endpoint.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiGenerator {
    pub fn new(client: reqwest::Client, cfg: &EnrichConfig) -> Self {
        Self {
            client,
            api_base: cfg.gemini_api_base.trim_end_matches('/').to_string(),
            api_key: cfg.gemini_api_key.clone(),
            model: cfg.generative_model.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, EnrichError> {
        let body = generation_request_body(prompt, sampling);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| EnrichError::Generation(format!("request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(EnrichError::Generation(format!(
                "provider returned status {status}: {detail}"
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|err| EnrichError::Generation(format!("invalid JSON response: {err}")))?;

        parse_generation_response(&value)
    }
}

/// Build the `generateContent` request payload.
fn generation_request_body(prompt: &str, sampling: &SamplingConfig) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "temperature": sampling.temperature,
            "topP": sampling.top_p,
            "topK": sampling.top_k,
            "maxOutputTokens": sampling.max_output_tokens,
        },
    })
}

/// Extract the first candidate's text. Zero candidates or an empty
/// candidate is an [`EnrichError::EmptyGeneration`]; the caller must not
/// post a blank triage note.
fn parse_generation_response(value: &Value) -> Result<String, EnrichError> {
    let parts = value
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .ok_or_else(|| EnrichError::EmptyGeneration("no candidates in response".into()))?;

    let mut text = String::new();
    for part in parts {
        if let Some(chunk) = part.get("text").and_then(Value::as_str) {
            text.push_str(chunk);
        }
    }

    if text.is_empty() {
        return Err(EnrichError::EmptyGeneration(
            "candidate contained no text".into(),
        ));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_defaults_match_reference() {
        let sampling = SamplingConfig::default();
        assert!((sampling.temperature - 0.7).abs() < f32::EPSILON);
        assert!((sampling.top_p - 0.95).abs() < f32::EPSILON);
        assert_eq!(sampling.top_k, 40);
        assert_eq!(sampling.max_output_tokens, 1024);
    }

    #[test]
    fn request_body_carries_generation_config() {
        let body = generation_request_body("triage this", &SamplingConfig::default());
        assert_eq!(body["contents"][0]["parts"][0]["text"], "triage this");
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn parses_multi_part_candidate() {
        let value = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Root cause: " }, { "text": "pool leak." }] }
            }]
        });
        assert_eq!(
            parse_generation_response(&value).unwrap(),
            "Root cause: pool leak."
        );
    }

    #[test]
    fn zero_candidates_is_fatal() {
        let value = json!({ "candidates": [] });
        let err = parse_generation_response(&value).unwrap_err();
        assert!(matches!(err, EnrichError::EmptyGeneration(_)));
    }

    #[test]
    fn empty_candidate_text_is_fatal() {
        let value = json!({
            "candidates": [{ "content": { "parts": [{ "text": "" }] } }]
        });
        let err = parse_generation_response(&value).unwrap_err();
        assert!(matches!(err, EnrichError::EmptyGeneration(_)));
    }

    #[test]
    fn missing_candidates_field_is_fatal() {
        let err = parse_generation_response(&json!({})).unwrap_err();
        assert!(matches!(err, EnrichError::EmptyGeneration(_)));
    }
}
