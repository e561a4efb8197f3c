use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::EnrichError;

/// Configuration for the enrichment pipeline and its collaborators.
///
/// Constructed once at startup and passed into
/// [`EnrichmentPipeline::from_config`](crate::pipeline::EnrichmentPipeline::from_config).
/// There is no process-global config, and a missing credential is an error
/// value from [`validate`](Self::validate), not a panic.
///
/// [`load`](Self::load) reads the environment through the `config` crate, so
/// the deployment keeps its variable names: `GEMINI_API_KEY`, `QDRANT_URL`,
/// `QDRANT_API_KEY`, `PAGERDUTY_API_TOKEN`, `PAGERDUTY_EMAIL`,
/// `COLLECTION_NAME`, `EMBEDDING_MODEL`, `GENERATIVE_MODEL`, `EMBEDDING_DIM`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichConfig {
    /// API key for the embedding + generation provider.
    #[serde(default)]
    pub gemini_api_key: String,

    /// Base URL of the generative-language API.
    #[serde(default = "default_gemini_api_base")]
    pub gemini_api_base: String,

    /// Qdrant deployment URL (scheme optional, `:6333` suffix tolerated).
    #[serde(default)]
    pub qdrant_url: String,

    /// Qdrant API key.
    #[serde(default)]
    pub qdrant_api_key: String,

    /// Incident-store REST token.
    #[serde(default)]
    pub pagerduty_api_token: String,

    /// `From:` address required by the incident store's note endpoint.
    #[serde(default)]
    pub pagerduty_email: String,

    /// Base URL of the incident store API.
    #[serde(default = "default_pagerduty_api_base")]
    pub pagerduty_api_base: String,

    /// Collection holding the historical-incident vectors.
    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Embedding model identifier.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Generative model identifier.
    #[serde(default = "default_generative_model")]
    pub generative_model: String,

    /// Dimensionality the similarity collection was populated with. The
    /// pipeline rejects any embedding whose length differs.
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    /// Bound on every outbound collaborator call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_api_base: default_gemini_api_base(),
            qdrant_url: String::new(),
            qdrant_api_key: String::new(),
            pagerduty_api_token: String::new(),
            pagerduty_email: String::new(),
            pagerduty_api_base: default_pagerduty_api_base(),
            collection_name: default_collection_name(),
            embedding_model: default_embedding_model(),
            generative_model: default_generative_model(),
            embedding_dim: default_embedding_dim(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl EnrichConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, EnrichError> {
        let builder = config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true));

        builder
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|err| EnrichError::Config(err.to_string()))
    }

    /// Check that every required credential is present.
    pub fn validate(&self) -> Result<(), EnrichError> {
        for (value, name) in [
            (&self.gemini_api_key, "GEMINI_API_KEY"),
            (&self.qdrant_url, "QDRANT_URL"),
            (&self.qdrant_api_key, "QDRANT_API_KEY"),
            (&self.pagerduty_api_token, "PAGERDUTY_API_TOKEN"),
            (&self.pagerduty_email, "PAGERDUTY_EMAIL"),
        ] {
            if value.is_empty() {
                return Err(EnrichError::Config(format!("{name} is required")));
            }
        }
        if self.embedding_dim == 0 {
            return Err(EnrichError::Config("EMBEDDING_DIM must be >= 1".into()));
        }
        Ok(())
    }

    /// Bound applied to every outbound request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_pagerduty_api_base() -> String {
    "https://api.pagerduty.com".to_string()
}

fn default_collection_name() -> String {
    "incident-knowledge-base".to_string()
}

fn default_embedding_model() -> String {
    "models/gemini-embedding-001".to_string()
}

fn default_generative_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_embedding_dim() -> usize {
    3072
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let cfg = EnrichConfig::default();
        assert_eq!(cfg.collection_name, "incident-knowledge-base");
        assert_eq!(cfg.embedding_model, "models/gemini-embedding-001");
        assert_eq!(cfg.generative_model, "gemini-2.0-flash-exp");
        assert_eq!(cfg.embedding_dim, 3072);
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.pagerduty_api_base, "https://api.pagerduty.com");
    }

    #[test]
    fn validate_rejects_missing_credentials() {
        let cfg = EnrichConfig::default();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn validate_accepts_complete_config() {
        let cfg = EnrichConfig {
            gemini_api_key: "key".into(),
            qdrant_url: "https://qdrant.example".into(),
            qdrant_api_key: "qkey".into(),
            pagerduty_api_token: "token".into(),
            pagerduty_email: "oncall@example.com".into(),
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_dimension() {
        let cfg = EnrichConfig {
            gemini_api_key: "key".into(),
            qdrant_url: "https://qdrant.example".into(),
            qdrant_api_key: "qkey".into(),
            pagerduty_api_token: "token".into(),
            pagerduty_email: "oncall@example.com".into(),
            embedding_dim: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: EnrichConfig =
            serde_json::from_str(r#"{"gemini_api_key":"k","embedding_dim":768}"#).unwrap();
        assert_eq!(cfg.gemini_api_key, "k");
        assert_eq!(cfg.embedding_dim, 768);
        assert_eq!(cfg.collection_name, "incident-knowledge-base");
    }
}
