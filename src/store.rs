//! Incident store contract and the PagerDuty notes adapter.

use async_trait::async_trait;
use serde_json::json;

use crate::config::EnrichConfig;
use crate::error::EnrichError;

/// Appends a note to an existing incident record. Durability of the note is
/// entirely the store's problem; the pipeline hands it off and forgets it.
#[async_trait]
pub trait IncidentStore: Send + Sync {
    async fn append_note(&self, incident_id: &str, text: &str) -> Result<(), EnrichError>;
}

/// Notes client for the PagerDuty REST API v2.
pub struct PagerDutyNotes {
    client: reqwest::Client,
    api_base: String,
    token: String,
    from_email: String,
}

impl PagerDutyNotes {
    pub fn new(client: reqwest::Client, cfg: &EnrichConfig) -> Self {
        Self {
            client,
            api_base: cfg.pagerduty_api_base.trim_end_matches('/').to_string(),
            token: cfg.pagerduty_api_token.clone(),
            from_email: cfg.pagerduty_email.clone(),
        }
    }

    fn endpoint(&self, incident_id: &str) -> String {
        format!("{}/incidents/{}/notes", self.api_base, incident_id)
    }
}

#[async_trait]
impl IncidentStore for PagerDutyNotes {
    async fn append_note(&self, incident_id: &str, text: &str) -> Result<(), EnrichError> {
        let body = json!({ "note": { "content": text } });

        let response = self
            .client
            .post(self.endpoint(incident_id))
            .header("Accept", "application/vnd.pagerduty+json;version=2")
            .header("Authorization", format!("Token token={}", self.token))
            .header("From", &self.from_email)
            .json(&body)
            .send()
            .await
            .map_err(|err| EnrichError::NoteDelivery(format!("request failed: {err}")))?;

        let status = response.status();
        // 201 on create; some proxies collapse to 200.
        if status != reqwest::StatusCode::CREATED && status != reqwest::StatusCode::OK {
            let detail = response.text().await.unwrap_or_default();
            return Err(EnrichError::NoteDelivery(format!(
                "store returned status {status}: {detail}"
            )));
        }

        Ok(())
    }
}
