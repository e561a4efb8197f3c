//! Incident domain types and the inbound webhook envelope.
//!
//! The envelope mirrors the alerting platform's webhook v3 payload. Every
//! field decodes with a default so a sparse or older payload never fails
//! deserialization; the handler only rejects bodies that are not JSON at
//! all. Decoding happens once at the intake boundary; the pipeline only
//! ever sees an [`IncidentInput`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Incident urgency as reported by the alerting platform.
///
/// Unrecognized values decode as [`Urgency::Low`] rather than failing the
/// whole envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Urgency {
    #[default]
    Low,
    High,
}

impl From<String> for Urgency {
    fn from(value: String) -> Self {
        match value.as_str() {
            "high" => Urgency::High,
            _ => Urgency::Low,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Low => write!(f, "low"),
            Urgency::High => write!(f, "high"),
        }
    }
}

/// One incident as handed to the enrichment pipeline.
///
/// Owned exclusively by a single run; nothing is shared between concurrent
/// runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentInput {
    pub id: String,
    pub title: String,
    pub description: String,
    pub service_name: String,
    pub urgency: Urgency,
}

/// One hit returned by the similarity index.
///
/// Payload fields are sparse in practice; a missing field is an empty
/// string, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarIncident {
    #[serde(default)]
    pub incident_id: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub score: f32,
}

/// Outer webhook envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub event: WebhookEvent,
}

/// The event wrapper inside the envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub occurred_at: String,
    #[serde(default)]
    pub data: IncidentPayload,
}

/// Incident fields carried by the event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncidentPayload {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub service: ServiceSummary,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub status: String,
}

/// Service reference on the incident.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceSummary {
    #[serde(default)]
    pub summary: String,
}

impl From<IncidentPayload> for IncidentInput {
    fn from(data: IncidentPayload) -> Self {
        IncidentInput {
            id: data.id,
            title: data.title,
            description: data.description,
            service_name: data.service.summary,
            urgency: data.urgency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_envelope_decodes() {
        let body = serde_json::json!({
            "event": {
                "id": "evt-1",
                "event_type": "incident.triggered",
                "resource_type": "incident",
                "occurred_at": "2025-06-01T12:00:00Z",
                "data": {
                    "id": "PABC123",
                    "type": "incident",
                    "title": "DB pool exhausted",
                    "description": "connection pool saturated on primary",
                    "service": { "summary": "payments-api" },
                    "urgency": "high",
                    "status": "triggered"
                }
            }
        });

        let payload: WebhookPayload = serde_json::from_value(body).unwrap();
        assert_eq!(payload.event.event_type, "incident.triggered");

        let incident = IncidentInput::from(payload.event.data);
        assert_eq!(incident.id, "PABC123");
        assert_eq!(incident.title, "DB pool exhausted");
        assert_eq!(incident.service_name, "payments-api");
        assert_eq!(incident.urgency, Urgency::High);
    }

    #[test]
    fn sparse_envelope_defaults_to_empty() {
        let payload: WebhookPayload =
            serde_json::from_str(r#"{"event":{"event_type":"incident.triggered"}}"#).unwrap();

        let incident = IncidentInput::from(payload.event.data);
        assert_eq!(incident.id, "");
        assert_eq!(incident.title, "");
        assert_eq!(incident.service_name, "");
        assert_eq!(incident.urgency, Urgency::Low);
    }

    #[test]
    fn empty_object_is_valid() {
        let payload: WebhookPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.event.event_type, "");
    }

    #[test]
    fn unknown_urgency_decodes_low() {
        let urgency: Urgency = serde_json::from_str(r#""sev1""#).unwrap();
        assert_eq!(urgency, Urgency::Low);
    }

    #[test]
    fn urgency_display_matches_wire_values() {
        assert_eq!(Urgency::Low.to_string(), "low");
        assert_eq!(Urgency::High.to_string(), "high");
    }

    #[test]
    fn similar_incident_defaults_are_empty() {
        let hit: SimilarIncident = serde_json::from_str(r#"{"score":0.8}"#).unwrap();
        assert_eq!(hit.incident_id, "");
        assert_eq!(hit.section, "");
        assert_eq!(hit.text, "");
        assert!((hit.score - 0.8).abs() < f32::EPSILON);
    }
}
