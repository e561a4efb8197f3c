//! HTTP endpoint handlers for the intake server.

use std::sync::Arc;
use std::time::SystemTime;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::incident::{IncidentInput, WebhookPayload};
use crate::pipeline::EnrichmentPipeline;
use crate::server::error::IntakeError;

/// The only event type that triggers enrichment.
pub const TRIGGER_EVENT: &str = "incident.triggered";

/// Server start time for uptime reporting.
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Webhook intake endpoint.
///
/// Decodes the envelope once, filters by event type, acknowledges the
/// caller immediately, and hands the incident to a detached enrichment run.
/// The response is never delayed by pipeline execution and the caller gets
/// no further signal beyond what lands on the incident itself.
pub async fn webhook(
    State(pipeline): State<Arc<EnrichmentPipeline>>,
    body: String,
) -> Result<Response, IntakeError> {
    let payload: WebhookPayload = serde_json::from_str(&body).map_err(|err| {
        tracing::warn!(error = %err, "failed to decode webhook payload");
        IntakeError::BadRequest("invalid payload".into())
    })?;

    let event = payload.event;
    tracing::info!(
        event_type = %event.event_type,
        incident_id = %event.data.id,
        "received webhook event"
    );

    if event.event_type != TRIGGER_EVENT {
        return Ok((
            StatusCode::OK,
            Json(json!({
                "status": "ignored",
                "reason": "not an incident.triggered event",
            })),
        )
            .into_response());
    }

    let incident = IncidentInput::from(event.data);
    let ack = json!({
        "status": "accepted",
        "incident_id": incident.id.clone(),
    });

    // Fire and forget: the handle is dropped, the run outlives this request.
    let _run = pipeline.spawn(incident);

    Ok((StatusCode::ACCEPTED, Json(ack)).into_response())
}

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    let uptime = SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(json!({
        "status": "healthy",
        "service": "incident-enrich",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime,
    }))
}
