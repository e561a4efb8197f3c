use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Intake-side error types.
///
/// These cover only what the webhook caller can cause; pipeline failures
/// never reach the HTTP layer (the caller was already acknowledged).
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl IntakeError {
    fn status_code(&self) -> StatusCode {
        match self {
            IntakeError::BadRequest(_) => StatusCode::BAD_REQUEST,
            IntakeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            IntakeError::BadRequest(_) => "BAD_REQUEST",
            IntakeError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
