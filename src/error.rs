use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::submission::pipeline::PipelineError;

/// Failures surfaced by the submit handler. Every kind maps to the same
/// `500 {"success": false, "error": ...}` envelope.
#[derive(Debug)]
pub enum AppError {
    InvalidBody(String),
    Sink(PipelineError),
}

impl AppError {
    /// Message text reported to the caller.
    pub fn message(&self) -> String {
        match self {
            AppError::InvalidBody(msg) => msg.clone(),
            AppError::Sink(err) => err.source.message.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::InvalidBody(msg) => write!(f, "Invalid body: {msg}"),
            AppError::Sink(err) => write!(f, "{err}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::InvalidBody(msg) = &self {
            tracing::warn!("Rejected submission: {msg}");
        }

        let body = json!({ "success": false, "error": self.message() });
        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::Sink(err)
    }
}
