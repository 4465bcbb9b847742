use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use bytes::Bytes;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::state::SharedState;
use crate::submission::{parser, pipeline};

pub const CONFIRMATION: &str = "Data submitted to Firebase, Sheet & Email!";

pub async fn submit(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let submission = parser::parse_body(&body).map_err(AppError::InvalidBody)?;

    pipeline::run(&state.sinks, &submission).await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": CONFIRMATION })),
    ))
}
