pub mod submit;

use axum::Router;
use axum::routing::{get, post};

use crate::state::SharedState;

pub fn submission_routes() -> Router<SharedState> {
    Router::new()
        .route("/submit", post(submit::submit))
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "ok"
}
