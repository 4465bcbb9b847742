pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod routes;
pub mod sinks;
pub mod state;
pub mod submission;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::sinks::SinkChain;
use crate::sinks::email::EmailSink;
use crate::sinks::firebase::FirebaseSink;
use crate::sinks::sheets::SheetsSink;
use crate::state::{AppState, SharedState};

/// Build the Firebase → Sheets → email chain from configuration.
pub fn build_sinks(config: &Config) -> Result<SinkChain, String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

    let firebase = FirebaseSink::new(client.clone(), &config.firebase)?;
    let sheets = SheetsSink::new(client, &config.sheets)?;
    let email = EmailSink::new(&config.smtp, &config.email)?;

    Ok(SinkChain::new()
        .then(Arc::new(firebase))
        .then(Arc::new(sheets))
        .then(Arc::new(email)))
}

pub fn build_app(config: &Config) -> Result<Router, String> {
    let sinks = build_sinks(config)?;
    tracing::info!("Sinks configured: {}", sinks.names().join(" -> "));

    Ok(router(AppState::new(sinks), config.max_body_size))
}

pub fn router(state: SharedState, max_body_size: usize) -> Router {
    Router::new()
        .merge(routes::submission_routes())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
