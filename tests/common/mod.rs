use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use formrelay::sinks::{Sink, SinkChain, SinkError};
use formrelay::state::AppState;
use formrelay::submission::Submission;

/// A sink that stores every submission it receives, optionally failing.
pub struct RecordingSink {
    name: &'static str,
    failure: Option<String>,
    pub received: Mutex<Vec<Value>>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub fn records(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sink for RecordingSink {
    fn name(&self) -> &str {
        self.name
    }

    async fn deliver(&self, submission: &Submission) -> Result<(), SinkError> {
        self.calls.lock().unwrap().push(self.name);
        if let Some(msg) = &self.failure {
            return Err(SinkError::from(msg.as_str()));
        }
        self.received
            .lock()
            .unwrap()
            .push(serde_json::to_value(submission).unwrap());
        Ok(())
    }
}

/// The three fake sinks of a test app, plus the order they were called in.
pub struct Sinks {
    pub firebase: Arc<RecordingSink>,
    pub sheets: Arc<RecordingSink>,
    pub email: Arc<RecordingSink>,
    pub calls: Arc<Mutex<Vec<&'static str>>>,
}

impl Sinks {
    /// Build sinks where the named one fails with `message`.
    pub fn failing(failing: Option<(&str, &str)>) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let make = |name: &'static str| {
            Arc::new(RecordingSink {
                name,
                failure: failing
                    .filter(|(n, _)| *n == name)
                    .map(|(_, msg)| msg.to_string()),
                received: Mutex::new(Vec::new()),
                calls: calls.clone(),
            })
        };

        let firebase = make("firebase");
        let sheets = make("sheets");
        let email = make("email");

        Self {
            firebase,
            sheets,
            email,
            calls,
        }
    }

    pub fn healthy() -> Self {
        Self::failing(None)
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn chain(&self) -> SinkChain {
        SinkChain::new()
            .then(self.firebase.clone())
            .then(self.sheets.clone())
            .then(self.email.clone())
    }
}

/// A running test server backed by fake sinks.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub sinks: Sinks,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Submit a JSON value, return (body, status).
    pub async fn submit_json(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/submit"))
            .json(data)
            .send()
            .await
            .expect("submit json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit a raw body with the given content type, return (body, status).
    pub async fn submit_raw(&self, body: &'static str, content_type: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/submit"))
            .header("content-type", content_type)
            .body(body)
            .send()
            .await
            .expect("submit raw failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub async fn spawn_app(sinks: Sinks) -> TestApp {
    spawn_app_with_limit(sinks, 102_400).await
}

pub async fn spawn_app_with_limit(sinks: Sinks, max_body_size: usize) -> TestApp {
    let app = formrelay::router(AppState::new(sinks.chain()), max_body_size);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        sinks,
    }
}
