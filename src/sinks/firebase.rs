use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use super::{Sink, SinkError};
use crate::auth::TokenProvider;
use crate::config::FirebaseConfig;
use crate::submission::Submission;

const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/firebase.database",
    "https://www.googleapis.com/auth/userinfo.email",
];

#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Appends submissions to a Realtime Database collection.
pub struct FirebaseSink {
    client: reqwest::Client,
    tokens: TokenProvider,
    push_url: Url,
}

impl FirebaseSink {
    pub fn new(client: reqwest::Client, config: &FirebaseConfig) -> Result<Self, String> {
        let push_url = push_url(&config.db_url, &config.collection)?;

        Ok(Self {
            tokens: TokenProvider::new(client.clone(), config.credentials.clone(), SCOPES),
            client,
            push_url,
        })
    }

    /// Push a record under the collection; returns the server-assigned key.
    pub async fn push(&self, submission: &Submission) -> Result<String, String> {
        let token = self.tokens.token().await?;

        let resp = self
            .client
            .post(self.push_url.clone())
            .bearer_auth(token)
            .json(submission)
            .send()
            .await
            .map_err(|e| format!("Firebase request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(format!("Firebase push failed ({status}): {detail}"));
        }

        let pushed: PushResponse = resp
            .json()
            .await
            .map_err(|e| format!("Invalid Firebase response: {e}"))?;

        Ok(pushed.name)
    }
}

fn push_url(db_url: &str, collection: &str) -> Result<Url, String> {
    let mut url = Url::parse(db_url).map_err(|e| format!("Invalid FIREBASE_DB_URL: {e}"))?;

    let segments: Vec<&str> = collection.split('/').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        return Err("Firebase collection path is empty".to_string());
    };

    url.path_segments_mut()
        .map_err(|_| "Invalid FIREBASE_DB_URL: cannot be a base".to_string())?
        .pop_if_empty()
        .extend(parents)
        .push(&format!("{last}.json"));

    Ok(url)
}

#[async_trait]
impl Sink for FirebaseSink {
    fn name(&self) -> &str {
        "firebase"
    }

    async fn deliver(&self, submission: &Submission) -> Result<(), SinkError> {
        let key = self.push(submission).await?;
        tracing::debug!("Firebase record created: {key}");
        Ok(())
    }
}
