use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::jwt;
use crate::credentials::ServiceAccountKey;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Tokens this close to expiry are refreshed instead of reused.
const EXPIRY_MARGIN_SECS: i64 = 300;

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges a service-account key for OAuth2 access tokens.
pub struct TokenProvider {
    client: reqwest::Client,
    key: ServiceAccountKey,
    scopes: &'static [&'static str],
    cache: Mutex<Option<AccessToken>>,
}

impl TokenProvider {
    pub fn new(
        client: reqwest::Client,
        key: ServiceAccountKey,
        scopes: &'static [&'static str],
    ) -> Self {
        Self {
            client,
            key,
            scopes,
            cache: Mutex::new(None),
        }
    }

    /// Return the cached token, refreshing it when missing or near expiry.
    pub async fn token(&self) -> Result<String, String> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(cached.token.clone());
        }

        let fresh = self.fetch().await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }

    /// Perform a new token exchange, bypassing the cache.
    pub async fn fetch(&self) -> Result<AccessToken, String> {
        let assertion = jwt::encode_assertion(&self.key, self.scopes)?;

        let resp = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| format!("Token request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{}: {desc}", err.error),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(format!("Token request rejected ({status}): {detail}"));
        }

        let parsed: TokenResponse = resp
            .json()
            .await
            .map_err(|e| format!("Invalid token response: {e}"))?;

        tracing::debug!(
            "Obtained access token for {} (expires in {}s)",
            self.key.client_email,
            parsed.expires_in
        );

        Ok(AccessToken {
            token: parsed.access_token,
            expires_at: Utc::now() + Duration::seconds(parsed.expires_in),
        })
    }
}
