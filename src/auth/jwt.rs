use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use crate::credentials::ServiceAccountKey;

/// Claims of the self-signed assertion exchanged for an OAuth2 access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AssertionClaims {
    pub fn new(key: &ServiceAccountKey, scopes: &[&str]) -> Self {
        let now = Utc::now();
        Self {
            iss: key.client_email.clone(),
            scope: scopes.join(" "),
            aud: key.token_uri.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        }
    }
}

pub fn encode_assertion(key: &ServiceAccountKey, scopes: &[&str]) -> Result<String, String> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| format!("Invalid service account private key: {e}"))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    encode(&header, &AssertionClaims::new(key, scopes), &encoding_key)
        .map_err(|e| format!("JWT encode failed: {e}"))
}
