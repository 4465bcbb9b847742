use std::net::IpAddr;

use crate::credentials::{self, ServiceAccountKey};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub log_level: String,
    pub firebase: FirebaseConfig,
    pub sheets: SheetsConfig,
    pub smtp: SmtpConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub credentials: ServiceAccountKey,
    pub db_url: String,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub credentials: ServiceAccountKey,
    pub sheet_id: String,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub tls: TlsMode,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub from: String,
    pub to: String,
    pub subject: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TlsMode {
    StartTls,
    Tls,
    None,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| format!("Missing required environment variable: {key}"))
        };
        let env_or = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let host: IpAddr = env_or("HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid HOST: {e}"))?;

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid PORT: {e}"))?;

        let max_body_size: usize = env_or("MAX_BODY_SIZE", "102400")
            .parse()
            .map_err(|e| format!("Invalid MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("LOG_LEVEL", "info");

        let firebase = FirebaseConfig {
            credentials: credentials::decode_base64_json(&env_required(
                "FIREBASE_CREDENTIALS_BASE64",
            )?)
            .map_err(|e| format!("Invalid FIREBASE_CREDENTIALS_BASE64: {e}"))?,
            db_url: env_required("FIREBASE_DB_URL")?
                .trim_end_matches('/')
                .to_string(),
            collection: env_or("FIREBASE_COLLECTION", "form_submissions"),
        };

        let sheets = SheetsConfig {
            credentials: credentials::decode_base64_json(&env_required(
                "GOOGLE_SHEETS_CREDENTIALS_BASE64",
            )?)
            .map_err(|e| format!("Invalid GOOGLE_SHEETS_CREDENTIALS_BASE64: {e}"))?,
            sheet_id: env_required("SHEET_ID")?,
            api_url: env_or("SHEETS_API_URL", "https://sheets.googleapis.com")
                .trim_end_matches('/')
                .to_string(),
        };

        let tls = match env_or("SMTP_TLS", "starttls").as_str() {
            "starttls" => TlsMode::StartTls,
            "tls" => TlsMode::Tls,
            "none" => TlsMode::None,
            other => return Err(format!("Invalid SMTP_TLS: {other}")),
        };

        let smtp = SmtpConfig {
            host: env_required("SMTP_SERVER")?,
            port: env_or("SMTP_PORT", "587")
                .parse()
                .map_err(|e| format!("Invalid SMTP_PORT: {e}"))?,
            user: env_required("SMTP_USER")?,
            pass: env_required("SMTP_PASS")?,
            tls,
        };

        let email = EmailConfig {
            from: env_required("EMAIL_FROM")?,
            to: env_required("EMAIL_TO")?,
            subject: env_or("EMAIL_SUBJECT", "New Form Submission"),
        };

        Ok(Config {
            host,
            port,
            max_body_size,
            log_level,
            firebase,
            sheets,
            smtp,
            email,
        })
    }
}
