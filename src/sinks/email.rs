use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{Sink, SinkError};
use crate::config::{EmailConfig, SmtpConfig, TlsMode};
use crate::submission::Submission;

/// Sends each submission as a plain-text email to a fixed recipient.
pub struct EmailSink {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    email: EmailConfig,
}

impl EmailSink {
    pub fn new(smtp: &SmtpConfig, email: &EmailConfig) -> Result<Self, String> {
        Ok(Self {
            transport: build_smtp_transport(smtp)?,
            email: email.clone(),
        })
    }

    pub async fn send(&self, submission: &Submission) -> Result<(), String> {
        let message = build_message(&self.email, submission)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}

pub fn build_message(email: &EmailConfig, submission: &Submission) -> Result<Message, String> {
    Message::builder()
        .from(
            email
                .from
                .parse()
                .map_err(|e| format!("Invalid from address: {e}"))?,
        )
        .to(email
            .to
            .parse()
            .map_err(|e| format!("Invalid to address: {e}"))?)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(submission.to_pretty_json())
        .map_err(|e| format!("Failed to build email: {e}"))
}

pub fn build_smtp_transport(
    config: &SmtpConfig,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
    let creds = Credentials::new(config.user.clone(), config.pass.clone());

    let transport = match config.tls {
        TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| format!("SMTP relay error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build(),
        TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .credentials(creds)
            .build(),
        // Upgrade only when the relay advertises STARTTLS.
        TlsMode::StartTls => {
            let params = TlsParameters::new(config.host.clone())
                .map_err(|e| format!("SMTP starttls error: {e}"))?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port)
                .tls(Tls::Opportunistic(params))
                .credentials(creds)
                .build()
        }
    };

    Ok(transport)
}

#[async_trait]
impl Sink for EmailSink {
    fn name(&self) -> &str {
        "email"
    }

    async fn deliver(&self, submission: &Submission) -> Result<(), SinkError> {
        self.send(submission).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn email_config(to: &str) -> EmailConfig {
        EmailConfig {
            from: "forms@example.com".to_string(),
            to: to.to_string(),
            subject: "New Form Submission".to_string(),
        }
    }

    fn submission() -> Submission {
        let Value::Object(fields) = json!({ "name": "Ann", "message": "hi" }) else {
            unreachable!()
        };
        Submission::new(fields)
    }

    #[test]
    fn message_carries_pretty_json_body() {
        let message = build_message(&email_config("inbox@example.com"), &submission()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: New Form Submission"));
        assert!(raw.contains("To: inbox@example.com"));
        assert!(raw.contains("From: forms@example.com"));
        assert!(raw.contains("\"name\": \"Ann\""));
        assert!(raw.contains("\"message\": \"hi\""));
    }

    #[tokio::test]
    async fn unreachable_relay_is_a_sink_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let smtp = SmtpConfig {
            host: "127.0.0.1".to_string(),
            port,
            user: "user".to_string(),
            pass: "pass".to_string(),
            tls: TlsMode::None,
        };
        let sink = EmailSink::new(&smtp, &email_config("inbox@example.com")).unwrap();

        let err = sink.deliver(&submission()).await.unwrap_err();
        assert!(err.message.starts_with("Failed to send email"), "{err}");
    }

    #[test]
    fn invalid_recipient_fails() {
        let err = build_message(&email_config("not-an-address"), &submission()).unwrap_err();
        assert!(err.starts_with("Invalid to address"));
    }
}
