//! Outgoing SMTP mail

use std::time::Duration;

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use supermanager_common::SuperManagerError;

use crate::model::MailConfig;

#[derive(Debug, Clone)]
pub struct MailService {
    config: MailConfig,
}

impl MailService {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MailConfig {
        &self.config
    }

    pub fn build_message(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<Message> {
        let from = self
            .config
            .from
            .parse::<Mailbox>()
            .map_err(|e| SuperManagerError::MailError(format!("invalid sender: {}", e)))?;
        let to = to
            .parse::<Mailbox>()
            .map_err(|e| SuperManagerError::MailError(format!("invalid recipient: {}", e)))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| SuperManagerError::MailError(e.to_string()))?;

        Ok(message)
    }

    fn transport(&self) -> anyhow::Result<AsyncSmtpTransport<Tokio1Executor>> {
        let host = self.config.host.as_str();

        let mut builder = if self.config.use_ssl {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else if self.config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        };

        builder = builder
            .port(self.config.port)
            .timeout(Some(Duration::from_secs(self.config.timeout_seconds)));

        if let Some(username) = self.config.username.as_ref().filter(|u| !u.is_empty()) {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                self.config.password.clone().unwrap_or_default(),
            ));
        }

        Ok(builder.build())
    }

    async fn try_send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let message = self.build_message(to, subject, body)?;

        self.transport()?
            .send(message)
            .await
            .map_err(|e| SuperManagerError::MailError(e.to_string()))?;

        Ok(())
    }

    /// Sends a plain-text mail. Failures are logged and reported as `false`.
    pub async fn send_mail(&self, to: &str, subject: &str, body: &str) -> bool {
        match self.try_send(to, subject, body).await {
            Ok(()) => {
                info!(to = %to, subject = %subject, "Mail sent");
                true
            }
            Err(e) => {
                error!(to = %to, subject = %subject, "Error sending email: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> MailService {
        MailService::new(MailConfig {
            from: "SuperManager <noreply@example.com>".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_build_message() {
        let message = service()
            .build_message("user@example.com", "Hello", "Body text")
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Hello"));
        assert!(raw.contains("To: user@example.com"));
        assert!(raw.contains("Body text"));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        assert!(service().build_message("not an address", "s", "b").is_err());
    }

    #[tokio::test]
    async fn test_send_mail_reports_failure() {
        let service = MailService::new(MailConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            timeout_seconds: 1,
            ..Default::default()
        });

        assert!(!service.send_mail("user@example.com", "s", "b").await);
    }
}
