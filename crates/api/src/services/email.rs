//! Email delivery providers.
//!
//! Supports two providers:
//! - `console`: Logs emails via tracing (development)
//! - `sendgrid`: Sends via the SendGrid API

use crate::config::EmailConfig;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors that can occur during email delivery.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Carbon-copy address (optional)
    pub cc: Option<String>,
    /// Email subject
    pub subject: String,
    /// Plain text body
    pub body_text: String,
    /// HTML body (carries the tracking pixel and tracked links)
    pub body_html: Option<String>,
}

/// Delivery service routing messages to the configured provider.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Check if email delivery is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Send an email message.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email delivery disabled, skipping send"
            );
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => self.send_console(message).await,
            "sendgrid" => self.send_sendgrid(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    /// Console provider - logs email via tracing (for development).
    async fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            cc = ?message.cc,
            subject = %message.subject,
            from = %self.config.sender_email,
            from_name = %self.config.sender_name,
            "Email (console provider)"
        );

        info!(body_text = %message.body_text, "Email body (plain text)");

        if let Some(html) = &message.body_html {
            debug!(body_html_length = html.len(), "Email body (HTML)");
        }

        Ok(())
    }

    /// SendGrid provider - sends via SendGrid API.
    async fn send_sendgrid(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let client = reqwest::Client::new();

        let mut personalization = serde_json::json!({
            "to": [{ "email": message.to }]
        });
        if let Some(cc) = &message.cc {
            personalization["cc"] = serde_json::json!([{ "email": cc }]);
        }

        let mut body = serde_json::json!({
            "personalizations": [personalization],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name
            },
            "subject": message.subject,
            "content": [{
                "type": "text/plain",
                "value": message.body_text
            }]
        });

        if let Some(html) = &message.body_html {
            body["content"]
                .as_array_mut()
                .expect("content is an array")
                .push(serde_json::json!({
                    "type": "text/html",
                    "value": html
                }));
        }

        let response = client
            .post("https://api.sendgrid.com/v3/mail/send")
            .header(
                "Authorization",
                format!("Bearer {}", self.config.sendgrid_api_key),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            info!(
                to = %message.to,
                subject = %message.subject,
                "Email sent via SendGrid"
            );
            Ok(())
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_body, "SendGrid API error");
            Err(EmailError::ProviderError(format!(
                "SendGrid returned {}: {}",
                status, error_body
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EmailConfig {
        EmailConfig {
            enabled: true,
            provider: "console".to_string(),
            sendgrid_api_key: String::new(),
            sender_email: "test@example.com".to_string(),
            sender_name: "Test".to_string(),
            base_url: "https://app.example.com".to_string(),
        }
    }

    fn message() -> EmailMessage {
        EmailMessage {
            to: "client@example.com".to_string(),
            cc: None,
            subject: "Proposal".to_string(),
            body_text: "Please review".to_string(),
            body_html: Some("<p>Please review</p>".to_string()),
        }
    }

    #[test]
    fn test_email_service_enabled_flag() {
        let service = EmailService::new(test_config());
        assert!(service.is_enabled());

        let mut config = test_config();
        config.enabled = false;
        assert!(!EmailService::new(config).is_enabled());
    }

    #[tokio::test]
    async fn test_send_console_email() {
        let service = EmailService::new(test_config());
        assert!(service.send(message()).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_disabled_silently_succeeds() {
        let mut config = test_config();
        config.enabled = false;
        let service = EmailService::new(config);
        assert!(service.send(message()).await.is_ok());
    }

    #[tokio::test]
    async fn test_sendgrid_without_key_not_configured() {
        let mut config = test_config();
        config.provider = "sendgrid".to_string();
        let service = EmailService::new(config);
        assert!(matches!(
            service.send(message()).await,
            Err(EmailError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected() {
        let mut config = test_config();
        config.provider = "pigeon".to_string();
        let service = EmailService::new(config);
        assert!(service.send(message()).await.is_err());
    }
}
