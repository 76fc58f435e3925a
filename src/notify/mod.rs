pub mod templates;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::MailConfig;
use crate::error::AppError;

/// A rendered plain-text email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), AppError>;
}

#[derive(Debug, Serialize)]
struct SendMailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Posts emails as JSON to a transactional mail API.
pub struct HttpNotifier {
    client: Client,
    config: MailConfig,
}

impl HttpNotifier {
    pub fn new(config: MailConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, email: &Email) -> Result<(), AppError> {
        let request_body = SendMailRequest {
            from: &self.config.from,
            to: &email.to,
            subject: &email.subject,
            text: &email.text,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_token))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Notification(format!("Mail API unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Notification(format!(
                "Mail API error {}: {}",
                status, body
            )));
        }

        info!("Sent \"{}\" to {}", email.subject, email.to);
        Ok(())
    }
}

/// Used when no mail API is configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, email: &Email) -> Result<(), AppError> {
        debug!("Mail disabled, dropping \"{}\" for {}", email.subject, email.to);
        Ok(())
    }
}
