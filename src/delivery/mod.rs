//! Report delivery.
//!
//! A [`Notifier`] takes one already-chunked message and a destination.
//! Failures come back as [`DeliveryError`] for the caller to log; nothing
//! here retries.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rejected by endpoint: {status_code} - {message}")]
    Rejected { status_code: u16, message: String },

    #[error("Delivery not configured: {0}")]
    NotConfigured(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, destination: &str, message: &str) -> Result<(), DeliveryError>;
}

// =============================================================================
// Telegram
// =============================================================================

const TELEGRAM_API: &str = "https://api.telegram.org";

/// Telegram Bot API `sendMessage`.
pub struct TelegramNotifier {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramNotifier {
    pub fn new(token: &str, timeout: Duration) -> Result<Self, DeliveryError> {
        Self::with_base_url(TELEGRAM_API, token, timeout)
    }

    pub fn with_base_url(
        base_url: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        if token.trim().is_empty() {
            return Err(DeliveryError::NotConfigured("empty bot token".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
        })
    }

    fn send_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, destination: &str, message: &str) -> Result<(), DeliveryError> {
        if destination.trim().is_empty() {
            return Err(DeliveryError::NotConfigured("empty chat id".to_string()));
        }

        let body = serde_json::json!({
            "chat_id": destination,
            "text": message,
            "disable_web_page_preview": true,
        });

        let resp = self
            .client
            .post(self.send_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Network(e.without_url().to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| {
                v.get("description")
                    .and_then(|d| d.as_str())
                    .map(str::to_string)
            })
            .unwrap_or(text);
        Err(DeliveryError::Rejected {
            status_code: status.as_u16(),
            message,
        })
    }
}

// =============================================================================
// Console
// =============================================================================

/// Prints to stdout. Used when no bot token or chat id is configured.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn send(&self, destination: &str, message: &str) -> Result<(), DeliveryError> {
        info!(destination, chars = message.chars().count(), "Printing report to stdout");
        println!("{message}");
        Ok(())
    }
}
