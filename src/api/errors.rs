//! Error types for the sports data provider client.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {status_code} - {message}")]
    Http { status_code: u16, message: String },

    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    /// The provider answered 200 but reported errors in the payload.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Build an error from a non-success response.
    pub fn from_response(status_code: u16, body: &str) -> Self {
        if status_code == 429 {
            return Self::RateLimited(body.to_string());
        }

        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.to_string());

        Self::Http {
            status_code,
            message,
        }
    }

    /// api-sports reports auth and quota problems inside a 200 body as
    /// `"errors": {...}` (or a non-empty array).
    pub fn from_payload(json: &serde_json::Value) -> Option<Self> {
        let errors = json.get("errors")?;
        let empty = match errors {
            serde_json::Value::Object(map) => map.is_empty(),
            serde_json::Value::Array(arr) => arr.is_empty(),
            serde_json::Value::Null => true,
            _ => false,
        };
        if empty {
            return None;
        }

        let text = errors.to_string();
        if text.to_lowercase().contains("ratelimit") || text.to_lowercase().contains("requests") {
            Some(Self::RateLimited(text))
        } else {
            Some(Self::Provider(text))
        }
    }

    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Deserialization(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
