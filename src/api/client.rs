//! Async REST client for the api-sports providers (football and baseball).
//!
//! Features:
//! - RapidAPI key/host headers
//! - Rate limiting (configurable, default 5 req/sec) to stay inside plan quotas
//! - Fixed per-call timeout, single attempt (no retries)
//! - Unwraps the `{"errors": ..., "response": [...]}` envelope

use governor::{Quota, RateLimiter};
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::errors::ApiError;

type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Connection settings for one provider host.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub rate_limit_per_sec: u32,
}

/// REST client bound to one api-sports host.
pub struct SportsApiClient {
    base_url: String,
    host: String,
    api_key: String,
    client: Client,
    rate_limiter: Arc<DirectLimiter>,
}

impl SportsApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec).unwrap_or(NonZeroU32::MIN),
        );

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            host: host_of(&base_url),
            base_url,
            api_key: config.api_key.clone(),
            client,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    // =========================================================================
    // Core request method
    // =========================================================================

    /// GET `path` and return the `response` array of the envelope.
    async fn get_response(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<serde_json::Value>, ApiError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        debug!(host = %self.host, path, params = ?params, "API request");

        let response = self
            .client
            .get(&url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .query(params)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(status.as_u16(), &body));
        }

        let json: serde_json::Value = response.json().await.map_err(ApiError::from_reqwest)?;
        if let Some(err) = ApiError::from_payload(&json) {
            return Err(err);
        }

        Ok(json
            .get("response")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default())
    }

    // =========================================================================
    // Endpoints
    // =========================================================================

    /// Football fixtures scheduled on a date (`/v3/fixtures?date=`).
    pub async fn get_fixtures(&self, date: &str) -> Result<Vec<serde_json::Value>, ApiError> {
        self.get_response("/v3/fixtures", &[("date", date.to_string())])
            .await
    }

    /// A team's last `last` football fixtures, used for recent form.
    pub async fn get_team_fixtures(
        &self,
        team_id: u64,
        last: u32,
    ) -> Result<Vec<serde_json::Value>, ApiError> {
        self.get_response(
            "/v3/fixtures",
            &[("team", team_id.to_string()), ("last", last.to_string())],
        )
        .await
    }

    /// Pre-match odds for one football fixture, every bookmaker.
    pub async fn get_fixture_odds(&self, fixture_id: u64) -> Result<Vec<serde_json::Value>, ApiError> {
        self.get_response("/v3/odds", &odds_query("fixture", fixture_id))
            .await
    }

    /// Baseball games scheduled on a date (`/games?date=`).
    pub async fn get_games(&self, date: &str) -> Result<Vec<serde_json::Value>, ApiError> {
        self.get_response("/games", &[("date", date.to_string())]).await
    }

    /// Pre-match odds for one baseball game, every bookmaker.
    pub async fn get_game_odds(&self, game_id: u64) -> Result<Vec<serde_json::Value>, ApiError> {
        self.get_response("/odds", &odds_query("game", game_id)).await
    }
}

/// Odds are requested for all bookmakers; the preferred one is chosen
/// while parsing so the others can fill its gaps.
fn odds_query(event_key: &'static str, event_id: u64) -> [(&'static str, String); 1] {
    [(event_key, event_id.to_string())]
}

/// RapidAPI expects the bare host in `x-rapidapi-host`.
fn host_of(base_url: &str) -> String {
    let without_scheme = base_url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(base_url);
    without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme)
        .to_string()
}
