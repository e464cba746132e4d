//! Configuration management.
//!
//! Loads settings from environment variables and .env file. Components
//! never read the environment themselves; they receive the typed configs
//! built here.

use chrono::{FixedOffset, Offset, Utc};
use std::time::Duration;

use crate::api::client::ApiConfig;
use crate::data::models::Sport;
use crate::data::source::SourceConfig;
use crate::edge::estimator::EstimatorConfig;
use crate::edge::ranker::{RankerConfig, COMBO_MAX_LEGS, COMBO_MIN_LEGS};
use crate::edge::selector::SelectorConfig;
use crate::report::renderer::ReportConfig;

const DEFAULT_FOOTBALL_LEAGUES: &str = "Premier League,La Liga,Bundesliga,Serie A,Ligue 1,\
Liga MX,Eredivisie,UEFA Champions League,Leagues Cup";

/// Smallest chunk limit that still fits a rendered pick block.
const MIN_CHUNK_LIMIT: usize = 256;

/// Past fixtures used for recent form.
const FORM_WINDOW: u32 = 5;

/// Application configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Settings {
    // Provider
    pub api_sports_key: String,
    pub football_base_url: String,
    pub baseball_base_url: String,
    pub http_timeout_secs: u64,
    pub api_rate_limit_per_sec: u32,
    pub bookmaker_id: u32,

    // Competitions
    pub football_leagues: Vec<String>,
    pub baseball_leagues: Vec<String>,
    pub enable_football: bool,
    pub enable_baseball: bool,
    pub fetch_recent_form: bool,

    // Reporting period
    pub report_utc_offset_minutes: i32,

    // Selection
    pub max_picks_per_day: usize,
    pub max_picks_per_match: usize,
    pub mlb_max_picks_per_game: usize,
    pub default_goals_lines: Vec<f64>,
    pub mlb_default_totals: Vec<f64>,
    pub fallback_if_no_value: bool,
    pub combo_max_legs: usize,

    // Delivery
    pub message_chunk_limit: usize,
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,

    // Audit log
    pub picks_log_path: String,

    // Logging
    pub log_level: String,
    pub log_json: bool,
}

impl Settings {
    /// Load settings from environment variables (and .env file).
    pub fn from_env() -> Self {
        // Try to load .env file (ignore if not found).
        let _ = dotenvy::dotenv();

        Self {
            api_sports_key: env_str("API_SPORTS_KEY", ""),
            football_base_url: env_str("FOOTBALL_BASE_URL", "https://api-football-v1.p.rapidapi.com"),
            baseball_base_url: env_str("BASEBALL_BASE_URL", "https://v1.baseball.api-sports.io"),
            http_timeout_secs: env_u64("HTTP_TIMEOUT_SECS", 30),
            api_rate_limit_per_sec: env_u32("API_RATE_LIMIT_PER_SEC", 5),
            bookmaker_id: env_u32("BOOKMAKER_ID", 8),

            football_leagues: env_csv_default("FOOTBALL_LEAGUES", DEFAULT_FOOTBALL_LEAGUES),
            baseball_leagues: env_csv_default("BASEBALL_LEAGUES", "MLB"),
            enable_football: env_bool("ENABLE_FOOTBALL", true),
            enable_baseball: env_bool("ENABLE_BASEBALL", true),
            fetch_recent_form: env_bool("FETCH_RECENT_FORM", true),

            report_utc_offset_minutes: env_i32("REPORT_UTC_OFFSET_MINUTES", -360),

            max_picks_per_day: env_usize("MAX_PICKS_PER_DAY", 10),
            max_picks_per_match: env_usize("MAX_PICKS_PER_MATCH", 3),
            mlb_max_picks_per_game: env_usize("MLB_MAX_PICKS_PER_GAME", 2),
            default_goals_lines: env_f64_csv_default("DEFAULT_GOALS_LINES", "2.5,3.0"),
            mlb_default_totals: env_f64_csv_default("MLB_DEFAULT_TOTALS", "7.5,8.5,9.0"),
            fallback_if_no_value: env_bool("FALLBACK_IF_NO_VALUE", true),
            combo_max_legs: env_usize("COMBO_MAX_LEGS", 3),

            message_chunk_limit: env_usize("MESSAGE_CHUNK_LIMIT", 4096),
            telegram_bot_token: env_str("TELEGRAM_BOT_TOKEN", ""),
            telegram_chat_id: env_str("TELEGRAM_CHAT_ID", ""),

            picks_log_path: env_str("PICKS_LOG_PATH", ""),

            log_level: env_str("LOG_LEVEL", "info"),
            log_json: env_bool("LOG_JSON", false),
        }
    }

    /// Validate configuration for critical requirements.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.max_picks_per_day == 0 {
            errors.push("MAX_PICKS_PER_DAY must be at least 1".to_string());
        }
        if self.max_picks_per_match == 0 {
            errors.push("MAX_PICKS_PER_MATCH must be at least 1".to_string());
        }
        if self.mlb_max_picks_per_game == 0 {
            errors.push("MLB_MAX_PICKS_PER_GAME must be at least 1".to_string());
        }
        if !(COMBO_MIN_LEGS..=COMBO_MAX_LEGS).contains(&self.combo_max_legs) {
            errors.push(format!(
                "COMBO_MAX_LEGS must be between {COMBO_MIN_LEGS} and {COMBO_MAX_LEGS}"
            ));
        }
        if self.message_chunk_limit < MIN_CHUNK_LIMIT {
            errors.push(format!("MESSAGE_CHUNK_LIMIT must be at least {MIN_CHUNK_LIMIT}"));
        }
        if self.api_rate_limit_per_sec == 0 {
            errors.push("API_RATE_LIMIT_PER_SEC must be at least 1".to_string());
        }
        if self.http_timeout_secs == 0 {
            errors.push("HTTP_TIMEOUT_SECS must be at least 1".to_string());
        }
        if self.report_offset().is_none() {
            errors.push("REPORT_UTC_OFFSET_MINUTES must be between -1439 and 1439".to_string());
        }

        if !self.enable_football && !self.enable_baseball {
            errors.push("At least one of ENABLE_FOOTBALL / ENABLE_BASEBALL must be true".to_string());
        }
        if self.enable_football {
            if self.football_leagues.is_empty() {
                errors.push("FOOTBALL_LEAGUES must not be empty".to_string());
            }
            if self.default_goals_lines.is_empty() {
                errors.push("DEFAULT_GOALS_LINES must list at least one line".to_string());
            }
        }
        if self.enable_baseball {
            if self.baseball_leagues.is_empty() {
                errors.push("BASEBALL_LEAGUES must not be empty".to_string());
            }
            if self.mlb_default_totals.is_empty() {
                errors.push("MLB_DEFAULT_TOTALS must list at least one line".to_string());
            }
        }

        errors.extend(band_errors(&self.estimator_config()));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    // =========================================================================
    // Component configs
    // =========================================================================

    /// Sports enabled for this run, football first.
    pub fn sports(&self) -> Vec<Sport> {
        let mut sports = Vec::new();
        if self.enable_football {
            sports.push(Sport::Football);
        }
        if self.enable_baseball {
            sports.push(Sport::Baseball);
        }
        sports
    }

    pub fn report_offset(&self) -> Option<FixedOffset> {
        self.report_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn football_api(&self) -> ApiConfig {
        self.api_config(&self.football_base_url)
    }

    pub fn baseball_api(&self) -> ApiConfig {
        self.api_config(&self.baseball_base_url)
    }

    fn api_config(&self, base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            api_key: self.api_sports_key.clone(),
            timeout: self.http_timeout(),
            rate_limit_per_sec: self.api_rate_limit_per_sec,
        }
    }

    pub fn source_config(&self) -> SourceConfig {
        SourceConfig {
            football_leagues: self.football_leagues.clone(),
            baseball_leagues: self.baseball_leagues.clone(),
            bookmaker: self.bookmaker_id,
            report_offset: self.report_offset().unwrap_or_else(|| Utc.fix()),
            fetch_recent_form: self.fetch_recent_form,
            form_window: FORM_WINDOW,
        }
    }

    pub fn estimator_config(&self) -> EstimatorConfig {
        EstimatorConfig::default()
    }

    pub fn football_selector(&self) -> SelectorConfig {
        SelectorConfig {
            total_lines: self.default_goals_lines.clone(),
            per_event_cap: self.max_picks_per_match,
            ..SelectorConfig::football()
        }
    }

    pub fn baseball_selector(&self) -> SelectorConfig {
        SelectorConfig {
            total_lines: self.mlb_default_totals.clone(),
            per_event_cap: self.mlb_max_picks_per_game,
            ..SelectorConfig::baseball()
        }
    }

    pub fn ranker_config(&self) -> RankerConfig {
        RankerConfig {
            max_picks_per_day: self.max_picks_per_day,
            fallback_if_no_value: self.fallback_if_no_value,
            combo_max_legs: self.combo_max_legs,
        }
    }

    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            chunk_limit: self.message_chunk_limit,
            ..ReportConfig::default()
        }
    }

    /// Bot token and chat id, when both are set.
    pub fn telegram(&self) -> Option<(&str, &str)> {
        let token = self.telegram_bot_token.trim();
        let chat = self.telegram_chat_id.trim();
        if token.is_empty() || chat.is_empty() {
            None
        } else {
            Some((token, chat))
        }
    }

    pub fn picks_log(&self) -> Option<&str> {
        let path = self.picks_log_path.trim();
        (!path.is_empty()).then_some(path)
    }
}

/// Every clamp band must be non-empty: low < high.
fn band_errors(config: &EstimatorConfig) -> Vec<String> {
    let f = &config.football;
    let b = &config.baseball;
    [
        ("football side", f.side_band),
        ("football draw", f.draw_band),
        ("football total", f.total_band),
        ("football over", f.over_band),
        ("football hedge", f.hedge_band),
        ("baseball side", b.side_band),
        ("baseball total", b.total_band),
        ("baseball over", b.over_band),
    ]
    .into_iter()
    .filter(|(_, (lo, hi))| lo.partial_cmp(hi) != Some(std::cmp::Ordering::Less))
    .map(|(name, (lo, hi))| format!("{name} band is inverted: [{lo}, {hi}]"))
    .collect()
}

// =============================================================================
// Environment helpers
// =============================================================================

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env_parse(key, default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_parse(key, default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_parse(key, default)
}

fn env_i32(key: &str, default: i32) -> i32 {
    env_parse(key, default)
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_csv_default(key: &str, default: &str) -> Vec<String> {
    split_csv(&std::env::var(key).unwrap_or_else(|_| default.to_string()))
}

/// Numeric list; entries that do not parse as a finite number are dropped.
fn env_f64_csv_default(key: &str, default: &str) -> Vec<f64> {
    env_csv_default(key, default)
        .iter()
        .filter_map(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .collect()
}
