//! Core data models for fixtures and bookmaker prices.
//!
//! These are the typed records the rest of the pipeline works with.
//! Provider JSON is converted into them by `data::fixtures` and
//! `data::odds`; anything that does not fit is dropped there.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Enums
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Football,
    Baseball,
}

impl Sport {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Football => "⚽ Football",
            Self::Baseball => "⚾ Baseball",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Football => write!(f, "football"),
            Self::Baseball => write!(f, "baseball"),
        }
    }
}

/// Market category, listed in selection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketCategory {
    /// Outright winner: 1X2 for football, moneyline for baseball.
    Winner,
    /// Double chance (hedge) market.
    DoubleChance,
    /// Over/under a total line.
    Totals,
}

impl fmt::Display for MarketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Winner => write!(f, "winner"),
            Self::DoubleChance => write!(f, "double_chance"),
            Self::Totals => write!(f, "totals"),
        }
    }
}

/// One priced outcome within a market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Home,
    Draw,
    Away,
    HomeOrDraw,
    HomeOrAway,
    DrawOrAway,
    Over(f64),
    Under(f64),
}

impl Outcome {
    pub fn category(&self) -> MarketCategory {
        match self {
            Self::Home | Self::Draw | Self::Away => MarketCategory::Winner,
            Self::HomeOrDraw | Self::HomeOrAway | Self::DrawOrAway => MarketCategory::DoubleChance,
            Self::Over(_) | Self::Under(_) => MarketCategory::Totals,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "Home"),
            Self::Draw => write!(f, "Draw"),
            Self::Away => write!(f, "Away"),
            Self::HomeOrDraw => write!(f, "1X"),
            Self::HomeOrAway => write!(f, "12"),
            Self::DrawOrAway => write!(f, "X2"),
            Self::Over(line) => write!(f, "Over {line}"),
            Self::Under(line) => write!(f, "Under {line}"),
        }
    }
}

// =============================================================================
// Event Models
// =============================================================================

/// One scheduled contest, immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub sport: Sport,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    /// Provider team ids, used for the recent form lookup.
    pub home_team_id: Option<u64>,
    pub away_team_id: Option<u64>,
    /// Scheduled start, already shifted into the reporting timezone.
    pub starts_at: DateTime<FixedOffset>,
}

impl Event {
    pub fn matchup(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

/// One bookmaker price for one outcome of one event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub outcome: Outcome,
    /// Always > 1.0; see [`MarketQuote::new`].
    pub decimal_odds: f64,
}

impl MarketQuote {
    /// Build a quote, rejecting odds that are not a finite value above 1.0.
    pub fn new(outcome: Outcome, decimal_odds: f64) -> Option<Self> {
        if decimal_odds.is_finite() && decimal_odds > 1.0 {
            Some(Self {
                outcome,
                decimal_odds,
            })
        } else {
            None
        }
    }
}

/// Find the price for an exact outcome.
pub fn find_quote(quotes: &[MarketQuote], outcome: Outcome) -> Option<f64> {
    quotes
        .iter()
        .find(|q| q.outcome == outcome)
        .map(|q| q.decimal_odds)
}

// =============================================================================
// Estimator Inputs
// =============================================================================

/// Recent scoring form for a football team. Missing fields fall back to
/// neutral defaults inside the estimator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamForm {
    /// Recent expected-goals average per match.
    pub xg_recent: Option<f64>,
    /// Goals scored per match over the recent window.
    pub goals_for: Option<f64>,
    /// Goals conceded per match over the recent window.
    pub goals_against: Option<f64>,
}

/// Pitching quality for a baseball side, ERA-like (lower is stronger).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchingProfile {
    pub starter_era: Option<f64>,
    pub bullpen_era: Option<f64>,
}

/// Estimator inputs for one event, by sport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ModelInputs {
    Football { home: TeamForm, away: TeamForm },
    Baseball { home: PitchingProfile, away: PitchingProfile },
}

impl ModelInputs {
    /// No data at all: the estimator falls back to its defaults.
    pub fn neutral(sport: Sport) -> Self {
        match sport {
            Sport::Football => Self::Football {
                home: TeamForm::default(),
                away: TeamForm::default(),
            },
            Sport::Baseball => Self::Baseball {
                home: PitchingProfile::default(),
                away: PitchingProfile::default(),
            },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
