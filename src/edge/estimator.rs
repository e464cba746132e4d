//! Heuristic outcome model.
//!
//! Football: each side's expected goals blends a quality signal (recent xG)
//! with a form composite (own scoring rate vs. opponent conceding rate):
//!     exp_home = 0.6 * xg_home + 0.4 * (0.6 * gf_home + 0.4 * ga_away)
//! The 1X2 split follows each side's share of expected goals, nudged by a
//! home-advantage offset. The draw takes the clamped remainder, so the three
//! need not sum to exactly 1.
//!
//! Baseball: an ERA-like strength rating per side (lower is stronger) is
//! inverted into a weight, scaled for home advantage and normalized.
//!
//! Totals: p_over = 0.5 + slope * (expected_total - line), clamped.
//!
//! Nothing here does I/O and nothing fails on missing inputs; absent form
//! figures fall back to the configured neutral defaults.

use serde::{Deserialize, Serialize};

use super::converter::clamp;
use crate::data::models::{ModelInputs, Outcome, PitchingProfile, TeamForm};

/// Every probability handed out is kept inside this band.
pub const PROBABILITY_FLOOR: f64 = 0.01;
pub const PROBABILITY_CEIL: f64 = 0.99;

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FootballModelConfig {
    /// Weight of the xG quality signal; the form composite gets the rest.
    pub quality_weight: f64,
    /// Weight of own scoring rate inside the form composite.
    pub attack_weight: f64,
    pub home_advantage: f64,
    pub side_band: (f64, f64),
    pub draw_band: (f64, f64),
    pub total_band: (f64, f64),
    pub over_slope: f64,
    pub over_band: (f64, f64),
    /// Haircuts applied to the summed double-chance probabilities (1X, 12, X2).
    pub hedge_margins: [f64; 3],
    pub hedge_band: (f64, f64),
    pub default_home: TeamForm,
    pub default_away: TeamForm,
}

impl Default for FootballModelConfig {
    fn default() -> Self {
        Self {
            quality_weight: 0.6,
            attack_weight: 0.6,
            home_advantage: 0.05,
            side_band: (0.05, 0.85),
            draw_band: (0.05, 0.50),
            total_band: (0.5, 5.0),
            over_slope: 0.18,
            over_band: (0.05, 0.90),
            hedge_margins: [0.02, 0.01, 0.02],
            hedge_band: (0.05, 0.95),
            // Last-5 defaults: 6 scored / 5 conceded at home, 5 / 6 away.
            default_home: TeamForm {
                xg_recent: Some(1.2),
                goals_for: Some(6.0 / 5.0),
                goals_against: Some(5.0 / 5.0),
            },
            default_away: TeamForm {
                xg_recent: Some(1.1),
                goals_for: Some(5.0 / 5.0),
                goals_against: Some(6.0 / 5.0),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BaseballModelConfig {
    pub starter_weight: f64,
    pub default_starter_era: f64,
    pub default_bullpen_era: f64,
    /// Ratings below this are treated as this (keeps the inverse bounded).
    pub min_rating: f64,
    pub home_multiplier: f64,
    pub side_band: (f64, f64),
    pub league_runs_per_team: f64,
    pub league_rating: f64,
    pub total_band: (f64, f64),
    pub over_slope: f64,
    pub over_band: (f64, f64),
}

impl Default for BaseballModelConfig {
    fn default() -> Self {
        Self {
            starter_weight: 0.65,
            default_starter_era: 4.20,
            default_bullpen_era: 4.10,
            min_rating: 1.0,
            home_multiplier: 1.04,
            side_band: (0.30, 0.70),
            league_runs_per_team: 4.4,
            league_rating: 4.15,
            total_band: (5.0, 13.0),
            over_slope: 0.08,
            over_band: (0.05, 0.90),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimatorConfig {
    pub football: FootballModelConfig,
    pub baseball: BaseballModelConfig,
}

// =============================================================================
// Estimates
// =============================================================================

/// Linear over/under model around an expected total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TotalsModel {
    pub expected: f64,
    pub slope: f64,
    pub band: (f64, f64),
}

impl TotalsModel {
    pub fn p_over(&self, line: f64) -> f64 {
        clamp(0.5 + self.slope * (self.expected - line), self.band.0, self.band.1)
    }

    pub fn p_under(&self, line: f64) -> f64 {
        1.0 - self.p_over(line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HedgeProbabilities {
    pub home_or_draw: f64,
    pub home_or_away: f64,
    pub draw_or_away: f64,
}

/// Model probabilities for one event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeEstimate {
    pub home: f64,
    /// `None` for sports without a draw outcome.
    pub draw: Option<f64>,
    pub away: f64,
    pub hedge: Option<HedgeProbabilities>,
    pub totals: Option<TotalsModel>,
}

impl OutcomeEstimate {
    /// Winner-only estimate for a two-outcome market.
    pub fn two_way(home: f64, away: f64) -> Self {
        Self {
            home,
            draw: None,
            away,
            hedge: None,
            totals: None,
        }
    }

    pub fn with_totals(mut self, totals: TotalsModel) -> Self {
        self.totals = Some(totals);
        self
    }

    /// Model probability for an outcome, or `None` when the model does not
    /// cover that market.
    pub fn probability(&self, outcome: Outcome) -> Option<f64> {
        let raw = match outcome {
            Outcome::Home => Some(self.home),
            Outcome::Away => Some(self.away),
            Outcome::Draw => self.draw,
            Outcome::HomeOrDraw => self.hedge.map(|h| h.home_or_draw),
            Outcome::HomeOrAway => self.hedge.map(|h| h.home_or_away),
            Outcome::DrawOrAway => self.hedge.map(|h| h.draw_or_away),
            Outcome::Over(line) => self.totals.map(|t| t.p_over(line)),
            Outcome::Under(line) => self.totals.map(|t| t.p_under(line)),
        }?;
        raw.is_finite()
            .then(|| clamp(raw, PROBABILITY_FLOOR, PROBABILITY_CEIL))
    }

    pub fn expected_total(&self) -> Option<f64> {
        self.totals.map(|t| t.expected)
    }
}

/// Expected scoring breakdown for a football match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalsExpectation {
    pub home: f64,
    pub away: f64,
    pub total: f64,
}

// =============================================================================
// Football
// =============================================================================

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

fn form_or(form: &TeamForm, default: &TeamForm) -> (f64, f64, f64) {
    let pick = |v: Option<f64>, d: Option<f64>| usable(v).or(usable(d)).unwrap_or(1.0);
    (
        pick(form.xg_recent, default.xg_recent),
        pick(form.goals_for, default.goals_for),
        pick(form.goals_against, default.goals_against),
    )
}

pub fn expected_goals(
    home: &TeamForm,
    away: &TeamForm,
    config: &FootballModelConfig,
) -> GoalsExpectation {
    let (xg_h, gf_h, ga_h) = form_or(home, &config.default_home);
    let (xg_a, gf_a, ga_a) = form_or(away, &config.default_away);

    let q = config.quality_weight;
    let w = config.attack_weight;
    let exp_home = q * xg_h + (1.0 - q) * (w * gf_h + (1.0 - w) * ga_a);
    let exp_away = q * xg_a + (1.0 - q) * (w * gf_a + (1.0 - w) * ga_h);
    let total = clamp(exp_home + exp_away, config.total_band.0, config.total_band.1);

    GoalsExpectation {
        home: exp_home,
        away: exp_away,
        total,
    }
}

pub fn estimate_football(
    home: &TeamForm,
    away: &TeamForm,
    config: &FootballModelConfig,
) -> OutcomeEstimate {
    let goals = expected_goals(home, away, config);

    let sum = goals.home + goals.away;
    let home_share = if sum > 0.0 { goals.home / sum } else { 0.5 };

    let (lo, hi) = config.side_band;
    let p_home = clamp(home_share + config.home_advantage, lo, hi);
    let p_away = clamp((1.0 - home_share) - config.home_advantage, lo, hi);
    let p_draw = clamp(1.0 - (p_home + p_away), config.draw_band.0, config.draw_band.1);

    let [m_1x, m_12, m_x2] = config.hedge_margins;
    let (hlo, hhi) = config.hedge_band;
    let hedge = HedgeProbabilities {
        home_or_draw: clamp(p_home + p_draw - m_1x, hlo, hhi),
        home_or_away: clamp(p_home + p_away - m_12, hlo, hhi),
        draw_or_away: clamp(p_draw + p_away - m_x2, hlo, hhi),
    };

    OutcomeEstimate {
        home: p_home,
        draw: Some(p_draw),
        away: p_away,
        hedge: Some(hedge),
        totals: Some(TotalsModel {
            expected: goals.total,
            slope: config.over_slope,
            band: config.over_band,
        }),
    }
}

// =============================================================================
// Baseball
// =============================================================================

/// ERA-like rating blending starter and bullpen; lower is stronger.
pub fn strength_rating(profile: &PitchingProfile, config: &BaseballModelConfig) -> f64 {
    let starter = usable(profile.starter_era).unwrap_or(config.default_starter_era);
    let bullpen = usable(profile.bullpen_era).unwrap_or(config.default_bullpen_era);
    let rating = config.starter_weight * starter + (1.0 - config.starter_weight) * bullpen;
    rating.max(config.min_rating)
}

pub fn estimate_baseball(
    home: &PitchingProfile,
    away: &PitchingProfile,
    config: &BaseballModelConfig,
) -> OutcomeEstimate {
    let rating_home = strength_rating(home, config);
    let rating_away = strength_rating(away, config);

    let w_home = config.home_multiplier / rating_home;
    let w_away = 1.0 / rating_away;

    let (lo, hi) = config.side_band;
    let p_home = clamp(w_home / (w_home + w_away), lo, hi);
    let p_away = clamp(1.0 - p_home, lo, hi);

    // Each lineup scores against the opposing staff.
    let runs_home = config.league_runs_per_team * rating_away / config.league_rating;
    let runs_away = config.league_runs_per_team * rating_home / config.league_rating;
    let total = clamp(runs_home + runs_away, config.total_band.0, config.total_band.1);

    OutcomeEstimate::two_way(p_home, p_away).with_totals(TotalsModel {
        expected: total,
        slope: config.over_slope,
        band: config.over_band,
    })
}

/// Dispatch on the sport carried by the inputs.
pub fn estimate(inputs: &ModelInputs, config: &EstimatorConfig) -> OutcomeEstimate {
    match inputs {
        ModelInputs::Football { home, away } => estimate_football(home, away, &config.football),
        ModelInputs::Baseball { home, away } => estimate_baseball(home, away, &config.baseball),
    }
}

// =============================================================================
// Tests
// =============================================================================
