//! Odds conversions and the edge metric.
//!
//! Decimal odds d pay d per unit staked (stake included), so the fair
//! probability implied by a price is:
//!     p_implied = 1 / d
//!
//! Edge compares the model probability p with that price:
//!     edge = p * d - 1
//!
//! which is the expected return per unit staked if p is right.
//! Every function returns `None` for unusable input instead of a NaN or zero.

/// Sort key used for candidates without a computable edge. Below any real
/// edge (edge >= -1 for probabilities in [0, 1]).
pub const UNDEFINED_EDGE: f64 = -9.0;

pub const VERY_STRONG_EDGE: f64 = 0.10;
pub const STRONG_EDGE: f64 = 0.05;
pub const MODERATE_EDGE: f64 = 0.01;

/// Value band for an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeLabel {
    VeryStrong,
    Strong,
    Moderate,
    Slight,
    NoValue,
    NotAvailable,
}

impl EdgeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryStrong => "very strong",
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Slight => "slight",
            Self::NoValue => "no value",
            Self::NotAvailable => "N/A",
        }
    }
}

impl std::fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Odds are usable only when finite and strictly above 1.0.
pub fn valid_odds(decimal_odds: f64) -> Option<f64> {
    (decimal_odds.is_finite() && decimal_odds > 1.0).then_some(decimal_odds)
}

pub fn implied_probability(decimal_odds: f64) -> Option<f64> {
    valid_odds(decimal_odds).map(|d| 1.0 / d)
}

/// Decimal to American notation.
///
/// d >= 2.0 (underdog price): `+round((d - 1) * 100)`
/// 1.0 < d < 2.0 (favorite price): `-round(100 / (d - 1))`
pub fn to_american(decimal_odds: f64) -> Option<String> {
    let d = valid_odds(decimal_odds)?;
    if d >= 2.0 {
        Some(format!("+{}", ((d - 1.0) * 100.0).round() as i64))
    } else {
        Some(format!("-{}", (100.0 / (d - 1.0)).round() as i64))
    }
}

pub fn edge(estimated_probability: Option<f64>, decimal_odds: Option<f64>) -> Option<f64> {
    let p = estimated_probability.filter(|p| p.is_finite())?;
    let d = valid_odds(decimal_odds?)?;
    Some(p * d - 1.0)
}

/// First matching threshold wins, checked from the top down.
pub fn label(edge: Option<f64>) -> EdgeLabel {
    match edge {
        None => EdgeLabel::NotAvailable,
        Some(e) if e >= VERY_STRONG_EDGE => EdgeLabel::VeryStrong,
        Some(e) if e >= STRONG_EDGE => EdgeLabel::Strong,
        Some(e) if e >= MODERATE_EDGE => EdgeLabel::Moderate,
        Some(e) if e > 0.0 => EdgeLabel::Slight,
        Some(_) => EdgeLabel::NoValue,
    }
}

pub fn clamp(value: f64, low: f64, high: f64) -> f64 {
    value.max(low).min(high)
}

/// Map an optional edge onto a totally ordered key, absent edges last.
pub fn edge_sort_key(edge: Option<f64>) -> f64 {
    edge.filter(|e| e.is_finite()).unwrap_or(UNDEFINED_EDGE)
}

// =============================================================================
// Tests
// =============================================================================
