//! Bookmaker odds parsing.
//!
//! api-sports nests prices as `response[].bookmakers[].bets[].values[]`,
//! with each value carrying a label ("Home", "1X", "Over 2.5") and a decimal
//! `odd`, usually as a string. Only the bets the selector understands are
//! kept; unknown bets, unparseable labels and odds <= 1.0 are skipped.

use serde::Deserialize;
use tracing::debug;

use super::models::{MarketQuote, Outcome, Sport};

#[derive(Debug, Deserialize)]
struct RawOddsEntry {
    #[serde(default)]
    bookmakers: Vec<RawBookmaker>,
}

#[derive(Debug, Deserialize)]
struct RawBookmaker {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    bets: Vec<RawBet>,
}

#[derive(Debug, Deserialize)]
struct RawBet {
    #[serde(default)]
    name: String,
    #[serde(default)]
    values: Vec<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    odd: serde_json::Value,
}

/// Odds arrive as "2.10" or 2.1.
fn parse_odd(raw: &serde_json::Value) -> Option<f64> {
    match raw {
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn label_text(raw: &serde_json::Value) -> Option<String> {
    match raw {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// "Over 2.5" -> Over(2.5)
fn parse_total(label: &str) -> Option<Outcome> {
    let (side, line) = label.split_once(' ')?;
    let line: f64 = line.trim().parse().ok()?;
    if !line.is_finite() || line < 0.0 {
        return None;
    }
    match side.to_ascii_lowercase().as_str() {
        "over" => Some(Outcome::Over(line)),
        "under" => Some(Outcome::Under(line)),
        _ => None,
    }
}

/// Map a (bet name, value label) pair onto an outcome.
pub fn outcome_for(sport: Sport, bet_name: &str, label: &str) -> Option<Outcome> {
    match (sport, bet_name) {
        (Sport::Football, "Match Winner") | (Sport::Baseball, "Home/Away" | "Moneyline") => {
            match label {
                "Home" | "1" => Some(Outcome::Home),
                "Draw" | "X" if sport == Sport::Football => Some(Outcome::Draw),
                "Away" | "2" => Some(Outcome::Away),
                _ => None,
            }
        }
        (Sport::Football, "Double Chance") => match label {
            "Home/Draw" | "1X" => Some(Outcome::HomeOrDraw),
            "Home/Away" | "12" => Some(Outcome::HomeOrAway),
            "Draw/Away" | "X2" => Some(Outcome::DrawOrAway),
            _ => None,
        },
        (Sport::Football, "Goals Over/Under") | (Sport::Baseball, "Over/Under") => {
            parse_total(label)
        }
        _ => None,
    }
}

fn bookmaker_quotes(sport: Sport, bookmaker: &RawBookmaker) -> Vec<MarketQuote> {
    bookmaker
        .bets
        .iter()
        .flat_map(|bet| {
            bet.values.iter().filter_map(move |v| {
                let label = label_text(&v.value)?;
                let outcome = outcome_for(sport, bet.name.trim(), &label)?;
                MarketQuote::new(outcome, parse_odd(&v.odd)?)
            })
        })
        .collect()
}

/// Extract quotes from an odds `response` array.
///
/// The preferred bookmaker's prices come first; any outcome it does not
/// price is filled from the remaining bookmakers in response order.
pub fn parse_quotes(
    sport: Sport,
    values: &[serde_json::Value],
    preferred_bookmaker: u32,
) -> Vec<MarketQuote> {
    let mut bookmakers: Vec<RawBookmaker> = values
        .iter()
        .filter_map(|v| serde_json::from_value::<RawOddsEntry>(v.clone()).ok())
        .flat_map(|entry| entry.bookmakers)
        .collect();

    // Stable: preferred first, others keep their order.
    bookmakers.sort_by_key(|b| b.id != Some(preferred_bookmaker));

    let mut quotes: Vec<MarketQuote> = Vec::new();
    for bookmaker in &bookmakers {
        for quote in bookmaker_quotes(sport, bookmaker) {
            if !quotes.iter().any(|q| q.outcome == quote.outcome) {
                quotes.push(quote);
            }
        }
    }

    debug!(
        %sport,
        bookmakers = bookmakers.len(),
        first = ?bookmakers.first().and_then(|b| b.name.as_deref()),
        quotes = quotes.len(),
        "Parsed odds"
    );
    quotes
}

// =============================================================================
// Tests
// =============================================================================
