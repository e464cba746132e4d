//! Per-event candidate selection.
//!
//! For each market category, in priority order, every priced outcome the
//! model covers becomes a candidate and only the best edge survives. Totals
//! pick the better side per line, then the best line. The category winners
//! are then capped per event.

use serde::Serialize;
use tracing::debug;

use super::converter::{self, edge_sort_key, EdgeLabel};
use super::estimator::OutcomeEstimate;
use crate::data::models::{find_quote, Event, MarketCategory, MarketQuote, Outcome, Sport};

const WINNER_NOTE: &str = "best price on the match result";
const HEDGE_NOTE: &str = "hedge/consistency pick";
const TOTALS_NOTE: &str = "based on expected scoring";

/// Selection rules for one sport.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorConfig {
    /// Categories evaluated, in priority order.
    pub categories: Vec<MarketCategory>,
    pub total_lines: Vec<f64>,
    pub per_event_cap: usize,
}

impl SelectorConfig {
    pub fn football() -> Self {
        Self {
            categories: vec![
                MarketCategory::Winner,
                MarketCategory::DoubleChance,
                MarketCategory::Totals,
            ],
            total_lines: vec![2.5, 3.0],
            per_event_cap: 3,
        }
    }

    pub fn baseball() -> Self {
        Self {
            categories: vec![MarketCategory::Winner, MarketCategory::Totals],
            total_lines: vec![7.5, 8.5, 9.0],
            per_event_cap: 2,
        }
    }
}

/// One concrete suggested bet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub event: Event,
    pub outcome: Outcome,
    pub decimal_odds: Option<f64>,
    pub probability: f64,
    pub note: &'static str,
    /// Expected goals or runs, when the model produced one.
    pub expected_total: Option<f64>,
}

impl Candidate {
    pub fn sport(&self) -> Sport {
        self.event.sport
    }

    pub fn category(&self) -> MarketCategory {
        self.outcome.category()
    }

    /// Recomputed on every call so it always reflects the current odds.
    pub fn edge(&self) -> Option<f64> {
        converter::edge(Some(self.probability), self.decimal_odds)
    }

    pub fn label(&self) -> EdgeLabel {
        converter::label(self.edge())
    }

    pub fn american_odds(&self) -> Option<String> {
        self.decimal_odds.and_then(converter::to_american)
    }

    pub fn implied_probability(&self) -> Option<f64> {
        self.decimal_odds.and_then(converter::implied_probability)
    }

    /// Human-readable pick, e.g. "Arsenal to win" or "Over 8.5 runs".
    pub fn description(&self) -> String {
        let units = match self.event.sport {
            Sport::Football => "goals",
            Sport::Baseball => "runs",
        };
        match (self.outcome, self.event.sport) {
            (Outcome::Home, Sport::Baseball) => format!("{} ML", self.event.home_team),
            (Outcome::Away, Sport::Baseball) => format!("{} ML", self.event.away_team),
            (Outcome::Home, _) => format!("1X2 – {} to win", self.event.home_team),
            (Outcome::Away, _) => format!("1X2 – {} to win", self.event.away_team),
            (Outcome::Draw, _) => "1X2 – Draw".to_string(),
            (dc @ (Outcome::HomeOrDraw | Outcome::HomeOrAway | Outcome::DrawOrAway), _) => {
                format!("Double chance – {dc}")
            }
            (total @ (Outcome::Over(_) | Outcome::Under(_)), _) => format!("{total} {units}"),
        }
    }
}

/// Stable sort, best edge first, undefined edges last.
pub fn sort_by_edge(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| edge_sort_key(b.edge()).total_cmp(&edge_sort_key(a.edge())));
}

/// Highest edge wins; on a tie the earliest candidate is kept.
fn best(candidates: impl IntoIterator<Item = Candidate>) -> Option<Candidate> {
    candidates.into_iter().fold(None, |best, c| match best {
        Some(b) if edge_sort_key(c.edge()) <= edge_sort_key(b.edge()) => Some(b),
        _ => Some(c),
    })
}

fn candidate(
    event: &Event,
    quotes: &[MarketQuote],
    estimate: &OutcomeEstimate,
    outcome: Outcome,
    note: &'static str,
) -> Option<Candidate> {
    let decimal_odds = find_quote(quotes, outcome)?;
    let probability = estimate.probability(outcome)?;
    Some(Candidate {
        event: event.clone(),
        outcome,
        decimal_odds: Some(decimal_odds),
        probability,
        note,
        expected_total: estimate.expected_total(),
    })
}

fn category_winner(
    event: &Event,
    quotes: &[MarketQuote],
    estimate: &OutcomeEstimate,
    category: MarketCategory,
    config: &SelectorConfig,
) -> Option<Candidate> {
    let pick = |outcome, note| candidate(event, quotes, estimate, outcome, note);
    match category {
        MarketCategory::Winner => best(
            [Outcome::Home, Outcome::Draw, Outcome::Away]
                .into_iter()
                .filter_map(|o| pick(o, WINNER_NOTE)),
        ),
        MarketCategory::DoubleChance => best(
            [Outcome::HomeOrDraw, Outcome::HomeOrAway, Outcome::DrawOrAway]
                .into_iter()
                .filter_map(|o| pick(o, HEDGE_NOTE)),
        ),
        MarketCategory::Totals => best(config.total_lines.iter().filter_map(|&line| {
            best(
                [Outcome::Over(line), Outcome::Under(line)]
                    .into_iter()
                    .filter_map(|o| pick(o, TOTALS_NOTE)),
            )
        })),
    }
}

/// Pick at most `per_event_cap` candidates for one event.
///
/// Category winners are gathered in priority order, then ordered by edge
/// (priority breaks ties) before the cap applies, so the cap always keeps
/// the strongest winners.
pub fn select_candidates(
    event: &Event,
    quotes: &[MarketQuote],
    estimate: &OutcomeEstimate,
    config: &SelectorConfig,
) -> Vec<Candidate> {
    if quotes.is_empty() {
        return Vec::new();
    }

    let mut winners: Vec<Candidate> = config
        .categories
        .iter()
        .filter_map(|&category| category_winner(event, quotes, estimate, category, config))
        .collect();

    let found = winners.len();
    sort_by_edge(&mut winners);
    winners.truncate(config.per_event_cap);

    debug!(
        event_id = event.id,
        matchup = %event.matchup(),
        quotes = quotes.len(),
        category_winners = found,
        kept = winners.len(),
        "Selected candidates"
    );

    winners
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::estimator::TotalsModel;
    use chrono::{FixedOffset, TimeZone};

    fn make_event() -> Event {
        Event {
            id: 1,
            sport: Sport::Football,
            league: "Test League".to_string(),
            home_team: "Team A".to_string(),
            away_team: "Team B".to_string(),
            home_team_id: None,
            away_team_id: None,
            starts_at: FixedOffset::west_opt(6 * 3600)
                .unwrap()
                .with_ymd_and_hms(2026, 10, 19, 13, 0, 0)
                .unwrap(),
        }
    }

    fn q(outcome: Outcome, odds: f64) -> MarketQuote {
        MarketQuote::new(outcome, odds).unwrap()
    }

    fn full_estimate() -> OutcomeEstimate {
        OutcomeEstimate {
            home: 0.50,
            draw: Some(0.25),
            away: 0.25,
            hedge: Some(crate::edge::estimator::HedgeProbabilities {
                home_or_draw: 0.73,
                home_or_away: 0.74,
                draw_or_away: 0.48,
            }),
            totals: Some(TotalsModel {
                expected: 2.95,
                slope: 0.18,
                band: (0.05, 0.90),
            }),
        }
    }

    #[test]
    fn test_single_moneyline_candidate() {
        let event = make_event();
        let quotes = vec![q(Outcome::Home, 2.10)];
        let estimate = OutcomeEstimate::two_way(0.55, 0.45);
        let picks = select_candidates(&event, &quotes, &estimate, &SelectorConfig::football());

        assert_eq!(picks.len(), 1);
        let pick = &picks[0];
        // 0.55 * 2.10 - 1 = 0.155
        assert!((pick.edge().unwrap() - 0.155).abs() < 1e-9);
        assert_eq!(pick.label(), EdgeLabel::VeryStrong);
        assert_eq!(pick.american_odds().as_deref(), Some("+110"));
        assert!((pick.implied_probability().unwrap() - 0.476).abs() < 1e-3);
        assert_eq!(pick.note, WINNER_NOTE);
    }

    #[test]
    fn test_no_quotes_no_candidates() {
        let picks = select_candidates(
            &make_event(),
            &[],
            &full_estimate(),
            &SelectorConfig::football(),
        );
        assert!(picks.is_empty());
    }

    #[test]
    fn test_best_per_category() {
        let event = make_event();
        let quotes = vec![
            // edges: 0.50*2.0-1 = 0.00, 0.25*3.6-1 = -0.10, 0.25*4.4-1 = 0.10
            q(Outcome::Home, 2.0),
            q(Outcome::Draw, 3.6),
            q(Outcome::Away, 4.4),
            // 0.73*1.3-1 = -0.051, 0.74*1.4-1 = 0.036, 0.48*2.0-1 = -0.04
            q(Outcome::HomeOrDraw, 1.3),
            q(Outcome::HomeOrAway, 1.4),
            q(Outcome::DrawOrAway, 2.0),
        ];
        let picks = select_candidates(&event, &quotes, &full_estimate(), &SelectorConfig::football());
        assert_eq!(picks.len(), 2);
        assert_eq!(picks[0].outcome, Outcome::Away);
        assert_eq!(picks[1].outcome, Outcome::HomeOrAway);
        assert_eq!(picks[1].note, HEDGE_NOTE);
    }

    #[test]
    fn test_totals_best_side_then_best_line() {
        let event = make_event();
        // expected 2.95: p_over(2.5)=0.581, p_under(2.5)=0.419
        //                p_over(3.0)=0.491, p_under(3.0)=0.509
        let quotes = vec![
            q(Outcome::Over(2.5), 1.80),  // 0.0458
            q(Outcome::Under(2.5), 2.10), // -0.1201
            q(Outcome::Over(3.0), 2.00),  // -0.018
            q(Outcome::Under(3.0), 2.10), // 0.0689
        ];
        let mut config = SelectorConfig::football();
        config.categories = vec![MarketCategory::Totals];
        let picks = select_candidates(&event, &quotes, &full_estimate(), &config);
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].outcome, Outcome::Under(3.0));
        assert_eq!(picks[0].note, TOTALS_NOTE);
        assert_eq!(picks[0].expected_total, Some(2.95));
        assert_eq!(picks[0].description(), "Under 3 goals");
    }

    #[test]
    fn test_per_event_cap_keeps_highest_edges() {
        let event = make_event();
        let quotes = vec![
            q(Outcome::Home, 1.9),         // 0.50*1.9-1 = -0.05
            q(Outcome::HomeOrAway, 1.5),   // 0.74*1.5-1 = 0.11
            q(Outcome::Over(2.5), 1.85),   // 0.581*1.85-1 = 0.0749
        ];
        let mut config = SelectorConfig::football();
        config.per_event_cap = 2;
        let picks = select_candidates(&event, &quotes, &full_estimate(), &config);
        assert_eq!(picks.len(), 2);
        assert_eq!(picks[0].outcome, Outcome::HomeOrAway);
        assert_eq!(picks[1].outcome, Outcome::Over(2.5));
    }

    #[test]
    fn test_unmodelled_outcome_skipped() {
        let event = make_event();
        let quotes = vec![q(Outcome::Draw, 3.2), q(Outcome::HomeOrDraw, 1.2)];
        let estimate = OutcomeEstimate::two_way(0.5, 0.5);
        let picks = select_candidates(&event, &quotes, &estimate, &SelectorConfig::football());
        assert!(picks.is_empty());
    }

    #[test]
    fn test_sort_by_edge_undefined_last() {
        let event = make_event();
        let make = |odds: Option<f64>, p: f64| Candidate {
            event: event.clone(),
            outcome: Outcome::Home,
            decimal_odds: odds,
            probability: p,
            note: WINNER_NOTE,
            expected_total: None,
        };
        let mut list = vec![
            make(None, 0.9),
            make(Some(1.5), 0.5),
            make(None, 0.1),
            make(Some(3.0), 0.5),
            make(Some(1.1), 0.5),
        ];
        sort_by_edge(&mut list);
        let edges: Vec<Option<f64>> = list.iter().map(|c| c.edge()).collect();
        assert!(edges[..3].iter().all(|e| e.is_some()));
        assert!(edges[3..].iter().all(|e| e.is_none()));
        assert!(edges[0] > edges[1] && edges[1] > edges[2]);
        // Stable among undefined edges.
        assert_eq!(list[3].probability, 0.9);
        assert_eq!(list[4].probability, 0.1);
    }

    #[test]
    fn test_descriptions() {
        let event = make_event();
        let make = |outcome| Candidate {
            event: event.clone(),
            outcome,
            decimal_odds: Some(2.0),
            probability: 0.5,
            note: WINNER_NOTE,
            expected_total: None,
        };
        assert_eq!(make(Outcome::Home).description(), "1X2 – Team A to win");
        assert_eq!(make(Outcome::Draw).description(), "1X2 – Draw");
        assert_eq!(make(Outcome::DrawOrAway).description(), "Double chance – X2");

        let mut ml = make(Outcome::Away);
        ml.event.sport = Sport::Baseball;
        assert_eq!(ml.description(), "Team B ML");
        ml.outcome = Outcome::Over(8.5);
        assert_eq!(ml.description(), "Over 8.5 runs");
    }
}
