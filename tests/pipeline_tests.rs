//! End-to-end tests of a daily run against an in-memory data source.
//!
//! Expected values carry their hand calculation. With neutral pitching
//! both sides rate 0.65*4.20 + 0.35*4.10 = 4.165, so the baseball model
//! gives p_home = 1.04 / 2.04 = 0.50980 and p_away = 0.49020, and an
//! expected total of 2 * 4.4 * 4.165 / 4.15 = 8.8318 runs.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use std::collections::HashMap;
use std::sync::Mutex;

use daily_picks::api::errors::ApiError;
use daily_picks::data::models::{Event, MarketQuote, ModelInputs, Outcome, Sport};
use daily_picks::data::source::SportsDataSource;
use daily_picks::delivery::{DeliveryError, Notifier};
use daily_picks::edge::converter::{self, EdgeLabel};
use daily_picks::edge::estimator::{EstimatorConfig, OutcomeEstimate};
use daily_picks::edge::ranker::{rank, RankerConfig};
use daily_picks::edge::selector::{select_candidates, Candidate, SelectorConfig};
use daily_picks::pipeline::{run, PipelineConfig, RunMode};
use daily_picks::report::renderer::{
    message_len, render_report, ReportConfig, FALLBACK_NOTICE, NO_VALUE_MESSAGE,
};
use daily_picks::storage::{PickStore, RunRecord, StorageError};

// =============================================================================
// Fakes
// =============================================================================

#[derive(Default)]
struct FakeSource {
    events: Vec<Event>,
    odds: HashMap<u64, Vec<MarketQuote>>,
    failing_sports: Vec<Sport>,
    failing_odds: Vec<u64>,
    failing_inputs: bool,
    requested: Mutex<Vec<(Sport, NaiveDate)>>,
}

impl FakeSource {
    fn with_event(mut self, event: Event, quotes: &[(Outcome, f64)]) -> Self {
        let quotes = quotes
            .iter()
            .filter_map(|&(o, d)| MarketQuote::new(o, d))
            .collect();
        self.odds.insert(event.id, quotes);
        self.events.push(event);
        self
    }
}

#[async_trait]
impl SportsDataSource for FakeSource {
    async fn fetch_events(&self, sport: Sport, date: NaiveDate) -> Result<Vec<Event>, ApiError> {
        self.requested.lock().unwrap().push((sport, date));
        if self.failing_sports.contains(&sport) {
            return Err(ApiError::Timeout("fixtures".to_string()));
        }
        Ok(self
            .events
            .iter()
            .filter(|e| e.sport == sport)
            .cloned()
            .collect())
    }

    async fn fetch_odds(&self, event: &Event) -> Result<Vec<MarketQuote>, ApiError> {
        if self.failing_odds.contains(&event.id) {
            return Err(ApiError::Http {
                status_code: 500,
                message: "upstream".to_string(),
            });
        }
        Ok(self.odds.get(&event.id).cloned().unwrap_or_default())
    }

    async fn fetch_model_inputs(&self, event: &Event) -> Result<ModelInputs, ApiError> {
        if self.failing_inputs {
            return Err(ApiError::Network("form".to_string()));
        }
        Ok(ModelInputs::neutral(event.sport))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail_first: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, destination: &str, message: &str) -> Result<(), DeliveryError> {
        let mut sent = self.sent.lock().unwrap();
        let first = sent.is_empty();
        sent.push((destination.to_string(), message.to_string()));
        if self.fail_first && first {
            return Err(DeliveryError::Rejected {
                status_code: 400,
                message: "message is too long".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
struct MemoryStore {
    records: Mutex<Vec<RunRecord>>,
}

impl PickStore for MemoryStore {
    fn append(&self, record: &RunRecord) -> Result<(), StorageError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn kickoff(hour: u32) -> DateTime<FixedOffset> {
    FixedOffset::west_opt(6 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 19, hour, 5, 0)
        .unwrap()
}

fn game(id: u64, home: &str, away: &str) -> Event {
    Event {
        id,
        sport: Sport::Baseball,
        league: "MLB".to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_team_id: None,
        away_team_id: None,
        starts_at: kickoff(18),
    }
}

fn fixture(id: u64, home: &str, away: &str) -> Event {
    Event {
        id,
        sport: Sport::Football,
        league: "Liga MX".to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_team_id: Some(id * 10),
        away_team_id: Some(id * 10 + 1),
        starts_at: kickoff(20),
    }
}

fn config() -> PipelineConfig {
    PipelineConfig {
        sports: vec![Sport::Football, Sport::Baseball],
        estimator: EstimatorConfig::default(),
        football_selector: SelectorConfig::football(),
        baseball_selector: SelectorConfig::baseball(),
        ranker: RankerConfig::default(),
        report: ReportConfig::default(),
        destination: "chat-1".to_string(),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

// =============================================================================
// Selector example
// =============================================================================

#[test]
fn test_moneyline_example_is_sole_candidate() {
    let event = Event {
        league: "Test League".to_string(),
        ..game(1, "Team A", "Team B")
    };
    let quotes = vec![MarketQuote::new(Outcome::Home, 2.10).unwrap()];
    let estimate = OutcomeEstimate::two_way(0.55, 0.45);

    let picks = select_candidates(&event, &quotes, &estimate, &SelectorConfig::baseball());
    assert_eq!(picks.len(), 1);

    let pick = &picks[0];
    assert_eq!(pick.outcome, Outcome::Home);
    // 1 / 2.10 = 0.47619
    assert!((pick.implied_probability().unwrap() - 0.476).abs() < 1e-3);
    // 0.55 * 2.10 - 1 = 0.155
    assert!((pick.edge().unwrap() - 0.155).abs() < 1e-9);
    assert_eq!(pick.label(), EdgeLabel::VeryStrong);
    assert_eq!(pick.american_odds().as_deref(), Some("+110"));
    assert_eq!(pick.description(), "Team A ML");
}

#[test]
fn test_undefined_edges_rank_last() {
    let event = game(1, "Team A", "Team B");
    let make = |outcome, decimal_odds| Candidate {
        event: event.clone(),
        outcome,
        decimal_odds,
        probability: 0.4,
        note: "test",
        expected_total: None,
    };
    // edges: home 0.4*2.0-1 = -0.20, away undefined, over 0.4*3.0-1 = +0.20
    let list = rank(
        vec![
            make(Outcome::Home, Some(2.0)),
            make(Outcome::Away, None),
            make(Outcome::Over(8.5), Some(3.0)),
        ],
        &RankerConfig::default(),
    );
    let order: Vec<Outcome> = list.picks.iter().map(|c| c.outcome).collect();
    assert_eq!(order, vec![Outcome::Over(8.5), Outcome::Home, Outcome::Away]);
    assert_eq!(converter::label(list.picks[2].edge()), EdgeLabel::NotAvailable);
    // Only one positive edge: no combo.
    assert!(list.combo.is_empty());
}

// =============================================================================
// Full runs
// =============================================================================

#[tokio::test]
async fn test_send_delivers_full_report() {
    let source = FakeSource::default()
        .with_event(game(1, "Yankees", "Dodgers"), &[(Outcome::Home, 2.10), (Outcome::Away, 1.80)])
        .with_event(game(2, "Cubs", "Mets"), &[(Outcome::Home, 2.30)]);
    let notifier = RecordingNotifier::default();
    let store = MemoryStore::default();

    let outcome = run(RunMode::Send, today(), &source, &notifier, Some(&store), &config()).await;

    // home 0.50980*2.10-1 = +0.0706, away 0.49020*1.80-1 = -0.1176
    // Cubs 0.50980*2.30-1 = +0.1725
    assert_eq!(outcome.picks.picks.len(), 2);
    assert_eq!(outcome.picks.picks[0].description(), "Cubs ML");
    assert_eq!(outcome.picks.picks[1].description(), "Yankees ML");
    assert_eq!(outcome.picks.combo.len(), 2);

    assert_eq!(outcome.messages.len(), 1);
    assert_eq!(outcome.delivered, 1);
    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "chat-1");

    let report = &sent[0].1;
    assert!(report.starts_with("📊 Daily Picks – 2026-10-19"));
    assert!(report.contains("#1 ⚾ Baseball · MLB"));
    assert!(report.contains("🕒 19/10 18:05"));
    assert!(report.contains("🎯 Yankees ML"));
    assert!(report.contains("💰 Odds: 2.10 (+110)"));
    assert!(report.contains("📈 Edge: +7.1% (strong)"));
    assert!(report.contains("📈 Edge: +17.3% (very strong)"));
    assert!(report.contains("exp. runs 8.8"));
    // 2.30 * 2.10 = 4.83
    assert!(report.contains("Combined odds: 4.83"));

    assert!(outcome.persisted);
    let records = store.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].run_id, outcome.run_id);
    assert_eq!(records[0].mode, "send");
    assert_eq!(records[0].picks.len(), 2);
}

#[tokio::test]
async fn test_no_events_reports_no_value() {
    let source = FakeSource::default();
    let notifier = RecordingNotifier::default();

    let outcome = run(RunMode::Send, today(), &source, &notifier, None, &config()).await;

    assert!(outcome.picks.is_empty());
    assert!(!outcome.persisted);
    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains(NO_VALUE_MESSAGE));
    assert!(sent[0].1.contains(FALLBACK_NOTICE));
}

#[tokio::test]
async fn test_fallback_disabled_omits_notice() {
    let source = FakeSource::default();
    let notifier = RecordingNotifier::default();
    let mut cfg = config();
    cfg.ranker.fallback_if_no_value = false;

    run(RunMode::Send, today(), &source, &notifier, None, &cfg).await;

    let sent = notifier.sent.lock().unwrap();
    assert!(sent[0].1.contains(NO_VALUE_MESSAGE));
    assert!(!sent[0].1.contains(FALLBACK_NOTICE));
}

#[tokio::test]
async fn test_odds_failure_only_drops_its_event() {
    let mut source = FakeSource::default()
        .with_event(fixture(1, "América", "Chivas"), &[(Outcome::Home, 2.00)])
        .with_event(fixture(2, "Tigres", "Monterrey"), &[(Outcome::Home, 2.00)]);
    source.failing_odds.push(1);
    let notifier = RecordingNotifier::default();

    let outcome = run(RunMode::Send, today(), &source, &notifier, None, &config()).await;

    // Neutral form: p_home = 0.58097, edge = 0.58097*2.00-1 = +0.1619
    assert_eq!(outcome.picks.picks.len(), 1);
    let pick = &outcome.picks.picks[0];
    assert_eq!(pick.event.id, 2);
    assert_eq!(pick.description(), "1X2 – Tigres to win");
    assert_eq!(pick.label(), EdgeLabel::VeryStrong);
    assert_eq!(outcome.delivered, 1);
}

#[tokio::test]
async fn test_event_failure_for_one_sport_keeps_the_other() {
    let mut source = FakeSource::default()
        .with_event(fixture(1, "América", "Chivas"), &[(Outcome::Home, 2.00)])
        .with_event(game(2, "Yankees", "Dodgers"), &[(Outcome::Home, 2.10)]);
    source.failing_sports.push(Sport::Football);
    let notifier = RecordingNotifier::default();

    let outcome = run(RunMode::Send, today(), &source, &notifier, None, &config()).await;

    assert_eq!(outcome.picks.picks.len(), 1);
    assert_eq!(outcome.picks.picks[0].sport(), Sport::Baseball);
    let requested = source.requested.lock().unwrap();
    assert_eq!(requested.len(), 2);
}

#[tokio::test]
async fn test_inputs_failure_uses_neutral_model() {
    let mut source =
        FakeSource::default().with_event(game(1, "Yankees", "Dodgers"), &[(Outcome::Home, 2.10)]);
    source.failing_inputs = true;
    let notifier = RecordingNotifier::default();

    let outcome = run(RunMode::Send, today(), &source, &notifier, None, &config()).await;

    assert_eq!(outcome.picks.picks.len(), 1);
    assert!((outcome.picks.picks[0].probability - 1.04 / 2.04).abs() < 1e-9);
}

#[tokio::test]
async fn test_per_event_cap_keeps_best_edges() {
    let quotes = [
        (Outcome::Home, 2.10),
        (Outcome::Away, 1.80),
        (Outcome::Over(8.5), 2.00),
        (Outcome::Under(8.5), 1.90),
    ];
    // over 8.5: p = 0.5 + 0.08*(8.8318-8.5) = 0.52654, edge = +0.0531
    // under 8.5: p = 0.47346, edge = 0.47346*1.90-1 = -0.1004
    let source = FakeSource::default().with_event(game(1, "Yankees", "Dodgers"), &quotes);
    let notifier = RecordingNotifier::default();

    let outcome = run(RunMode::Send, today(), &source, &notifier, None, &config()).await;
    let picks: Vec<Outcome> = outcome.picks.picks.iter().map(|c| c.outcome).collect();
    assert_eq!(picks, vec![Outcome::Home, Outcome::Over(8.5)]);

    let mut cfg = config();
    cfg.baseball_selector.per_event_cap = 1;
    let outcome = run(RunMode::Send, today(), &source, &notifier, None, &cfg).await;
    let picks: Vec<Outcome> = outcome.picks.picks.iter().map(|c| c.outcome).collect();
    assert_eq!(picks, vec![Outcome::Home]);
}

#[tokio::test]
async fn test_preview_targets_next_day_with_summary() {
    let source =
        FakeSource::default().with_event(game(1, "Yankees", "Dodgers"), &[(Outcome::Home, 2.10)]);
    let notifier = RecordingNotifier::default();
    let store = MemoryStore::default();

    let outcome = run(
        RunMode::PreviewNextPeriod,
        today(),
        &source,
        &notifier,
        Some(&store),
        &config(),
    )
    .await;

    let tomorrow = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
    assert_eq!(outcome.period, tomorrow);
    assert!(source
        .requested
        .lock()
        .unwrap()
        .iter()
        .all(|(_, d)| *d == tomorrow));

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let summary = &sent[0].1;
    assert!(summary.starts_with("📊 Daily Picks – 2026-10-20 – Preview"));
    assert!(summary.contains("✅ 1 pick with a price"));
    assert!(summary.contains("⭐ Top: Yankees vs Dodgers – Yankees ML @ 2.10 (+110)"));
    assert!(!summary.contains("🏟️"));

    let records = store.records.lock().unwrap();
    assert_eq!(records[0].mode, "preview-next-period");
    assert_eq!(records[0].run_date, tomorrow);
}

#[tokio::test]
async fn test_recheck_summary_without_picks() {
    let source = FakeSource::default();
    let notifier = RecordingNotifier::default();

    let outcome = run(
        RunMode::RecheckCurrentPeriod,
        today(),
        &source,
        &notifier,
        None,
        &config(),
    )
    .await;

    assert_eq!(outcome.period, today());
    let sent = notifier.sent.lock().unwrap();
    assert!(sent[0].1.starts_with("📊 Daily Picks – 2026-10-19 – Recheck"));
    assert!(sent[0].1.contains(NO_VALUE_MESSAGE));
}

#[tokio::test]
async fn test_long_report_is_chunked_losslessly() {
    let mut source = FakeSource::default();
    for id in 1..=6 {
        source = source.with_event(
            game(id, &format!("Home {id}"), &format!("Away {id}")),
            &[(Outcome::Home, 2.0 + id as f64 * 0.05)],
        );
    }
    let notifier = RecordingNotifier::default();
    let mut cfg = config();
    cfg.report.chunk_limit = 300;

    let outcome = run(RunMode::Send, today(), &source, &notifier, None, &cfg).await;

    assert_eq!(outcome.picks.picks.len(), 6);
    assert!(outcome.messages.len() > 1);
    assert!(outcome.messages.iter().all(|m| message_len(m) <= 300));
    assert_eq!(
        outcome.messages.concat(),
        render_report(&outcome.picks, outcome.period, &cfg.report)
    );

    let sent = notifier.sent.lock().unwrap();
    let delivered: Vec<&String> = sent.iter().map(|(_, m)| m).collect();
    assert_eq!(delivered, outcome.messages.iter().collect::<Vec<_>>());
}

#[tokio::test]
async fn test_delivery_failure_does_not_stop_the_run() {
    let mut source = FakeSource::default();
    for id in 1..=6 {
        source = source.with_event(
            game(id, &format!("Home {id}"), &format!("Away {id}")),
            &[(Outcome::Home, 2.20)],
        );
    }
    let notifier = RecordingNotifier {
        fail_first: true,
        ..RecordingNotifier::default()
    };
    let store = MemoryStore::default();
    let mut cfg = config();
    cfg.report.chunk_limit = 300;

    let outcome = run(RunMode::Send, today(), &source, &notifier, Some(&store), &cfg).await;

    let chunks = outcome.messages.len();
    assert!(chunks > 1);
    assert_eq!(notifier.sent.lock().unwrap().len(), chunks);
    assert_eq!(outcome.delivered, chunks - 1);
    assert!(outcome.persisted);
}
