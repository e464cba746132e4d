//! One run of the daily picks job.
//!
//! fetch events -> per event: odds + model inputs -> estimate -> select
//! -> rank across sports -> render -> deliver -> audit.
//!
//! Every external call is awaited in turn. A failed fetch only removes its
//! own events or candidates from the run; delivery and audit failures are
//! logged and the run still completes.

use chrono::{Days, NaiveDate};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::data::models::{ModelInputs, Sport};
use crate::data::source::SportsDataSource;
use crate::delivery::Notifier;
use crate::edge::estimator::{estimate, EstimatorConfig};
use crate::edge::ranker::{rank, PickList, RankerConfig};
use crate::edge::selector::{select_candidates, Candidate, SelectorConfig};
use crate::report::renderer::{render_report, render_summary, split_message, ReportConfig};
use crate::storage::{PickStore, RunRecord};

// =============================================================================
// Run mode
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Full pipeline for today, full report delivered.
    Send,
    /// Tomorrow's picks, short summary delivered.
    PreviewNextPeriod,
    /// Today's picks recomputed, short summary delivered.
    RecheckCurrentPeriod,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "send" => Ok(Self::Send),
            "preview-next-period" => Ok(Self::PreviewNextPeriod),
            "recheck-current-period" => Ok(Self::RecheckCurrentPeriod),
            _ => Err(format!(
                "Invalid mode: {s} (expected send, preview-next-period or recheck-current-period)"
            )),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send => write!(f, "send"),
            Self::PreviewNextPeriod => write!(f, "preview-next-period"),
            Self::RecheckCurrentPeriod => write!(f, "recheck-current-period"),
        }
    }
}

impl RunMode {
    /// The day this mode reports on.
    pub fn period(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::PreviewNextPeriod => today.checked_add_days(Days::new(1)).unwrap_or(today),
            Self::Send | Self::RecheckCurrentPeriod => today,
        }
    }

    fn summary_heading(&self) -> Option<&'static str> {
        match self {
            Self::Send => None,
            Self::PreviewNextPeriod => Some("Preview"),
            Self::RecheckCurrentPeriod => Some("Recheck"),
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sports processed, in this order.
    pub sports: Vec<Sport>,
    pub estimator: EstimatorConfig,
    pub football_selector: SelectorConfig,
    pub baseball_selector: SelectorConfig,
    pub ranker: RankerConfig,
    pub report: ReportConfig,
    pub destination: String,
}

impl PipelineConfig {
    fn selector(&self, sport: Sport) -> &SelectorConfig {
        match sport {
            Sport::Football => &self.football_selector,
            Sport::Baseball => &self.baseball_selector,
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub mode: RunMode,
    pub period: NaiveDate,
    pub picks: PickList,
    pub messages: Vec<String>,
    pub delivered: usize,
    pub persisted: bool,
}

// =============================================================================
// Stages
// =============================================================================

/// Candidates for every event of one sport.
pub async fn collect_candidates(
    source: &dyn SportsDataSource,
    sport: Sport,
    period: NaiveDate,
    config: &PipelineConfig,
) -> Vec<Candidate> {
    let events = match source.fetch_events(sport, period).await {
        Ok(events) => events,
        Err(e) => {
            warn!(%sport, %period, error = %e, "Event fetch failed, no events for this sport");
            return Vec::new();
        }
    };
    info!(%sport, %period, events = events.len(), "Events loaded");

    let selector = config.selector(sport);
    let mut candidates = Vec::new();

    for event in &events {
        let quotes = match source.fetch_odds(event).await {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(event_id = event.id, matchup = %event.matchup(), error = %e, "Odds fetch failed");
                continue;
            }
        };
        if quotes.is_empty() {
            debug!(event_id = event.id, matchup = %event.matchup(), "No usable odds");
            continue;
        }

        let inputs = match source.fetch_model_inputs(event).await {
            Ok(inputs) => inputs,
            Err(e) => {
                warn!(event_id = event.id, error = %e, "Model inputs unavailable, using defaults");
                ModelInputs::neutral(sport)
            }
        };

        let estimate = estimate(&inputs, &config.estimator);
        candidates.extend(select_candidates(event, &quotes, &estimate, selector));
    }

    candidates
}

/// Deliver each chunk in order. Returns how many were accepted.
pub async fn deliver(notifier: &dyn Notifier, destination: &str, messages: &[String]) -> usize {
    let mut delivered = 0;
    for (i, message) in messages.iter().enumerate() {
        match notifier.send(destination, message).await {
            Ok(()) => delivered += 1,
            Err(e) => warn!(
                notifier = notifier.name(),
                chunk = i + 1,
                chunks = messages.len(),
                error = %e,
                "Delivery failed"
            ),
        }
    }
    delivered
}

/// Run the whole job once.
pub async fn run(
    mode: RunMode,
    today: NaiveDate,
    source: &dyn SportsDataSource,
    notifier: &dyn Notifier,
    store: Option<&dyn PickStore>,
    config: &PipelineConfig,
) -> RunOutcome {
    let run_id = Uuid::new_v4();
    let period = mode.period(today);
    info!(%run_id, %mode, %period, sports = ?config.sports, "Run started");

    let mut candidates = Vec::new();
    for &sport in &config.sports {
        candidates.extend(collect_candidates(source, sport, period, config).await);
    }

    let picks = rank(candidates, &config.ranker);

    let text = match mode.summary_heading() {
        None => render_report(&picks, period, &config.report),
        Some(heading) => render_summary(&picks, period, heading, &config.report),
    };
    let messages = split_message(&text, config.report.chunk_limit);

    let delivered = deliver(notifier, &config.destination, &messages).await;

    let persisted = match store {
        Some(store) => match store.append(&RunRecord::new(run_id, &mode.to_string(), period, &picks)) {
            Ok(()) => true,
            Err(e) => {
                warn!(%run_id, error = %e, "Audit log write failed");
                false
            }
        },
        None => false,
    };

    info!(
        %run_id,
        picks = picks.picks.len(),
        chunks = messages.len(),
        delivered,
        persisted,
        "Run complete"
    );

    RunOutcome {
        run_id,
        mode,
        period,
        picks,
        messages,
        delivered,
        persisted,
    }
}
