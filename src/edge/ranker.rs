//! Daily ranking across every event and sport.

use tracing::info;

use super::selector::{sort_by_edge, Candidate};

#[derive(Debug, Clone, PartialEq)]
pub struct RankerConfig {
    pub max_picks_per_day: usize,
    /// Only changes the empty-report wording; never invents picks.
    pub fallback_if_no_value: bool,
    /// Upper bound on combo legs. A combo needs at least two.
    pub combo_max_legs: usize,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            max_picks_per_day: 10,
            fallback_if_no_value: true,
            combo_max_legs: COMBO_MAX_LEGS,
        }
    }
}

pub const COMBO_MIN_LEGS: usize = 2;

/// Largest combo the report supports.
pub const COMBO_MAX_LEGS: usize = 3;

/// Final ranked output of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickList {
    pub picks: Vec<Candidate>,
    pub combo: Vec<Candidate>,
    /// Set when nothing survived and the fallback notice should be shown.
    pub fallback_notice: bool,
}

impl PickList {
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn best(&self) -> Option<&Candidate> {
        self.picks.first()
    }
}

/// First few positive-edge picks in ranked order; empty unless at least
/// [`COMBO_MIN_LEGS`] qualify.
pub fn build_combo(ranked: &[Candidate], max_legs: usize) -> Vec<Candidate> {
    let legs: Vec<Candidate> = ranked
        .iter()
        .filter(|c| c.edge().is_some_and(|e| e > 0.0))
        .take(max_legs)
        .cloned()
        .collect();

    if legs.len() >= COMBO_MIN_LEGS {
        legs
    } else {
        Vec::new()
    }
}

pub fn rank(candidates: Vec<Candidate>, config: &RankerConfig) -> PickList {
    let mut picks = candidates;
    let total = picks.len();
    sort_by_edge(&mut picks);
    picks.truncate(config.max_picks_per_day);

    let combo = build_combo(&picks, config.combo_max_legs);
    let fallback_notice = picks.is_empty() && config.fallback_if_no_value;

    info!(
        candidates = total,
        picks = picks.len(),
        combo_legs = combo.len(),
        fallback_notice,
        "Ranked daily picks"
    );

    PickList {
        picks,
        combo,
        fallback_notice,
    }
}

// =============================================================================
// Tests
// =============================================================================
