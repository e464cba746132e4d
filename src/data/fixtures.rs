//! Fixture and game parsing.
//!
//! Converts provider `response` entries into [`Event`]s. Every record is
//! checked on its own: a missing id, team name, league or date drops that
//! record only. Start times are shifted into the reporting offset here so
//! nothing downstream sees UTC.
//!
//! The provider's `date=` filter is a UTC date, while a report covers one
//! local day. A local day can span two UTC dates, so both are fetched and
//! the events are then cut back to the local day.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::debug;

use super::models::{Event, Sport, TeamForm};

const SECONDS_PER_DAY: i64 = 86_400;

// =============================================================================
// api-sports response types
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawFixture {
    #[serde(default)]
    fixture: Option<RawFixtureInfo>,
    #[serde(default)]
    league: Option<RawLeague>,
    #[serde(default)]
    teams: Option<RawTeams>,
    #[serde(default)]
    goals: Option<RawGoals>,
}

#[derive(Debug, Deserialize)]
struct RawFixtureInfo {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    date: Option<String>,
}

/// Baseball games keep id and date at the top level.
#[derive(Debug, Deserialize)]
struct RawGame {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    league: Option<RawLeague>,
    #[serde(default)]
    teams: Option<RawTeams>,
}

#[derive(Debug, Deserialize)]
struct RawLeague {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTeams {
    #[serde(default)]
    home: Option<RawTeam>,
    #[serde(default)]
    away: Option<RawTeam>,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGoals {
    #[serde(default)]
    home: Option<u32>,
    #[serde(default)]
    away: Option<u32>,
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse an ISO-8601 instant and shift it into the reporting offset.
pub fn localize(iso: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(iso)
        .ok()
        .map(|dt| dt.with_timezone(&offset))
}

/// UTC dates overlapped by the local day `period` at `offset`, in order.
pub fn provider_dates(period: NaiveDate, offset: FixedOffset) -> Vec<NaiveDate> {
    let Some(start) = offset
        .from_local_datetime(&period.and_time(NaiveTime::MIN))
        .single()
    else {
        return vec![period];
    };
    let first = start.with_timezone(&Utc).date_naive();
    let last = (start + Duration::seconds(SECONDS_PER_DAY - 1))
        .with_timezone(&Utc)
        .date_naive();

    if last == first {
        vec![first]
    } else {
        vec![first, last]
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

struct Parts {
    id: Option<u64>,
    date: Option<String>,
    league: Option<RawLeague>,
    teams: Option<RawTeams>,
}

fn build_event(sport: Sport, parts: Parts, offset: FixedOffset) -> Option<Event> {
    let teams = parts.teams?;
    let home = teams.home?;
    let away = teams.away?;
    Some(Event {
        id: parts.id?,
        sport,
        league: non_empty(parts.league?.name)?,
        home_team: non_empty(home.name)?,
        away_team: non_empty(away.name)?,
        home_team_id: home.id,
        away_team_id: away.id,
        starts_at: localize(parts.date.as_deref()?, offset)?,
    })
}

pub fn parse_fixture(value: &serde_json::Value, offset: FixedOffset) -> Option<Event> {
    let raw: RawFixture = serde_json::from_value(value.clone()).ok()?;
    let info = raw.fixture?;
    build_event(
        Sport::Football,
        Parts {
            id: info.id,
            date: info.date,
            league: raw.league,
            teams: raw.teams,
        },
        offset,
    )
}

pub fn parse_game(value: &serde_json::Value, offset: FixedOffset) -> Option<Event> {
    let raw: RawGame = serde_json::from_value(value.clone()).ok()?;
    build_event(
        Sport::Baseball,
        Parts {
            id: raw.id,
            date: raw.date,
            league: raw.league,
            teams: raw.teams,
        },
        offset,
    )
}

/// Parse a provider listing, keeping only allow-listed competitions that
/// start on the local day `period`.
pub fn parse_events(
    sport: Sport,
    values: &[serde_json::Value],
    leagues: &[String],
    offset: FixedOffset,
    period: NaiveDate,
) -> Vec<Event> {
    let mut malformed = 0usize;
    let mut filtered = 0usize;
    let mut other_day = 0usize;
    let mut events: Vec<Event> = Vec::new();

    for value in values {
        let parsed = match sport {
            Sport::Football => parse_fixture(value, offset),
            Sport::Baseball => parse_game(value, offset),
        };
        match parsed {
            Some(event) if !leagues.iter().any(|l| l == &event.league) => filtered += 1,
            Some(event) if event.starts_at.date_naive() != period => other_day += 1,
            Some(event) if events.iter().any(|e| e.id == event.id) => {}
            Some(event) => events.push(event),
            None => malformed += 1,
        }
    }

    debug!(
        %sport,
        total = values.len(),
        kept = events.len(),
        filtered,
        other_day,
        malformed,
        "Parsed events"
    );
    events
}

/// Goals-for and goals-against per match over a team's recent fixtures.
///
/// Fixtures without a final score are ignored. No usable fixture means an
/// empty form, which the estimator replaces with its defaults.
pub fn parse_team_form(values: &[serde_json::Value], team_id: u64) -> TeamForm {
    let mut played = 0u32;
    let mut scored = 0u32;
    let mut conceded = 0u32;

    for value in values {
        let Ok(raw) = serde_json::from_value::<RawFixture>(value.clone()) else {
            continue;
        };
        let (Some(teams), Some(goals)) = (raw.teams, raw.goals) else {
            continue;
        };
        let (Some(home_goals), Some(away_goals)) = (goals.home, goals.away) else {
            continue;
        };
        let home_id = teams.home.and_then(|t| t.id);
        let away_id = teams.away.and_then(|t| t.id);

        let (gf, ga) = if home_id == Some(team_id) {
            (home_goals, away_goals)
        } else if away_id == Some(team_id) {
            (away_goals, home_goals)
        } else {
            continue;
        };
        played += 1;
        scored += gf;
        conceded += ga;
    }

    if played == 0 {
        return TeamForm::default();
    }
    TeamForm {
        xg_recent: None,
        goals_for: Some(scored as f64 / played as f64),
        goals_against: Some(conceded as f64 / played as f64),
    }
}

// =============================================================================
// Tests
// =============================================================================
