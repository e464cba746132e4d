//! Sports data collaborator.
//!
//! [`SportsDataSource`] is the one interface the pipeline fetches through:
//! events for a date, odds for an event, estimator inputs for an event.
//! [`ApiSportsSource`] implements it over the api-sports football and
//! baseball hosts.

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate};
use tracing::{debug, warn};

use super::fixtures::{parse_events, parse_team_form, provider_dates};
use super::models::{Event, MarketQuote, ModelInputs, Sport, TeamForm};
use super::odds::parse_quotes;
use crate::api::client::SportsApiClient;
use crate::api::errors::ApiError;

#[async_trait]
pub trait SportsDataSource: Send + Sync {
    /// Allow-listed events of one sport starting on the local day `date`.
    async fn fetch_events(&self, sport: Sport, date: NaiveDate) -> Result<Vec<Event>, ApiError>;

    /// Valid quotes for one event. Missing markets are simply absent.
    async fn fetch_odds(&self, event: &Event) -> Result<Vec<MarketQuote>, ApiError>;

    /// Estimator inputs for one event.
    async fn fetch_model_inputs(&self, event: &Event) -> Result<ModelInputs, ApiError>;
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub football_leagues: Vec<String>,
    pub baseball_leagues: Vec<String>,
    pub bookmaker: u32,
    pub report_offset: FixedOffset,
    pub fetch_recent_form: bool,
    /// Number of past fixtures in the recent form window.
    pub form_window: u32,
}

pub struct ApiSportsSource {
    football: SportsApiClient,
    baseball: SportsApiClient,
    config: SourceConfig,
}

impl ApiSportsSource {
    pub fn new(football: SportsApiClient, baseball: SportsApiClient, config: SourceConfig) -> Self {
        Self {
            football,
            baseball,
            config,
        }
    }

    fn client(&self, sport: Sport) -> &SportsApiClient {
        match sport {
            Sport::Football => &self.football,
            Sport::Baseball => &self.baseball,
        }
    }

    fn leagues(&self, sport: Sport) -> &[String] {
        match sport {
            Sport::Football => &self.config.football_leagues,
            Sport::Baseball => &self.config.baseball_leagues,
        }
    }

    /// Form for one side; any failure degrades to "unknown" for that side.
    async fn team_form(&self, team_id: Option<u64>) -> TeamForm {
        let Some(team_id) = team_id else {
            return TeamForm::default();
        };
        match self
            .football
            .get_team_fixtures(team_id, self.config.form_window)
            .await
        {
            Ok(values) => parse_team_form(&values, team_id),
            Err(e) => {
                warn!(team_id, error = %e, "Recent form fetch failed, using defaults");
                TeamForm::default()
            }
        }
    }
}

#[async_trait]
impl SportsDataSource for ApiSportsSource {
    async fn fetch_events(&self, sport: Sport, date: NaiveDate) -> Result<Vec<Event>, ApiError> {
        let offset = self.config.report_offset;
        let mut values = Vec::new();
        for utc_day in provider_dates(date, offset) {
            let day = utc_day.format("%Y-%m-%d").to_string();
            let batch = match sport {
                Sport::Football => self.football.get_fixtures(&day).await?,
                Sport::Baseball => self.baseball.get_games(&day).await?,
            };
            debug!(%sport, %day, records = batch.len(), "Provider listing fetched");
            values.extend(batch);
        }
        Ok(parse_events(sport, &values, self.leagues(sport), offset, date))
    }

    async fn fetch_odds(&self, event: &Event) -> Result<Vec<MarketQuote>, ApiError> {
        let client = self.client(event.sport);
        let values = match event.sport {
            Sport::Football => client.get_fixture_odds(event.id).await?,
            Sport::Baseball => client.get_game_odds(event.id).await?,
        };
        Ok(parse_quotes(event.sport, &values, self.config.bookmaker))
    }

    async fn fetch_model_inputs(&self, event: &Event) -> Result<ModelInputs, ApiError> {
        match event.sport {
            Sport::Football if self.config.fetch_recent_form => {
                let home = self.team_form(event.home_team_id).await;
                let away = self.team_form(event.away_team_id).await;
                debug!(event_id = event.id, ?home, ?away, "Recent form loaded");
                Ok(ModelInputs::Football { home, away })
            }
            // The provider exposes no pitching data; the estimator's
            // neutral ratings apply.
            sport => Ok(ModelInputs::neutral(sport)),
        }
    }
}
