//! Append-only audit log of delivered pick lists.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::data::models::{MarketCategory, Sport};
use crate::edge::ranker::PickList;
use crate::edge::selector::Candidate;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One pick as written to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickRecord {
    pub sport: Sport,
    pub league: String,
    pub matchup: String,
    pub starts_at: String,
    pub market: MarketCategory,
    pub pick: String,
    pub decimal_odds: Option<f64>,
    pub american_odds: Option<String>,
    pub probability: f64,
    pub edge: Option<f64>,
    pub label: String,
}

impl From<&Candidate> for PickRecord {
    fn from(c: &Candidate) -> Self {
        Self {
            sport: c.sport(),
            league: c.event.league.clone(),
            matchup: c.event.matchup(),
            starts_at: c.event.starts_at.to_rfc3339(),
            market: c.category(),
            pick: c.description(),
            decimal_odds: c.decimal_odds,
            american_odds: c.american_odds(),
            probability: c.probability,
            edge: c.edge(),
            label: c.label().to_string(),
        }
    }
}

/// One line of the log: everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub mode: String,
    pub run_date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub picks: Vec<PickRecord>,
    pub combo_legs: usize,
}

impl RunRecord {
    pub fn new(run_id: Uuid, mode: &str, run_date: NaiveDate, list: &PickList) -> Self {
        Self {
            run_id,
            mode: mode.to_string(),
            run_date,
            generated_at: Utc::now(),
            picks: list.picks.iter().map(PickRecord::from).collect(),
            combo_legs: list.combo.len(),
        }
    }
}

pub trait PickStore {
    fn append(&self, record: &RunRecord) -> Result<(), StorageError>;
}

/// JSON-lines file, one [`RunRecord`] per line.
pub struct JsonlPickStore {
    path: PathBuf,
}

impl JsonlPickStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PickStore for JsonlPickStore {
    fn append(&self, record: &RunRecord) -> Result<(), StorageError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
