//! Library entrypoint for daily-picks.
//!
//! Exposes all modules so integration tests can import them.

pub mod api;
pub mod config;
pub mod data;
pub mod delivery;
pub mod edge;
pub mod pipeline;
pub mod report;
pub mod storage;
