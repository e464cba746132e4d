pub mod fixtures;
pub mod models;
pub mod odds;
pub mod source;
