pub mod converter;
pub mod estimator;
pub mod ranker;
pub mod selector;
