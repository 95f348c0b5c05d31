//! Scenario configuration

pub mod config;

pub use config::{ConfigError, SampleSpec, ScenarioConfig};
