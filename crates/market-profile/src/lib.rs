//! Per-market scoring profiles, thresholds and screener configuration.

pub mod config;
pub mod error;
pub mod profile;
pub mod registry;

pub use config::ScreenerConfig;
pub use error::ConfigError;
pub use profile::{MarketProfile, MarketThresholds, RsiBands};
pub use registry::{MarketSettings, ProfileRegistry};
