use crate::error::ConfigError;
use crate::profile::RsiBands;
use crate::registry::ProfileRegistry;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Run-level screener settings read from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    pub min_recommendation_score: f64, // 60
    pub max_recommendations: usize,    // 10
    /// Overrides the registry's RSI bands only when set
    pub rsi_oversold: Option<f64>,
    pub rsi_overbought: Option<f64>,
    pub history_days: u32,             // 120
    pub cache_expiry_hours: u64,       // 24
    pub profile_file: Option<PathBuf>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            min_recommendation_score: 60.0,
            max_recommendations: 10,
            rsi_oversold: None,
            rsi_overbought: None,
            history_days: 120,
            cache_expiry_hours: 24,
            profile_file: None,
        }
    }
}

impl ScreenerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            min_recommendation_score: parse_var("SCREENER_MIN_SCORE", "60.0")?,
            max_recommendations: parse_var("SCREENER_MAX_RESULTS", "10")?,
            rsi_oversold: parse_optional_var("SCREENER_RSI_OVERSOLD")?,
            rsi_overbought: parse_optional_var("SCREENER_RSI_OVERBOUGHT")?,
            history_days: parse_var("SCREENER_HISTORY_DAYS", "120")?,
            cache_expiry_hours: parse_var("SCREENER_CACHE_EXPIRY_HOURS", "24")?,
            profile_file: env::var("SCREENER_PROFILE_FILE")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    /// `base` with whichever RSI overrides are set
    pub fn rsi_bands(&self, base: RsiBands) -> RsiBands {
        RsiBands {
            oversold: self.rsi_oversold.unwrap_or(base.oversold),
            overbought: self.rsi_overbought.unwrap_or(base.overbought),
        }
    }

    /// Build the profile registry: built-in defaults or the override file,
    /// with any RSI overrides from this config applied on top.
    pub fn build_registry(&self) -> Result<ProfileRegistry, ConfigError> {
        let registry = match &self.profile_file {
            Some(path) => ProfileRegistry::from_json_file(path)?,
            None => ProfileRegistry::new(),
        };
        let bands = self.rsi_bands(registry.rsi_bands());
        let registry = registry.with_rsi_bands(bands);
        registry.validate()?;
        Ok(registry)
    }
}

fn parse_var<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError> {
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        value,
    })
}

fn parse_optional_var<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => parse_var(key, &value).map(Some),
        _ => Ok(None),
    }
}
