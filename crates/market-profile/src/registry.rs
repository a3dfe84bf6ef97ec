use crate::error::ConfigError;
use crate::profile::{MarketProfile, MarketThresholds, RsiBands};
use analysis_core::Market;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

const WEIGHT_EPSILON: f64 = 1e-6;

/// Profile and thresholds for one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSettings {
    pub profile: MarketProfile,
    pub thresholds: MarketThresholds,
}

impl MarketSettings {
    pub fn for_market(market: Market) -> Self {
        Self {
            profile: MarketProfile::for_market(market),
            thresholds: MarketThresholds::for_market(market),
        }
    }
}

/// Read-only registry of per-market scoring configuration.
///
/// Built once at start-up and shared behind an `Arc`. Markets missing
/// from an override file keep their built-in settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRegistry {
    #[serde(rename = "US")]
    pub us: MarketSettings,
    #[serde(rename = "HK")]
    pub hk: MarketSettings,
    #[serde(rename = "CN")]
    pub cn: MarketSettings,
    pub rsi: RsiBands,
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self {
            us: MarketSettings::for_market(Market::US),
            hk: MarketSettings::for_market(Market::HK),
            cn: MarketSettings::for_market(Market::CN),
            rsi: RsiBands::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let registry: Self = serde_json::from_str(json)?;
        registry.validate()?;
        Ok(registry)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let registry = Self::from_json_str(&contents)?;
        info!(path = %path.display(), "Loaded market profile overrides");
        Ok(registry)
    }

    pub fn with_rsi_bands(mut self, rsi: RsiBands) -> Self {
        self.rsi = rsi;
        self
    }

    pub fn settings(&self, market: Market) -> &MarketSettings {
        match market {
            Market::US => &self.us,
            Market::HK => &self.hk,
            Market::CN => &self.cn,
        }
    }

    pub fn profile(&self, market: Market) -> &MarketProfile {
        &self.settings(market).profile
    }

    pub fn thresholds(&self, market: Market) -> &MarketThresholds {
        &self.settings(market).thresholds
    }

    /// Lookup by raw market code; unknown codes resolve to US
    pub fn profile_for_code(&self, code: &str) -> &MarketProfile {
        self.profile(Market::from_code(code))
    }

    pub fn rsi_bands(&self) -> RsiBands {
        self.rsi
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for market in Market::ALL {
            let settings = self.settings(market);
            let profile = &settings.profile;
            let invalid = |reason: String| ConfigError::InvalidWeights {
                market: market.to_string(),
                reason,
            };

            if (profile.blend_sum() - 1.0).abs() > WEIGHT_EPSILON {
                return Err(invalid(format!(
                    "technical_weight + fundamental_weight = {}",
                    profile.blend_sum()
                )));
            }
            if profile.technical_weight < 0.0 || profile.fundamental_weight < 0.0 {
                return Err(invalid("blend weights must be non-negative".to_string()));
            }
            if profile.technical.values().chain(profile.fundamental.values()).any(|w| *w < 0.0 || !w.is_finite()) {
                return Err(invalid("indicator weights must be finite and non-negative".to_string()));
            }
            if profile.growth_bonus_cap < 0.0 {
                return Err(invalid(format!(
                    "growth_bonus_cap must be >= 0, got {}",
                    profile.growth_bonus_cap
                )));
            }

            let tech_sum = profile.technical_weight_sum();
            if (tech_sum - 1.0).abs() > WEIGHT_EPSILON {
                warn!(market = %market, sum = tech_sum, "Technical weights do not sum to 1.0");
            }
            let fund_sum = profile.fundamental_weight_sum();
            if (fund_sum - 1.0).abs() > WEIGHT_EPSILON {
                warn!(market = %market, sum = fund_sum, "Fundamental weights do not sum to 1.0, scores will be renormalized");
            }

            let t = &settings.thresholds;
            if t.max_pe_ratio <= 0.0 || t.max_pb_ratio <= 0.0 {
                return Err(ConfigError::InvalidThresholds(format!(
                    "{}: max PE/PB must be positive",
                    market
                )));
            }
        }

        if !(self.rsi.oversold > 0.0 && self.rsi.oversold < self.rsi.overbought && self.rsi.overbought < 100.0) {
            return Err(ConfigError::InvalidThresholds(format!(
                "RSI bands must satisfy 0 < oversold < overbought < 100, got {}/{}",
                self.rsi.oversold, self.rsi.overbought
            )));
        }

        Ok(())
    }
}
