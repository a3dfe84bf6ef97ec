use crate::types::{FundamentalMetric, TechnicalIndicator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Raw indicator values backing a technical score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorValues {
    pub close: Option<f64>,
    pub ma5: Option<f64>,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
    pub rsi_14: Option<f64>,
    pub macd_dif: Option<f64>,
    pub macd_dea: Option<f64>,
    pub macd_hist: Option<f64>,
    pub boll_upper: Option<f64>,
    pub boll_mid: Option<f64>,
    pub boll_lower: Option<f64>,
    pub boll_position: Option<f64>,
    pub volume_latest: Option<f64>,
    pub volume_ma5: Option<f64>,
    pub volume_ma20: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalResult {
    pub symbol: String,
    pub score: f64,
    pub sub_scores: BTreeMap<TechnicalIndicator, f64>,
    pub signals: Vec<String>,
    pub indicators: IndicatorValues,
    pub error: Option<String>,
}

impl TechnicalResult {
    /// Result for an instrument whose technical side was skipped entirely.
    /// Score stays at 0 and no sub-scores are reported.
    pub fn skipped(symbol: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            score: 0.0,
            sub_scores: BTreeMap::new(),
            signals: Vec::new(),
            indicators: IndicatorValues::default(),
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Growth classification, ordered roughly from strongest to weakest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GrowthLabel {
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "super growth")]
    SuperGrowth,
    #[serde(rename = "earnings-led growth")]
    EarningsLedGrowth,
    #[serde(rename = "revenue-led growth")]
    RevenueLedGrowth,
    #[serde(rename = "steady growth")]
    SteadyGrowth,
    #[serde(rename = "double decline")]
    DoubleDecline,
    #[serde(rename = "revenue decline")]
    RevenueDecline,
    #[serde(rename = "low growth")]
    LowGrowth,
}

impl GrowthLabel {
    pub fn to_label(&self) -> &'static str {
        match self {
            GrowthLabel::Unknown => "unknown",
            GrowthLabel::SuperGrowth => "super growth",
            GrowthLabel::EarningsLedGrowth => "earnings-led growth",
            GrowthLabel::RevenueLedGrowth => "revenue-led growth",
            GrowthLabel::SteadyGrowth => "steady growth",
            GrowthLabel::DoubleDecline => "double decline",
            GrowthLabel::RevenueDecline => "revenue decline",
            GrowthLabel::LowGrowth => "low growth",
        }
    }

    /// Whether the label is worth surfacing as a recommendation reason
    pub fn is_informative(&self) -> bool {
        !matches!(self, GrowthLabel::Unknown | GrowthLabel::LowGrowth)
    }
}

impl fmt::Display for GrowthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_label())
    }
}

/// Growth summary. Growth rates are percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthProfile {
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub free_cashflow_per_share: Option<f64>,
    pub label: GrowthLabel,
    pub bonus: f64,
    pub signals: Vec<String>,
}

/// Metric snapshot echoed back with a fundamental result.
/// Ratios are kept in the provider's units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalMetrics {
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub roe: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub profit_margin: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub free_cashflow: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub market_cap: Option<f64>,
    pub sector: String,
    pub industry: String,
    pub company_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalResult {
    pub symbol: String,
    /// Weighted (and renormalized) score before the growth bonus
    pub base_score: f64,
    /// Final score including the growth bonus
    pub score: f64,
    pub sub_scores: BTreeMap<FundamentalMetric, f64>,
    pub signals: Vec<String>,
    pub metrics: FundamentalMetrics,
    pub growth: GrowthProfile,
    pub error: Option<String>,
}

impl FundamentalResult {
    /// Neutral result used when scoring could not run
    pub fn neutral(symbol: impl Into<String>, error: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            metrics: FundamentalMetrics {
                sector: "Unknown".to_string(),
                industry: "Unknown".to_string(),
                company_name: symbol.clone(),
                ..Default::default()
            },
            symbol,
            base_score: crate::NEUTRAL_SCORE,
            score: crate::NEUTRAL_SCORE,
            sub_scores: BTreeMap::new(),
            signals: Vec::new(),
            growth: GrowthProfile::default(),
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_label_serializes_as_text() {
        let json = serde_json::to_string(&GrowthLabel::EarningsLedGrowth).unwrap();
        assert_eq!(json, "\"earnings-led growth\"");
        assert_eq!(GrowthLabel::SuperGrowth.to_string(), "super growth");
    }

    #[test]
    fn test_informative_labels() {
        assert!(!GrowthLabel::Unknown.is_informative());
        assert!(!GrowthLabel::LowGrowth.is_informative());
        assert!(GrowthLabel::DoubleDecline.is_informative());
        assert!(GrowthLabel::SteadyGrowth.is_informative());
    }

    #[test]
    fn test_skipped_technical_result() {
        let r = TechnicalResult::skipped("AAPL", "not enough bars");
        assert_eq!(r.score, 0.0);
        assert!(r.sub_scores.is_empty());
        assert!(!r.is_ok());
    }

    #[test]
    fn test_neutral_fundamental_result() {
        let r = FundamentalResult::neutral("0700.HK", "no fundamental data");
        assert_eq!(r.score, 50.0);
        assert_eq!(r.metrics.company_name, "0700.HK");
        assert_eq!(r.growth.label, GrowthLabel::Unknown);
    }

    #[test]
    fn test_sub_score_keys_serialize_snake_case() {
        let mut r = TechnicalResult::skipped("X", "e");
        r.sub_scores.insert(TechnicalIndicator::VolumeTrend, 55.0);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["sub_scores"]["volume_trend"], 55.0);
    }
}
