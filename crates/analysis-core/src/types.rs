use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Neutral sub-score used whenever an input is missing or unusable
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Clamp a score into the 0-100 range
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

/// Round to two decimals, the precision scores are reported at
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Equity market an instrument trades on.
///
/// Parsing is total: any code that is not `HK` or `CN` maps to `US`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Market {
    #[default]
    US,
    HK,
    CN,
}

impl Market {
    pub const ALL: [Market; 3] = [Market::US, Market::HK, Market::CN];

    pub fn code(&self) -> &'static str {
        match self {
            Market::US => "US",
            Market::HK => "HK",
            Market::CN => "CN",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "HK" => Market::HK,
            "CN" => Market::CN,
            _ => Market::US,
        }
    }

    /// Infer the market from an exchange-suffixed symbol (`0700.HK`, `600519.SS`, `AAPL`)
    pub fn from_symbol(symbol: &str) -> Self {
        let upper = symbol.trim().to_ascii_uppercase();
        if upper.ends_with(".HK") {
            Market::HK
        } else if upper.ends_with(".SS") || upper.ends_with(".SZ") {
            Market::CN
        } else {
            Market::US
        }
    }
}

impl From<String> for Market {
    fn from(code: String) -> Self {
        Market::from_code(&code)
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Sparse fundamental attributes as delivered by the data provider.
///
/// Every field may be absent. Ratios such as ROE and growth rates are
/// fractions (0.22 = 22%); debt/equity is in percent form (150 = 1.5x).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FundamentalAttributes {
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub profit_margins: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub free_cashflow: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub market_cap: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    #[serde(rename = "shortName", alias = "companyName")]
    pub company_name: Option<String>,
}

impl FundamentalAttributes {
    /// True when the provider returned nothing at all
    pub fn is_empty(&self) -> bool {
        self == &FundamentalAttributes::default()
    }

    /// Numeric accessor that treats NaN and infinities as absent
    pub fn numeric(value: Option<f64>) -> Option<f64> {
        value.filter(|v| v.is_finite())
    }
}

/// Everything the scorers need to know about one instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentSnapshot {
    pub symbol: String,
    pub market: Market,
    #[serde(default)]
    pub bars: Vec<Bar>,
    #[serde(default)]
    pub attributes: FundamentalAttributes,
    /// Fetch failure reported by the data provider, if any
    #[serde(default)]
    pub error: Option<String>,
}

impl InstrumentSnapshot {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>, attributes: FundamentalAttributes) -> Self {
        let symbol = symbol.into();
        Self {
            market: Market::from_symbol(&symbol),
            symbol,
            bars,
            attributes,
            error: None,
        }
    }

    pub fn with_market(mut self, market: Market) -> Self {
        self.market = market;
        self
    }

    pub fn is_valid(&self) -> bool {
        !self.bars.is_empty() && self.error.is_none()
    }
}

/// Technical sub-indicators, in scoring order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnicalIndicator {
    MaTrend,
    Rsi,
    Macd,
    Bollinger,
    VolumeTrend,
}

impl TechnicalIndicator {
    pub const ALL: [TechnicalIndicator; 5] = [
        TechnicalIndicator::MaTrend,
        TechnicalIndicator::Rsi,
        TechnicalIndicator::Macd,
        TechnicalIndicator::Bollinger,
        TechnicalIndicator::VolumeTrend,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            TechnicalIndicator::MaTrend => "ma_trend",
            TechnicalIndicator::Rsi => "rsi",
            TechnicalIndicator::Macd => "macd",
            TechnicalIndicator::Bollinger => "bollinger",
            TechnicalIndicator::VolumeTrend => "volume_trend",
        }
    }
}

/// Fundamental sub-metrics, in scoring order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundamentalMetric {
    PeRatio,
    PbRatio,
    Roe,
    RevenueGrowth,
    EarningsGrowth,
    ProfitMargin,
    DebtRatio,
    FreeCashflow,
    PegRatio,
    DividendYield,
}

impl FundamentalMetric {
    pub const ALL: [FundamentalMetric; 10] = [
        FundamentalMetric::PeRatio,
        FundamentalMetric::PbRatio,
        FundamentalMetric::Roe,
        FundamentalMetric::RevenueGrowth,
        FundamentalMetric::EarningsGrowth,
        FundamentalMetric::ProfitMargin,
        FundamentalMetric::DebtRatio,
        FundamentalMetric::FreeCashflow,
        FundamentalMetric::PegRatio,
        FundamentalMetric::DividendYield,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            FundamentalMetric::PeRatio => "pe_ratio",
            FundamentalMetric::PbRatio => "pb_ratio",
            FundamentalMetric::Roe => "roe",
            FundamentalMetric::RevenueGrowth => "revenue_growth",
            FundamentalMetric::EarningsGrowth => "earnings_growth",
            FundamentalMetric::ProfitMargin => "profit_margin",
            FundamentalMetric::DebtRatio => "debt_ratio",
            FundamentalMetric::FreeCashflow => "free_cashflow",
            FundamentalMetric::PegRatio => "peg_ratio",
            FundamentalMetric::DividendYield => "dividend_yield",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_from_code_defaults_to_us() {
        assert_eq!(Market::from_code("hk"), Market::HK);
        assert_eq!(Market::from_code(" CN "), Market::CN);
        assert_eq!(Market::from_code("JP"), Market::US);
        assert_eq!(Market::from_code(""), Market::US);
    }

    #[test]
    fn test_market_from_symbol() {
        assert_eq!(Market::from_symbol("0700.HK"), Market::HK);
        assert_eq!(Market::from_symbol("600519.SS"), Market::CN);
        assert_eq!(Market::from_symbol("300750.sz"), Market::CN);
        assert_eq!(Market::from_symbol("AAPL"), Market::US);
    }

    #[test]
    fn test_market_deserializes_unknown_as_us() {
        let m: Market = serde_json::from_str("\"XETRA\"").unwrap();
        assert_eq!(m, Market::US);
        let m: Market = serde_json::from_str("\"HK\"").unwrap();
        assert_eq!(m, Market::HK);
        assert_eq!(serde_json::to_string(&Market::CN).unwrap(), "\"CN\"");
    }

    #[test]
    fn test_attributes_use_provider_keys() {
        let attrs: FundamentalAttributes = serde_json::from_str(
            r#"{"trailingPE": 15.0, "returnOnEquity": 0.22, "pegRatio": 0.6, "shortName": "Acme"}"#,
        )
        .unwrap();
        assert_eq!(attrs.trailing_pe, Some(15.0));
        assert_eq!(attrs.return_on_equity, Some(0.22));
        assert_eq!(attrs.peg_ratio, Some(0.6));
        assert_eq!(attrs.company_name.as_deref(), Some("Acme"));
        assert!(!attrs.is_empty());
        assert!(FundamentalAttributes::default().is_empty());
    }

    #[test]
    fn test_numeric_filters_non_finite() {
        assert_eq!(FundamentalAttributes::numeric(Some(f64::NAN)), None);
        assert_eq!(FundamentalAttributes::numeric(Some(f64::INFINITY)), None);
        assert_eq!(FundamentalAttributes::numeric(Some(1.5)), Some(1.5));
    }

    #[test]
    fn test_snapshot_validity() {
        let snap = InstrumentSnapshot::new("0700.HK", vec![], FundamentalAttributes::default());
        assert_eq!(snap.market, Market::HK);
        assert!(!snap.is_valid());
    }

    #[test]
    fn test_score_helpers() {
        assert_eq!(clamp_score(120.0), 100.0);
        assert_eq!(clamp_score(-3.0), 0.0);
        assert_eq!(round2(12.3456), 12.35);
    }
}
