use analysis_core::{FundamentalMetric, Market, TechnicalIndicator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scoring weights for one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketProfile {
    /// Technical sub-indicator weights (sum to 1.0)
    pub technical: BTreeMap<TechnicalIndicator, f64>,
    /// Fundamental sub-metric weights (sum to 1.0 when every metric is weighted)
    pub fundamental: BTreeMap<FundamentalMetric, f64>,
    pub technical_weight: f64,
    pub fundamental_weight: f64,
    /// Growth bonus is clamped to +/- this value
    pub growth_bonus_cap: f64,
}

impl MarketProfile {
    pub fn for_market(market: Market) -> Self {
        match market {
            Market::US => Self::us(),
            Market::HK => Self::hk(),
            Market::CN => Self::cn(),
        }
    }

    /// US: growth-led, free cash flow matters, dividends ignored
    pub fn us() -> Self {
        Self {
            technical: default_technical_weights(),
            fundamental: BTreeMap::from([
                (FundamentalMetric::PeRatio, 0.12),
                (FundamentalMetric::PbRatio, 0.05),
                (FundamentalMetric::Roe, 0.15),
                (FundamentalMetric::RevenueGrowth, 0.18),
                (FundamentalMetric::EarningsGrowth, 0.15),
                (FundamentalMetric::ProfitMargin, 0.10),
                (FundamentalMetric::FreeCashflow, 0.10),
                (FundamentalMetric::DebtRatio, 0.05),
                (FundamentalMetric::PegRatio, 0.10),
            ]),
            technical_weight: 0.35,
            fundamental_weight: 0.65,
            growth_bonus_cap: 15.0,
        }
    }

    /// HK: value and dividend oriented
    pub fn hk() -> Self {
        Self {
            technical: default_technical_weights(),
            fundamental: BTreeMap::from([
                (FundamentalMetric::PeRatio, 0.15),
                (FundamentalMetric::PbRatio, 0.10),
                (FundamentalMetric::Roe, 0.15),
                (FundamentalMetric::RevenueGrowth, 0.15),
                (FundamentalMetric::EarningsGrowth, 0.10),
                (FundamentalMetric::ProfitMargin, 0.10),
                (FundamentalMetric::DividendYield, 0.10),
                (FundamentalMetric::DebtRatio, 0.08),
                (FundamentalMetric::PegRatio, 0.07),
            ]),
            technical_weight: 0.30,
            fundamental_weight: 0.70,
            growth_bonus_cap: 12.0,
        }
    }

    /// CN: momentum carries more weight, earnings growth emphasised
    pub fn cn() -> Self {
        Self {
            technical: default_technical_weights(),
            fundamental: BTreeMap::from([
                (FundamentalMetric::PeRatio, 0.12),
                (FundamentalMetric::PbRatio, 0.08),
                (FundamentalMetric::Roe, 0.15),
                (FundamentalMetric::RevenueGrowth, 0.18),
                (FundamentalMetric::EarningsGrowth, 0.17),
                (FundamentalMetric::ProfitMargin, 0.10),
                (FundamentalMetric::FreeCashflow, 0.05),
                (FundamentalMetric::DebtRatio, 0.05),
                (FundamentalMetric::PegRatio, 0.10),
            ]),
            technical_weight: 0.40,
            fundamental_weight: 0.60,
            growth_bonus_cap: 18.0,
        }
    }

    pub fn blend_sum(&self) -> f64 {
        self.technical_weight + self.fundamental_weight
    }

    pub fn technical_weight_sum(&self) -> f64 {
        self.technical.values().sum()
    }

    pub fn fundamental_weight_sum(&self) -> f64 {
        self.fundamental.values().sum()
    }
}

fn default_technical_weights() -> BTreeMap<TechnicalIndicator, f64> {
    BTreeMap::from([
        (TechnicalIndicator::MaTrend, 0.25),
        (TechnicalIndicator::Rsi, 0.20),
        (TechnicalIndicator::Macd, 0.25),
        (TechnicalIndicator::Bollinger, 0.15),
        (TechnicalIndicator::VolumeTrend, 0.15),
    ])
}

/// Per-market cut-offs. Percent values (ROE, growth) are in whole percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketThresholds {
    pub max_pe_ratio: f64,
    pub max_pb_ratio: f64,
    pub min_roe: f64,
    pub high_growth_revenue: f64,
    pub high_growth_earnings: f64,
    pub min_growth_revenue: f64,
}

impl MarketThresholds {
    pub fn for_market(market: Market) -> Self {
        match market {
            Market::US => Self {
                max_pe_ratio: 60.0,
                max_pb_ratio: 15.0,
                min_roe: 8.0,
                high_growth_revenue: 20.0,
                high_growth_earnings: 20.0,
                min_growth_revenue: 8.0,
            },
            Market::HK => Self {
                max_pe_ratio: 40.0,
                max_pb_ratio: 8.0,
                min_roe: 5.0,
                high_growth_revenue: 20.0,
                high_growth_earnings: 20.0,
                min_growth_revenue: 8.0,
            },
            Market::CN => Self {
                max_pe_ratio: 50.0,
                max_pb_ratio: 10.0,
                min_roe: 6.0,
                high_growth_revenue: 25.0,
                high_growth_earnings: 30.0,
                min_growth_revenue: 10.0,
            },
        }
    }
}

/// Global RSI bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiBands {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiBands {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}
