pub mod growth;
pub mod metrics;
pub mod sector;

use analysis_core::{
    clamp_score, round2, AnalysisError, FundamentalAttributes, FundamentalMetric, FundamentalMetrics,
    FundamentalResult, FundamentalScorer, InstrumentSnapshot,
};
use market_profile::ProfileRegistry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

pub use growth::classify_growth;
pub use metrics::*;
pub use sector::{pe_benchmark, DEFAULT_PE_BENCHMARK, SECTOR_PE_BENCHMARKS};

/// Below this covered weight the weighted sum is renormalized
const FULL_COVERAGE: f64 = 0.99;

pub struct FundamentalScoringEngine {
    registry: Arc<ProfileRegistry>,
}

impl FundamentalScoringEngine {
    pub fn new(registry: Arc<ProfileRegistry>) -> Self {
        Self { registry }
    }

    pub fn analyze(&self, snapshot: &InstrumentSnapshot) -> FundamentalResult {
        if snapshot.attributes.is_empty() {
            return FundamentalResult::neutral(&snapshot.symbol, "no fundamental data");
        }

        match self.compute(snapshot) {
            Ok(result) => result,
            Err(e) => {
                warn!(symbol = %snapshot.symbol, error = %e, "Fundamental scoring failed");
                FundamentalResult::neutral(&snapshot.symbol, format!("fundamental analysis failed: {}", e))
            }
        }
    }

    fn compute(&self, snapshot: &InstrumentSnapshot) -> Result<FundamentalResult, AnalysisError> {
        let attrs = &snapshot.attributes;
        let market = snapshot.market;
        let profile = self.registry.profile(market);
        let thresholds = self.registry.thresholds(market);

        let scored = [
            (FundamentalMetric::PeRatio, score_pe(attrs, thresholds)),
            (FundamentalMetric::PbRatio, score_pb(attrs, thresholds)),
            (FundamentalMetric::Roe, score_roe(attrs, thresholds)),
            (FundamentalMetric::RevenueGrowth, score_revenue_growth(attrs, thresholds)),
            (FundamentalMetric::EarningsGrowth, score_earnings_growth(attrs, thresholds)),
            (FundamentalMetric::ProfitMargin, score_profit_margin(attrs)),
            (FundamentalMetric::DebtRatio, score_debt_ratio(attrs)),
            (FundamentalMetric::FreeCashflow, score_free_cashflow(attrs)),
            (FundamentalMetric::PegRatio, score_peg(attrs)),
            (FundamentalMetric::DividendYield, score_dividend_yield(attrs, market)),
        ];

        let mut sub_scores = BTreeMap::new();
        let mut signals = Vec::new();
        for (metric, metric_score) in scored {
            sub_scores.insert(metric, metric_score.score);
            signals.extend(metric_score.signals);
        }

        let base_score = round2(AnalysisError::check_finite(
            weighted_score(&sub_scores, &profile.fundamental),
            "fundamental score",
        )?);

        let growth = classify_growth(attrs, thresholds, profile.growth_bonus_cap);
        signals.extend(growth.signals.iter().cloned());
        let score = round2(clamp_score(AnalysisError::check_finite(
            base_score + growth.bonus,
            "fundamental score with growth bonus",
        )?));

        Ok(FundamentalResult {
            symbol: snapshot.symbol.clone(),
            base_score,
            score,
            sub_scores,
            signals,
            metrics: metric_snapshot(&snapshot.symbol, attrs),
            growth,
            error: None,
        })
    }
}

impl FundamentalScorer for FundamentalScoringEngine {
    fn score(&self, snapshot: &InstrumentSnapshot) -> FundamentalResult {
        self.analyze(snapshot)
    }
}

/// Weighted sum over the metrics that were scored, renormalized by the
/// covered weight when the profile leaves part of the weight uncovered.
pub fn weighted_score(
    sub_scores: &BTreeMap<FundamentalMetric, f64>,
    weights: &BTreeMap<FundamentalMetric, f64>,
) -> f64 {
    let (total, covered) = weights
        .iter()
        .filter_map(|(metric, weight)| sub_scores.get(metric).map(|score| (score * weight, *weight)))
        .fold((0.0, 0.0), |(total, covered), (value, weight)| (total + value, covered + weight));

    if covered > 0.0 && covered < FULL_COVERAGE {
        total / covered
    } else {
        total
    }
}

fn metric_snapshot(symbol: &str, attrs: &FundamentalAttributes) -> FundamentalMetrics {
    let n = FundamentalAttributes::numeric;
    FundamentalMetrics {
        pe_ratio: n(attrs.trailing_pe),
        forward_pe: n(attrs.forward_pe),
        pb_ratio: n(attrs.price_to_book),
        roe: n(attrs.return_on_equity),
        revenue_growth: n(attrs.revenue_growth),
        earnings_growth: n(attrs.earnings_growth),
        profit_margin: n(attrs.profit_margins),
        debt_to_equity: n(attrs.debt_to_equity),
        free_cashflow: n(attrs.free_cashflow),
        peg_ratio: n(attrs.peg_ratio),
        dividend_yield: n(attrs.dividend_yield),
        market_cap: n(attrs.market_cap),
        sector: attrs.sector.clone().unwrap_or_else(|| "Unknown".to_string()),
        industry: attrs.industry.clone().unwrap_or_else(|| "Unknown".to_string()),
        company_name: attrs.company_name.clone().unwrap_or_else(|| symbol.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{GrowthLabel, Market};
    use approx::assert_relative_eq;

    fn engine() -> FundamentalScoringEngine {
        FundamentalScoringEngine::new(Arc::new(ProfileRegistry::new()))
    }

    fn snapshot(symbol: &str, attributes: FundamentalAttributes) -> InstrumentSnapshot {
        InstrumentSnapshot::new(symbol, vec![], attributes)
    }

    fn growth_stock() -> FundamentalAttributes {
        FundamentalAttributes {
            trailing_pe: Some(15.0),
            sector: Some("Technology".to_string()),
            return_on_equity: Some(0.22),
            revenue_growth: Some(0.30),
            earnings_growth: Some(0.28),
            peg_ratio: Some(0.6),
            ..Default::default()
        }
    }

    #[test]
    fn test_super_growth_bonus_clamped_to_us_cap() {
        let result = engine().analyze(&snapshot("NVDA", growth_stock()));

        assert!(result.is_ok());
        assert_eq!(result.growth.label, GrowthLabel::SuperGrowth);
        assert_eq!(result.growth.bonus, 15.0);
        assert_eq!(result.score, round2(clamp_score(result.base_score + 15.0)));
    }

    #[test]
    fn test_base_score_weighted_sum() {
        let result = engine().analyze(&snapshot("NVDA", growth_stock()));
        // pe 85, pb 50, roe 80, rev 90, earn 90, pm 50, debt 50, fcf 50, peg 80
        let expected = 85.0 * 0.12
            + 50.0 * 0.05
            + 80.0 * 0.15
            + 90.0 * 0.18
            + 90.0 * 0.15
            + 50.0 * 0.10
            + 50.0 * 0.10
            + 50.0 * 0.05
            + 80.0 * 0.10;
        assert_relative_eq!(result.base_score, round2(expected), epsilon = 1e-9);
        assert_eq!(result.sub_scores.len(), 10);
    }

    #[test]
    fn test_empty_attributes_are_neutral() {
        let result = engine().analyze(&snapshot("XYZ", FundamentalAttributes::default()));
        assert_eq!(result.score, 50.0);
        assert_eq!(result.error.as_deref(), Some("no fundamental data"));
        assert!(result.sub_scores.is_empty());
        assert_eq!(result.growth.label, GrowthLabel::Unknown);
    }

    #[test]
    fn test_sparse_attributes_score_neutral_per_metric() {
        let attrs = FundamentalAttributes {
            sector: Some("Energy".to_string()),
            ..Default::default()
        };
        let result = engine().analyze(&snapshot("XOM", attrs));
        assert!(result.is_ok());
        assert!(result.sub_scores.values().all(|s| *s == 50.0));
        assert_eq!(result.score, 50.0);
        assert_eq!(result.metrics.sector, "Energy");
        assert_eq!(result.metrics.company_name, "XOM");
    }

    #[test]
    fn test_renormalizes_partial_weights() {
        let mut registry = ProfileRegistry::new();
        registry.us.profile.fundamental =
            BTreeMap::from([(FundamentalMetric::PeRatio, 0.25), (FundamentalMetric::Roe, 0.25)]);
        let engine = FundamentalScoringEngine::new(Arc::new(registry));

        let attrs = FundamentalAttributes {
            trailing_pe: Some(10.0), // 85 against the default benchmark
            return_on_equity: Some(0.30), // 90
            ..Default::default()
        };
        let result = engine.analyze(&snapshot("AAPL", attrs));
        assert_relative_eq!(result.base_score, 87.5, epsilon = 1e-9);
    }

    #[test]
    fn test_weighted_score_full_coverage_untouched() {
        let scores = BTreeMap::from([(FundamentalMetric::PeRatio, 80.0), (FundamentalMetric::Roe, 60.0)]);
        let weights = BTreeMap::from([(FundamentalMetric::PeRatio, 0.5), (FundamentalMetric::Roe, 0.5)]);
        assert_relative_eq!(weighted_score(&scores, &weights), 70.0);

        let sparse = BTreeMap::from([(FundamentalMetric::PeRatio, 80.0)]);
        assert_relative_eq!(weighted_score(&sparse, &weights), 80.0);
        assert_eq!(weighted_score(&BTreeMap::new(), &weights), 0.0);
    }

    #[test]
    fn test_hk_uses_dividend_weight() {
        let attrs = FundamentalAttributes {
            dividend_yield: Some(0.06),
            ..Default::default()
        };
        let hk = engine().analyze(&snapshot("0005.HK", attrs.clone()));
        let us = engine().analyze(&snapshot("JPM", attrs));
        assert_eq!(hk.sub_scores[&FundamentalMetric::DividendYield], 95.0);
        assert_eq!(us.sub_scores[&FundamentalMetric::DividendYield], 90.0);
        // 50 everywhere except dividend (weight 0.10 in HK, unweighted in US)
        assert_relative_eq!(hk.base_score, 54.5, epsilon = 1e-9);
        assert_relative_eq!(us.base_score, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_growth_signals_follow_metric_signals() {
        let result = engine().analyze(&snapshot("NVDA", growth_stock()));
        let last = result.signals.last().unwrap();
        assert!(last.contains("PEG"));
        assert!(result.signals.iter().any(|s| s.starts_with("[super growth]")));
    }

    #[test]
    fn test_scores_bounded_for_extremes() {
        let terrible = FundamentalAttributes {
            trailing_pe: Some(500.0),
            price_to_book: Some(-3.0),
            return_on_equity: Some(-0.5),
            revenue_growth: Some(-0.6),
            earnings_growth: Some(-0.9),
            profit_margins: Some(-0.4),
            debt_to_equity: Some(900.0),
            free_cashflow: Some(-1.0e9),
            market_cap: Some(1.0e9),
            peg_ratio: Some(-2.0),
            dividend_yield: Some(0.0),
            ..Default::default()
        };
        for market in Market::ALL {
            let result = engine().analyze(&snapshot("BAD", terrible.clone()).with_market(market));
            assert!((0.0..=100.0).contains(&result.score));
            let cap = ProfileRegistry::new().profile(market).growth_bonus_cap;
            assert!(result.growth.bonus.abs() <= cap);
        }
    }
}
