use analysis_core::{FundamentalMetric, GrowthLabel, Market, TechnicalIndicator};
use serde::Serialize;
use std::collections::BTreeMap;
use strategy_engine::{Recommendation, ScreenOutcome, ScreenSummary, StockEvaluation};

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationRow {
    pub rank: usize,
    pub symbol: String,
    pub company_name: String,
    pub market: Market,
    pub sector: String,
    pub current_price: Option<f64>,
    pub technical_score: f64,
    pub fundamental_score: f64,
    pub total_score: f64,
    pub growth_label: GrowthLabel,
    pub growth_bonus: f64,
    pub recommendation: Recommendation,
    pub reasons: Vec<String>,
    /// Sub-scores by indicator key; empty when the technical side was skipped
    pub technical_breakdown: BTreeMap<&'static str, f64>,
    pub fundamental_breakdown: BTreeMap<&'static str, f64>,
}

fn breakdown<K, const N: usize>(
    all: [K; N],
    key: fn(&K) -> &'static str,
    scores: &BTreeMap<K, f64>,
) -> BTreeMap<&'static str, f64>
where
    K: Ord,
{
    all.iter()
        .filter_map(|k| scores.get(k).map(|score| (key(k), *score)))
        .collect()
}

impl RecommendationRow {
    fn from_evaluation(rank: usize, eval: &StockEvaluation) -> Self {
        Self {
            rank,
            symbol: eval.symbol.clone(),
            company_name: eval.company_name.clone(),
            market: eval.market,
            sector: eval.sector.clone(),
            current_price: eval.current_price(),
            technical_score: eval.technical_score,
            fundamental_score: eval.fundamental_score,
            total_score: eval.total_score,
            growth_label: eval.growth_label,
            growth_bonus: eval.growth_bonus,
            recommendation: eval.recommendation,
            reasons: eval.reasons.clone(),
            technical_breakdown: breakdown(TechnicalIndicator::ALL, TechnicalIndicator::key, &eval.technical.sub_scores),
            fundamental_breakdown: breakdown(FundamentalMetric::ALL, FundamentalMetric::key, &eval.fundamental.sub_scores),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreenReport {
    pub market: String,
    pub summary: ScreenSummary,
    pub recommendations: Vec<RecommendationRow>,
}

impl ScreenReport {
    pub fn new(market: &str, outcome: &ScreenOutcome) -> Self {
        Self {
            market: market.to_string(),
            summary: outcome.summary.clone(),
            recommendations: outcome
                .recommended
                .iter()
                .enumerate()
                .map(|(i, eval)| RecommendationRow::from_evaluation(i + 1, eval))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{FundamentalResult, TechnicalResult};
    use chrono::Utc;

    fn evaluation(symbol: &str, total: f64) -> StockEvaluation {
        StockEvaluation {
            symbol: symbol.to_string(),
            company_name: format!("{} Inc", symbol),
            market: Market::US,
            sector: "Technology".to_string(),
            technical_score: total,
            fundamental_score: total,
            total_score: total,
            growth_label: GrowthLabel::SteadyGrowth,
            growth_bonus: 4.0,
            recommendation: Recommendation::from_score(total),
            reasons: vec!["Technical score 70 (strong)".to_string()],
            technical: TechnicalResult::skipped(symbol, "not enough bars"),
            fundamental: FundamentalResult::neutral(symbol, "no fundamental data"),
        }
    }

    #[test]
    fn test_rows_are_ranked_from_one() {
        let outcome = ScreenOutcome {
            evaluations: vec![evaluation("AAA", 82.0), evaluation("BBB", 70.0), evaluation("CCC", 40.0)],
            recommended: vec![evaluation("AAA", 82.0), evaluation("BBB", 70.0)],
            summary: ScreenSummary {
                total_analyzed: 3,
                total_recommended: 2,
                valid_data: 3,
                timestamp: Utc::now(),
            },
        };
        let report = ScreenReport::new("US", &outcome);
        assert_eq!(report.recommendations.len(), 2);
        assert_eq!(report.recommendations[0].rank, 1);
        assert_eq!(report.recommendations[1].symbol, "BBB");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["recommendations"][0]["recommendation"], "Strong Buy");
        assert_eq!(json["recommendations"][0]["growth_label"], "steady growth");
        assert_eq!(json["summary"]["total_analyzed"], 3);
        assert!(json["recommendations"][0]["current_price"].is_null());
        assert_eq!(json["recommendations"][0]["technical_breakdown"], serde_json::json!({}));
    }

    #[test]
    fn test_breakdown_uses_indicator_keys() {
        let mut eval = evaluation("AAA", 75.0);
        eval.technical.sub_scores = TechnicalIndicator::ALL.iter().map(|i| (*i, 60.0)).collect();
        eval.technical.sub_scores.insert(TechnicalIndicator::Rsi, 80.0);
        eval.fundamental.sub_scores =
            BTreeMap::from([(FundamentalMetric::PegRatio, 70.0), (FundamentalMetric::DividendYield, 90.0)]);

        let row = RecommendationRow::from_evaluation(1, &eval);
        assert_eq!(
            row.technical_breakdown.keys().copied().collect::<Vec<_>>(),
            ["bollinger", "ma_trend", "macd", "rsi", "volume_trend"]
        );
        assert_eq!(row.technical_breakdown["rsi"], 80.0);
        assert_eq!(row.fundamental_breakdown.len(), 2);
        assert_eq!(row.fundamental_breakdown["peg_ratio"], 70.0);

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["fundamental_breakdown"]["dividend_yield"], 90.0);
        assert_eq!(json["technical_breakdown"]["volume_trend"], 60.0);
    }
}
