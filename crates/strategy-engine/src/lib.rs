pub mod reasons;
pub mod screener;

use analysis_core::{
    clamp_score, round2, AnalysisError, FundamentalResult, FundamentalScorer, GrowthLabel,
    InstrumentSnapshot, Market, TechnicalResult, TechnicalScorer,
};
use fundamental_analysis::FundamentalScoringEngine;
use market_profile::{ProfileRegistry, ScreenerConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use technical_analysis::TechnicalScoringEngine;
use tracing::debug;

pub use reasons::{build_reasons, key_signals, FUNDAMENTAL_KEYWORDS, TECHNICAL_KEYWORDS};
pub use screener::{filter_recommendations, ScreenOutcome, ScreenSummary};

/// Recommendation tier derived solely from the total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    Buy,
    Hold,
    Avoid,
}

impl Recommendation {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Recommendation::StrongBuy
        } else if score >= 65.0 {
            Recommendation::Buy
        } else if score >= 50.0 {
            Recommendation::Hold
        } else {
            Recommendation::Avoid
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::Hold => "Hold",
            Recommendation::Avoid => "Avoid",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_label())
    }
}

/// Blended evaluation of one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEvaluation {
    pub symbol: String,
    pub company_name: String,
    pub market: Market,
    pub sector: String,
    pub technical_score: f64,
    pub fundamental_score: f64,
    pub total_score: f64,
    pub growth_label: GrowthLabel,
    pub growth_bonus: f64,
    pub recommendation: Recommendation,
    pub reasons: Vec<String>,
    pub technical: TechnicalResult,
    pub fundamental: FundamentalResult,
}

impl StockEvaluation {
    /// Latest close seen by the technical scorer
    pub fn current_price(&self) -> Option<f64> {
        self.technical.indicators.close
    }
}

pub struct StrategyEngine {
    technical: Arc<dyn TechnicalScorer>,
    fundamental: Arc<dyn FundamentalScorer>,
    registry: Arc<ProfileRegistry>,
    min_score: f64,
    max_count: usize,
}

impl StrategyEngine {
    /// Engine backed by the built-in technical and fundamental scorers
    pub fn new(registry: Arc<ProfileRegistry>, config: &ScreenerConfig) -> Self {
        Self::with_scorers(
            Arc::new(TechnicalScoringEngine::new(Arc::clone(&registry))),
            Arc::new(FundamentalScoringEngine::new(Arc::clone(&registry))),
            registry,
            config,
        )
    }

    pub fn with_scorers(
        technical: Arc<dyn TechnicalScorer>,
        fundamental: Arc<dyn FundamentalScorer>,
        registry: Arc<ProfileRegistry>,
        config: &ScreenerConfig,
    ) -> Self {
        Self {
            technical,
            fundamental,
            registry,
            min_score: config.min_recommendation_score,
            max_count: config.max_recommendations,
        }
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    /// Score one instrument on both sides and blend with its market profile.
    ///
    /// Only a snapshot without a symbol is rejected; scorer failures are
    /// carried on the embedded results.
    pub fn evaluate(&self, snapshot: &InstrumentSnapshot) -> Result<StockEvaluation, AnalysisError> {
        if snapshot.symbol.trim().is_empty() {
            return Err(AnalysisError::InvalidData("snapshot has no symbol".to_string()));
        }

        let technical = self.technical.score(snapshot);
        let fundamental = self.fundamental.score(snapshot);
        let profile = self.registry.profile(snapshot.market);

        // fundamental score already carries the growth bonus
        let blended = technical.score * profile.technical_weight + fundamental.score * profile.fundamental_weight;
        let total_score = round2(clamp_score(AnalysisError::check_finite(blended, "total score")?));
        let recommendation = Recommendation::from_score(total_score);

        debug!(
            symbol = %snapshot.symbol,
            market = %snapshot.market,
            technical = technical.score,
            fundamental = fundamental.score,
            total = total_score,
            "Evaluated instrument"
        );

        Ok(StockEvaluation {
            symbol: snapshot.symbol.clone(),
            company_name: fundamental.metrics.company_name.clone(),
            market: snapshot.market,
            sector: fundamental.metrics.sector.clone(),
            technical_score: technical.score,
            fundamental_score: fundamental.score,
            total_score,
            growth_label: fundamental.growth.label,
            growth_bonus: fundamental.growth.bonus,
            recommendation,
            reasons: build_reasons(&technical, &fundamental),
            technical,
            fundamental,
        })
    }
}
