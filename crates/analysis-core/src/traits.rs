use crate::{FundamentalResult, InstrumentSnapshot, TechnicalResult};

/// Trait for technical scoring engines.
///
/// Scoring never fails: problems are recorded on the returned result.
pub trait TechnicalScorer: Send + Sync {
    fn score(&self, snapshot: &InstrumentSnapshot) -> TechnicalResult;
}

/// Trait for fundamental scoring engines
pub trait FundamentalScorer: Send + Sync {
    fn score(&self, snapshot: &InstrumentSnapshot) -> FundamentalResult;
}
