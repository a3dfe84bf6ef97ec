use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Insufficient data: need at least {required} bars, got {provided}")]
    InsufficientData { required: usize, provided: usize },

    #[error("{0} data missing")]
    MissingAttribute(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

impl AnalysisError {
    /// Guard for derived values: NaN or infinity becomes a `CalculationError`.
    pub fn check_finite(value: f64, what: &str) -> Result<f64, AnalysisError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(AnalysisError::CalculationError(format!(
                "{} is not finite ({})",
                what, value
            )))
        }
    }
}
