use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },

    #[error("Invalid weights for {market}: {reason}")]
    InvalidWeights { market: String, reason: String },

    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Failed to read profile file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse profile file: {0}")]
    Parse(#[from] serde_json::Error),
}
