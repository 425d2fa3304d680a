//! Domain error types.

/// Top-level error type for folio.
#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    #[error("failed to read {file}: {reason}")]
    Data { file: String, reason: String },

    #[error("invalid portfolio rows:\n{}", reasons.join("\n"))]
    InvalidHoldings { reasons: Vec<String> },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("insufficient price data: {points} aligned dates, need at least {minimum}")]
    InsufficientData { points: usize, minimum: usize },

    #[error("benchmark {benchmark} has {overlap} dates overlapping the portfolio, need at least 2")]
    BenchmarkMismatch { benchmark: String, overlap: usize },

    #[error("invalid target weights: {reason}")]
    InvalidWeights { reason: String },

    #[error("no price available for {ticker}")]
    MissingPrice { ticker: String },

    #[error("tolerance must be non-negative, got {tolerance}")]
    NegativeTolerance { tolerance: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&FolioError> for std::process::ExitCode {
    fn from(err: &FolioError) -> Self {
        let code: u8 = match err {
            FolioError::Io(_) => 1,
            FolioError::ConfigParse { .. } | FolioError::ConfigInvalid { .. } => 2,
            FolioError::Data { .. } | FolioError::InvalidHoldings { .. } => 3,
            FolioError::InvalidWeights { .. } | FolioError::NegativeTolerance { .. } => 4,
            FolioError::InsufficientData { .. }
            | FolioError::BenchmarkMismatch { .. }
            | FolioError::MissingPrice { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
