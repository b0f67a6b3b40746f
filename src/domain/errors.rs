use serde::Serialize;
use thiserror::Error;

/// Errors that abort a forecast request.
///
/// Every failure inside the pipeline is reported through exactly one of these
/// variants; no partial forecast is ever returned alongside an error.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ForecastError {
    #[error("Insufficient data for {symbol}: {available} usable rows, need at least {required}")]
    InsufficientData {
        symbol: String,
        available: usize,
        required: usize,
    },

    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: String,
        actual: String,
    },

    #[error("Training failed for {model}: {reason}")]
    Training { model: String, reason: String },

    #[error("Upstream data error from {source_name}: {reason}")]
    UpstreamData { source_name: String, reason: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl ForecastError {
    pub fn shape(
        context: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn training(model: impl Into<String>, reason: impl ToString) -> Self {
        Self::Training {
            model: model.into(),
            reason: reason.to_string(),
        }
    }

    pub fn upstream(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::UpstreamData {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Stable error code reported to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => "InsufficientDataError",
            Self::ShapeMismatch { .. } => "ShapeMismatchError",
            Self::Training { .. } => "TrainingError",
            Self::UpstreamData { .. } => "UpstreamDataError",
            Self::InvalidRequest { .. } => "InvalidRequestError",
        }
    }

    pub fn to_failure(&self) -> ForecastFailure {
        ForecastFailure {
            error: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

/// Serializable single structured failure handed to outer surfaces.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForecastFailure {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_formatting() {
        let error = ForecastError::InsufficientData {
            symbol: "AAPL".to_string(),
            available: 0,
            required: 1,
        };

        let msg = error.to_string();
        assert!(msg.contains("AAPL"));
        assert!(msg.contains("0 usable rows"));
        assert_eq!(error.kind(), "InsufficientDataError");
    }

    #[test]
    fn test_failure_carries_kind_and_message() {
        let error = ForecastError::shape("target scaler", "(N, 1)", "(12, 2)");
        let failure = error.to_failure();

        assert_eq!(failure.error, "ShapeMismatchError");
        assert!(failure.message.contains("(12, 2)"));

        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["error"], "ShapeMismatchError");
    }
}
