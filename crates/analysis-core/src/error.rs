use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Insufficient history: {0}")]
    InsufficientHistory(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::InvalidData(_) => ErrorKind::InvalidData,
            AnalysisError::EmptyInput(_) => ErrorKind::EmptyInput,
            AnalysisError::InsufficientHistory(_) => ErrorKind::InsufficientHistory,
            AnalysisError::CalculationError(_) => ErrorKind::Calculation,
            AnalysisError::Configuration(_) => ErrorKind::Configuration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidData,
    EmptyInput,
    InsufficientHistory,
    Calculation,
    Configuration,
}

/// Error document handed to callers in place of a record, e.g.
/// `{"error": "Empty input: no news articles", "kind": "empty_input"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub kind: ErrorKind,
}

impl From<&AnalysisError> for ErrorPayload {
    fn from(err: &AnalysisError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind(),
        }
    }
}

/// Result of one analysis component for one asset.
///
/// Serializes as the bare record on success and as an [`ErrorPayload`] on
/// failure, so a batch caller can record the failure and move on to the next
/// asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Ready(T),
    Failed(ErrorPayload),
}

impl<T> Outcome<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorPayload> {
        match self {
            Outcome::Ready(_) => None,
            Outcome::Failed(payload) => Some(payload),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }
}

impl<T> From<Result<T, AnalysisError>> for Outcome<T> {
    fn from(result: Result<T, AnalysisError>) -> Self {
        match result {
            Ok(value) => Outcome::Ready(value),
            Err(err) => Outcome::Failed(ErrorPayload::from(&err)),
        }
    }
}
