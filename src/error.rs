//! Error taxonomy shared by the pipeline stages.

use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a failed analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingCredential,
    EmptyResult,
    ProviderError,
    IoFailure,
    InvalidInput,
}

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("OpenAI API key not configured")]
    MissingCredential,

    #[error("No results from analysis")]
    EmptyResult,

    #[error("{0}")]
    Provider(String),

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    InvalidInput(String),
}

impl AnalyzerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential => ErrorKind::MissingCredential,
            Self::EmptyResult => ErrorKind::EmptyResult,
            Self::Provider(_) => ErrorKind::ProviderError,
            Self::Io(_) => ErrorKind::IoFailure,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}

/// Result of one trip through the adapter. Callers must handle both arms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Success { markdown_text: String },
    Failure { kind: ErrorKind, message: String },
}

impl AnalysisOutcome {
    pub fn success(markdown_text: impl Into<String>) -> Self {
        Self::Success {
            markdown_text: markdown_text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<AnalyzerError> for AnalysisOutcome {
    fn from(err: AnalyzerError) -> Self {
        Self::Failure {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_from_error_keeps_kind_and_message() {
        let outcome: AnalysisOutcome = AnalyzerError::Provider("rate limited".into()).into();
        assert_eq!(
            outcome,
            AnalysisOutcome::Failure {
                kind: ErrorKind::ProviderError,
                message: "rate limited".into(),
            }
        );
    }

    #[test]
    fn io_errors_classify_as_io_failure() {
        let err: AnalyzerError =
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "stream closed").into();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert!(err.to_string().contains("stream closed"));
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::MissingCredential).unwrap();
        assert_eq!(json, "\"missing_credential\"");
    }
}
