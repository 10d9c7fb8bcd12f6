use serde::{Deserialize, Serialize};

use crate::ClinicalError;

/// Machine-readable error category returned to API clients
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    InvalidData,
    Unavailable,
    Unauthorized,
    Throttled,
    Internal,
}

/// JSON error body: `{"error": "not_found", "detail": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorOutcome {
    pub error: ErrorKind,
    pub detail: String,
}

impl ErrorOutcome {
    pub fn new(error: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            error,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, detail)
    }

    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, detail)
    }
}

impl From<&ClinicalError> for ErrorOutcome {
    fn from(err: &ClinicalError) -> Self {
        let kind = match err {
            ClinicalError::NotFound(_) => ErrorKind::NotFound,
            ClinicalError::Validation(_) => ErrorKind::Validation,
            ClinicalError::InvalidData(_) => ErrorKind::InvalidData,
            ClinicalError::Connection(_) | ClinicalError::Timeout(_) => ErrorKind::Unavailable,
            ClinicalError::Query(_) => ErrorKind::Internal,
        };
        Self::new(kind, err.to_string())
    }
}
