use thiserror::Error;

/// Clinical graph error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClinicalError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Graph connection error: {0}")]
    Connection(String),

    #[error("Graph query error: {0}")]
    Query(String),

    #[error("Timed out: {0}")]
    Timeout(String),
}

impl ClinicalError {
    pub fn not_found(kind: &str, id: &str) -> Self {
        ClinicalError::NotFound(format!("{} {} not found", kind, id))
    }
}
