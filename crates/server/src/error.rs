//! Application error handling

use aegis_core::{ClinicalError, ErrorOutcome};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unavailable(String),
    Clinical(ClinicalError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, outcome) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorOutcome::not_found(msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorOutcome::invalid(msg)),
            AppError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorOutcome::new(aegis_core::ErrorKind::Unavailable, msg),
            ),
            AppError::Clinical(err) => {
                let status = match err {
                    ClinicalError::NotFound(_) => StatusCode::NOT_FOUND,
                    ClinicalError::Validation(_) => StatusCode::BAD_REQUEST,
                    ClinicalError::InvalidData(_)
                    | ClinicalError::Connection(_)
                    | ClinicalError::Query(_)
                    | ClinicalError::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    tracing::error!(error = %err, "Request failed");
                }
                (status, ErrorOutcome::from(&err))
            }
        };

        (status, Json(outcome)).into_response()
    }
}

impl From<ClinicalError> for AppError {
    fn from(err: ClinicalError) -> Self {
        AppError::Clinical(err)
    }
}
