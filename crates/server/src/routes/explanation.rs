//! AI explanation endpoint

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};

use super::catalog::payload;
use crate::ai::{Explanation, ExplanationRequest, SharedCompletion, explanation};
use crate::db::SharedStore;
use crate::error::AppError;

/// POST /api/v1/explanations
///
/// Always answers when the patient exists: if the completion backend is
/// unreachable the explanation is built from the patient graph alone.
pub async fn explain(
    State(store): State<SharedStore>,
    Extension(completion): Extension<SharedCompletion>,
    body: Result<Json<ExplanationRequest>, JsonRejection>,
) -> Result<Json<Explanation>, AppError> {
    let request = payload(body)?;
    tracing::info!(patient_id = %request.patient_id, "Explanation requested");

    let result = explanation::generate(&store, completion.as_ref(), &request).await?;
    Ok(Json(result))
}
