//! Similar-patient endpoint

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use aegis_core::SimilarPatient;

use super::catalog::params;
use super::patient::LimitParams;
use crate::db::SharedStore;
use crate::error::AppError;
use crate::services::SimilarityService;

/// GET /api/v1/patients/{id}/similar?limit=..
pub async fn similar(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    query: Result<Query<LimitParams>, QueryRejection>,
) -> Result<Json<Vec<SimilarPatient>>, AppError> {
    let params = params(query)?;
    Ok(Json(
        SimilarityService::new(store)
            .find_similar(&id, params.limit)
            .await?,
    ))
}
