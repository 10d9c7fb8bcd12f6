//! Drug interaction endpoints

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use aegis_core::{Drug, DrugInteraction, DrugRiskAlert};
use serde::Deserialize;

use super::catalog::params;
use crate::db::SharedStore;
use crate::error::AppError;
use crate::services::InteractionService;

#[derive(Debug, Deserialize)]
pub struct PairParams {
    drug1_id: String,
    drug2_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AlternativeParams {
    drug_id: String,
}

/// GET /api/v1/patients/{id}/drug-interactions
pub async fn for_patient(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<Vec<DrugInteraction>>, AppError> {
    Ok(Json(
        InteractionService::new(store).patient_interactions(&id).await?,
    ))
}

/// GET /api/v1/drug-interactions?drug1_id=..&drug2_id=..
pub async fn check_pair(
    State(store): State<SharedStore>,
    query: Result<Query<PairParams>, QueryRejection>,
) -> Result<Json<Option<DrugInteraction>>, AppError> {
    let params = params(query)?;
    let found = InteractionService::new(store)
        .check_pair(&params.drug1_id, &params.drug2_id)
        .await?;
    Ok(Json(found))
}

/// GET /api/v1/patients/{id}/drug-risk-alerts
pub async fn risk_alerts(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<Vec<DrugRiskAlert>>, AppError> {
    Ok(Json(InteractionService::new(store).risk_alerts(&id).await?))
}

/// GET /api/v1/patients/{id}/safe-alternatives?drug_id=..
pub async fn safe_alternatives(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    query: Result<Query<AlternativeParams>, QueryRejection>,
) -> Result<Json<Vec<Drug>>, AppError> {
    let params = params(query)?;
    let alternatives = InteractionService::new(store)
        .safe_alternatives(&id, &params.drug_id)
        .await?;
    Ok(Json(alternatives))
}
