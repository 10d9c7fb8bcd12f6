//! Patient graph, linking and per-patient lookups

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use aegis_core::{CatalogEntity, Disease, Patient, PatientGraph, Relation};
use serde::{Deserialize, Serialize};

use super::catalog::params;
use crate::db::SharedStore;
use crate::error::AppError;
use crate::services::{CatalogService, PatientService};

/// Result of a link request
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    linked: bool,
    relationship: &'static str,
    from: String,
    to: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

/// GET /api/v1/patients/{id}/graph
pub async fn graph(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<PatientGraph>, AppError> {
    Ok(Json(PatientService::new(store).graph(&id).await?))
}

async fn link<T: CatalogEntity>(
    store: SharedStore,
    relation: Relation,
    from: String,
    to: String,
) -> Result<Json<LinkResponse>, AppError> {
    CatalogService::<T>::new(store).link(relation, &from, &to).await?;
    Ok(Json(LinkResponse {
        linked: true,
        relationship: relation.rel_type(),
        from,
        to,
    }))
}

/// PUT /api/v1/patients/{id}/symptoms/{symptom_id}
pub async fn link_symptom(
    State(store): State<SharedStore>,
    Path((id, target)): Path<(String, String)>,
) -> Result<Json<LinkResponse>, AppError> {
    link::<Patient>(store, Relation::HasSymptom, id, target).await
}

/// PUT /api/v1/patients/{id}/diseases/{disease_id}
pub async fn link_disease(
    State(store): State<SharedStore>,
    Path((id, target)): Path<(String, String)>,
) -> Result<Json<LinkResponse>, AppError> {
    link::<Patient>(store, Relation::HasDisease, id, target).await
}

/// PUT /api/v1/patients/{id}/drugs/{drug_id}
pub async fn link_drug(
    State(store): State<SharedStore>,
    Path((id, target)): Path<(String, String)>,
) -> Result<Json<LinkResponse>, AppError> {
    link::<Patient>(store, Relation::TakesDrug, id, target).await
}

/// PUT /api/v1/patients/{id}/lab-tests/{lab_test_id}
pub async fn link_lab_test(
    State(store): State<SharedStore>,
    Path((id, target)): Path<(String, String)>,
) -> Result<Json<LinkResponse>, AppError> {
    link::<Patient>(store, Relation::HasLabResult, id, target).await
}

/// PUT /api/v1/diseases/{id}/drugs/{drug_id}
pub async fn link_treatment(
    State(store): State<SharedStore>,
    Path((id, target)): Path<(String, String)>,
) -> Result<Json<LinkResponse>, AppError> {
    link::<Disease>(store, Relation::TreatedBy, id, target).await
}

/// PUT /api/v1/diseases/{id}/protocols/{protocol_id}
pub async fn link_protocol(
    State(store): State<SharedStore>,
    Path((id, target)): Path<(String, String)>,
) -> Result<Json<LinkResponse>, AppError> {
    link::<Disease>(store, Relation::FollowProtocol, id, target).await
}

/// GET /api/v1/diseases/{id}/patients
pub async fn with_disease(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    query: Result<Query<LimitParams>, QueryRejection>,
) -> Result<Json<Vec<Patient>>, AppError> {
    let params = params(query)?;
    let patients = PatientService::new(store)
        .patients_with(Relation::HasDisease, &id, params.limit)
        .await?;
    Ok(Json(patients))
}

/// GET /api/v1/symptoms/{id}/patients
pub async fn with_symptom(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    query: Result<Query<LimitParams>, QueryRejection>,
) -> Result<Json<Vec<Patient>>, AppError> {
    let params = params(query)?;
    let patients = PatientService::new(store)
        .patients_with(Relation::HasSymptom, &id, params.limit)
        .await?;
    Ok(Json(patients))
}
