//! Generic create / fetch / list handlers shared by every node kind

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
};
use aegis_core::{CatalogEntity, NodeKind};

use crate::db::SharedStore;
use crate::error::AppError;
use crate::services::CatalogService;

/// Collection segment under `/api/v1` for each kind
pub fn collection(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Patient => "patients",
        NodeKind::Symptom => "symptoms",
        NodeKind::Disease => "diseases",
        NodeKind::Drug => "drugs",
        NodeKind::LabTest => "lab-tests",
        NodeKind::TreatmentProtocol => "protocols",
    }
}

/// Unwrap a JSON body, turning extractor rejections into 400s
pub fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Unwrap query parameters, turning extractor rejections into 400s
pub fn params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// POST /api/v1/{collection}
pub async fn create<T: CatalogEntity>(
    State(store): State<SharedStore>,
    body: Result<Json<T::New>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let new = payload(body)?;
    let created = CatalogService::<T>::new(store).create(new).await?;
    let location = format!("/api/v1/{}/{}", collection(T::KIND), created.id());

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

/// GET /api/v1/{collection}/{id}
pub async fn read<T: CatalogEntity>(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<T>, AppError> {
    Ok(Json(CatalogService::<T>::new(store).get(&id).await?))
}

/// GET /api/v1/{collection}
pub async fn list<T: CatalogEntity>(State(store): State<SharedStore>) -> Result<Json<Vec<T>>, AppError> {
    Ok(Json(CatalogService::<T>::new(store).list().await?))
}
