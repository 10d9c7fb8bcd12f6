pub mod catalog;
pub mod explanation;
pub mod health;
pub mod interaction;
pub mod metrics;
pub mod patient;
pub mod similarity;

use axum::{
    Router,
    routing::{get, post, put},
};
use aegis_core::{Disease, Drug, LabTest, Patient, Symptom, TreatmentProtocol};

use crate::db::SharedStore;

/// Build the `/api/v1` domain routes
pub fn api_routes() -> Router<SharedStore> {
    Router::new()
        .route(
            "/patients",
            get(catalog::list::<Patient>).post(catalog::create::<Patient>),
        )
        .route("/patients/{id}", get(catalog::read::<Patient>))
        .route("/patients/{id}/graph", get(patient::graph))
        .route("/patients/{id}/symptoms/{symptom_id}", put(patient::link_symptom))
        .route("/patients/{id}/diseases/{disease_id}", put(patient::link_disease))
        .route("/patients/{id}/drugs/{drug_id}", put(patient::link_drug))
        .route("/patients/{id}/lab-tests/{lab_test_id}", put(patient::link_lab_test))
        .route("/patients/{id}/drug-interactions", get(interaction::for_patient))
        .route("/patients/{id}/drug-risk-alerts", get(interaction::risk_alerts))
        .route("/patients/{id}/safe-alternatives", get(interaction::safe_alternatives))
        .route("/patients/{id}/similar", get(similarity::similar))
        .route("/drug-interactions", get(interaction::check_pair))
        .route("/explanations", post(explanation::explain))
        .route(
            "/symptoms",
            get(catalog::list::<Symptom>).post(catalog::create::<Symptom>),
        )
        .route("/symptoms/{id}", get(catalog::read::<Symptom>))
        .route("/symptoms/{id}/patients", get(patient::with_symptom))
        .route(
            "/diseases",
            get(catalog::list::<Disease>).post(catalog::create::<Disease>),
        )
        .route("/diseases/{id}", get(catalog::read::<Disease>))
        .route("/diseases/{id}/patients", get(patient::with_disease))
        .route("/diseases/{id}/drugs/{drug_id}", put(patient::link_treatment))
        .route("/diseases/{id}/protocols/{protocol_id}", put(patient::link_protocol))
        .route(
            "/drugs",
            get(catalog::list::<Drug>).post(catalog::create::<Drug>),
        )
        .route("/drugs/{id}", get(catalog::read::<Drug>))
        .route(
            "/lab-tests",
            get(catalog::list::<LabTest>).post(catalog::create::<LabTest>),
        )
        .route("/lab-tests/{id}", get(catalog::read::<LabTest>))
        .route(
            "/protocols",
            get(catalog::list::<TreatmentProtocol>).post(catalog::create::<TreatmentProtocol>),
        )
        .route("/protocols/{id}", get(catalog::read::<TreatmentProtocol>))
}
