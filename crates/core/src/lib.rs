//! aegis-core: Shared clinical graph types and decision logic
//!
//! This crate provides the domain model used across the server
//! (patients, symptoms, diseases, drugs, lab tests, protocols), the
//! interaction-risk classification and the similar-patient scoring.
//! It performs no I/O.

pub mod error;
pub mod graph;
pub mod model;
pub mod outcome;
pub mod risk;
pub mod similarity;

pub use error::ClinicalError;
pub use graph::{GraphSlots, PatientContext, PatientGraph};
pub use model::{
    CatalogEntity, ClinicalNode, Disease, Drug, Keyed, LabTest, NewDisease, NewDrug, NewLabTest,
    NewPatient, NewSymptom, NewTreatmentProtocol, NodeKind, Patient, Relation, Symptom,
    TreatmentProtocol,
};
pub use outcome::{ErrorKind, ErrorOutcome};
pub use risk::{DrugInteraction, DrugRiskAlert, InteractionEdge, RiskLevel};
pub use similarity::{ClinicalProfile, SimilarPatient};
