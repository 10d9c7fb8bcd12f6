//! Clinical graph storage

pub mod graph;
#[cfg(test)]
pub mod memory;
mod neo4j;
pub mod seed;

pub use graph::{GraphDb, Statement, WriteSummary};
pub use neo4j::Neo4jStore;

use std::sync::Arc;

use aegis_core::{
    ClinicalError, ClinicalNode, ClinicalProfile, Drug, InteractionEdge, NodeKind, Patient,
    PatientGraph, Relation,
};
use async_trait::async_trait;

/// Every graph pattern the services rely on.
///
/// Implemented over Neo4j for production and in memory for tests.
#[async_trait]
pub trait ClinicalStore: Send + Sync {
    /// Persist a new node and return it as stored
    async fn create_node(&self, node: ClinicalNode) -> Result<ClinicalNode, ClinicalError>;

    async fn get_node(&self, kind: NodeKind, id: &str) -> Result<Option<ClinicalNode>, ClinicalError>;

    /// All nodes of a kind, ordered by name then id
    async fn list_nodes(&self, kind: NodeKind) -> Result<Vec<ClinicalNode>, ClinicalError>;

    /// Idempotently create `from -[relation]-> to`. Returns `false` when
    /// either endpoint does not exist.
    async fn link(&self, relation: Relation, from_id: &str, to_id: &str) -> Result<bool, ClinicalError>;

    async fn patient_graph(&self, patient_id: &str) -> Result<Option<PatientGraph>, ClinicalError>;

    /// Drugs the patient currently takes
    async fn patient_drugs(&self, patient_id: &str) -> Result<Vec<Drug>, ClinicalError>;

    /// Stored interaction edges whose endpoints are both in `drug_ids`
    async fn interactions_among(&self, drug_ids: &[String]) -> Result<Vec<InteractionEdge>, ClinicalError>;

    /// Drugs that treat any disease the patient has
    async fn treatments_for_patient(&self, patient_id: &str) -> Result<Vec<Drug>, ClinicalError>;

    /// Symptom, disease and drug names for every patient
    async fn clinical_profiles(&self) -> Result<Vec<ClinicalProfile>, ClinicalError>;

    /// Patients holding `relation` to `target_id`, ordered by name
    async fn patients_linked_to(
        &self,
        relation: Relation,
        target_id: &str,
        limit: usize,
    ) -> Result<Vec<Patient>, ClinicalError>;

    async fn ping(&self) -> Result<(), ClinicalError>;

    async fn close(&self) {}
}

/// Store handle shared by every request
pub type SharedStore = Arc<dyn ClinicalStore>;
