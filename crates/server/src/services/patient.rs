//! Patient traversals

use aegis_core::{ClinicalError, Patient, PatientContext, PatientGraph, Relation};

use crate::db::SharedStore;

/// Default number of patients returned by disease/symptom lookups
pub const DEFAULT_PATIENT_LIMIT: usize = 10;
pub const MAX_PATIENT_LIMIT: usize = 100;

pub struct PatientService {
    store: SharedStore,
}

impl PatientService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Full clinical subgraph of one patient
    pub async fn graph(&self, patient_id: &str) -> Result<PatientGraph, ClinicalError> {
        self.store
            .patient_graph(patient_id)
            .await?
            .ok_or_else(|| ClinicalError::not_found("Patient", patient_id))
    }

    /// Name-level summary used in explanation prompts
    pub async fn context(&self, patient_id: &str) -> Result<PatientContext, ClinicalError> {
        Ok(self.graph(patient_id).await?.context())
    }

    /// Patients that have the given disease or symptom
    pub async fn patients_with(
        &self,
        relation: Relation,
        target_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Patient>, ClinicalError> {
        let limit = limit.unwrap_or(DEFAULT_PATIENT_LIMIT);
        if !(1..=MAX_PATIENT_LIMIT).contains(&limit) {
            return Err(ClinicalError::Validation(format!(
                "limit must be between 1 and {}, got {}",
                MAX_PATIENT_LIMIT, limit
            )));
        }
        self.store.patients_linked_to(relation, target_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::db::memory::MemoryStore;

    fn service() -> PatientService {
        PatientService::new(Arc::new(MemoryStore::seeded()))
    }

    #[tokio::test]
    async fn graph_collects_protocols_through_diseases() {
        let graph = service().graph("pat_001").await.unwrap();
        assert_eq!(graph.patient.name, "John Smith");
        let diseases: Vec<_> = graph.diseases.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(diseases, vec!["dis_003", "dis_001"]);
        assert_eq!(graph.drugs.len(), 3);
        assert_eq!(graph.lab_tests.len(), 1);
        let protocols: Vec<_> = graph
            .treatment_protocols
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(protocols, vec!["proto_001"]);
    }

    #[tokio::test]
    async fn patient_without_links_has_empty_lists() {
        let store = Arc::new(MemoryStore::seeded());
        let created = crate::services::CatalogService::<Patient>::new(store.clone())
            .create(aegis_core::NewPatient {
                name: "Ana Lee".into(),
                age: 30,
                gender: None,
                medical_record_number: None,
            })
            .await
            .unwrap();

        let graph = PatientService::new(store).graph(&created.id).await.unwrap();
        assert!(graph.symptoms.is_empty());
        assert!(graph.diseases.is_empty());
        assert!(graph.treatment_protocols.is_empty());
    }

    #[tokio::test]
    async fn unknown_patient_graph_is_not_found() {
        let err = service().graph("pat_404").await.unwrap_err();
        assert!(matches!(err, ClinicalError::NotFound(_)));
    }

    #[tokio::test]
    async fn patients_with_disease_are_ordered_and_limited() {
        let service = service();
        let all = service
            .patients_with(Relation::HasDisease, "dis_003", None)
            .await
            .unwrap();
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["James Brown", "John Smith", "Robert Williams"]);

        let one = service
            .patients_with(Relation::HasSymptom, "sym_001", Some(1))
            .await
            .unwrap();
        assert_eq!(one.len(), 1);
    }

    #[tokio::test]
    async fn patient_limit_is_bounded() {
        let service = service();
        for limit in [0, MAX_PATIENT_LIMIT + 1, usize::MAX] {
            let err = service
                .patients_with(Relation::HasDisease, "dis_001", Some(limit))
                .await
                .unwrap_err();
            assert!(matches!(err, ClinicalError::Validation(_)), "{}", limit);
        }
        let all = service
            .patients_with(Relation::HasDisease, "dis_001", Some(MAX_PATIENT_LIMIT))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }
}
