//! Similar-patient search

use aegis_core::{ClinicalError, SimilarPatient, similarity};

use crate::db::SharedStore;

pub struct SimilarityService {
    store: SharedStore,
}

impl SimilarityService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Patients ranked by weighted overlap with `patient_id`.
    /// An unknown patient has no similar patients.
    pub async fn find_similar(
        &self,
        patient_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SimilarPatient>, ClinicalError> {
        let limit = similarity::resolve_limit(limit)?;
        let profiles = self.store.clinical_profiles().await?;

        let Some(target) = profiles.iter().find(|p| p.patient_id == patient_id) else {
            tracing::debug!(patient_id = %patient_id, "Similarity target not found");
            return Ok(Vec::new());
        };
        Ok(similarity::rank(target, &profiles, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::db::memory::MemoryStore;

    fn service() -> SimilarityService {
        SimilarityService::new(Arc::new(MemoryStore::seeded()))
    }

    #[tokio::test]
    async fn james_brown_is_closest_to_john_smith() {
        let ranked = service().find_similar("pat_001", None).await.unwrap();
        assert_eq!(ranked[0].patient_id, "pat_005");
        // 2 symptoms, 2 diseases, 1 drug
        assert_eq!(ranked[0].similarity_score, 1.8);
        assert!(ranked.iter().all(|p| p.patient_id != "pat_001"));
        // Mary Johnson shares nothing
        assert!(ranked.iter().all(|p| p.patient_id != "pat_002"));
    }

    #[tokio::test]
    async fn unknown_target_yields_empty_list() {
        assert!(service().find_similar("pat_404", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_limit_is_rejected() {
        let err = service().find_similar("pat_001", Some(0)).await.unwrap_err();
        assert!(matches!(err, ClinicalError::Validation(_)));
    }
}
