//! Drug interaction checks over the patient graph

use aegis_core::{
    ClinicalError, ClinicalNode, Drug, DrugInteraction, DrugRiskAlert, NodeKind,
    risk::{evaluate_pairs, select_alternatives},
};

use crate::db::SharedStore;

pub struct InteractionService {
    store: SharedStore,
}

impl InteractionService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Every interacting pair among the drugs a patient takes
    pub async fn patient_interactions(&self, patient_id: &str) -> Result<Vec<DrugInteraction>, ClinicalError> {
        let drugs = self.store.patient_drugs(patient_id).await?;
        let ids: Vec<String> = drugs.iter().map(|d| d.id.clone()).collect();
        let edges = self.store.interactions_among(&ids).await?;
        let interactions = evaluate_pairs(&drugs, &edges)?;

        if !interactions.is_empty() {
            tracing::info!(
                patient_id = %patient_id,
                count = interactions.len(),
                "Drug interactions detected"
            );
        }
        Ok(interactions)
    }

    /// Check one pair in either direction. Unknown drugs yield `None`.
    pub async fn check_pair(&self, drug1_id: &str, drug2_id: &str) -> Result<Option<DrugInteraction>, ClinicalError> {
        let (Some(first), Some(second)) = (self.drug(drug1_id).await?, self.drug(drug2_id).await?) else {
            return Ok(None);
        };
        let ids = vec![first.id.clone(), second.id.clone()];
        let edges = self.store.interactions_among(&ids).await?;

        edges
            .iter()
            .find(|e| e.connects(&first.id, &second.id))
            .map(|edge| DrugInteraction::classify(&first, &second, edge))
            .transpose()
    }

    pub async fn risk_alerts(&self, patient_id: &str) -> Result<Vec<DrugRiskAlert>, ClinicalError> {
        Ok(self
            .patient_interactions(patient_id)
            .await?
            .iter()
            .map(DrugRiskAlert::from)
            .collect())
    }

    /// Drugs treating one of the patient's diseases that could replace
    /// `drug_id` without interacting with anything the patient takes
    pub async fn safe_alternatives(&self, patient_id: &str, drug_id: &str) -> Result<Vec<Drug>, ClinicalError> {
        let candidates = self.store.treatments_for_patient(patient_id).await?;
        let current: Vec<String> = self
            .store
            .patient_drugs(patient_id)
            .await?
            .into_iter()
            .map(|d| d.id)
            .collect();

        let mut ids: Vec<String> = candidates.iter().map(|d| d.id.clone()).collect();
        ids.extend(current.iter().cloned());
        ids.sort();
        ids.dedup();
        let edges = self.store.interactions_among(&ids).await?;

        Ok(select_alternatives(candidates, drug_id, &current, &edges))
    }

    async fn drug(&self, id: &str) -> Result<Option<Drug>, ClinicalError> {
        Ok(match self.store.get_node(NodeKind::Drug, id).await? {
            Some(ClinicalNode::Drug(d)) => Some(d),
            _ => None,
        })
    }
}
