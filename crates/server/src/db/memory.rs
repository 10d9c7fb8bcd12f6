//! In-memory `ClinicalStore` used by unit and router tests

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use aegis_core::{
    ClinicalError, ClinicalNode, ClinicalProfile, Drug, GraphSlots, InteractionEdge, Keyed,
    NodeKind, Patient, PatientGraph, Relation,
};
use async_trait::async_trait;

use super::ClinicalStore;
use super::seed;

#[derive(Default)]
struct State {
    nodes: HashMap<(NodeKind, String), ClinicalNode>,
    edges: BTreeSet<(&'static str, String, String)>,
    interactions: Vec<InteractionEdge>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with the sample dataset
    pub fn seeded() -> Self {
        let store = Self::new();
        let data = seed::dataset();
        {
            let mut state = store.state.write().unwrap();
            for node in data.nodes() {
                state
                    .nodes
                    .insert((node.kind(), node.id().to_string()), node);
            }
            for (relation, from, to) in data.links() {
                state.edges.insert((relation.rel_type(), from, to));
            }
            state.interactions = data.interactions;
        }
        store
    }

    /// A store whose every call fails as if the database were down
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn add_interaction(&self, edge: InteractionEdge) {
        self.state.write().unwrap().interactions.push(edge);
    }

    pub fn edge_count(&self, relation: Relation, from: &str, to: &str) -> usize {
        let state = self.state.read().unwrap();
        state
            .edges
            .iter()
            .filter(|(rel, f, t)| *rel == relation.rel_type() && f == from && t == to)
            .count()
    }

    fn check(&self) -> Result<(), ClinicalError> {
        if self.unavailable {
            return Err(ClinicalError::Connection("store unavailable".into()));
        }
        Ok(())
    }
}

impl State {
    fn targets(&self, relation: Relation, from: &str) -> Vec<ClinicalNode> {
        self.edges
            .iter()
            .filter(|(rel, f, _)| *rel == relation.rel_type() && f == from)
            .filter_map(|(_, _, to)| self.nodes.get(&(relation.target(), to.clone())).cloned())
            .collect()
    }

    fn drugs(&self, relation: Relation, from: &str) -> Vec<Drug> {
        self.targets(relation, from)
            .into_iter()
            .filter_map(|n| match n {
                ClinicalNode::Drug(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    fn names(&self, relation: Relation, from: &str) -> BTreeSet<String> {
        self.targets(relation, from)
            .iter()
            .map(|n| n.name().to_string())
            .collect()
    }
}

fn sort_nodes(nodes: &mut [ClinicalNode]) {
    nodes.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));
}

#[async_trait]
impl ClinicalStore for MemoryStore {
    async fn create_node(&self, node: ClinicalNode) -> Result<ClinicalNode, ClinicalError> {
        self.check()?;
        let key = (node.kind(), node.id().to_string());
        let mut state = self.state.write().unwrap();
        if state.nodes.contains_key(&key) {
            return Err(ClinicalError::Query(format!(
                "{} {} already exists",
                key.0.label(),
                key.1
            )));
        }
        state.nodes.insert(key, node.clone());
        Ok(node)
    }

    async fn get_node(&self, kind: NodeKind, id: &str) -> Result<Option<ClinicalNode>, ClinicalError> {
        self.check()?;
        let state = self.state.read().unwrap();
        Ok(state.nodes.get(&(kind, id.to_string())).cloned())
    }

    async fn list_nodes(&self, kind: NodeKind) -> Result<Vec<ClinicalNode>, ClinicalError> {
        self.check()?;
        let state = self.state.read().unwrap();
        let mut nodes: Vec<_> = state
            .nodes
            .values()
            .filter(|n| n.kind() == kind)
            .cloned()
            .collect();
        sort_nodes(&mut nodes);
        Ok(nodes)
    }

    async fn link(&self, relation: Relation, from_id: &str, to_id: &str) -> Result<bool, ClinicalError> {
        self.check()?;
        let mut state = self.state.write().unwrap();
        let endpoints = state
            .nodes
            .contains_key(&(relation.source(), from_id.to_string()))
            && state
                .nodes
                .contains_key(&(relation.target(), to_id.to_string()));
        if !endpoints {
            return Ok(false);
        }
        state
            .edges
            .insert((relation.rel_type(), from_id.to_string(), to_id.to_string()));
        Ok(true)
    }

    async fn patient_graph(&self, patient_id: &str) -> Result<Option<PatientGraph>, ClinicalError> {
        self.check()?;
        let state = self.state.read().unwrap();
        let Some(ClinicalNode::Patient(patient)) = state
            .nodes
            .get(&(NodeKind::Patient, patient_id.to_string()))
            .cloned()
        else {
            return Ok(None);
        };

        let mut slots = GraphSlots::default();
        for node in state.targets(Relation::HasSymptom, patient_id) {
            if let ClinicalNode::Symptom(s) = node {
                slots.symptoms.push(Some(s));
            }
        }
        for node in state.targets(Relation::HasDisease, patient_id) {
            if let ClinicalNode::Disease(d) = node {
                for protocol in state.targets(Relation::FollowProtocol, d.id()) {
                    if let ClinicalNode::TreatmentProtocol(tp) = protocol {
                        slots.treatment_protocols.push(Some(tp));
                    }
                }
                slots.diseases.push(Some(d));
            }
        }
        slots.drugs = state
            .drugs(Relation::TakesDrug, patient_id)
            .into_iter()
            .map(Some)
            .collect();
        for node in state.targets(Relation::HasLabResult, patient_id) {
            if let ClinicalNode::LabTest(l) = node {
                slots.lab_tests.push(Some(l));
            }
        }
        Ok(Some(PatientGraph::assemble(patient, slots)))
    }

    async fn patient_drugs(&self, patient_id: &str) -> Result<Vec<Drug>, ClinicalError> {
        self.check()?;
        let state = self.state.read().unwrap();
        Ok(state.drugs(Relation::TakesDrug, patient_id))
    }

    async fn interactions_among(&self, drug_ids: &[String]) -> Result<Vec<InteractionEdge>, ClinicalError> {
        self.check()?;
        let state = self.state.read().unwrap();
        Ok(state
            .interactions
            .iter()
            .filter(|e| drug_ids.contains(&e.from_id) && drug_ids.contains(&e.to_id))
            .cloned()
            .collect())
    }

    async fn treatments_for_patient(&self, patient_id: &str) -> Result<Vec<Drug>, ClinicalError> {
        self.check()?;
        let state = self.state.read().unwrap();
        Ok(state
            .targets(Relation::HasDisease, patient_id)
            .iter()
            .flat_map(|disease| state.drugs(Relation::TreatedBy, disease.id()))
            .collect())
    }

    async fn clinical_profiles(&self) -> Result<Vec<ClinicalProfile>, ClinicalError> {
        self.check()?;
        let state = self.state.read().unwrap();
        Ok(state
            .nodes
            .values()
            .filter_map(|n| match n {
                ClinicalNode::Patient(p) => Some(ClinicalProfile {
                    patient_id: p.id.clone(),
                    patient_name: p.name.clone(),
                    symptoms: state.names(Relation::HasSymptom, &p.id),
                    diseases: state.names(Relation::HasDisease, &p.id),
                    drugs: state.names(Relation::TakesDrug, &p.id),
                }),
                _ => None,
            })
            .collect())
    }

    async fn patients_linked_to(
        &self,
        relation: Relation,
        target_id: &str,
        limit: usize,
    ) -> Result<Vec<Patient>, ClinicalError> {
        self.check()?;
        let state = self.state.read().unwrap();
        let mut patients: Vec<Patient> = state
            .edges
            .iter()
            .filter(|(rel, _, to)| *rel == relation.rel_type() && to == target_id)
            .filter_map(|(_, from, _)| match state.nodes.get(&(NodeKind::Patient, from.clone())) {
                Some(ClinicalNode::Patient(p)) => Some(p.clone()),
                _ => None,
            })
            .collect();
        patients.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        patients.truncate(limit);
        Ok(patients)
    }

    async fn ping(&self) -> Result<(), ClinicalError> {
        self.check()
    }
}
