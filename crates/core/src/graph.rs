//! Aggregated clinical subgraph of a single patient

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{Disease, Drug, Keyed, LabTest, Patient, Symptom, TreatmentProtocol};

/// Everything reachable from one patient in a single traversal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientGraph {
    pub patient: Patient,
    pub symptoms: Vec<Symptom>,
    pub diseases: Vec<Disease>,
    pub drugs: Vec<Drug>,
    pub lab_tests: Vec<LabTest>,
    pub treatment_protocols: Vec<TreatmentProtocol>,
}

/// Collected slots straight from an outer-join traversal. `None` marks the
/// placeholder an optional match yields when nothing is linked.
#[derive(Debug, Default)]
pub struct GraphSlots {
    pub symptoms: Vec<Option<Symptom>>,
    pub diseases: Vec<Option<Disease>>,
    pub drugs: Vec<Option<Drug>>,
    pub lab_tests: Vec<Option<LabTest>>,
    pub treatment_protocols: Vec<Option<TreatmentProtocol>>,
}

impl PatientGraph {
    /// Drop placeholders, deduplicate by node id and order each list by name.
    pub fn assemble(patient: Patient, slots: GraphSlots) -> Self {
        Self {
            patient,
            symptoms: distinct(slots.symptoms),
            diseases: distinct(slots.diseases),
            drugs: distinct(slots.drugs),
            lab_tests: distinct(slots.lab_tests),
            treatment_protocols: distinct(slots.treatment_protocols),
        }
    }

    pub fn context(&self) -> PatientContext {
        PatientContext {
            patient_name: self.patient.name.clone(),
            age: self.patient.age,
            symptoms: names(&self.symptoms),
            diseases: names(&self.diseases),
            drugs: names(&self.drugs),
            lab_tests: names(&self.lab_tests),
        }
    }
}

fn distinct<T: Keyed>(slots: Vec<Option<T>>) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut nodes: Vec<T> = slots
        .into_iter()
        .flatten()
        .filter(|node| seen.insert(node.id().to_string()))
        .collect();
    nodes.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));
    nodes
}

fn names<T: Keyed>(nodes: &[T]) -> Vec<String> {
    nodes.iter().map(|n| n.name().to_string()).collect()
}

/// Flattened patient summary used to build explanation prompts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientContext {
    pub patient_name: String,
    pub age: i64,
    pub symptoms: Vec<String>,
    pub diseases: Vec<String>,
    pub drugs: Vec<String>,
    pub lab_tests: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> Patient {
        Patient {
            id: "pat_003".into(),
            name: "Robert Williams".into(),
            age: 72,
            gender: Some("Male".into()),
            medical_record_number: Some("MRN003".into()),
        }
    }

    fn symptom(id: &str, name: &str) -> Symptom {
        Symptom {
            id: id.into(),
            name: name.into(),
            severity: None,
            onset_date: None,
        }
    }

    #[test]
    fn placeholders_are_dropped() {
        let slots = GraphSlots {
            symptoms: vec![None],
            diseases: vec![None, None],
            ..Default::default()
        };
        let graph = PatientGraph::assemble(patient(), slots);
        assert!(graph.symptoms.is_empty());
        assert!(graph.diseases.is_empty());
        assert!(graph.treatment_protocols.is_empty());
    }

    #[test]
    fn duplicates_collapse_by_id() {
        let slots = GraphSlots {
            symptoms: vec![
                Some(symptom("sym_002", "Shortness of Breath")),
                Some(symptom("sym_001", "Chest Pain")),
                Some(symptom("sym_002", "Shortness of Breath")),
                None,
            ],
            ..Default::default()
        };
        let graph = PatientGraph::assemble(patient(), slots);
        let ids: Vec<_> = graph.symptoms.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["sym_001", "sym_002"]);
    }

    #[test]
    fn context_lists_names() {
        let slots = GraphSlots {
            symptoms: vec![Some(symptom("sym_001", "Chest Pain"))],
            ..Default::default()
        };
        let context = PatientGraph::assemble(patient(), slots).context();
        assert_eq!(context.patient_name, "Robert Williams");
        assert_eq!(context.age, 72);
        assert_eq!(context.symptoms, vec!["Chest Pain".to_string()]);
        assert!(context.drugs.is_empty());
    }
}
