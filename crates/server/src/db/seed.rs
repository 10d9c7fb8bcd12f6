//! Sample clinical dataset used by the `seed` binary and by tests

use aegis_core::{
    ClinicalError, ClinicalNode, Disease, Drug, InteractionEdge, LabTest, Patient, Relation,
    Symptom, TreatmentProtocol,
};

use super::{ClinicalStore, Neo4jStore, Statement};

/// A patient together with the ids it links to
pub struct SeedPatient {
    pub patient: Patient,
    pub symptoms: &'static [&'static str],
    pub diseases: &'static [&'static str],
    pub drugs: &'static [&'static str],
    pub lab_tests: &'static [&'static str],
}

pub struct Dataset {
    pub symptoms: Vec<Symptom>,
    pub diseases: Vec<Disease>,
    pub drugs: Vec<Drug>,
    pub interactions: Vec<InteractionEdge>,
    /// (disease id, drug id)
    pub treatments: Vec<(&'static str, &'static str)>,
    pub lab_tests: Vec<LabTest>,
    pub protocols: Vec<TreatmentProtocol>,
    /// (disease id, protocol id)
    pub protocol_links: Vec<(&'static str, &'static str)>,
    pub patients: Vec<SeedPatient>,
}

/// Counts reported after seeding
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Nodes deleted before loading
    pub removed: usize,
    pub nodes: usize,
    pub interactions: usize,
    pub links: usize,
}

impl Dataset {
    /// Every node, in creation order
    pub fn nodes(&self) -> Vec<ClinicalNode> {
        let mut nodes = Vec::new();
        nodes.extend(self.symptoms.iter().cloned().map(ClinicalNode::Symptom));
        nodes.extend(self.diseases.iter().cloned().map(ClinicalNode::Disease));
        nodes.extend(self.drugs.iter().cloned().map(ClinicalNode::Drug));
        nodes.extend(self.lab_tests.iter().cloned().map(ClinicalNode::LabTest));
        nodes.extend(self.protocols.iter().cloned().map(ClinicalNode::TreatmentProtocol));
        nodes.extend(self.patients.iter().map(|p| ClinicalNode::Patient(p.patient.clone())));
        nodes
    }

    /// Every relationship except drug interactions, as (relation, from, to)
    pub fn links(&self) -> Vec<(Relation, String, String)> {
        let mut links: Vec<_> = self
            .treatments
            .iter()
            .map(|&(disease, drug)| (Relation::TreatedBy, disease, drug))
            .chain(
                self.protocol_links
                    .iter()
                    .map(|&(disease, protocol)| (Relation::FollowProtocol, disease, protocol)),
            )
            .map(|(relation, from, to)| (relation, from.to_string(), to.to_string()))
            .collect();

        for seed in &self.patients {
            let groups = [
                (Relation::HasSymptom, seed.symptoms),
                (Relation::HasDisease, seed.diseases),
                (Relation::TakesDrug, seed.drugs),
                (Relation::HasLabResult, seed.lab_tests),
            ];
            for (relation, targets) in groups {
                links.extend(
                    targets
                        .iter()
                        .map(|target| (relation, seed.patient.id.clone(), target.to_string())),
                );
            }
        }
        links
    }
}

fn symptom(id: &str, name: &str, severity: &str) -> Symptom {
    Symptom {
        id: id.into(),
        name: name.into(),
        severity: Some(severity.into()),
        onset_date: None,
    }
}

fn disease(id: &str, name: &str, icd10: &str) -> Disease {
    Disease {
        id: id.into(),
        name: name.into(),
        icd10_code: Some(icd10.into()),
        diagnosis_date: None,
    }
}

fn drug(id: &str, name: &str, rxnorm: &str, dosage: &str, frequency: &str) -> Drug {
    Drug {
        id: id.into(),
        name: name.into(),
        rxnorm_code: Some(rxnorm.into()),
        dosage: Some(dosage.into()),
        frequency: Some(frequency.into()),
    }
}

fn interaction(from: &str, to: &str, severity: &str, level: &str, description: &str) -> InteractionEdge {
    InteractionEdge {
        from_id: from.into(),
        to_id: to.into(),
        severity: Some(severity.into()),
        risk_level: Some(level.into()),
        description: Some(description.into()),
    }
}

fn lab(id: &str, name: &str, value: &str, unit: &str, range: &str) -> LabTest {
    LabTest {
        id: id.into(),
        name: name.into(),
        value: Some(value.into()),
        unit: Some(unit.into()),
        reference_range: Some(range.into()),
        test_date: None,
    }
}

fn protocol(id: &str, name: &str, description: &str) -> TreatmentProtocol {
    TreatmentProtocol {
        id: id.into(),
        name: name.into(),
        description: Some(description.into()),
        guidelines: None,
    }
}

fn patient(id: &str, name: &str, age: i64, gender: &str, mrn: &str) -> Patient {
    Patient {
        id: id.into(),
        name: name.into(),
        age,
        gender: Some(gender.into()),
        medical_record_number: Some(mrn.into()),
    }
}

pub fn dataset() -> Dataset {
    Dataset {
        symptoms: vec![
            symptom("sym_001", "Chest Pain", "Moderate"),
            symptom("sym_002", "Shortness of Breath", "Moderate"),
            symptom("sym_003", "Headache", "Mild"),
            symptom("sym_004", "Fever", "Moderate"),
            symptom("sym_005", "Cough", "Mild"),
            symptom("sym_006", "Fatigue", "Mild"),
            symptom("sym_007", "Joint Pain", "Moderate"),
            symptom("sym_008", "Nausea", "Mild"),
        ],
        diseases: vec![
            disease("dis_001", "Hypertension", "I10"),
            disease("dis_002", "Type 2 Diabetes", "E11"),
            disease("dis_003", "Coronary Artery Disease", "I25"),
            disease("dis_004", "Chronic Obstructive Pulmonary Disease", "J44"),
            disease("dis_005", "Osteoarthritis", "M19"),
            disease("dis_006", "Depression", "F32"),
        ],
        drugs: vec![
            drug("drug_001", "Lisinopril", "314076", "10mg", "Daily"),
            drug("drug_002", "Metformin", "6809", "500mg", "Twice daily"),
            drug("drug_003", "Atorvastatin", "83367", "20mg", "Daily"),
            drug("drug_004", "Aspirin", "1191", "81mg", "Daily"),
            drug("drug_005", "Warfarin", "11289", "5mg", "Daily"),
            drug("drug_006", "Ibuprofen", "5640", "400mg", "As needed"),
            drug("drug_007", "Albuterol", "435", "90mcg", "As needed"),
            drug("drug_008", "Sertraline", "36437", "50mg", "Daily"),
            drug("drug_009", "Amlodipine", "17767", "5mg", "Daily"),
        ],
        interactions: vec![
            interaction(
                "drug_005",
                "drug_004",
                "High",
                "high",
                "Increased risk of bleeding when taken together",
            ),
            interaction(
                "drug_005",
                "drug_006",
                "High",
                "high",
                "Increased risk of bleeding and gastrointestinal complications",
            ),
            interaction(
                "drug_001",
                "drug_009",
                "Moderate",
                "moderate",
                "Both are antihypertensives - monitor blood pressure closely",
            ),
        ],
        treatments: vec![
            ("dis_001", "drug_001"),
            ("dis_001", "drug_009"),
            ("dis_002", "drug_002"),
            ("dis_003", "drug_004"),
            ("dis_003", "drug_003"),
            ("dis_006", "drug_008"),
        ],
        lab_tests: vec![
            lab("lab_001", "Hemoglobin A1C", "7.2", "%", "<7.0"),
            lab("lab_002", "Total Cholesterol", "220", "mg/dL", "<200"),
            lab("lab_003", "Blood Pressure", "145/92", "mmHg", "<120/80"),
        ],
        protocols: vec![
            protocol(
                "proto_001",
                "Hypertension Management",
                "ACE inhibitor or ARB as first-line",
            ),
            protocol(
                "proto_002",
                "Diabetes Management",
                "Metformin as first-line, lifestyle modifications",
            ),
        ],
        protocol_links: vec![("dis_001", "proto_001"), ("dis_002", "proto_002")],
        patients: vec![
            SeedPatient {
                patient: patient("pat_001", "John Smith", 65, "Male", "MRN001"),
                symptoms: &["sym_001", "sym_002"],
                diseases: &["dis_001", "dis_003"],
                drugs: &["drug_001", "drug_004", "drug_003"],
                lab_tests: &["lab_003"],
            },
            SeedPatient {
                patient: patient("pat_002", "Mary Johnson", 58, "Female", "MRN002"),
                symptoms: &["sym_006", "sym_008"],
                diseases: &["dis_002", "dis_006"],
                drugs: &["drug_002", "drug_008"],
                lab_tests: &["lab_001"],
            },
            SeedPatient {
                patient: patient("pat_003", "Robert Williams", 72, "Male", "MRN003"),
                symptoms: &["sym_001"],
                diseases: &["dis_003"],
                drugs: &["drug_005", "drug_004", "drug_006"],
                lab_tests: &[],
            },
            SeedPatient {
                patient: patient("pat_004", "Sarah Davis", 55, "Female", "MRN004"),
                symptoms: &["sym_007", "sym_003"],
                diseases: &["dis_005"],
                drugs: &["drug_006"],
                lab_tests: &[],
            },
            SeedPatient {
                patient: patient("pat_005", "James Brown", 68, "Male", "MRN005"),
                symptoms: &["sym_001", "sym_002"],
                diseases: &["dis_001", "dis_003"],
                drugs: &["drug_001", "drug_009"],
                lab_tests: &["lab_002", "lab_003"],
            },
        ],
    }
}

/// Wipe the graph and load [`dataset`]
pub async fn seed_database(store: &Neo4jStore) -> Result<SeedSummary, ClinicalError> {
    store.ensure_schema().await;

    let cleared = store
        .db()
        .run_write(
            "clear_graph",
            Statement::new("MATCH (n) WITH n, n.id AS id DETACH DELETE n RETURN id"),
        )
        .await?;
    tracing::info!(removed = cleared.records, "Cleared existing graph data");

    let data = dataset();
    let mut summary = SeedSummary {
        removed: cleared.records,
        ..SeedSummary::default()
    };

    for node in data.nodes() {
        store.create_node(node).await?;
        summary.nodes += 1;
    }

    for edge in &data.interactions {
        store.create_interaction(edge).await?;
        summary.interactions += 1;
    }

    for (relation, from, to) in data.links() {
        if !store.link(relation, &from, &to).await? {
            return Err(ClinicalError::InvalidData(format!(
                "seed link {} {} -> {} has a missing endpoint",
                relation.rel_type(),
                from,
                to
            )));
        }
        summary.links += 1;
    }

    tracing::info!(
        nodes = summary.nodes,
        interactions = summary.interactions,
        links = summary.links,
        "Graph seeded"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn dataset_counts() {
        let data = dataset();
        assert_eq!(data.symptoms.len(), 8);
        assert_eq!(data.diseases.len(), 6);
        assert_eq!(data.drugs.len(), 9);
        assert_eq!(data.interactions.len(), 3);
        assert_eq!(data.treatments.len(), 6);
        assert_eq!(data.lab_tests.len(), 3);
        assert_eq!(data.protocols.len(), 2);
        assert_eq!(data.patients.len(), 5);
        assert_eq!(data.nodes().len(), 8 + 6 + 9 + 3 + 2 + 5);
    }

    #[test]
    fn every_link_endpoint_exists() {
        let data = dataset();
        let ids: HashSet<String> = data.nodes().iter().map(|n| n.id().to_string()).collect();
        for (relation, from, to) in data.links() {
            assert!(ids.contains(&from), "{} source {} missing", relation.rel_type(), from);
            assert!(ids.contains(&to), "{} target {} missing", relation.rel_type(), to);
        }
        for edge in &data.interactions {
            assert!(ids.contains(&edge.from_id) && ids.contains(&edge.to_id));
        }
    }
}
