//! `ClinicalStore` over Neo4j

use aegis_core::{
    ClinicalError, ClinicalNode, ClinicalProfile, Disease, Drug, GraphSlots, InteractionEdge,
    LabTest, NodeKind, Patient, PatientGraph, Relation, Symptom, TreatmentProtocol,
};
use async_trait::async_trait;
use neo4rs::{BoltType, Row};

use super::ClinicalStore;
use super::graph::{GraphDb, Statement, field, nullable};

/// Clinical graph stored in Neo4j
pub struct Neo4jStore {
    db: GraphDb,
}

impl Neo4jStore {
    pub fn new(db: GraphDb) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &GraphDb {
        &self.db
    }

    /// Create a uniqueness constraint on `id` for every label.
    ///
    /// Best-effort: a failure is logged and startup continues.
    pub async fn ensure_schema(&self) {
        for kind in NodeKind::ALL {
            let label = kind.label();
            let statement = Statement::new(format!(
                "CREATE CONSTRAINT {}_id_unique IF NOT EXISTS FOR (n:{}) REQUIRE n.id IS UNIQUE",
                label.to_ascii_lowercase(),
                label
            ));
            if let Err(e) = self.db.run_write("ensure_constraint", statement).await {
                tracing::warn!(label, error = %e, "Could not ensure uniqueness constraint");
            }
        }
    }

    /// Store an `INTERACTS_WITH` edge in the given direction
    pub async fn create_interaction(&self, edge: &InteractionEdge) -> Result<bool, ClinicalError> {
        let statement = Statement::new(
            "MATCH (a:Drug {id: $from_id})
             MATCH (b:Drug {id: $to_id})
             MERGE (a)-[r:INTERACTS_WITH]->(b)
             SET r.severity = $severity, r.risk_level = $risk_level, r.description = $description
             RETURN count(r) AS linked",
        )
        .param("from_id", edge.from_id.as_str())
        .param("to_id", edge.to_id.as_str())
        .param("severity", nullable(&edge.severity))
        .param("risk_level", nullable(&edge.risk_level))
        .param("description", nullable(&edge.description));

        let rows = self.db.run_query("create_interaction", statement).await?;
        linked(&rows, "create_interaction")
    }
}

/// Property assignments for a node, in a stable order
fn node_properties(node: &ClinicalNode) -> Vec<(&'static str, BoltType)> {
    let mut props = vec![
        ("id", BoltType::from(node.id())),
        ("name", BoltType::from(node.name())),
    ];
    match node {
        ClinicalNode::Patient(p) => {
            props.push(("age", BoltType::from(p.age)));
            props.push(("gender", nullable(&p.gender)));
            props.push(("medical_record_number", nullable(&p.medical_record_number)));
        }
        ClinicalNode::Symptom(s) => {
            props.push(("severity", nullable(&s.severity)));
            props.push(("onset_date", nullable(&s.onset_date)));
        }
        ClinicalNode::Disease(d) => {
            props.push(("icd10_code", nullable(&d.icd10_code)));
            props.push(("diagnosis_date", nullable(&d.diagnosis_date)));
        }
        ClinicalNode::Drug(d) => {
            props.push(("rxnorm_code", nullable(&d.rxnorm_code)));
            props.push(("dosage", nullable(&d.dosage)));
            props.push(("frequency", nullable(&d.frequency)));
        }
        ClinicalNode::LabTest(l) => {
            props.push(("value", nullable(&l.value)));
            props.push(("unit", nullable(&l.unit)));
            props.push(("reference_range", nullable(&l.reference_range)));
            props.push(("test_date", nullable(&l.test_date)));
        }
        ClinicalNode::TreatmentProtocol(t) => {
            props.push(("description", nullable(&t.description)));
            props.push(("guidelines", nullable(&t.guidelines)));
        }
    }
    props
}

fn node_from_row(kind: NodeKind, row: &Row, operation: &str) -> Result<ClinicalNode, ClinicalError> {
    Ok(match kind {
        NodeKind::Patient => ClinicalNode::Patient(field(row, operation, "node")?),
        NodeKind::Symptom => ClinicalNode::Symptom(field(row, operation, "node")?),
        NodeKind::Disease => ClinicalNode::Disease(field(row, operation, "node")?),
        NodeKind::Drug => ClinicalNode::Drug(field(row, operation, "node")?),
        NodeKind::LabTest => ClinicalNode::LabTest(field(row, operation, "node")?),
        NodeKind::TreatmentProtocol => {
            ClinicalNode::TreatmentProtocol(field(row, operation, "node")?)
        }
    })
}

fn linked(rows: &[Row], operation: &str) -> Result<bool, ClinicalError> {
    match rows.first() {
        Some(row) => Ok(field::<i64>(row, operation, "linked")? > 0),
        None => Ok(false),
    }
}

fn drugs_from_rows(rows: &[Row], operation: &str) -> Result<Vec<Drug>, ClinicalError> {
    rows.iter().map(|row| field(row, operation, "node")).collect()
}

#[async_trait]
impl ClinicalStore for Neo4jStore {
    async fn create_node(&self, node: ClinicalNode) -> Result<ClinicalNode, ClinicalError> {
        let kind = node.kind();
        let props = node_properties(&node);
        let assignments = props
            .iter()
            .map(|(key, _)| format!("n.{key} = ${key}"))
            .collect::<Vec<_>>()
            .join(", ");

        let mut statement = Statement::new(format!(
            "CREATE (n:{}) SET {} RETURN n{{.*}} AS node",
            kind.label(),
            assignments
        ));
        for (key, value) in props {
            statement = statement.param(key, value);
        }

        let rows = self.db.run_query("create_node", statement).await?;
        let row = rows.first().ok_or_else(|| {
            ClinicalError::Query(format!("create_node: no {} returned", kind.label()))
        })?;
        node_from_row(kind, row, "create_node")
    }

    async fn get_node(&self, kind: NodeKind, id: &str) -> Result<Option<ClinicalNode>, ClinicalError> {
        let statement = Statement::new(format!(
            "MATCH (n:{} {{id: $id}}) RETURN n{{.*}} AS node LIMIT 1",
            kind.label()
        ))
        .param("id", id);

        let rows = self.db.run_query("get_node", statement).await?;
        rows.first()
            .map(|row| node_from_row(kind, row, "get_node"))
            .transpose()
    }

    async fn list_nodes(&self, kind: NodeKind) -> Result<Vec<ClinicalNode>, ClinicalError> {
        let statement = Statement::new(format!(
            "MATCH (n:{}) RETURN n{{.*}} AS node ORDER BY n.name, n.id",
            kind.label()
        ));

        let rows = self.db.run_query("list_nodes", statement).await?;
        rows.iter()
            .map(|row| node_from_row(kind, row, "list_nodes"))
            .collect()
    }

    async fn link(&self, relation: Relation, from_id: &str, to_id: &str) -> Result<bool, ClinicalError> {
        let statement = Statement::new(format!(
            "MATCH (a:{} {{id: $from_id}})
             MATCH (b:{} {{id: $to_id}})
             MERGE (a)-[:{}]->(b)
             RETURN count(*) AS linked",
            relation.source().label(),
            relation.target().label(),
            relation.rel_type()
        ))
        .param("from_id", from_id)
        .param("to_id", to_id);

        let rows = self.db.run_query("link", statement).await?;
        linked(&rows, "link")
    }

    async fn patient_graph(&self, patient_id: &str) -> Result<Option<PatientGraph>, ClinicalError> {
        const OP: &str = "patient_graph";
        let statement = Statement::new(
            "MATCH (p:Patient {id: $patient_id})
             OPTIONAL MATCH (p)-[:HAS_SYMPTOM]->(s:Symptom)
             WITH p, collect(DISTINCT s{.*}) AS symptoms
             OPTIONAL MATCH (p)-[:HAS_DISEASE]->(d:Disease)
             OPTIONAL MATCH (d)-[:FOLLOW_PROTOCOL]->(tp:TreatmentProtocol)
             WITH p, symptoms, collect(DISTINCT d{.*}) AS diseases,
                  collect(DISTINCT tp{.*}) AS protocols
             OPTIONAL MATCH (p)-[:TAKES_DRUG]->(dr:Drug)
             WITH p, symptoms, diseases, protocols, collect(DISTINCT dr{.*}) AS drugs
             OPTIONAL MATCH (p)-[:HAS_LAB_RESULT]->(lt:LabTest)
             RETURN p{.*} AS patient, symptoms, diseases, drugs,
                    collect(DISTINCT lt{.*}) AS lab_tests, protocols",
        )
        .param("patient_id", patient_id);

        let rows = self.db.run_query(OP, statement).await?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };

        let patient: Patient = field(row, OP, "patient")?;
        let slots = GraphSlots {
            symptoms: field::<Vec<Option<Symptom>>>(row, OP, "symptoms")?,
            diseases: field::<Vec<Option<Disease>>>(row, OP, "diseases")?,
            drugs: field::<Vec<Option<Drug>>>(row, OP, "drugs")?,
            lab_tests: field::<Vec<Option<LabTest>>>(row, OP, "lab_tests")?,
            treatment_protocols: field::<Vec<Option<TreatmentProtocol>>>(row, OP, "protocols")?,
        };
        Ok(Some(PatientGraph::assemble(patient, slots)))
    }

    async fn patient_drugs(&self, patient_id: &str) -> Result<Vec<Drug>, ClinicalError> {
        let statement = Statement::new(
            "MATCH (:Patient {id: $patient_id})-[:TAKES_DRUG]->(d:Drug)
             RETURN DISTINCT d{.*} AS node",
        )
        .param("patient_id", patient_id);

        let rows = self.db.run_query("patient_drugs", statement).await?;
        drugs_from_rows(&rows, "patient_drugs")
    }

    async fn interactions_among(&self, drug_ids: &[String]) -> Result<Vec<InteractionEdge>, ClinicalError> {
        if drug_ids.len() < 2 {
            return Ok(Vec::new());
        }
        const OP: &str = "interactions_among";
        let statement = Statement::new(
            "MATCH (a:Drug)-[r:INTERACTS_WITH]->(b:Drug)
             WHERE a.id IN $ids AND b.id IN $ids
             RETURN a.id AS from_id, b.id AS to_id,
                    r.severity AS severity, r.risk_level AS risk_level,
                    r.description AS description",
        )
        .param("ids", drug_ids.to_vec());

        let rows = self.db.run_query(OP, statement).await?;
        rows.iter()
            .map(|row| {
                Ok(InteractionEdge {
                    from_id: field(row, OP, "from_id")?,
                    to_id: field(row, OP, "to_id")?,
                    severity: field(row, OP, "severity")?,
                    risk_level: field(row, OP, "risk_level")?,
                    description: field(row, OP, "description")?,
                })
            })
            .collect()
    }

    async fn treatments_for_patient(&self, patient_id: &str) -> Result<Vec<Drug>, ClinicalError> {
        let statement = Statement::new(
            "MATCH (:Patient {id: $patient_id})-[:HAS_DISEASE]->(:Disease)-[:TREATED_BY]->(alt:Drug)
             RETURN DISTINCT alt{.*} AS node",
        )
        .param("patient_id", patient_id);

        let rows = self.db.run_query("treatments_for_patient", statement).await?;
        drugs_from_rows(&rows, "treatments_for_patient")
    }

    async fn clinical_profiles(&self) -> Result<Vec<ClinicalProfile>, ClinicalError> {
        const OP: &str = "clinical_profiles";
        let statement = Statement::new(
            "MATCH (p:Patient)
             OPTIONAL MATCH (p)-[:HAS_SYMPTOM]->(s:Symptom)
             WITH p, collect(DISTINCT s.name) AS symptoms
             OPTIONAL MATCH (p)-[:HAS_DISEASE]->(d:Disease)
             WITH p, symptoms, collect(DISTINCT d.name) AS diseases
             OPTIONAL MATCH (p)-[:TAKES_DRUG]->(dr:Drug)
             RETURN p.id AS patient_id, p.name AS patient_name,
                    symptoms, diseases, collect(DISTINCT dr.name) AS drugs",
        );

        let rows = self.db.run_query(OP, statement).await?;
        rows.iter()
            .map(|row| {
                Ok(ClinicalProfile {
                    patient_id: field(row, OP, "patient_id")?,
                    patient_name: field(row, OP, "patient_name")?,
                    symptoms: field::<Vec<String>>(row, OP, "symptoms")?.into_iter().collect(),
                    diseases: field::<Vec<String>>(row, OP, "diseases")?.into_iter().collect(),
                    drugs: field::<Vec<String>>(row, OP, "drugs")?.into_iter().collect(),
                })
            })
            .collect()
    }

    async fn patients_linked_to(
        &self,
        relation: Relation,
        target_id: &str,
        limit: usize,
    ) -> Result<Vec<Patient>, ClinicalError> {
        const OP: &str = "patients_linked_to";
        let statement = Statement::new(format!(
            "MATCH (p:Patient)-[:{}]->(:{} {{id: $target_id}})
             RETURN DISTINCT p{{.*}} AS node, p.name AS name, p.id AS id
             ORDER BY name, id
             LIMIT $limit",
            relation.rel_type(),
            relation.target().label()
        ))
        .param("target_id", target_id)
        .param("limit", i64::try_from(limit).unwrap_or(i64::MAX));

        let rows = self.db.run_query(OP, statement).await?;
        rows.iter().map(|row| field(row, OP, "node")).collect()
    }

    async fn ping(&self) -> Result<(), ClinicalError> {
        self.db
            .run_query("ping", Statement::new("RETURN 1 AS ok"))
            .await
            .map(|_| ())
    }

    async fn close(&self) {
        self.db.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_cover_every_patient_field() {
        let node = ClinicalNode::Patient(Patient {
            id: "pat_001".into(),
            name: "John Smith".into(),
            age: 65,
            gender: None,
            medical_record_number: Some("MRN001".into()),
        });
        let keys: Vec<_> = node_properties(&node).into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["id", "name", "age", "gender", "medical_record_number"]
        );
    }

    #[test]
    fn absent_optionals_become_null() {
        let node = ClinicalNode::Symptom(Symptom {
            id: "sym_001".into(),
            name: "Chest Pain".into(),
            severity: None,
            onset_date: None,
        });
        let props = node_properties(&node);
        assert!(matches!(props[2].1, BoltType::Null(_)));
    }
}
