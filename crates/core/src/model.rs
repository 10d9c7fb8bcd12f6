//! Clinical graph nodes, their creation payloads, and relationship types

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::ClinicalError;

/// Oldest age accepted for a patient record
pub const MAX_PATIENT_AGE: i64 = 150;

/// Node labels in the clinical graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Patient,
    Symptom,
    Disease,
    Drug,
    LabTest,
    TreatmentProtocol,
}

impl NodeKind {
    /// Graph label used in queries
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Patient => "Patient",
            NodeKind::Symptom => "Symptom",
            NodeKind::Disease => "Disease",
            NodeKind::Drug => "Drug",
            NodeKind::LabTest => "LabTest",
            NodeKind::TreatmentProtocol => "TreatmentProtocol",
        }
    }

    /// Human-readable name for messages
    pub fn noun(self) -> &'static str {
        match self {
            NodeKind::Patient => "Patient",
            NodeKind::Symptom => "Symptom",
            NodeKind::Disease => "Disease",
            NodeKind::Drug => "Drug",
            NodeKind::LabTest => "Lab test",
            NodeKind::TreatmentProtocol => "Treatment protocol",
        }
    }

    pub const ALL: [NodeKind; 6] = [
        NodeKind::Patient,
        NodeKind::Symptom,
        NodeKind::Disease,
        NodeKind::Drug,
        NodeKind::LabTest,
        NodeKind::TreatmentProtocol,
    ];
}

/// Directed relationship types that can be created through the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    HasSymptom,
    HasDisease,
    TakesDrug,
    HasLabResult,
    TreatedBy,
    FollowProtocol,
}

impl Relation {
    pub fn rel_type(self) -> &'static str {
        match self {
            Relation::HasSymptom => "HAS_SYMPTOM",
            Relation::HasDisease => "HAS_DISEASE",
            Relation::TakesDrug => "TAKES_DRUG",
            Relation::HasLabResult => "HAS_LAB_RESULT",
            Relation::TreatedBy => "TREATED_BY",
            Relation::FollowProtocol => "FOLLOW_PROTOCOL",
        }
    }

    pub fn source(self) -> NodeKind {
        match self {
            Relation::HasSymptom
            | Relation::HasDisease
            | Relation::TakesDrug
            | Relation::HasLabResult => NodeKind::Patient,
            Relation::TreatedBy | Relation::FollowProtocol => NodeKind::Disease,
        }
    }

    pub fn target(self) -> NodeKind {
        match self {
            Relation::HasSymptom => NodeKind::Symptom,
            Relation::HasDisease => NodeKind::Disease,
            Relation::TakesDrug | Relation::TreatedBy => NodeKind::Drug,
            Relation::HasLabResult => NodeKind::LabTest,
            Relation::FollowProtocol => NodeKind::TreatmentProtocol,
        }
    }
}

// ---------------------------------------------------------------------------
// Node records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub age: i64,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub medical_record_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub onset_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disease {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icd10_code: Option<String>,
    #[serde(default)]
    pub diagnosis_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drug {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rxnorm_code: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub reference_range: Option<String>,
    #[serde(default)]
    pub test_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentProtocol {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub guidelines: Option<String>,
}

// ---------------------------------------------------------------------------
// Creation payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub age: i64,
    pub gender: Option<String>,
    pub medical_record_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSymptom {
    pub name: String,
    pub severity: Option<String>,
    pub onset_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDisease {
    pub name: String,
    pub icd10_code: Option<String>,
    pub diagnosis_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDrug {
    pub name: String,
    pub rxnorm_code: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLabTest {
    pub name: String,
    pub value: Option<String>,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    pub test_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTreatmentProtocol {
    pub name: String,
    pub description: Option<String>,
    pub guidelines: Option<String>,
}

/// Trimmed, non-blank name or a validation error
fn required_name(kind: NodeKind, name: String) -> Result<String, ClinicalError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ClinicalError::Validation(format!(
            "{} name must not be blank",
            kind.noun()
        )));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Uniform access for catalog operations
// ---------------------------------------------------------------------------

/// Any node record, tagged by kind
#[derive(Debug, Clone, PartialEq)]
pub enum ClinicalNode {
    Patient(Patient),
    Symptom(Symptom),
    Disease(Disease),
    Drug(Drug),
    LabTest(LabTest),
    TreatmentProtocol(TreatmentProtocol),
}

impl ClinicalNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            ClinicalNode::Patient(_) => NodeKind::Patient,
            ClinicalNode::Symptom(_) => NodeKind::Symptom,
            ClinicalNode::Disease(_) => NodeKind::Disease,
            ClinicalNode::Drug(_) => NodeKind::Drug,
            ClinicalNode::LabTest(_) => NodeKind::LabTest,
            ClinicalNode::TreatmentProtocol(_) => NodeKind::TreatmentProtocol,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ClinicalNode::Patient(n) => &n.id,
            ClinicalNode::Symptom(n) => &n.id,
            ClinicalNode::Disease(n) => &n.id,
            ClinicalNode::Drug(n) => &n.id,
            ClinicalNode::LabTest(n) => &n.id,
            ClinicalNode::TreatmentProtocol(n) => &n.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ClinicalNode::Patient(n) => &n.name,
            ClinicalNode::Symptom(n) => &n.name,
            ClinicalNode::Disease(n) => &n.name,
            ClinicalNode::Drug(n) => &n.name,
            ClinicalNode::LabTest(n) => &n.name,
            ClinicalNode::TreatmentProtocol(n) => &n.name,
        }
    }
}

/// Identity and display name shared by every node record
pub trait Keyed {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

macro_rules! keyed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Keyed for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn name(&self) -> &str {
                    &self.name
                }
            }
        )*
    };
}

keyed!(Patient, Symptom, Disease, Drug, LabTest, TreatmentProtocol);

/// A node type that supports create / get / list through the generic
/// catalog service and routes.
pub trait CatalogEntity:
    Keyed + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Creation payload accepted by the API
    type New: DeserializeOwned + Send + 'static;

    const KIND: NodeKind;

    /// Validate a creation payload and assign it the given id
    fn from_new(id: String, new: Self::New) -> Result<Self, ClinicalError>;

    fn into_node(self) -> ClinicalNode;

    fn from_node(node: ClinicalNode) -> Option<Self>;
}

impl CatalogEntity for Patient {
    type New = NewPatient;
    const KIND: NodeKind = NodeKind::Patient;

    fn from_new(id: String, new: NewPatient) -> Result<Self, ClinicalError> {
        if !(0..=MAX_PATIENT_AGE).contains(&new.age) {
            return Err(ClinicalError::Validation(format!(
                "age must be between 0 and {}, got {}",
                MAX_PATIENT_AGE, new.age
            )));
        }
        Ok(Patient {
            id,
            name: required_name(Self::KIND, new.name)?,
            age: new.age,
            gender: new.gender,
            medical_record_number: new.medical_record_number,
        })
    }

    fn into_node(self) -> ClinicalNode {
        ClinicalNode::Patient(self)
    }

    fn from_node(node: ClinicalNode) -> Option<Self> {
        match node {
            ClinicalNode::Patient(p) => Some(p),
            _ => None,
        }
    }
}

impl CatalogEntity for Symptom {
    type New = NewSymptom;
    const KIND: NodeKind = NodeKind::Symptom;

    fn from_new(id: String, new: NewSymptom) -> Result<Self, ClinicalError> {
        Ok(Symptom {
            id,
            name: required_name(Self::KIND, new.name)?,
            severity: new.severity,
            onset_date: new.onset_date,
        })
    }

    fn into_node(self) -> ClinicalNode {
        ClinicalNode::Symptom(self)
    }

    fn from_node(node: ClinicalNode) -> Option<Self> {
        match node {
            ClinicalNode::Symptom(s) => Some(s),
            _ => None,
        }
    }
}

impl CatalogEntity for Disease {
    type New = NewDisease;
    const KIND: NodeKind = NodeKind::Disease;

    fn from_new(id: String, new: NewDisease) -> Result<Self, ClinicalError> {
        Ok(Disease {
            id,
            name: required_name(Self::KIND, new.name)?,
            icd10_code: new.icd10_code,
            diagnosis_date: new.diagnosis_date,
        })
    }

    fn into_node(self) -> ClinicalNode {
        ClinicalNode::Disease(self)
    }

    fn from_node(node: ClinicalNode) -> Option<Self> {
        match node {
            ClinicalNode::Disease(d) => Some(d),
            _ => None,
        }
    }
}

impl CatalogEntity for Drug {
    type New = NewDrug;
    const KIND: NodeKind = NodeKind::Drug;

    fn from_new(id: String, new: NewDrug) -> Result<Self, ClinicalError> {
        Ok(Drug {
            id,
            name: required_name(Self::KIND, new.name)?,
            rxnorm_code: new.rxnorm_code,
            dosage: new.dosage,
            frequency: new.frequency,
        })
    }

    fn into_node(self) -> ClinicalNode {
        ClinicalNode::Drug(self)
    }

    fn from_node(node: ClinicalNode) -> Option<Self> {
        match node {
            ClinicalNode::Drug(d) => Some(d),
            _ => None,
        }
    }
}

impl CatalogEntity for LabTest {
    type New = NewLabTest;
    const KIND: NodeKind = NodeKind::LabTest;

    fn from_new(id: String, new: NewLabTest) -> Result<Self, ClinicalError> {
        Ok(LabTest {
            id,
            name: required_name(Self::KIND, new.name)?,
            value: new.value,
            unit: new.unit,
            reference_range: new.reference_range,
            test_date: new.test_date,
        })
    }

    fn into_node(self) -> ClinicalNode {
        ClinicalNode::LabTest(self)
    }

    fn from_node(node: ClinicalNode) -> Option<Self> {
        match node {
            ClinicalNode::LabTest(l) => Some(l),
            _ => None,
        }
    }
}

impl CatalogEntity for TreatmentProtocol {
    type New = NewTreatmentProtocol;
    const KIND: NodeKind = NodeKind::TreatmentProtocol;

    fn from_new(id: String, new: NewTreatmentProtocol) -> Result<Self, ClinicalError> {
        Ok(TreatmentProtocol {
            id,
            name: required_name(Self::KIND, new.name)?,
            description: new.description,
            guidelines: new.guidelines,
        })
    }

    fn into_node(self) -> ClinicalNode {
        ClinicalNode::TreatmentProtocol(self)
    }

    fn from_node(node: ClinicalNode) -> Option<Self> {
        match node {
            ClinicalNode::TreatmentProtocol(t) => Some(t),
            _ => None,
        }
    }
}
