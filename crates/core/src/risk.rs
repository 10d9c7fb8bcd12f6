//! Drug-drug interaction classification
//!
//! Interactions are stored as a single directed `INTERACTS_WITH` edge per
//! drug pair, so every lookup here checks both orientations.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ClinicalError;
use crate::model::Drug;

/// Maximum number of substitute drugs returned by a safe-alternative search
pub const SAFE_ALTERNATIVE_LIMIT: usize = 10;

/// Ordinal severity of a drug pair: low < moderate < high < contraindicated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Contraindicated,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Contraindicated => "contraindicated",
        }
    }

    /// Fixed clinical guidance attached to each severity
    pub fn recommendation(self) -> &'static str {
        match self {
            RiskLevel::Low => {
                "Monitor patient closely. Interaction is mild and may not require action."
            }
            RiskLevel::Moderate => {
                "Consider alternative medication or adjust dosages. Regular monitoring recommended."
            }
            RiskLevel::High => {
                "Avoid combination if possible. Consider alternative medications or close supervision."
            }
            RiskLevel::Contraindicated => {
                "DO NOT prescribe together. This combination is contraindicated."
            }
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ClinicalError;

    /// Case-insensitive; unknown values are rejected rather than defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "moderate" => Ok(RiskLevel::Moderate),
            "high" => Ok(RiskLevel::High),
            "contraindicated" => Ok(RiskLevel::Contraindicated),
            other => Err(ClinicalError::InvalidData(format!(
                "unrecognized risk level '{}'",
                other
            ))),
        }
    }
}

/// An `INTERACTS_WITH` edge as stored, in its stored direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEdge {
    pub from_id: String,
    pub to_id: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl InteractionEdge {
    /// True when the edge joins `a` and `b` in either direction
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.from_id == a && self.to_id == b) || (self.from_id == b && self.to_id == a)
    }
}

/// Classified interaction between two drugs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugInteraction {
    pub drug1_id: String,
    pub drug1: String,
    pub drug2_id: String,
    pub drug2: String,
    pub risk_level: RiskLevel,
    pub severity: String,
    pub description: String,
    pub recommendation: String,
}

impl DrugInteraction {
    /// Classify a stored edge between `first` and `second`.
    pub fn classify(first: &Drug, second: &Drug, edge: &InteractionEdge) -> Result<Self, ClinicalError> {
        let pair = format!("{}/{}", first.id, second.id);
        let raw_level = edge.risk_level.as_deref().ok_or_else(|| {
            ClinicalError::InvalidData(format!("interaction {} has no risk_level", pair))
        })?;
        let risk_level: RiskLevel = raw_level
            .parse()
            .map_err(|e: ClinicalError| ClinicalError::InvalidData(format!("interaction {}: {}", pair, e)))?;
        let severity = edge.severity.clone().ok_or_else(|| {
            ClinicalError::InvalidData(format!("interaction {} has no severity", pair))
        })?;

        Ok(Self {
            drug1_id: first.id.clone(),
            drug1: first.name.clone(),
            drug2_id: second.id.clone(),
            drug2: second.name.clone(),
            risk_level,
            severity,
            description: edge
                .description
                .clone()
                .unwrap_or_else(|| "Interaction detected".to_string()),
            recommendation: risk_level.recommendation().to_string(),
        })
    }
}

/// Evaluate every unordered pair of `drugs` against the stored edges.
///
/// Drugs are deduplicated and ordered by id, and only pairs with
/// `drug1.id < drug2.id` are examined, so each pair is reported at most once
/// regardless of which direction its edge was stored in.
pub fn evaluate_pairs(
    drugs: &[Drug],
    edges: &[InteractionEdge],
) -> Result<Vec<DrugInteraction>, ClinicalError> {
    let mut ordered: Vec<&Drug> = drugs.iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));
    ordered.dedup_by(|a, b| a.id == b.id);

    let mut interactions = Vec::new();
    for (i, first) in ordered.iter().enumerate() {
        for second in &ordered[i + 1..] {
            if let Some(edge) = edges.iter().find(|e| e.connects(&first.id, &second.id)) {
                interactions.push(DrugInteraction::classify(first, second, edge)?);
            }
        }
    }
    Ok(interactions)
}

/// Interaction reshaped for dashboard alerts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugRiskAlert {
    pub drug_name: String,
    pub risk_level: RiskLevel,
    pub interacting_drugs: Vec<String>,
    pub alert_message: String,
    pub severity: String,
}

impl From<&DrugInteraction> for DrugRiskAlert {
    fn from(i: &DrugInteraction) -> Self {
        Self {
            drug_name: i.drug1.clone(),
            risk_level: i.risk_level,
            interacting_drugs: vec![i.drug2.clone()],
            alert_message: format!("{} and {}: {}", i.drug1, i.drug2, i.description),
            severity: i.severity.clone(),
        }
    }
}

/// Pick substitutes for `replaced_id` among `candidates` (drugs treating one
/// of the patient's diseases): never the replaced drug itself, and never a
/// drug with an edge in either direction to any of `current_ids`.
/// Deduplicated by id, ordered by name, capped at [`SAFE_ALTERNATIVE_LIMIT`].
pub fn select_alternatives(
    candidates: Vec<Drug>,
    replaced_id: &str,
    current_ids: &[String],
    edges: &[InteractionEdge],
) -> Vec<Drug> {
    let mut seen = HashSet::new();
    let mut safe: Vec<Drug> = candidates
        .into_iter()
        .filter(|d| d.id != replaced_id)
        .filter(|d| seen.insert(d.id.clone()))
        .filter(|d| {
            !current_ids
                .iter()
                .any(|current| edges.iter().any(|e| e.connects(&d.id, current)))
        })
        .collect();
    safe.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    safe.truncate(SAFE_ALTERNATIVE_LIMIT);
    safe
}
