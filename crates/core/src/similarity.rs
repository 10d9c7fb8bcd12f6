//! Weighted-overlap patient similarity
//!
//! score = 0.3 × |shared symptoms| + 0.5 × |shared diseases| + 0.2 × |shared drugs|

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ClinicalError;

/// Weights in tenths, so equal scores compare equal
pub const SYMPTOM_WEIGHT: u64 = 3;
pub const DISEASE_WEIGHT: u64 = 5;
pub const DRUG_WEIGHT: u64 = 2;

pub const DEFAULT_LIMIT: usize = 5;
pub const MAX_LIMIT: usize = 100;

/// Name sets describing one patient's clinical picture
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalProfile {
    pub patient_id: String,
    pub patient_name: String,
    pub symptoms: BTreeSet<String>,
    pub diseases: BTreeSet<String>,
    pub drugs: BTreeSet<String>,
}

/// A ranked candidate with its overlap evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarPatient {
    pub patient_id: String,
    pub patient_name: String,
    pub similarity_score: f64,
    pub common_symptoms: Vec<String>,
    pub common_diseases: Vec<String>,
    pub common_drugs: Vec<String>,
}

fn common(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Vec<String> {
    a.intersection(b).cloned().collect()
}

/// Exact weighted score in tenths
pub fn score_tenths(symptoms: usize, diseases: usize, drugs: usize) -> u64 {
    SYMPTOM_WEIGHT * symptoms as u64 + DISEASE_WEIGHT * diseases as u64 + DRUG_WEIGHT * drugs as u64
}

/// Weighted score from overlap counts
pub fn weighted_score(symptoms: usize, diseases: usize, drugs: usize) -> f64 {
    score_tenths(symptoms, diseases, drugs) as f64 / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Check a caller-supplied limit, falling back to the default
pub fn resolve_limit(limit: Option<usize>) -> Result<usize, ClinicalError> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(n) if (1..=MAX_LIMIT).contains(&n) => Ok(n),
        Some(n) => Err(ClinicalError::Validation(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIMIT, n
        ))),
    }
}

/// Rank `candidates` against `target`.
///
/// The target itself and candidates with no overlap at all are skipped.
/// Ordering is by exact score descending, then by patient id ascending.
pub fn rank(target: &ClinicalProfile, candidates: &[ClinicalProfile], limit: usize) -> Vec<SimilarPatient> {
    let mut scored: Vec<(u64, SimilarPatient)> = candidates
        .iter()
        .filter(|c| c.patient_id != target.patient_id)
        .filter_map(|c| {
            let common_symptoms = common(&target.symptoms, &c.symptoms);
            let common_diseases = common(&target.diseases, &c.diseases);
            let common_drugs = common(&target.drugs, &c.drugs);
            if common_symptoms.is_empty() && common_diseases.is_empty() && common_drugs.is_empty() {
                return None;
            }

            let tenths = score_tenths(
                common_symptoms.len(),
                common_diseases.len(),
                common_drugs.len(),
            );
            Some((
                tenths,
                SimilarPatient {
                    patient_id: c.patient_id.clone(),
                    patient_name: c.patient_name.clone(),
                    similarity_score: round2(tenths as f64 / 10.0),
                    common_symptoms,
                    common_diseases,
                    common_drugs,
                },
            ))
        })
        .collect();

    scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| a.patient_id.cmp(&b.patient_id)));
    scored.into_iter().take(limit).map(|(_, p)| p).collect()
}
