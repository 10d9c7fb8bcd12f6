//! Clinical explanations generated from the patient graph
//!
//! The patient's context is embedded in a prompt, sent to the completion
//! backend, and the reply is split into explanation / reasoning / evidence /
//! recommendations. When the backend fails, a deterministic explanation is
//! built locally instead.

use aegis_core::{ClinicalError, PatientContext};
use serde::{Deserialize, Serialize};

use super::client::CompletionBackend;
use crate::db::SharedStore;
use crate::services::PatientService;

/// Interaction detail supplied by the caller
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionRisk {
    #[serde(default)]
    pub drug1: String,
    #[serde(default)]
    pub drug2: String,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplanationRequest {
    pub patient_id: String,
    #[serde(default)]
    pub drug_name: Option<String>,
    #[serde(default)]
    pub interaction_risk: Option<InteractionRisk>,
    pub question: String,
}

impl ExplanationRequest {
    fn validate(&self) -> Result<(), ClinicalError> {
        if self.patient_id.trim().is_empty() {
            return Err(ClinicalError::Validation("patient_id must not be blank".into()));
        }
        if self.question.trim().is_empty() {
            return Err(ClinicalError::Validation("question must not be blank".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub explanation: String,
    pub reasoning: String,
    pub evidence: Vec<String>,
    pub recommendations: Vec<String>,
}

const DEFAULT_EVIDENCE: &str = "Clinical context analyzed from patient graph";
const DEFAULT_RECOMMENDATION: &str = "Consult with treating physician for final decision";

/// Explain a clinical question for one patient.
///
/// Fails only when the request is invalid or the patient cannot be
/// resolved; completion failures degrade to [`fallback`].
pub async fn generate(
    store: &SharedStore,
    backend: &dyn CompletionBackend,
    request: &ExplanationRequest,
) -> Result<Explanation, ClinicalError> {
    request.validate()?;
    let context = PatientService::new(store.clone())
        .context(&request.patient_id)
        .await?;

    let prompt = build_prompt(request, &context);
    match backend.complete(&prompt).await {
        Ok(text) => Ok(parse_explanation(&text, &context)),
        Err(e) => {
            tracing::warn!(
                patient_id = %request.patient_id,
                error = %e,
                "Completion unavailable, using local explanation"
            );
            Ok(fallback(request, &context))
        }
    }
}

pub fn build_prompt(request: &ExplanationRequest, context: &PatientContext) -> String {
    let mut prompt = format!(
        "You are a clinical decision support assistant. Provide clear, evidence-based \
         explanations for clinical questions.\n\n\
         PATIENT CONTEXT:\n\
         - Name: {}\n\
         - Age: {}\n\
         - Symptoms: {}\n\
         - Diseases: {}\n\
         - Current Medications: {}\n\
         - Lab Tests: {}\n",
        context.patient_name,
        context.age,
        context.symptoms.join(", "),
        context.diseases.join(", "),
        context.drugs.join(", "),
        context.lab_tests.join(", "),
    );

    if let Some(drug) = &request.drug_name {
        prompt.push_str(&format!("\nDRUG IN QUESTION: {}\n", drug));
    }

    if let Some(risk) = &request.interaction_risk {
        prompt.push_str(&format!(
            "\nDRUG INTERACTION RISK:\n\
             - Drugs: {} and {}\n\
             - Risk Level: {}\n\
             - Description: {}\n",
            risk.drug1,
            risk.drug2,
            risk.risk_level.as_deref().unwrap_or("unknown"),
            risk.description,
        ));
    }

    prompt.push_str(&format!("\nCLINICAL QUESTION: {}\n", request.question.trim()));
    prompt.push_str(
        "\nPlease provide:\n\
         1. A clear, concise explanation answering the question\n\
         2. Evidence-based reasoning for your answer\n\
         3. Key evidence points from the patient's clinical profile\n\
         4. Actionable recommendations\n\n\
         Use language appropriate for healthcare professionals. Be transparent about \
         limitations and always recommend consulting with a physician for final decisions.\n\n\
         Format your response with these sections, each starting on its own paragraph:\n\
         Explanation:\n\
         Reasoning:\n\
         Evidence: (bulleted list)\n\
         Recommendations: (bulleted list)\n",
    );
    prompt
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Explanation,
    Reasoning,
    Evidence,
    Recommendations,
}

const HEADERS: [(&str, Section); 4] = [
    ("explanation", Section::Explanation),
    ("reasoning", Section::Reasoning),
    ("evidence", Section::Evidence),
    ("recommendation", Section::Recommendations),
];

const BULLETS: [char; 3] = ['-', '*', '•'];

fn is_decoration(c: char) -> bool {
    c == '#' || c == '*' || c == ':' || c.is_whitespace()
}

/// Section of a paragraph block and its text with the header removed
fn split_header(block: &str) -> Option<(Section, String)> {
    let (first, rest) = block.split_once('\n').unwrap_or((block, ""));
    let plain = first.trim_start_matches(is_decoration);
    let lower = plain.to_ascii_lowercase();
    let (section, after) = HEADERS.iter().find_map(|(key, section)| {
        let tail = lower.strip_prefix(key)?;
        let tail = tail.strip_prefix('s').unwrap_or(tail);
        is_header_end(tail).then(|| (*section, &plain[plain.len() - tail.len()..]))
    })?;
    let inline = after.trim_matches(is_decoration);

    let body = [inline, rest.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    Some((section, body))
}

/// A header word must end the line or be followed by `:` or markdown emphasis
fn is_header_end(tail: &str) -> bool {
    let tail = tail.trim_start();
    tail.is_empty() || tail.starts_with([':', '*', '#'])
}

fn bullet_content(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if !trimmed.starts_with(BULLETS) {
        return None;
    }
    let content = trimmed.trim_start_matches(BULLETS).trim();
    (!content.is_empty()).then_some(content)
}

fn bullet_list(body: &str) -> Vec<String> {
    body.lines()
        .map(|line| line.trim().trim_start_matches(BULLETS).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

/// Best-effort split of a free-text reply into the four sections
pub fn parse_explanation(text: &str, context: &PatientContext) -> Explanation {
    let mut explanation: Option<String> = None;
    let mut reasoning: Option<String> = None;
    let mut evidence: Option<Vec<String>> = None;
    let mut recommendations: Option<Vec<String>> = None;

    // First block per section wins
    for block in text.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
        let Some((section, body)) = split_header(block) else {
            continue;
        };
        match section {
            Section::Explanation => {
                explanation.get_or_insert(body);
            }
            Section::Reasoning => {
                reasoning.get_or_insert(body);
            }
            Section::Evidence => {
                evidence.get_or_insert_with(|| bullet_list(&body));
            }
            Section::Recommendations => {
                recommendations.get_or_insert_with(|| bullet_list(&body));
            }
        }
    }
    let mut reasoning = reasoning.unwrap_or_default();
    let mut evidence = evidence.unwrap_or_default();
    let mut recommendations = recommendations.unwrap_or_default();

    for line in text.lines() {
        let Some(content) = bullet_content(line) else {
            continue;
        };
        let lower = line.to_lowercase();
        if lower.contains("evidence") {
            push_unique(&mut evidence, content);
        } else if lower.contains("recommend") {
            push_unique(&mut recommendations, content);
        }
    }

    let explanation = explanation
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| text.trim().to_string());
    if reasoning.is_empty() {
        reasoning = explanation.clone();
    }

    if evidence.is_empty() {
        if !context.symptoms.is_empty() {
            evidence.push(format!("Patient presents with: {}", context.symptoms.join(", ")));
        }
        if !context.diseases.is_empty() {
            evidence.push(format!("Diagnosed with: {}", context.diseases.join(", ")));
        }
        if evidence.is_empty() {
            evidence.push(DEFAULT_EVIDENCE.to_string());
        }
    }
    if recommendations.is_empty() {
        recommendations.push(DEFAULT_RECOMMENDATION.to_string());
    }

    Explanation {
        explanation,
        reasoning,
        evidence,
        recommendations,
    }
}

/// Deterministic explanation from local context only
pub fn fallback(request: &ExplanationRequest, context: &PatientContext) -> Explanation {
    let name = if context.patient_name.is_empty() {
        "the patient"
    } else {
        context.patient_name.as_str()
    };
    let question = request.question.trim();
    let subject = match &request.drug_name {
        Some(drug) => format!("regarding {}: {}. ", drug, question),
        None => format!("regarding: {}. ", question),
    };

    Explanation {
        explanation: format!(
            "Based on the clinical profile for {}, {}Please review the patient's symptoms, \
             diseases, and current medications for context.",
            name, subject
        ),
        reasoning: "Graph-based analysis of patient clinical profile".to_string(),
        evidence: vec![
            format!("Symptoms: {}", context.symptoms.join(", ")),
            format!("Diseases: {}", context.diseases.join(", ")),
            format!("Current medications: {}", context.drugs.join(", ")),
        ],
        recommendations: vec![
            "Review full patient chart".to_string(),
            "Consider drug interactions".to_string(),
            "Consult with specialist if needed".to_string(),
        ],
    }
}
