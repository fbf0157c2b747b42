use std::sync::Arc;

use serde_json::{Value, json};
use tracing::info;

use crate::error::ClaimError;
use crate::inference::{InferenceClient, InferenceRequest};
use crate::models::{AdjudicationVerdict, CategorySummary, ExtractionResults};
use crate::pipeline::aggregate;
use crate::pipeline::parse::strip_code_fences;

const ADJUDICATION_MAX_TOKENS: u32 = 2000;

/// Stage 2: aggregates the extraction results per category and asks the
/// inference service for a verdict. Unlike extraction, there is no degrade
/// path: any inference or parse failure fails the request.
pub struct AdjudicationEngine {
    client: Arc<dyn InferenceClient>,
    model: String,
}

impl AdjudicationEngine {
    pub fn new(client: Arc<dyn InferenceClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub async fn adjudicate(
        &self,
        results: &ExtractionResults,
    ) -> Result<AdjudicationVerdict, ClaimError> {
        if results.is_empty() {
            return Err(ClaimError::NoInputData);
        }

        let report_summary = aggregate::summarize(&results.medical_report);
        let prescription_summary = aggregate::summarize(&results.prescription);
        let bill_summary = aggregate::summarize(&results.medical_bill);

        let prompt = adjudication_prompt(&report_summary, &prescription_summary, &bill_summary);

        let reply = self
            .client
            .complete(InferenceRequest {
                model: &self.model,
                prompt: &prompt,
                image_png: None,
                max_tokens: ADJUDICATION_MAX_TOKENS,
            })
            .await
            .map_err(|e| ClaimError::AdjudicationFailed(e.to_string()))?;

        let verdict: AdjudicationVerdict = serde_json::from_str(strip_code_fences(&reply))
            .map_err(|e| ClaimError::AdjudicationFailed(format!("unparseable verdict: {e}")))?;

        info!(
            claim_valid = verdict.final_assessment.is_claim_valid,
            confidence = verdict.final_assessment.confidence_score,
            "claim adjudicated"
        );
        Ok(verdict)
    }
}

fn adjudication_prompt(
    report: &CategorySummary,
    prescription: &CategorySummary,
    bill: &CategorySummary,
) -> String {
    let expected_output = json!({
        "claimValidation": {
            "isPatientNameConsistent": true,
            "isConsistent": true,
            "isTreatmentBillMatch": true,
            "isDateSequenceLogical": true
        },
        "finalAssessment": {
            "isClaimValid": true,
            "confidenceScore": 0.7,
            "reasoning": [
                "Example reasoning 1",
                "Example reasoning 2",
                "Example reasoning 3"
            ]
        }
    });

    format!(
        "You are an expert insurance claim adjudicator. Analyze the following structured data \
         from a patient's claim and determine if it is valid. Some fields may be empty, \
         indicating missing or inapplicable information, you can ignore those.\n\
         \n\
         **Clinical Report Data:**\n{report:#}\n\
         \n\
         **Prescription Data:**\n{prescription:#}\n\
         \n\
         **Billing Data:**\n{bill:#}\n\
         \n\
         Apply the following logic to generate your response.\n\
         \n\
         isPatientNameConsistent: Only fail if there are substantial differences indicating \
         different individuals (different first names, last names, or clearly unrelated \
         identifiers).\n\
         \n\
         isConsistent: Does the patient's diagnosis justify the prescribed medications?\n\
         \n\
         isTreatmentBillMatch: Do all billed items (procedures, tests, medications) directly \
         match what is documented in the clinical and prescription reports?\n\
         \n\
         isDateSequenceLogical: Are all event dates in a logical chronological order \
         (admission -> treatment -> discharge -> billing)?\n\
         \n\
         reasoning: Every check must be justified with specific data from the source. This \
         applies to both PASS and FAIL outcomes.\n\
         Cite matching data points that confirm the check passed.\n\
         Cite conflicting data points that prove the check failed.\n\
         \n\
         **Why this matters:** Explicit citations are mandatory to ensure conclusions are \
         verifiable, prevent hallucinations, and support reliable human review.\n\
         **Output Format:**\n{expected_output:#}\n\
         \n\
         Do not include any additional text or markdown formatting.",
        report = Value::Object(report.clone()),
        prescription = Value::Object(prescription.clone()),
        bill = Value::Object(bill.clone()),
    )
}
