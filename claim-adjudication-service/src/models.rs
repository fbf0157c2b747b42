use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClaimError;

/// Field name → extracted value for a single page, shaped by the category schema.
pub type PageRecord = Map<String, Value>;

/// Flat field name → value mapping produced by category aggregation.
pub type CategorySummary = Map<String, Value>;

/// The three document types a claim is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    MedicalReport,
    Prescription,
    MedicalBill,
}

impl DocumentCategory {
    pub const ALL: [DocumentCategory; 3] = [
        DocumentCategory::MedicalReport,
        DocumentCategory::Prescription,
        DocumentCategory::MedicalBill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::MedicalReport => "medical_report",
            DocumentCategory::Prescription => "prescription",
            DocumentCategory::MedicalBill => "medical_bill",
        }
    }

    /// Multipart field name carrying uploads for this category.
    pub fn upload_field(&self) -> &'static str {
        match self {
            DocumentCategory::MedicalReport => "medical_report_files",
            DocumentCategory::Prescription => "prescription_files",
            DocumentCategory::MedicalBill => "medical_bill_files",
        }
    }

    pub fn from_upload_field(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.upload_field() == name)
    }

    pub(crate) fn index(self) -> usize {
        match self {
            DocumentCategory::MedicalReport => 0,
            DocumentCategory::Prescription => 1,
            DocumentCategory::MedicalBill => 2,
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentCategory {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ClaimError::InvalidCategory(s.to_string()))
    }
}

/// One uploaded file, as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub contents: Vec<u8>,
}

/// Uploads grouped by category, preserving per-category upload order.
#[derive(Debug, Default)]
pub struct CategoryUploads {
    files: [Vec<UploadedFile>; 3],
}

impl CategoryUploads {
    pub fn push(&mut self, category: DocumentCategory, file: UploadedFile) {
        self.files[category.index()].push(file);
    }

    pub fn is_empty(&self) -> bool {
        self.files.iter().all(Vec::is_empty)
    }

    /// Consumes the uploads in fixed category order.
    pub fn into_entries(self) -> impl Iterator<Item = (DocumentCategory, Vec<UploadedFile>)> {
        DocumentCategory::ALL.into_iter().zip(self.files)
    }
}

/// Extraction output for one uploaded file, pages in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    pub filename: String,
    pub pages: Vec<PageRecord>,
}

/// Full stage-1 output and stage-2 input: per-category file results.
///
/// Absent category keys decode as empty lists, so any mapping carrying a
/// subset of the category keys is accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResults {
    #[serde(default)]
    pub medical_report: Vec<FileResult>,
    #[serde(default)]
    pub prescription: Vec<FileResult>,
    #[serde(default)]
    pub medical_bill: Vec<FileResult>,
}

impl ExtractionResults {
    pub fn category(&self, category: DocumentCategory) -> &[FileResult] {
        match category {
            DocumentCategory::MedicalReport => &self.medical_report,
            DocumentCategory::Prescription => &self.prescription,
            DocumentCategory::MedicalBill => &self.medical_bill,
        }
    }

    pub fn category_mut(&mut self, category: DocumentCategory) -> &mut Vec<FileResult> {
        match category {
            DocumentCategory::MedicalReport => &mut self.medical_report,
            DocumentCategory::Prescription => &mut self.prescription,
            DocumentCategory::MedicalBill => &mut self.medical_bill,
        }
    }

    pub fn is_empty(&self) -> bool {
        DocumentCategory::ALL
            .into_iter()
            .all(|c| self.category(c).is_empty())
    }
}

/// The four per-rule consistency checks of a claim verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimValidation {
    pub is_patient_name_consistent: bool,
    pub is_consistent: bool,
    pub is_treatment_bill_match: bool,
    pub is_date_sequence_logical: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalAssessment {
    pub is_claim_valid: bool,
    pub confidence_score: f64,
    pub reasoning: Vec<String>,
}

/// Fixed-shape adjudication result returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjudicationVerdict {
    pub claim_validation: ClaimValidation,
    pub final_assessment: FinalAssessment,
}
