use std::sync::LazyLock;

use serde_json::{Map, Value, json};

use crate::models::DocumentCategory;

/// Expected field set and default values for one category.
pub type Schema = Map<String, Value>;

/// Fields run through the date normalizer after extraction.
pub const DATE_FIELDS: [&str; 3] = ["report_date", "prescription_date", "bill_date"];

static MEDICAL_REPORT_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    object(json!({
        "patient_name": "",
        "hospital_name": "",
        "report_date": "",
        "report_type": "",
        "clinical_findings": ""
    }))
});

static PRESCRIPTION_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    object(json!({
        "patient_name": "",
        "doctor_name": "",
        "clinic_name": "",
        "prescription_date": "",
        "diagnosis_notes": ""
    }))
});

static MEDICAL_BILL_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    object(json!({
        "patient_name": "",
        "hospital_or_clinic_name": "",
        "bill_date": "",
        "bill_items": [],
        "total_amount": ""
    }))
});

fn object(value: Value) -> Schema {
    match value {
        Value::Object(map) => map,
        _ => unreachable!("schema literals are JSON objects"),
    }
}

/// Returns the category's default schema as an independent copy, so callers
/// that hand it out on failure never alias the shared defaults.
pub fn schema_for(category: DocumentCategory) -> Schema {
    match category {
        DocumentCategory::MedicalReport => MEDICAL_REPORT_SCHEMA.clone(),
        DocumentCategory::Prescription => PRESCRIPTION_SCHEMA.clone(),
        DocumentCategory::MedicalBill => MEDICAL_BILL_SCHEMA.clone(),
    }
}
