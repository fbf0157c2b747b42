use serde_json::Value;

use crate::models::{CategorySummary, FileResult};

/// Collapses a category's extraction results into one flat fact set.
///
/// Only the first file's pages feed the summary; additional files in the same
/// category are extracted but never merged. Within those pages, a later page
/// overwrites an earlier one for any key whose value is non-empty; empty
/// values never overwrite.
pub fn summarize(file_results: &[FileResult]) -> CategorySummary {
    let mut summary = CategorySummary::new();

    let Some(first) = file_results.first() else {
        return summary;
    };

    for page in &first.pages {
        for (key, value) in page {
            if is_truthy(value) {
                summary.insert(key.clone(), value.clone());
            }
        }
    }

    summary
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
