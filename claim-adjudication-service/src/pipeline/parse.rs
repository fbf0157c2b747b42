use serde_json::{Map, Value};

/// Removes a surrounding markdown code fence, with or without a language tag.
/// Input without fences is returned trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        let rest = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
        body = rest.trim_start();
    }

    if let Some(rest) = body.strip_suffix("```") {
        body = rest.trim_end();
    }

    body
}

/// Decodes a model reply into a JSON object, tolerating fence decoration.
/// A reply that is valid JSON but not an object is an error.
pub fn parse_json_object(text: &str) -> Result<Map<String, Value>, serde_json::Error> {
    serde_json::from_str(strip_code_fences(text))
}
