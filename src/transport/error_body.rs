use serde_json::Value;

/// Pull a human-readable detail out of a non-2xx response body.
///
/// Tried in order: `message`, `detail`, the first `variables[].message`, then
/// the first element of a list body. Falls back to the raw body.
pub fn extract_error_detail(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return body.to_owned();
    };

    match parsed {
        Value::Object(map) => {
            if let Some(message) = map.get("message") {
                return value_text(message);
            }
            if let Some(detail) = map.get("detail") {
                return value_text(detail);
            }
            map.get("variables")
                .and_then(Value::as_array)
                .and_then(|vars| vars.iter().find_map(|var| var.get("message")))
                .map_or_else(|| body.to_owned(), value_text)
        }
        Value::Array(items) => match items.first() {
            Some(first) => first
                .get("message")
                .map_or_else(|| value_text(first), value_text),
            None => body.to_owned(),
        },
        _ => body.to_owned(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
