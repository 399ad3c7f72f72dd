//! Conversion from client wire formats to the canonical request

pub mod anthropic;
pub mod openai;

use serde_json::Value;

/// Join system prompt fragments, dropping empty ones
fn join_system(parts: Vec<String>) -> Option<String> {
    let parts: Vec<String> = parts.into_iter().filter(|p| !p.trim().is_empty()).collect();
    (!parts.is_empty()).then(|| parts.join("\n\n"))
}

/// Parameter schema, or an empty object schema when none was declared
fn schema_or_empty(schema: Option<Value>) -> Value {
    match schema {
        Some(schema @ Value::Object(_)) => schema,
        _ => serde_json::json!({"type": "object", "properties": {}}),
    }
}
