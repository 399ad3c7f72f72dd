use serde_json::Value;

use super::{non_empty, string_at};

type TextProbe = fn(&Value) -> Option<String>;

/// Text probes in priority order
const PROBES: &[(&str, TextProbe)] = &[
    ("generation.generatedText", generated_text),
    ("generation.text", generation_text),
    ("generations[0].text", generations_list),
    ("details.generatedText", details),
    ("choices[0].message.content", chat_message),
    ("choices[0].text", legacy_completion),
    ("content[].text", content_blocks),
    ("candidates[0].content.parts[].text", candidate_parts),
    ("text", bare),
];

/// First non-empty text and the name of the probe that found it
pub(super) fn probe(raw: &Value) -> Option<(&'static str, String)> {
    PROBES
        .iter()
        .find_map(|(name, probe)| probe(raw).map(|text| (*name, text)))
}

fn generated_text(raw: &Value) -> Option<String> {
    ["/generation/generatedText", "/generation/generated_text", "/generatedText", "/generated_text"]
        .iter()
        .find_map(|p| string_at(raw, p))
}

fn generation_text(raw: &Value) -> Option<String> {
    string_at(raw, "/generation/text")
}

fn generations_list(raw: &Value) -> Option<String> {
    string_at(raw, "/generations/0/text").or_else(|| string_at(raw, "/generation/0/text"))
}

fn details(raw: &Value) -> Option<String> {
    [
        "/generation/details/generatedText",
        "/generation/details/text",
        "/details/generatedText",
        "/details/generated_text",
        "/details/text",
    ]
    .iter()
    .find_map(|p| string_at(raw, p))
}

fn chat_message(raw: &Value) -> Option<String> {
    joined_text(raw.pointer("/choices/0/message/content")?)
}

fn legacy_completion(raw: &Value) -> Option<String> {
    string_at(raw, "/choices/0/text")
}

fn content_blocks(raw: &Value) -> Option<String> {
    match raw.get("content")? {
        Value::Array(_) => joined_text(&raw["content"]),
        _ => None,
    }
}

fn candidate_parts(raw: &Value) -> Option<String> {
    joined_text(raw.pointer("/candidates/0/content/parts")?)
}

fn bare(raw: &Value) -> Option<String> {
    ["/text", "/content", "/completion", "/output", "/response"]
        .iter()
        .find_map(|p| string_at(raw, p))
}

/// A plain string, or the concatenated `text` of an array of parts
///
/// Parts with a `type` other than `text` are skipped.
fn joined_text(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => non_empty(value),
        Value::Array(parts) => {
            let text: String = parts
                .iter()
                .filter(|part| part.get("type").is_none_or(|t| t == "text"))
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect();
            Some(text).filter(|t| !t.trim().is_empty())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn text_of(raw: &Value) -> Option<String> {
        probe(raw).map(|(_, text)| text)
    }

    #[test]
    fn known_shapes() {
        let shapes = [
            json!({"generation": {"generatedText": "a"}}),
            json!({"generation": {"text": "a"}}),
            json!({"generations": [{"text": "a"}]}),
            json!({"details": {"generated_text": "a"}}),
            json!({"choices": [{"message": {"role": "assistant", "content": "a"}}]}),
            json!({"choices": [{"message": {"content": [{"type": "text", "text": "a"}]}}]}),
            json!({"choices": [{"text": "a"}]}),
            json!({"content": [{"type": "text", "text": "a"}, {"type": "tool_use", "name": "x"}]}),
            json!({"candidates": [{"content": {"parts": [{"text": "a"}]}}]}),
            json!({"text": "a"}),
            json!({"content": "a"}),
            json!({"completion": "a"}),
        ];

        for shape in &shapes {
            assert_eq!(text_of(shape).as_deref(), Some("a"), "shape: {shape}");
        }
    }

    #[test]
    fn earlier_probes_win() {
        let raw = json!({
            "text": "bare",
            "choices": [{"message": {"content": "chat"}}],
            "generation": {"generatedText": "generated"}
        });

        assert_eq!(probe(&raw), Some(("generation.generatedText", "generated".to_owned())));
    }

    #[test]
    fn blank_strings_are_skipped() {
        let raw = json!({"generation": {"generatedText": "   ", "text": "fallback"}});
        assert_eq!(text_of(&raw).as_deref(), Some("fallback"));
    }

    #[test]
    fn null_content_yields_nothing() {
        let raw = json!({"choices": [{"message": {"content": null, "tool_calls": []}}]});
        assert_eq!(text_of(&raw), None);
    }

    #[test]
    fn multiple_parts_are_concatenated() {
        let raw = json!({"candidates": [{"content": {"parts": [{"text": "Hello, "}, {"text": "world"}]}}]});
        assert_eq!(text_of(&raw).as_deref(), Some("Hello, world"));
    }
}
