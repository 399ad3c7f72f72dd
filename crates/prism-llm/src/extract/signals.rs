use serde_json::Value;

use super::string_at;
use crate::types::FinishSignal;

const FINISH_REASON_PATHS: &[&str] = &[
    "/choices/0/finish_reason",
    "/stop_reason",
    "/delta/stop_reason",
    "/candidates/0/finishReason",
    "/generation/finishReason",
    "/generation/finish_reason",
    "/generation/details/finishReason",
    "/details/finish_reason",
    "/finishReason",
    "/finish_reason",
];

const FILTER_FLAG_PATHS: &[&str] = &[
    "/filtered",
    "/contentFiltered",
    "/generation/filtered",
    "/generation/contentFiltered",
];

const STOP_SEQUENCE_PATHS: &[&str] = &[
    "/stop_sequence",
    "/delta/stop_sequence",
    "/generation/stopSequence",
    "/stopSequence",
];

/// Collect truncation, filtering and stop-sequence signals
pub(super) fn probe(raw: &Value) -> FinishSignal {
    let reason = FINISH_REASON_PATHS
        .iter()
        .find_map(|p| string_at(raw, p))
        .map(|r| r.to_ascii_lowercase());

    let truncated = reason
        .as_deref()
        .is_some_and(|r| matches!(r, "length" | "max_tokens" | "max_output_tokens" | "max_tokens_reached"));

    let content_filtered = reason.as_deref().is_some_and(|r| {
        matches!(
            r,
            "content_filter" | "safety" | "recitation" | "blocked" | "prohibited_content" | "spii" | "refusal"
        )
    }) || FILTER_FLAG_PATHS
        .iter()
        .any(|p| raw.pointer(p).and_then(Value::as_bool) == Some(true))
        || raw.pointer("/promptFeedback/blockReason").is_some_and(Value::is_string);

    let stop_sequence = STOP_SEQUENCE_PATHS.iter().find_map(|p| string_at(raw, p));

    FinishSignal {
        truncated,
        content_filtered,
        stop_sequence,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn natural_stop_has_no_signals() {
        assert_eq!(probe(&json!({"choices": [{"finish_reason": "stop"}]})), FinishSignal::default());
    }

    #[test]
    fn truncation_spellings() {
        for raw in [
            json!({"choices": [{"finish_reason": "length"}]}),
            json!({"stop_reason": "max_tokens"}),
            json!({"candidates": [{"finishReason": "MAX_TOKENS"}]}),
            json!({"generation": {"finishReason": "max_tokens_reached"}}),
        ] {
            assert!(probe(&raw).truncated, "shape: {raw}");
        }
    }

    #[test]
    fn content_filter_signals() {
        for raw in [
            json!({"choices": [{"finish_reason": "content_filter"}]}),
            json!({"candidates": [{"finishReason": "SAFETY"}]}),
            json!({"promptFeedback": {"blockReason": "OTHER"}}),
            json!({"generation": {"filtered": true}}),
        ] {
            assert!(probe(&raw).content_filtered, "shape: {raw}");
        }
    }

    #[test]
    fn stop_sequence_is_captured() {
        let signal = probe(&json!({"stop_reason": "stop_sequence", "stop_sequence": "\n\nHuman:"}));
        assert_eq!(signal.stop_sequence.as_deref(), Some("\n\nHuman:"));
        assert!(!signal.truncated);
    }
}
