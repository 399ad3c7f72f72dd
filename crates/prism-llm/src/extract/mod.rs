//! Response extraction
//!
//! Turns one raw backend payload into text, usage, tool-call candidates
//! and stop signals. Each concern is an ordered list of pure probes over
//! the JSON value; the first probe that yields something wins. Extraction
//! never fails: a payload with no usable content is reported through
//! [`Extraction::failure`].

mod delta;
mod signals;
mod text;
mod tool_calls;
mod usage;

use regex::Regex;
use serde_json::Value;

pub use delta::probe_delta;
pub use tool_calls::{RawArguments, RawToolCall};

use crate::types::{FinishSignal, Usage};

/// What extraction found in one backend payload
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Visible text, with embedded tool-call blocks removed
    pub text: Option<String>,
    /// Name of the probe that produced the text
    pub text_source: Option<&'static str>,
    /// Reported or estimated usage
    pub usage: Usage,
    /// Unrepaired tool-call candidates
    pub tool_calls: Vec<RawToolCall>,
    /// Stop signals
    pub signal: FinishSignal,
    /// Set when no probe found text or tool calls
    pub failure: Option<ExtractionFailure>,
}

/// Marker for a payload with no usable content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionFailure {
    /// Top-level keys of the payload, for diagnostics
    pub shape: Vec<String>,
}

/// Ordered-probe extractor
///
/// Owns the compiled pattern for `<tool_call>` blocks that some backends
/// emit inside plain text.
#[derive(Debug, Clone)]
pub struct Extractor {
    tool_call_block: Regex,
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            tool_call_block: Regex::new(r"(?s)<tool_call>\s*(.*?)\s*(?:</tool_call>|\z)").expect("valid tool call regex"),
        }
    }

    /// Extract everything the engine needs from a raw payload
    ///
    /// `prompt_chars` feeds the usage estimate when the payload carries no
    /// usage object.
    pub fn extract(&self, raw: &Value, prompt_chars: usize) -> Extraction {
        let found = text::probe(raw);
        let (text_source, raw_text) = found.map_or((None, None), |(source, text)| (Some(source), Some(text)));

        let mut candidates = tool_calls::probe(raw).unwrap_or_default();
        let text = match raw_text {
            Some(text) if self.tool_call_block.is_match(&text) => {
                if candidates.is_empty() {
                    candidates = self.text_tool_calls(&text);
                }
                let stripped = self.tool_call_block.replace_all(&text, "");
                Some(stripped.trim().to_owned()).filter(|t| !t.is_empty())
            }
            other => other,
        };

        let completion_chars = text.as_ref().map_or(0, |t| t.chars().count());
        let usage = usage::probe(raw).unwrap_or_else(|| Usage::estimate(prompt_chars, completion_chars));

        let failure = (text.is_none() && candidates.is_empty()).then(|| ExtractionFailure {
            shape: raw
                .as_object()
                .map(|map| map.keys().cloned().collect())
                .unwrap_or_default(),
        });

        Extraction {
            text,
            text_source,
            usage,
            tool_calls: candidates,
            signal: signals::probe(raw),
            failure,
        }
    }

    fn text_tool_calls(&self, text: &str) -> Vec<RawToolCall> {
        self.tool_call_block
            .captures_iter(text)
            .filter_map(|captures| captures.get(1))
            .map(|body| RawToolCall::from_text_block(body.as_str()))
            .collect()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-empty string at a JSON pointer
fn string_at(raw: &Value, pointer: &str) -> Option<String> {
    non_empty(raw.pointer(pointer)?)
}

fn non_empty(value: &Value) -> Option<String> {
    value.as_str().filter(|s| !s.trim().is_empty()).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn generated_text_shape() {
        let extraction = Extractor::new().extract(&json!({"generation": {"generatedText": "hi"}}), 8);

        assert_eq!(extraction.text.as_deref(), Some("hi"));
        assert_eq!(extraction.text_source, Some("generation.generatedText"));
        assert!(extraction.usage.estimated);
        assert!(extraction.failure.is_none());
    }

    #[test]
    fn empty_payload_is_a_failure_not_a_panic() {
        let extraction = Extractor::new().extract(&json!({"status": "ok"}), 0);

        assert!(extraction.text.is_none());
        assert!(extraction.tool_calls.is_empty());
        assert_eq!(
            extraction.failure,
            Some(ExtractionFailure {
                shape: vec!["status".to_owned()]
            })
        );
    }

    #[test]
    fn non_object_payload_is_a_failure() {
        let extraction = Extractor::new().extract(&json!([1, 2, 3]), 0);
        assert_eq!(extraction.failure, Some(ExtractionFailure { shape: Vec::new() }));
    }

    #[test]
    fn tool_call_only_payload_is_not_a_failure() {
        let extraction = Extractor::new().extract(&json!({"toolCalls": [{"arguments": {"expression": "2+2"}}]}), 0);

        assert!(extraction.text.is_none());
        assert_eq!(extraction.tool_calls.len(), 1);
        assert!(extraction.failure.is_none());
    }

    #[test]
    fn text_blocks_become_tool_calls() {
        let raw = json!({
            "generation": {
                "generatedText": "Let me check.\n<tool_call>{\"name\": \"lookup\", \"arguments\": {\"query\": \"rust\"}}</tool_call>"
            }
        });
        let extraction = Extractor::new().extract(&raw, 0);

        assert_eq!(extraction.text.as_deref(), Some("Let me check."));
        assert_eq!(extraction.tool_calls.len(), 1);
        assert_eq!(extraction.tool_calls[0].name.as_deref(), Some("lookup"));
        assert_eq!(
            extraction.tool_calls[0].arguments,
            RawArguments::Value(json!({"query": "rust"}))
        );
    }

    #[test]
    fn unterminated_text_block_is_still_found() {
        let raw = json!({"text": "<tool_call>{\"name\": \"calculate\", \"arguments\": {\"expression\": \"1+"});
        let extraction = Extractor::new().extract(&raw, 0);

        assert!(extraction.text.is_none());
        assert_eq!(extraction.tool_calls.len(), 1);
        assert_eq!(extraction.tool_calls[0].name.as_deref(), Some("calculate"));
    }

    #[test]
    fn reported_usage_is_exact() {
        let raw = json!({
            "choices": [{"message": {"content": "hello"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 7, "completion_tokens": 2, "total_tokens": 9}
        });
        let extraction = Extractor::new().extract(&raw, 100);

        assert_eq!(extraction.usage, Usage::reported(7, 2));
        assert!(!extraction.usage.estimated);
    }

    #[test]
    fn estimate_counts_prompt_and_text() {
        let extraction = Extractor::new().extract(&json!({"text": "abcdefgh"}), 16);

        assert_eq!(extraction.usage, Usage::estimate(16, 8));
    }
}
