use serde_json::Value;

use crate::types::Usage;

/// Pointer triples for `(prompt, completion, total)` counts, in priority order
const SHAPES: &[(&str, &str, Option<&str>)] = &[
    (
        "/usage/prompt_tokens",
        "/usage/completion_tokens",
        Some("/usage/total_tokens"),
    ),
    ("/usage/input_tokens", "/usage/output_tokens", None),
    (
        "/usageMetadata/promptTokenCount",
        "/usageMetadata/candidatesTokenCount",
        Some("/usageMetadata/totalTokenCount"),
    ),
    (
        "/generation/usage/promptTokens",
        "/generation/usage/completionTokens",
        Some("/generation/usage/totalTokens"),
    ),
    (
        "/usage/promptTokens",
        "/usage/completionTokens",
        Some("/usage/totalTokens"),
    ),
    ("/tokenUsage/inputTokens", "/tokenUsage/outputTokens", None),
];

/// Backend-reported usage, if any known usage object is present
pub(crate) fn probe(raw: &Value) -> Option<Usage> {
    SHAPES.iter().find_map(|&(prompt, completion, total)| {
        let prompt_tokens = count_at(raw, prompt)?;
        let completion_tokens = count_at(raw, completion)?;
        let mut usage = Usage::reported(prompt_tokens, completion_tokens);

        if let Some(total) = total.and_then(|p| count_at(raw, p)) {
            usage.total_tokens = total.max(usage.total_tokens);
        }

        Some(usage)
    })
}

/// Usage from one stream event, where a side may be missing
///
/// Anthropic streams put input tokens on `message_start` and output tokens
/// on `message_delta`. The missing side is reported as zero so a field-wise
/// max over the stream recovers both.
pub(crate) fn probe_partial(raw: &Value) -> Option<Usage> {
    probe(raw).or_else(|| {
        let prompt = count_at(raw, "/message/usage/input_tokens");
        let completion = ["/usage/output_tokens", "/message/usage/output_tokens"]
            .iter()
            .find_map(|p| count_at(raw, p));

        (prompt.is_some() || completion.is_some())
            .then(|| Usage::reported(prompt.unwrap_or(0), completion.unwrap_or(0)))
    })
}

fn count_at(raw: &Value, pointer: &str) -> Option<u32> {
    raw.pointer(pointer)
        .and_then(Value::as_u64)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
}
