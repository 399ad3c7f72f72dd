use serde_json::Value;

use super::{signals, string_at, usage};
use crate::backend::BackendDelta;

/// Read one incremental backend event
///
/// Covers `OpenAI` chunks, Anthropic `content_block_delta` and
/// `message_delta` events, Gemini candidates and plain `{text}` tokens.
pub fn probe_delta(event: &Value) -> BackendDelta {
    let text = [
        "/choices/0/delta/content",
        "/choices/0/text",
        "/delta/text",
        "/candidates/0/content/parts/0/text",
        "/token/text",
        "/generation/text",
        "/text",
    ]
    .iter()
    .find_map(|p| event.pointer(p).and_then(Value::as_str))
    .filter(|t| !t.is_empty())
    .map(str::to_owned);

    let finished = [
        "/choices/0/finish_reason",
        "/delta/stop_reason",
        "/candidates/0/finishReason",
        "/finish_reason",
    ]
    .iter()
    .any(|p| string_at(event, p).is_some());

    BackendDelta {
        text,
        signal: finished.then(|| signals::probe(event)),
        usage: usage::probe_partial(event),
    }
}
