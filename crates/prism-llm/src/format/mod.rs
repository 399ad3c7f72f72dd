//! Response formatting
//!
//! Renders a [`NormalizedResult`](crate::types::NormalizedResult) into the
//! non-streamed envelope of each client protocol. Output depends only on
//! the result and the [`ResponseMeta`](crate::ids::ResponseMeta), so the
//! same inputs always serialize to the same bytes.

pub mod anthropic;
pub mod openai;

use serde_json::Value;

use crate::types::ToolCall;

/// Parsed arguments of a repaired call
fn arguments_value(call: &ToolCall) -> Value {
    serde_json::from_str(&call.arguments).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}
