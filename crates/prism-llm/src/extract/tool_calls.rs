use serde_json::Value;

use crate::repair::json::recover_object;
use crate::types::ToolCall;

/// A tool-call candidate as found in a backend payload, before repair
#[derive(Debug, Clone, PartialEq)]
pub struct RawToolCall {
    /// Call id, if the backend supplied one
    pub id: Option<String>,
    /// Tool name, if the backend supplied one
    pub name: Option<String>,
    /// Arguments in whatever form the backend used
    pub arguments: RawArguments,
}

/// Tool-call arguments before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RawArguments {
    /// No arguments field at all
    Missing,
    /// A string, possibly truncated or wrapped in prose
    Text(String),
    /// A live JSON value
    Value(Value),
}

impl RawToolCall {
    /// Read a candidate from one record of a tool-call container
    ///
    /// Accepts the `OpenAI` `{id, function: {name, arguments}}` form, flat
    /// `{name, arguments}` records and the Anthropic `{id, name, input}`
    /// block.
    pub fn from_record(record: &Value) -> Option<Self> {
        let record = record.as_object()?;
        let function = record.get("function").filter(|f| f.is_object());

        let name = function
            .and_then(|f| f.get("name"))
            .into_iter()
            .chain(["name", "toolName", "tool_name"].iter().filter_map(|k| record.get(*k)))
            .find_map(|v| v.as_str().map(str::trim).filter(|s| !s.is_empty()))
            .map(str::to_owned);

        let id = ["id", "toolCallId", "tool_call_id", "callId"]
            .iter()
            .filter_map(|k| record.get(*k))
            .find_map(|v| v.as_str().filter(|s| !s.trim().is_empty()))
            .map(str::to_owned);

        let arguments = function
            .and_then(|f| f.get("arguments"))
            .into_iter()
            .chain(["arguments", "args", "input", "parameters"].iter().filter_map(|k| record.get(*k)))
            .next()
            .map_or(RawArguments::Missing, |v| match v {
                Value::String(s) => RawArguments::Text(s.clone()),
                other => RawArguments::Value(other.clone()),
            });

        Some(Self { id, name, arguments })
    }

    /// Read a candidate from the body of a `<tool_call>` text block
    ///
    /// The body is usually `{"name": ..., "arguments": {...}}`, possibly
    /// cut off mid-way. When nothing parses the whole body is kept as
    /// arguments text for the repair pass.
    pub fn from_text_block(body: &str) -> Self {
        match recover_object(body) {
            Some(object) => Self::from_record(&Value::Object(object)).unwrap_or_else(|| Self::unparsed(body)),
            None => Self::unparsed(body),
        }
    }

    fn unparsed(body: &str) -> Self {
        Self {
            id: None,
            name: None,
            arguments: RawArguments::Text(body.to_owned()),
        }
    }
}

impl From<&ToolCall> for RawToolCall {
    fn from(call: &ToolCall) -> Self {
        Self {
            id: Some(call.id.clone()),
            name: Some(call.name.clone()),
            arguments: RawArguments::Text(call.arguments.clone()),
        }
    }
}

type ContainerProbe = fn(&Value) -> Option<Vec<RawToolCall>>;

/// Container probes in priority order
const PROBES: &[ContainerProbe] = &[
    top_level,
    message,
    chat_choice,
    generation_wrappers,
    content_blocks,
    candidate_parts,
];

/// Candidates from the first container that holds any
pub(super) fn probe(raw: &Value) -> Option<Vec<RawToolCall>> {
    PROBES.iter().find_map(|probe| probe(raw))
}

fn records_at(raw: &Value, pointers: &[&str]) -> Option<Vec<RawToolCall>> {
    pointers.iter().find_map(|p| {
        let calls: Vec<RawToolCall> = raw
            .pointer(p)?
            .as_array()?
            .iter()
            .filter_map(RawToolCall::from_record)
            .collect();
        Some(calls).filter(|c| !c.is_empty())
    })
}

fn top_level(raw: &Value) -> Option<Vec<RawToolCall>> {
    records_at(raw, &["/toolCalls", "/tool_calls"])
}

fn message(raw: &Value) -> Option<Vec<RawToolCall>> {
    records_at(raw, &["/message/toolCalls", "/message/tool_calls"])
}

fn chat_choice(raw: &Value) -> Option<Vec<RawToolCall>> {
    records_at(raw, &["/choices/0/message/tool_calls"])
}

fn generation_wrappers(raw: &Value) -> Option<Vec<RawToolCall>> {
    records_at(
        raw,
        &[
            "/generation/toolCalls",
            "/generation/tool_calls",
            "/generation/details/toolCalls",
            "/details/toolCalls",
            "/details/tool_calls",
        ],
    )
}

fn content_blocks(raw: &Value) -> Option<Vec<RawToolCall>> {
    let calls: Vec<RawToolCall> = raw
        .get("content")?
        .as_array()?
        .iter()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("tool_use"))
        .filter_map(RawToolCall::from_record)
        .collect();
    Some(calls).filter(|c| !c.is_empty())
}

fn candidate_parts(raw: &Value) -> Option<Vec<RawToolCall>> {
    let calls: Vec<RawToolCall> = raw
        .pointer("/candidates/0/content/parts")?
        .as_array()?
        .iter()
        .filter_map(|part| part.get("functionCall"))
        .filter_map(RawToolCall::from_record)
        .collect();
    Some(calls).filter(|c| !c.is_empty())
}
