//! Tool-call repair
//!
//! Turns raw candidates into well-formed [`ToolCall`]s: a valid name, a
//! unique id and arguments that parse as a JSON object. Calls that cannot
//! be given a valid name are dropped and counted. A call that is already
//! well-formed passes through unchanged.

pub mod json;

use std::collections::HashSet;

use regex::Regex;
use serde_json::Value;

use crate::extract::{RawArguments, RawToolCall};
use crate::types::{ToolCall, ToolDefinition};

/// Outcome of repairing one batch of candidates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Well-formed calls, in candidate order
    pub calls: Vec<ToolCall>,
    /// Number of candidates dropped as unrepairable
    pub dropped: usize,
    /// What was changed or why a candidate was dropped
    pub diagnostics: Vec<RepairDiagnostic>,
}

/// One repair action, keyed by candidate index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairDiagnostic {
    pub index: usize,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Missing name filled from the only declared tool
    NameFilled,
    /// Invalid characters replaced in the name
    NameSanitized { original: String },
    /// Missing name with several declared tools; candidate dropped
    AmbiguousName { declared: usize },
    /// Missing name with no declared tools; candidate dropped
    MissingName,
    /// Name had no usable characters; candidate dropped
    InvalidName { original: String },
    /// Arguments were a live object and got serialized
    ArgumentsSerialized,
    /// Arguments were damaged text and got recovered
    ArgumentsRecovered,
    /// Arguments were unusable and got replaced with `{}`
    ArgumentsDefaulted,
    /// Missing or duplicate id replaced with a fresh one
    IdAssigned,
}

/// Repairs tool-call candidates against the declared tool definitions
#[derive(Debug, Clone)]
pub struct ToolCallRepair {
    valid_name: Regex,
}

impl ToolCallRepair {
    pub fn new() -> Self {
        Self {
            valid_name: Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("valid tool name regex"),
        }
    }

    /// Whether a tool name is well-formed
    pub fn is_valid_name(&self, name: &str) -> bool {
        self.valid_name.is_match(name)
    }

    /// Repair a batch of candidates
    pub fn repair(&self, candidates: Vec<RawToolCall>, definitions: &[ToolDefinition]) -> RepairReport {
        let mut report = RepairReport::default();
        let mut seen_ids = HashSet::new();

        for (index, candidate) in candidates.into_iter().enumerate() {
            let mut note = |kind| report.diagnostics.push(RepairDiagnostic { index, kind });

            let Some(name) = self.repair_name(candidate.name, definitions, &mut note) else {
                report.dropped += 1;
                continue;
            };

            let arguments = normalize_arguments(candidate.arguments, &mut note);

            let id = match candidate.id {
                Some(id) if !id.trim().is_empty() && !seen_ids.contains(&id) => id,
                _ => {
                    note(DiagnosticKind::IdAssigned);
                    format!("call_{}", uuid::Uuid::new_v4().simple())
                }
            };
            seen_ids.insert(id.clone());

            report.calls.push(ToolCall { id, name, arguments });
        }

        if report.dropped > 0 {
            tracing::warn!(
                dropped = report.dropped,
                kept = report.calls.len(),
                "dropped unrepairable tool calls"
            );
        }

        report
    }

    fn repair_name(
        &self,
        name: Option<String>,
        definitions: &[ToolDefinition],
        note: &mut impl FnMut(DiagnosticKind),
    ) -> Option<String> {
        let Some(name) = name else {
            return match definitions {
                [only] => {
                    note(DiagnosticKind::NameFilled);
                    Some(only.name.clone())
                }
                [] => {
                    note(DiagnosticKind::MissingName);
                    None
                }
                _ => {
                    note(DiagnosticKind::AmbiguousName {
                        declared: definitions.len(),
                    });
                    None
                }
            };
        };

        if self.is_valid_name(&name) {
            return Some(name);
        }

        let sanitized = sanitize_name(&name);
        if sanitized.is_empty() {
            note(DiagnosticKind::InvalidName { original: name });
            return None;
        }

        let sanitized = definitions
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(&sanitized))
            .map_or(sanitized, |d| d.name.clone());

        note(DiagnosticKind::NameSanitized { original: name });
        Some(sanitized)
    }
}

impl Default for ToolCallRepair {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip a `functions.` namespace, replace invalid characters with `_`
/// and drop leading characters that are not letters
fn sanitize_name(name: &str) -> String {
    let name = name.trim();
    let name = name.strip_prefix("functions.").unwrap_or(name);

    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .skip_while(|c| !c.is_ascii_alphabetic())
        .collect()
}

fn normalize_arguments(arguments: RawArguments, note: &mut impl FnMut(DiagnosticKind)) -> String {
    match arguments {
        RawArguments::Value(Value::Object(object)) => {
            note(DiagnosticKind::ArgumentsSerialized);
            Value::Object(object).to_string()
        }
        RawArguments::Value(Value::String(text)) | RawArguments::Text(text) => normalize_text(&text, note),
        RawArguments::Value(_) | RawArguments::Missing => {
            note(DiagnosticKind::ArgumentsDefaulted);
            "{}".to_owned()
        }
    }
}

fn normalize_text(text: &str, note: &mut impl FnMut(DiagnosticKind)) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(_)) => return text.to_owned(),
        Ok(Value::String(inner)) => {
            if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(&inner) {
                note(DiagnosticKind::ArgumentsRecovered);
                return Value::Object(object).to_string();
            }
        }
        _ => {}
    }

    if let Some(object) = json::recover_object(text) {
        note(DiagnosticKind::ArgumentsRecovered);
        return Value::Object(object).to_string();
    }

    note(DiagnosticKind::ArgumentsDefaulted);
    "{}".to_owned()
}
