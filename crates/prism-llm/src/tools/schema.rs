use serde_json::{Map, Value, json};
use thiserror::Error;

/// JSON type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// One declared tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

impl Param {
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }
}

/// Arguments that do not fit the declared parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("tool arguments must be a JSON object")]
    NotAnObject,

    #[error("missing required parameter '{name}'")]
    MissingRequired { name: &'static str },

    #[error("invalid type for '{name}': expected {expected}, got {actual}")]
    InvalidType {
        name: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
}

/// JSON Schema object for a parameter list
pub(super) fn schema(params: &[Param]) -> Value {
    let properties: Map<String, Value> = params
        .iter()
        .map(|p| {
            (
                p.name.to_owned(),
                json!({"type": p.kind.as_str(), "description": p.description}),
            )
        })
        .collect();

    let required: Vec<&str> = params.iter().filter(|p| p.required).map(|p| p.name).collect();

    json!({"type": "object", "properties": properties, "required": required})
}

/// Move alias keys to their canonical names
///
/// An alias is only used when the canonical key is absent or `null`; the
/// first non-null alias in table order wins.
pub(super) fn remap_aliases(
    mut args: Map<String, Value>,
    aliases: &[(&'static str, &'static str)],
) -> Map<String, Value> {
    for (alias, canonical) in aliases {
        if args.get(*canonical).is_some_and(|v| !v.is_null()) {
            continue;
        }
        if args.get(*alias).is_some_and(|v| !v.is_null())
            && let Some(value) = args.remove(*alias)
        {
            args.insert((*canonical).to_owned(), value);
        }
    }
    args
}

/// Check arguments against the declared parameters
///
/// `null` counts as absent. Undeclared keys are ignored.
pub(super) fn validate(params: &[Param], args: &Map<String, Value>) -> Result<(), ValidationError> {
    for param in params {
        match args.get(param.name).filter(|v| !v.is_null()) {
            None if param.required => return Err(ValidationError::MissingRequired { name: param.name }),
            None => {}
            Some(value) if !param.kind.matches(value) => {
                return Err(ValidationError::InvalidType {
                    name: param.name,
                    expected: param.kind.as_str(),
                    actual: json_type(value),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: &[Param] = &[
        Param::required("query", ParamKind::String, "Search term"),
        Param::optional("limit", ParamKind::Integer, "Maximum results"),
    ];

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn schema_lists_required_params() {
        assert_eq!(
            schema(PARAMS),
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search term"},
                    "limit": {"type": "integer", "description": "Maximum results"}
                },
                "required": ["query"]
            })
        );
    }

    #[test]
    fn alias_fills_missing_canonical() {
        let remapped = remap_aliases(args(json!({"input": "x"})), &[("input", "query")]);
        assert_eq!(remapped, args(json!({"query": "x"})));
    }

    #[test]
    fn canonical_wins_over_alias() {
        let remapped = remap_aliases(args(json!({"query": "a", "input": "b"})), &[("input", "query")]);
        assert_eq!(remapped["query"], "a");
    }

    #[test]
    fn null_canonical_takes_alias() {
        let remapped = remap_aliases(
            args(json!({"query": null, "input": "rust"})),
            &[("search", "query"), ("input", "query")],
        );
        assert_eq!(remapped, args(json!({"query": "rust"})));
    }

    #[test]
    fn missing_required() {
        assert_eq!(
            validate(PARAMS, &args(json!({"limit": 2}))),
            Err(ValidationError::MissingRequired { name: "query" })
        );
        assert_eq!(
            validate(PARAMS, &args(json!({"query": null}))),
            Err(ValidationError::MissingRequired { name: "query" })
        );
    }

    #[test]
    fn wrong_type() {
        assert_eq!(
            validate(PARAMS, &args(json!({"query": "x", "limit": 1.5}))),
            Err(ValidationError::InvalidType {
                name: "limit",
                expected: "integer",
                actual: "number"
            })
        );
    }

    #[test]
    fn optional_and_extra_keys_pass() {
        assert!(validate(PARAMS, &args(json!({"query": "x", "verbose": true}))).is_ok());
    }
}
