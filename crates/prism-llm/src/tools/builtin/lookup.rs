use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::tools::{Param, ParamKind, Tool, ToolCategory, ToolError};

/// Search over the configured glossary
pub struct Lookup {
    entries: IndexMap<String, String>,
}

const PARAMS: &[Param] = &[
    Param::required("query", ParamKind::String, "Term or phrase to look up"),
    Param::optional("limit", ParamKind::Integer, "Maximum number of matches, default 5"),
];

const ALIASES: &[(&str, &str)] = &[
    ("input", "query"),
    ("search", "query"),
    ("term", "query"),
    ("text", "query"),
    ("prompt", "query"),
    ("content", "query"),
    ("message", "query"),
    ("q", "query"),
    ("keyword", "query"),
];

const DEFAULT_LIMIT: usize = 5;

impl Lookup {
    pub const fn new(entries: IndexMap<String, String>) -> Self {
        Self { entries }
    }

    /// Exact key matches first, then entries whose key or text contains the query
    fn search(&self, query: &str, limit: usize) -> Vec<Value> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let exact = self.entries.iter().filter(|(key, _)| key.to_lowercase() == needle);
        let partial = self.entries.iter().filter(|(key, text)| {
            let key = key.to_lowercase();
            key != needle && (key.contains(&needle) || text.to_lowercase().contains(&needle))
        });

        exact
            .chain(partial)
            .take(limit)
            .map(|(key, text)| json!({"term": key, "definition": text}))
            .collect()
    }
}

#[async_trait]
impl Tool for Lookup {
    fn name(&self) -> &'static str {
        "lookup"
    }

    fn description(&self) -> &'static str {
        "Look up a term in the reference glossary"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Safe
    }

    fn params(&self) -> &'static [Param] {
        PARAMS
    }

    fn aliases(&self) -> &'static [(&'static str, &'static str)] {
        ALIASES
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<Value, ToolError> {
        let query = args.get("query").and_then(Value::as_str).unwrap_or_default();
        let limit = args
            .get("limit")
            .and_then(Value::as_u64)
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(DEFAULT_LIMIT)
            .max(1);

        let matches = self.search(query, limit);
        tracing::debug!(query, matches = matches.len(), "glossary lookup");

        Ok(json!({"query": query, "matches": matches}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> Lookup {
        let mut entries = IndexMap::new();
        entries.insert("Rust ownership".to_owned(), "Each value has one owner".to_owned());
        entries.insert("rust".to_owned(), "A systems programming language".to_owned());
        entries.insert("cargo".to_owned(), "The Rust package manager".to_owned());
        Lookup::new(entries)
    }

    #[test]
    fn exact_match_comes_first() {
        let matches = lookup().search("RUST", 5);

        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0]["term"], "rust");
        assert_eq!(matches[1]["term"], "Rust ownership");
        assert_eq!(matches[2]["term"], "cargo");
    }

    #[test]
    fn limit_is_respected() {
        assert_eq!(lookup().search("rust", 1).len(), 1);
    }

    #[test]
    fn blank_query_matches_nothing() {
        assert!(lookup().search("  ", 5).is_empty());
    }

    #[tokio::test]
    async fn result_echoes_query() {
        let mut args = Map::new();
        args.insert("query".to_owned(), json!("cargo"));

        let result = lookup().execute(args).await.unwrap();
        assert_eq!(result["query"], "cargo");
        assert_eq!(result["matches"][0]["definition"], "The Rust package manager");
    }
}
