use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::truncate_output;
use crate::tools::{Param, ParamKind, Tool, ToolCategory, ToolError};

/// Reads UTF-8 files below a sandbox root
pub struct ReadFile {
    root: PathBuf,
}

const PARAMS: &[Param] = &[Param::required(
    "path",
    ParamKind::String,
    "File path relative to the sandbox root",
)];

const ALIASES: &[(&str, &str)] = &[("file", "path"), ("filename", "path"), ("file_path", "path")];

impl ReadFile {
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve `requested` inside the sandbox
    ///
    /// Rejects absolute paths and parent components up front, then checks
    /// the canonical path so symlinks cannot escape either.
    async fn resolve(&self, requested: &str) -> Result<PathBuf, ToolError> {
        let relative = Path::new(requested);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(ToolError::Execution(format!("path '{requested}' is outside the sandbox")));
        }

        let root = tokio::fs::canonicalize(&self.root)
            .await
            .map_err(|e| ToolError::Execution(format!("sandbox root is unavailable: {e}")))?;
        let resolved = tokio::fs::canonicalize(root.join(relative))
            .await
            .map_err(|e| ToolError::Execution(format!("cannot open '{requested}': {e}")))?;

        if !resolved.starts_with(&root) {
            return Err(ToolError::Execution(format!("path '{requested}' is outside the sandbox")));
        }

        Ok(resolved)
    }
}

#[async_trait]
impl Tool for ReadFile {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Read a text file from the sandbox directory"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::FileSystem
    }

    fn params(&self) -> &'static [Param] {
        PARAMS
    }

    fn aliases(&self) -> &'static [(&'static str, &'static str)] {
        ALIASES
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<Value, ToolError> {
        let requested = args.get("path").and_then(Value::as_str).unwrap_or_default();
        let path = self.resolve(requested).await?;

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| ToolError::Execution(format!("cannot read '{requested}': {e}")))?;

        Ok(Value::String(truncate_output(String::from_utf8_lossy(&bytes).into_owned())))
    }
}
