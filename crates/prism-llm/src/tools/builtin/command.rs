use std::process::Stdio;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio::process::Command;

use super::truncate_output;
use crate::tools::{Param, ParamKind, Tool, ToolCategory, ToolError};

/// Runs allow-listed programs without a shell
pub struct RunCommand {
    allowed: Vec<String>,
}

const PARAMS: &[Param] = &[
    Param::required("command", ParamKind::String, "Program name, must be allow-listed"),
    Param::optional("args", ParamKind::Array, "Arguments passed to the program"),
];

const ALIASES: &[(&str, &str)] = &[("cmd", "command"), ("program", "command"), ("arguments", "args")];

impl RunCommand {
    pub const fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }
}

#[async_trait]
impl Tool for RunCommand {
    fn name(&self) -> &'static str {
        "run_command"
    }

    fn description(&self) -> &'static str {
        "Run an allow-listed command and return its exit code and output"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Process
    }

    fn params(&self) -> &'static [Param] {
        PARAMS
    }

    fn aliases(&self) -> &'static [(&'static str, &'static str)] {
        ALIASES
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<Value, ToolError> {
        let command = args.get("command").and_then(Value::as_str).unwrap_or_default();
        if !self.allowed.iter().any(|a| a == command) {
            return Err(ToolError::Execution(format!("command '{command}' is not allowed")));
        }

        let argv: Vec<String> = args
            .get("args")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_owned))
                    .collect()
            })
            .unwrap_or_default();

        // Dropped on timeout, which kills the child
        let output = Command::new(command)
            .args(&argv)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ToolError::Execution(format!("failed to start '{command}': {e}")))?;

        Ok(json!({
            "exit_code": output.status.code(),
            "stdout": truncate_output(String::from_utf8_lossy(&output.stdout).into_owned()),
            "stderr": truncate_output(String::from_utf8_lossy(&output.stderr).into_owned()),
        }))
    }
}
