use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;

/// Limits for the tool-calling conversation loop
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum backend calls per request
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    /// Maximum retained conversation messages, oldest evicted first
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            max_history: default_max_history(),
        }
    }
}

/// Built-in tool registry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Advertise and execute built-in tools when the client declares none
    #[serde(default = "default_true")]
    pub builtin: bool,
    /// Register file, network and process tools
    #[serde(default)]
    pub allow_dangerous: bool,
    /// Per-call execution timeout
    #[serde(default = "default_tool_timeout", deserialize_with = "crate::duration::deserialize")]
    pub timeout: Duration,
    /// Directory `read_file` is confined to
    #[serde(default)]
    pub sandbox_root: Option<PathBuf>,
    /// Programs `run_command` may launch
    #[serde(default)]
    pub allowed_commands: Vec<String>,
    /// Glossary searched by the `lookup` tool
    #[serde(default)]
    pub lookup: IndexMap<String, String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            allow_dangerous: false,
            timeout: default_tool_timeout(),
            sandbox_root: None,
            allowed_commands: Vec::new(),
            lookup: IndexMap::new(),
        }
    }
}

/// Streaming response shaping
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamingConfig {
    /// Idle interval after which a keepalive is sent
    #[serde(default = "default_heartbeat", deserialize_with = "crate::duration::deserialize")]
    pub heartbeat_interval: Duration,
    /// Words per content delta
    #[serde(default = "default_chunk_words")]
    pub chunk_words: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: default_heartbeat(),
            chunk_words: default_chunk_words(),
        }
    }
}

const fn default_max_turns() -> u32 {
    8
}

const fn default_max_history() -> usize {
    50
}

const fn default_true() -> bool {
    true
}

const fn default_tool_timeout() -> Duration {
    Duration::from_secs(30)
}

const fn default_heartbeat() -> Duration {
    Duration::from_secs(15)
}

const fn default_chunk_words() -> usize {
    5
}
