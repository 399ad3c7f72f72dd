#![allow(clippy::must_use_candidate)]

pub mod backend;
mod duration;
pub mod engine;
mod env;
pub mod health;
mod loader;
pub mod models;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use backend::*;
pub use engine::*;
pub use health::*;
pub use models::*;
pub use server::*;
pub use telemetry::TelemetryConfig;

/// Top-level Prism configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Hosted model backend
    #[serde(default)]
    pub backend: BackendConfig,
    /// Model capability catalogue
    #[serde(default)]
    pub models: ModelsConfig,
    /// Orchestration limits
    #[serde(default)]
    pub engine: EngineConfig,
    /// Built-in tool registry
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Streaming response shaping
    #[serde(default)]
    pub streaming: StreamingConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
