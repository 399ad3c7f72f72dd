use std::path::PathBuf;

use clap::Parser;

/// Prism LLM gateway
#[derive(Debug, Parser)]
#[command(name = "prism", about = "OpenAI- and Anthropic-compatible gateway with tool orchestration")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "prism.toml", env = "PRISM_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "PRISM_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,

    /// Log filter directive, e.g. `debug` or `prism_llm=trace`
    #[arg(long, env = "PRISM_LOG")]
    pub log: Option<String>,
}
