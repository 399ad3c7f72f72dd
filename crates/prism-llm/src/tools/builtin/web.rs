use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{Map, Value, json};
use url::Url;

use super::{MAX_OUTPUT_BYTES, truncate_output};
use crate::tools::{Param, ParamKind, Tool, ToolCategory, ToolError};

/// Fetches a URL over HTTP(S)
pub struct HttpGet {
    client: Client,
}

const PARAMS: &[Param] = &[Param::required("url", ParamKind::String, "Absolute http or https URL")];

const ALIASES: &[(&str, &str)] = &[("uri", "url"), ("link", "url"), ("address", "url")];

impl HttpGet {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for HttpGet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for HttpGet {
    fn name(&self) -> &'static str {
        "http_get"
    }

    fn description(&self) -> &'static str {
        "Fetch a web page or API response with an HTTP GET request"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Network
    }

    fn params(&self) -> &'static [Param] {
        PARAMS
    }

    fn aliases(&self) -> &'static [(&'static str, &'static str)] {
        ALIASES
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<Value, ToolError> {
        let raw = args.get("url").and_then(Value::as_str).unwrap_or_default();
        let url = parse_url(raw)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ToolError::Execution(format!("request failed: {e}")))?;
        let status = response.status().as_u16();

        // Stop reading once the cap is reached
        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| ToolError::Execution(format!("reading body failed: {e}")))?;
            body.extend_from_slice(&chunk);
            if body.len() > MAX_OUTPUT_BYTES {
                break;
            }
        }

        Ok(json!({
            "status": status,
            "body": truncate_output(String::from_utf8_lossy(&body).into_owned()),
        }))
    }
}

fn parse_url(raw: &str) -> Result<Url, ToolError> {
    let url = Url::parse(raw).map_err(|e| ToolError::Execution(format!("invalid url '{raw}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ToolError::Execution(format!("unsupported url scheme '{other}'"))),
    }
}
