use async_trait::async_trait;
use jiff::Timestamp;
use serde_json::{Map, Value, json};

use crate::tools::{Param, ParamKind, Tool, ToolCategory, ToolError};

/// Current date and time in a given IANA time zone
pub struct CurrentTime;

const PARAMS: &[Param] = &[Param::optional(
    "timezone",
    ParamKind::String,
    "IANA time zone such as Europe/Berlin, default UTC",
)];

const ALIASES: &[(&str, &str)] = &[
    ("tz", "timezone"),
    ("zone", "timezone"),
    ("time_zone", "timezone"),
    ("location", "timezone"),
];

#[async_trait]
impl Tool for CurrentTime {
    fn name(&self) -> &'static str {
        "current_time"
    }

    fn description(&self) -> &'static str {
        "Return the current date and time"
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
        let zone = args
            .get("timezone")
            .and_then(Value::as_str)
            .filter(|z| !z.trim().is_empty())
            .unwrap_or("UTC");

        let now = Timestamp::now()
            .in_tz(zone)
            .map_err(|e| ToolError::Execution(format!("unknown time zone '{zone}': {e}")))?;

        Ok(json!({
            "timezone": zone,
            "datetime": now.strftime("%Y-%m-%dT%H:%M:%S%:z").to_string(),
            "weekday": now.strftime("%A").to_string(),
            "unix": now.timestamp().as_second(),
        }))
    }
}
