use regex::{Captures, Regex};

/// Placeholder grammar: `{{ env.NAME }}` with an optional `| default("x")`
const PLACEHOLDER: &str = r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#;

/// Expand `{{ env.VAR }}` placeholders in raw TOML text
///
/// Runs once per load, before deserialization, so config structs hold plain
/// strings and secrets. Comment lines are left untouched so a commented-out
/// secret never has to be present in the environment.
pub fn expand_env(input: &str) -> Result<String, String> {
    let pattern = Regex::new(PLACEHOLDER).map_err(|e| format!("invalid placeholder pattern: {e}"))?;

    let lines = input
        .lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                Ok(line.to_owned())
            } else {
                expand_line(&pattern, line)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut output = lines.join("\n");
    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

fn expand_line(pattern: &Regex, line: &str) -> Result<String, String> {
    let mut output = String::with_capacity(line.len());
    let mut cursor = 0;

    for captures in pattern.captures_iter(line) {
        let (Some(whole), Some(key)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        output.push_str(&line[cursor..whole.start()]);
        output.push_str(&resolve(key.as_str(), &captures)?);
        cursor = whole.end();
    }

    output.push_str(&line[cursor..]);
    Ok(output)
}

fn resolve(key: &str, captures: &Captures<'_>) -> Result<String, String> {
    let Some(name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(name), captures.get(2)) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.as_str().to_owned()),
        (Err(_), None) => Err(format!("environment variable not found: `{name}`")),
    }
}
