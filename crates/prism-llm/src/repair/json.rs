//! Recovery of JSON objects from damaged model output

use serde_json::{Map, Value};

/// Best-effort parse of a JSON object out of model text
///
/// Tries, in order: the trimmed text as-is, the first complete value
/// starting at the first `{` (dropping surrounding prose or code fences),
/// then [`balance`] for output that was cut off.
pub fn recover_object(text: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(object)) = serde_json::from_str(text.trim()) {
        return Some(object);
    }

    let start = text.find('{')?;
    let tail = &text[start..];

    let leading = serde_json::Deserializer::from_str(tail).into_iter::<Value>().next();
    if let Some(Ok(Value::Object(object))) = leading {
        return Some(object);
    }

    match serde_json::from_str(&balance(tail)?) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// Close a truncated JSON object
///
/// Scans from the first `{`, tracking strings and open brackets, then
/// closes whatever is still open. When that does not parse, retries from
/// each earlier comma or opening bracket, newest first, dropping the
/// incomplete member. Returns `None` when no prefix can be closed into
/// valid JSON or the brackets are mismatched.
pub fn balance(text: &str) -> Option<String> {
    let body = &text[text.find('{')?..];

    let mut stack: Vec<char> = Vec::new();
    let mut checkpoints: Vec<(usize, Vec<char>)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' | '[' => {
                stack.push(if c == '{' { '}' } else { ']' });
                checkpoints.push((i + 1, stack.clone()));
            }
            '}' | ']' => {
                if stack.pop() != Some(c) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(body[..=i].to_owned());
                }
            }
            ',' => checkpoints.push((i, stack.clone())),
            _ => {}
        }
    }

    let mut full = body.to_owned();
    if in_string {
        if escaped {
            full.pop();
        }
        full.push('"');
    }
    let trimmed = full.trim_end();
    let mut full = trimmed.strip_suffix(',').unwrap_or(trimmed).to_owned();
    if full.ends_with(':') {
        full.push_str("null");
    }

    std::iter::once(close(&full, &stack))
        .chain(checkpoints.iter().rev().map(|(at, open)| close(&body[..*at], open)))
        .find(|candidate| serde_json::from_str::<Value>(candidate).is_ok())
}

fn close(prefix: &str, open: &[char]) -> String {
    let mut out = prefix.trim_end().to_owned();
    out.extend(open.iter().rev());
    out
}
