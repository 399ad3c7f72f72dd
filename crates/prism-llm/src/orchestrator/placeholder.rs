use regex::{Captures, Regex};

/// A parameter the caller wants derived from the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub description: Option<String>,
    pub kind: Option<String>,
}

/// Rewrites `{{ $fromAI('name', 'description', 'type') }}` placeholders
///
/// Workflow-automation callers embed these in user content to ask the
/// model for a value instead of supplying it. Each one becomes a
/// bracketed instruction the model can follow.
#[derive(Debug, Clone)]
pub struct PlaceholderRewriter {
    pattern: Regex,
}

impl PlaceholderRewriter {
    pub fn new() -> Self {
        let arg = r#"(?:'([^']*)'|"([^"]*)")"#;
        let pattern = format!(r"\{{\{{\s*\$fromAI\(\s*{arg}(?:\s*,\s*{arg})?(?:\s*,\s*{arg})?[^)]*\)\s*\}}\}}");

        Self {
            pattern: Regex::new(&pattern).expect("valid placeholder regex"),
        }
    }

    /// Rewrite every placeholder in `text`, collecting the ones found
    pub fn rewrite(&self, text: &str, found: &mut Vec<Placeholder>) -> String {
        if !text.contains("$fromAI") {
            return text.to_owned();
        }

        self.pattern
            .replace_all(text, |caps: &Captures<'_>| {
                let placeholder = Placeholder {
                    name: quoted(caps, 1).unwrap_or_default(),
                    description: quoted(caps, 3),
                    kind: quoted(caps, 5),
                };
                let instruction = instruction(&placeholder);

                if !found.iter().any(|p| p.name == placeholder.name) {
                    found.push(placeholder);
                }
                instruction
            })
            .into_owned()
    }
}

impl Default for PlaceholderRewriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Value of the quoted argument starting at capture group `group`
fn quoted(caps: &Captures<'_>, group: usize) -> Option<String> {
    caps.get(group)
        .or_else(|| caps.get(group + 1))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn instruction(placeholder: &Placeholder) -> String {
    let mut text = format!("[derive parameter \"{}\"", placeholder.name);
    if let Some(kind) = &placeholder.kind {
        text.push_str(&format!(" ({kind})"));
    }
    text.push_str(" from the conversation");
    if let Some(description) = &placeholder.description {
        text.push_str(": ");
        text.push_str(description);
    }
    text.push(']');
    text
}

/// System prompt addendum listing the parameters to derive
pub fn system_note(placeholders: &[Placeholder]) -> Option<String> {
    if placeholders.is_empty() {
        return None;
    }

    let mut note = String::from(
        "The user's message marks some values as parameters to derive. \
         Fill in each one from the surrounding conversation:",
    );
    for placeholder in placeholders {
        note.push_str("\n- ");
        note.push_str(&placeholder.name);
        if let Some(kind) = &placeholder.kind {
            note.push_str(&format!(" ({kind})"));
        }
        if let Some(description) = &placeholder.description {
            note.push_str(": ");
            note.push_str(description);
        }
    }
    Some(note)
}
