//! Prompt augmentation
//!
//! Backends take a single prompt string. The prompt carries the tool
//! catalogue with call instructions, then the bounded transcript, and ends
//! on an open assistant turn.

use std::fmt::Write as _;

use super::conversation::ConversationState;
use crate::types::{Message, Role, ToolDefinition};

/// Render the outgoing prompt
pub fn render(tools: &[ToolDefinition], conversation: &ConversationState) -> String {
    let mut prompt = String::new();

    if !tools.is_empty() {
        prompt.push_str(&tool_section(tools));
        prompt.push_str("\n\n");
    }

    for message in conversation.messages() {
        render_message(&mut prompt, message);
        prompt.push_str("\n\n");
    }

    prompt.push_str("Assistant:");
    prompt
}

/// Join the caller's system prompt with any addenda
pub fn system(base: Option<&str>, addenda: impl IntoIterator<Item = String>) -> Option<String> {
    let parts: Vec<String> = base
        .map(str::to_owned)
        .into_iter()
        .chain(addenda)
        .filter(|p| !p.trim().is_empty())
        .collect();

    (!parts.is_empty()).then(|| parts.join("\n\n"))
}

fn tool_section(tools: &[ToolDefinition]) -> String {
    let mut section = String::from("You can call the following tools:\n");

    for tool in tools {
        let _ = write!(section, "\n- {}", tool.name);
        if let Some(description) = tool.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = write!(section, ": {description}");
        }
        let _ = write!(section, "\n  parameters: {}", tool.parameters);
    }

    section.push_str(
        "\n\nTo call a tool, reply with one block per call:\n\
         <tool_call>{\"name\": \"<tool name>\", \"arguments\": {<arguments as a JSON object>}}</tool_call>\n\
         Tool results are returned to you in the next turn. \
         When no tool is needed, answer the user directly.",
    );
    section
}

fn render_message(prompt: &mut String, message: &Message) {
    match message.role {
        Role::System => {
            let _ = write!(prompt, "System: {}", message.content);
        }
        Role::User => {
            let _ = write!(prompt, "User: {}", message.content);
        }
        Role::Assistant => {
            prompt.push_str("Assistant:");
            if !message.content.is_empty() {
                let _ = write!(prompt, " {}", message.content);
            }
            for call in &message.tool_calls {
                let arguments = if call.arguments.trim().is_empty() {
                    "{}"
                } else {
                    call.arguments.as_str()
                };
                let _ = write!(
                    prompt,
                    "\n<tool_call>{{\"name\": \"{}\", \"arguments\": {arguments}}}</tool_call>",
                    call.name
                );
            }
        }
        Role::Tool => {
            let label = match (&message.name, &message.tool_call_id) {
                (Some(name), Some(id)) => format!("{name}, {id}"),
                (Some(name), None) => name.clone(),
                (None, Some(id)) => id.clone(),
                (None, None) => "unknown".to_owned(),
            };
            let _ = write!(prompt, "Tool result ({label}): {}", message.content);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::ToolCall;

    #[test]
    fn transcript_without_tools() {
        let conversation = ConversationState::from_messages([Message::user("hi")], 10);

        insta::assert_snapshot!(render(&[], &conversation), @r"
        User: hi

        Assistant:
        ");
    }

    #[test]
    fn tool_round_trip_is_rendered() {
        let conversation = ConversationState::from_messages(
            [
                Message::user("2+2?"),
                Message::assistant_tool_calls(
                    None,
                    vec![ToolCall {
                        id: "call_1".to_owned(),
                        name: "calculate".to_owned(),
                        arguments: r#"{"expression":"2+2"}"#.to_owned(),
                    }],
                ),
                Message::tool_result("call_1", Some("calculate".to_owned()), "4"),
            ],
            10,
        );

        insta::assert_snapshot!(render(&[], &conversation), @r#"
        User: 2+2?

        Assistant:
        <tool_call>{"name": "calculate", "arguments": {"expression":"2+2"}}</tool_call>

        Tool result (calculate, call_1): 4

        Assistant:
        "#);
    }

    #[test]
    fn tool_catalogue_leads_the_prompt() {
        let tools = [ToolDefinition {
            name: "lookup".to_owned(),
            description: Some("Glossary search".to_owned()),
            parameters: json!({"type": "object"}),
        }];
        let conversation = ConversationState::from_messages([Message::user("what is rust?")], 10);

        let prompt = render(&tools, &conversation);

        assert!(prompt.starts_with("You can call the following tools:\n\n- lookup: Glossary search\n  parameters: {\"type\":\"object\"}"));
        assert!(prompt.contains("<tool_call>{\"name\": \"<tool name>\""));
        assert!(prompt.ends_with("User: what is rust?\n\nAssistant:"));
    }

    #[test]
    fn system_joins_non_empty_parts() {
        assert_eq!(
            system(Some("Be brief."), [String::new(), "Note.".to_owned()]).as_deref(),
            Some("Be brief.\n\nNote.")
        );
        assert_eq!(system(None, []), None);
    }
}
