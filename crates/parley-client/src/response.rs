//! Mapping of chat-completion responses to text and reply messages

use serde::Deserialize;

use crate::error::{ParleyError, Result};
use crate::message::{Message, MessageContent, Role, render_value, tool_calls_from_value};

/// Chat-completion response body (only the consumed fields)
#[derive(Debug, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
}

/// A single completion choice
#[derive(Debug, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

/// Message inside a choice
///
/// Every field is taken as raw JSON so text extraction never depends on the
/// shape of the others.
#[derive(Debug, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<serde_json::Value>,
    #[serde(default)]
    pub tool_calls: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<serde_json::Value>,
}

impl ChoiceMessage {
    /// Content as text; missing or null content is the empty string
    pub fn text(&self) -> String {
        self.content.as_ref().map(render_value).unwrap_or_default()
    }

    fn into_reply(self) -> Message {
        let content = self.text();
        Message {
            role: Role::Assistant,
            content: MessageContent::Text(content),
            tool_calls: self.tool_calls.and_then(tool_calls_from_value),
            name: self.name.as_ref().and_then(serde_json::Value::as_str).map(str::to_owned),
        }
    }
}

/// Single-prompt result: first-choice text plus the untouched payload
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub raw: serde_json::Value,
}

/// One chat reply paired with its text
#[derive(Debug, Clone, PartialEq)]
pub struct ChatGeneration {
    pub text: String,
    pub message: Message,
}

impl From<Message> for ChatGeneration {
    fn from(message: Message) -> Self {
        Self {
            text: message.text(),
            message,
        }
    }
}

fn decode(raw: &serde_json::Value) -> Result<ChatResponse> {
    ChatResponse::deserialize(raw).map_err(|e| ParleyError::Decode(format!("unexpected response shape: {e}")))
}

/// Extract `choices[0].message.content`, defaulting to the empty string
///
/// # Errors
///
/// Returns `ParleyError::Decode` if the payload does not have the
/// chat-completion shape
pub fn first_choice_text(raw: serde_json::Value) -> Result<Completion> {
    let response = decode(&raw)?;

    let content = response
        .choices
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .map(|message| message.text())
        .unwrap_or_default();

    Ok(Completion { content, raw })
}

/// Map every choice to an assistant reply, preserving order
///
/// An empty or absent `choices` array yields no replies.
///
/// # Errors
///
/// Returns `ParleyError::Decode` if the payload does not have the
/// chat-completion shape
pub fn replies(raw: &serde_json::Value) -> Result<Vec<Message>> {
    let response = decode(raw)?;

    Ok(response
        .choices
        .unwrap_or_default()
        .into_iter()
        .map(|choice| choice.message.unwrap_or_default().into_reply())
        .collect())
}

/// Number of choices in a payload, for diagnostics
pub(crate) fn choice_count(raw: &serde_json::Value) -> usize {
    raw["choices"].as_array().map_or(0, Vec::len)
}
