//! Domain messages and their translation to the two-role wire format

use serde::{Deserialize, Serialize};

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
    Function,
    /// Any role the orchestration layer emits that this adapter does not name
    #[serde(other)]
    Unknown,
}

/// Message content: plain text or a structured value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Structured(serde_json::Value),
}

impl MessageContent {
    /// Textual rendering, total for every shape
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => render_value(value),
        }
    }
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<serde_json::Value> for MessageContent {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => Self::Text(text),
            other => Self::Structured(other),
        }
    }
}

/// Render a JSON content value as text
///
/// Strings render as-is, null as the empty string, arrays of content parts
/// as the concatenation of their `text` fields. Anything else is
/// JSON-encoded.
pub(crate) fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Array(parts) if parts.iter().all(|p| p.get("text").is_some_and(serde_json::Value::is_string)) => {
            parts.iter().filter_map(|p| p["text"].as_str()).collect()
        }
        other => other.to_string(),
    }
}

/// A tool invocation requested by the model
///
/// Kept exactly as the endpoint sent it. The accessors read the OpenAI
/// `{id, type, function: {name, arguments}}` shape and return `None` for
/// anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolCall(serde_json::Value);

impl ToolCall {
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(serde_json::Value::as_str)
    }

    /// Usually `"function"`
    pub fn call_type(&self) -> Option<&str> {
        self.0.get("type").and_then(serde_json::Value::as_str)
    }

    pub fn function_name(&self) -> Option<&str> {
        self.0
            .get("function")
            .and_then(|f| f.get("name"))
            .and_then(serde_json::Value::as_str)
    }

    /// Provider-encoded arguments, usually a JSON string
    pub fn arguments(&self) -> Option<&serde_json::Value> {
        self.0.get("function").and_then(|f| f.get("arguments"))
    }

    pub const fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for ToolCall {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Tool-call data from a reply, passed through whatever its shape
///
/// An array yields one call per entry; null yields none; any other value is
/// kept as a single call.
pub(crate) fn tool_calls_from_value(value: serde_json::Value) -> Option<Vec<ToolCall>> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Array(items) => Some(items.into_iter().map(ToolCall).collect()),
        other => Some(vec![ToolCall(other)]),
    }
}

/// One conversation turn as the orchestration layer sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            name: None,
        }
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::Tool, content)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = Some(tool_calls);
        self
    }

    /// Content rendered as text
    pub fn text(&self) -> String {
        self.content.render()
    }
}

// -- Wire format --

/// The only roles the endpoint is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    Assistant,
}

impl From<Role> for WireRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User | Role::System => Self::User,
            Role::Assistant | Role::Tool | Role::Function | Role::Unknown => Self::Assistant,
        }
    }
}

/// Message shape transmitted to the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: String,
}

impl WireMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: WireRole::User,
            content: content.into(),
        }
    }
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.into(),
            content: message.text(),
        }
    }
}

/// Translate domain messages to wire messages, preserving order
pub fn translate(messages: &[Message]) -> Vec<WireMessage> {
    messages.iter().map(WireMessage::from).collect()
}
