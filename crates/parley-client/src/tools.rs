//! Tool declarations and the per-client active set

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Provider-understood description of a callable function
///
/// Opaque to this crate: whatever JSON the caller supplies is sent as-is and
/// the endpoint decides whether it is acceptable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolDeclaration(Value);

impl ToolDeclaration {
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Build an OpenAI-style function declaration
    pub fn function(name: &str, description: &str, parameters: Value) -> Self {
        Self(json!({
            "type": "function",
            "function": {
                "name": name,
                "description": description,
                "parameters": parameters,
            }
        }))
    }

    /// Declared function name, if the declaration carries one
    pub fn name(&self) -> Option<&str> {
        self.0["function"]["name"].as_str().or_else(|| self.0["name"].as_str())
    }

    /// Null, empty string, empty array and empty object count as empty
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        }
    }

    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for ToolDeclaration {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Option<Value>> for ToolDeclaration {
    fn from(value: Option<Value>) -> Self {
        Self(value.unwrap_or(Value::Null))
    }
}

/// The tool declarations currently bound to a client
///
/// Updates replace the whole set at once, so readers see either the
/// previous or the new set, never a mix.
#[derive(Debug)]
pub struct ToolRegistry {
    active: RwLock<Arc<[ToolDeclaration]>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self {
            active: RwLock::new(Arc::from(Vec::new())),
        }
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active set; empty entries are dropped, order is kept
    ///
    /// Returns the number of declarations now active.
    pub fn set_tools<I>(&self, declarations: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<ToolDeclaration>,
    {
        let filtered: Arc<[ToolDeclaration]> = declarations
            .into_iter()
            .map(Into::into)
            .filter(|tool| !tool.is_empty())
            .collect();
        let count = filtered.len();

        *self.active.write().unwrap_or_else(PoisonError::into_inner) = filtered;

        count
    }

    /// Snapshot of the active set
    pub fn active_tools(&self) -> Arc<[ToolDeclaration]> {
        Arc::clone(&self.active.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.active_tools().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.set_tools(Vec::<ToolDeclaration>::new());
    }
}
