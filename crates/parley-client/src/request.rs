//! Chat-completion request assembly

use parley_config::ModelConfig;
use serde::Serialize;

use crate::message::{Message, WireMessage, translate};
use crate::tools::ToolDeclaration;

/// Temperature used when none is configured, or the configured value is zero
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Chat-completion request body
///
/// Serializes to exactly `{model, messages, temperature, tools}` unless
/// sampling forwarding is enabled.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub temperature: f64,
    pub tools: Vec<ToolDeclaration>,
    /// Legacy function list kept for response compatibility; never sent
    #[serde(skip)]
    pub functions: Vec<ToolDeclaration>,
    #[serde(flatten)]
    pub sampling: Option<SamplingParams>,
}

/// Optional sampling parameters, sent only when forwarding is enabled
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SamplingParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

impl SamplingParams {
    fn from_model(model: &ModelConfig) -> Self {
        let stop = model.stop_sequences();
        Self {
            max_tokens: model.max_tokens,
            top_p: model.top_p,
            frequency_penalty: model.frequency_penalty,
            presence_penalty: model.presence_penalty,
            stop: (!stop.is_empty()).then_some(stop),
        }
    }
}

/// Resolve the temperature to send; unset, zero and non-finite values fall back
pub fn effective_temperature(temperature: Option<f64>) -> f64 {
    match temperature {
        Some(t) if t.is_normal() => t,
        _ => DEFAULT_TEMPERATURE,
    }
}

/// Builds requests for one model configuration
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    model: &'a ModelConfig,
}

impl<'a> RequestBuilder<'a> {
    pub const fn new(model: &'a ModelConfig) -> Self {
        Self { model }
    }

    /// Single-prompt request: one synthesized user message, no history
    pub fn prompt(&self, prompt: &str, tools: &[ToolDeclaration]) -> ChatRequest {
        self.build(vec![WireMessage::user(prompt)], tools)
    }

    /// Multi-turn request carrying the whole translated conversation
    pub fn conversation(&self, messages: &[Message], tools: &[ToolDeclaration]) -> ChatRequest {
        self.build(translate(messages), tools)
    }

    fn build(&self, messages: Vec<WireMessage>, tools: &[ToolDeclaration]) -> ChatRequest {
        ChatRequest {
            model: self.model.name.clone(),
            messages,
            temperature: effective_temperature(self.model.temperature),
            tools: tools.to_vec(),
            functions: Vec::new(),
            sampling: self
                .model
                .forward_sampling
                .then(|| SamplingParams::from_model(self.model)),
        }
    }
}
