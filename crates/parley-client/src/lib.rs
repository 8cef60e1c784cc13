#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Adapter between role-tagged conversations and an OpenAI-compatible
//! chat-completions endpoint
//!
//! [`ChatClient`] turns a prompt or a message history into a single POST,
//! and maps the response back to text or assistant replies. Tool
//! declarations registered with [`ChatClient::set_tools`] ride along on
//! every request. [`ChatClient::list_models`] reads the endpoint's model
//! catalog and never fails.

mod catalog;
mod client;
pub mod error;
pub mod message;
pub mod model;
pub mod observer;
pub mod request;
pub mod response;
pub mod tools;
mod transport;

pub use client::ChatClient;
pub use error::{ErrorKind, ParleyError, Result};
pub use message::{Message, MessageContent, Role, ToolCall, WireMessage, WireRole, translate};
pub use model::LanguageModel;
pub use observer::{CallPath, DiagnosticEvent, DiagnosticObserver, NoopObserver, TracingObserver};
pub use parley_config::{Config, ModelConfig, TransportConfig};
pub use request::{ChatRequest, RequestBuilder, SamplingParams};
pub use response::{ChatGeneration, Completion};
pub use tools::{ToolDeclaration, ToolRegistry};
pub use tokio_util::sync::CancellationToken;
