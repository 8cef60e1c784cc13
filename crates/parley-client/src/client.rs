use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parley_config::Config;
use tokio_util::sync::CancellationToken;

use crate::catalog;
use crate::error::{ParleyError, Result};
use crate::message::Message;
use crate::model::LanguageModel;
use crate::observer::{CallPath, DiagnosticEvent, DiagnosticObserver, TracingObserver};
use crate::request::{ChatRequest, RequestBuilder};
use crate::response::{self, Completion};
use crate::tools::{ToolDeclaration, ToolRegistry};
use crate::transport::Transport;

struct Inner {
    config: Config,
    transport: Transport,
    tools: ToolRegistry,
    observer: Arc<dyn DiagnosticObserver>,
}

/// Client for one OpenAI-compatible chat-completions endpoint and model
///
/// Cheap to clone; clones share the transport and the active tool set.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<Inner>,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.inner.config.transport.base_url.as_str())
            .field("model", &self.inner.config.model.name)
            .field("tools", &self.inner.tools.len())
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Create a client that reports diagnostics through `tracing`
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Config` if the configuration is invalid
    pub fn new(config: Config) -> Result<Self> {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    /// Create a client that reports diagnostics to `observer`
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Config` if `base_options` is malformed, the
    /// configuration fails validation, or the HTTP client cannot be built
    pub fn with_observer(mut config: Config, observer: Arc<dyn DiagnosticObserver>) -> Result<Self> {
        config
            .transport
            .apply_base_options()
            .map_err(|e| ParleyError::Config(format!("{e:#}")))?;
        config
            .validate()
            .map_err(|e| ParleyError::Config(format!("{e:#}")))?;

        let transport = Transport::new(&config.transport)?;

        if !config.transport.verify_tls {
            observer.observe(&DiagnosticEvent::TlsVerificationDisabled {
                base_url: config.transport.base_url.to_string(),
            });
        }

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                transport,
                tools: ToolRegistry::new(),
                observer,
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Model identifier sent with every request
    pub fn model(&self) -> &str {
        &self.inner.config.model.name
    }

    // -- Tools --

    /// Replace the active tool declarations
    ///
    /// Null and empty entries are dropped. Requests already in flight keep
    /// the set they started with.
    pub fn set_tools<I>(&self, declarations: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<ToolDeclaration>,
    {
        let count = self.inner.tools.set_tools(declarations);
        self.emit(&DiagnosticEvent::ToolsReplaced { count });
        count
    }

    pub fn active_tools(&self) -> Arc<[ToolDeclaration]> {
        self.inner.tools.active_tools()
    }

    // -- Single prompt --

    /// Send one prompt and return the first choice's text with the raw payload
    ///
    /// Failures are the classified transport or decode error.
    pub async fn complete(&self, prompt: &str) -> Result<Completion> {
        let tools = self.inner.tools.active_tools();
        let request = RequestBuilder::new(&self.inner.config.model).prompt(prompt, &tools);

        let raw = self.dispatch(CallPath::Generate, &request).await?;

        response::first_choice_text(raw).inspect_err(|e| self.report_failure(CallPath::Generate, e))
    }

    /// Send one prompt and return the reply text
    ///
    /// Every failure surfaces as `ParleyError::GenerationFailed`; the
    /// classified cause goes to the observer only.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(prompt)
            .await
            .map(|completion| completion.content)
            .map_err(|_| ParleyError::GenerationFailed)
    }

    /// [`ChatClient::generate`], aborted when `cancel` fires
    pub async fn generate_with_cancellation(&self, prompt: &str, cancel: &CancellationToken) -> Result<String> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(self.cancelled(CallPath::Generate)),
            result = self.generate(prompt) => result,
        }
    }

    // -- Multi-turn chat --

    /// Send a conversation and map every choice to an assistant reply
    ///
    /// Failures propagate with their classification intact.
    pub async fn chat(&self, messages: &[Message]) -> Result<Vec<Message>> {
        let tools = self.inner.tools.active_tools();
        let request = RequestBuilder::new(&self.inner.config.model).conversation(messages, &tools);

        let raw = self.dispatch(CallPath::Chat, &request).await?;

        response::replies(&raw).inspect_err(|e| self.report_failure(CallPath::Chat, e))
    }

    /// [`ChatClient::chat`], aborted when `cancel` fires
    pub async fn chat_with_cancellation(&self, messages: &[Message], cancel: &CancellationToken) -> Result<Vec<Message>> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(self.cancelled(CallPath::Chat)),
            result = self.chat(messages) => result,
        }
    }

    // -- Models --

    /// List model identifiers from `GET {base_url}/models`
    ///
    /// Never fails: any error yields an empty list and a
    /// `CatalogUnavailable` event.
    pub async fn list_models(&self) -> Vec<String> {
        let url = self.inner.config.transport.models_url();

        match catalog::fetch_model_ids(&self.inner.transport, &url).await {
            Ok(models) => {
                self.emit(&DiagnosticEvent::ModelsListed { count: models.len() });
                models
            }
            Err(e) => {
                self.emit(&DiagnosticEvent::CatalogUnavailable {
                    url,
                    message: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    // -- Helpers --

    /// Issue exactly one completion request
    async fn dispatch(&self, path: CallPath, request: &ChatRequest) -> Result<serde_json::Value> {
        let url = self.inner.config.transport.completions_url(&request.model);

        self.emit(&DiagnosticEvent::RequestDispatched {
            path,
            url: url.clone(),
            model: request.model.clone(),
            messages: request.messages.len(),
            tools: request.tools.len(),
        });

        match self.inner.transport.post_json(&url, request).await {
            Ok(reply) => {
                self.emit(&DiagnosticEvent::ResponseReceived {
                    path,
                    status: reply.status,
                    choices: response::choice_count(&reply.body),
                });
                Ok(reply.body)
            }
            Err(e) => {
                self.report_failure(path, &e);
                Err(e)
            }
        }
    }

    fn cancelled(&self, path: CallPath) -> ParleyError {
        let error = ParleyError::Cancelled;
        self.report_failure(path, &error);
        error
    }

    fn report_failure(&self, path: CallPath, error: &ParleyError) {
        self.emit(&DiagnosticEvent::RequestFailed {
            path,
            kind: error.kind(),
            message: error.to_string(),
        });
    }

    fn emit(&self, event: &DiagnosticEvent) {
        self.inner.observer.observe(event);
    }
}

#[async_trait]
impl LanguageModel for ChatClient {
    fn model_type(&self) -> &'static str {
        "parley-chat"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        Self::generate(self, prompt).await
    }

    async fn chat(&self, messages: &[Message]) -> Result<Vec<Message>> {
        Self::chat(self, messages).await
    }
}
