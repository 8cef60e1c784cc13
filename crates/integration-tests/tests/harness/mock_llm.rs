//! Mock chat-completions backend for integration tests
//!
//! Serves both endpoint shapes plus `/models`, records every request it
//! sees, and answers with a configurable canned reply

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use axum_server::tls_rustls::RustlsConfig;
use serde_json::json;
use tokio_util::sync::CancellationToken;

const SELF_SIGNED_CERT: &[u8] = include_bytes!("../fixtures/self-signed.crt");
const SELF_SIGNED_KEY: &[u8] = include_bytes!("../fixtures/self-signed.key");

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum MockReply {
    /// One assistant choice with this content
    Content(String),
    /// Verbatim `choices` array
    Choices(Vec<serde_json::Value>),
    /// Arbitrary JSON body
    Json(StatusCode, serde_json::Value),
    /// Arbitrary raw body, sent without a JSON content type
    Raw(StatusCode, String),
}

impl MockReply {
    pub fn content(content: &str) -> Self {
        Self::Content(content.to_owned())
    }

    pub fn models(ids: &[&str]) -> Self {
        let data: Vec<_> = ids
            .iter()
            .map(|id| json!({"id": id, "object": "model", "created": 1_700_000_000, "owned_by": "mock"}))
            .collect();
        Self::Json(StatusCode::OK, json!({"object": "list", "data": data}))
    }

    fn into_response(self, model: Option<&str>) -> Response {
        match self {
            Self::Content(content) => Json(completion(
                model,
                vec![json!({
                    "index": 0,
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                })],
            ))
            .into_response(),
            Self::Choices(choices) => Json(completion(model, choices)).into_response(),
            Self::Json(status, body) => (status, Json(body)).into_response(),
            Self::Raw(status, body) => (status, body).into_response(),
        }
    }
}

fn completion(model: Option<&str>, choices: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test-123",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": model.unwrap_or("mock-model"),
        "choices": choices,
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

/// Startup options for [`MockLlm`]
#[derive(Debug, Clone)]
pub struct MockOptions {
    pub completion: MockReply,
    pub models: MockReply,
    /// Held before every completion reply
    pub delay: Option<Duration>,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            completion: MockReply::content("Hello from mock LLM"),
            models: MockReply::models(&["mock-model-1", "mock-model-2"]),
            delay: None,
        }
    }
}

/// A request as the mock received it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

struct MockLlmState {
    options: MockOptions,
    completions: Mutex<Vec<RecordedRequest>>,
    model_lists: Mutex<Vec<RecordedRequest>>,
}

/// Mock backend bound to an ephemeral local port
pub struct MockLlm {
    addr: SocketAddr,
    scheme: &'static str,
    shutdown: CancellationToken,
    state: Arc<MockLlmState>,
}

impl MockLlm {
    /// Start with default replies
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(MockOptions::default()).await
    }

    /// Start answering completions with `content`
    pub async fn start_with_response(content: &str) -> anyhow::Result<Self> {
        Self::start_with_reply(MockReply::content(content)).await
    }

    /// Start answering completions with `reply`
    pub async fn start_with_reply(reply: MockReply) -> anyhow::Result<Self> {
        Self::start_with(MockOptions {
            completion: reply,
            ..MockOptions::default()
        })
        .await
    }

    pub async fn start_with(options: MockOptions) -> anyhow::Result<Self> {
        let state = new_state(options);
        let app = router(&state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            scheme: "http",
            shutdown,
            state,
        })
    }

    /// Start an HTTPS mock presenting a self-signed certificate for
    /// `localhost` and `127.0.0.1`
    pub async fn start_tls() -> anyhow::Result<Self> {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let state = new_state(MockOptions::default());
        let app = router(&state);

        let tls = RustlsConfig::from_pem(SELF_SIGNED_CERT.to_vec(), SELF_SIGNED_KEY.to_vec()).await?;
        let handle = axum_server::Handle::new();
        let server = axum_server::bind_rustls(SocketAddr::from(([127, 0, 0, 1], 0)), tls)
            .handle(handle.clone())
            .serve(app.into_make_service());
        tokio::spawn(async move {
            server.await.ok();
        });

        let addr = handle
            .listening()
            .await
            .ok_or_else(|| anyhow::anyhow!("TLS mock failed to bind"))?;

        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            shutdown_clone.cancelled().await;
            handle.shutdown();
        });

        Ok(Self {
            addr,
            scheme: "https",
            shutdown,
            state,
        })
    }

    /// Base URL to configure the client with
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.addr)
    }

    /// Completion requests received so far
    pub fn completions(&self) -> Vec<RecordedRequest> {
        self.state.completions.lock().unwrap().clone()
    }

    /// The only completion request received
    pub fn single_completion(&self) -> RecordedRequest {
        let completions = self.completions();
        assert_eq!(completions.len(), 1, "expected exactly one completion request");
        completions.into_iter().next().unwrap()
    }

    /// Model-list requests received so far
    pub fn model_lists(&self) -> Vec<RecordedRequest> {
        self.state.model_lists.lock().unwrap().clone()
    }
}

impl Drop for MockLlm {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn new_state(options: MockOptions) -> Arc<MockLlmState> {
    Arc::new(MockLlmState {
        options,
        completions: Mutex::new(Vec::new()),
        model_lists: Mutex::new(Vec::new()),
    })
}

fn router(state: &Arc<MockLlmState>) -> Router {
    Router::new()
        .route("/engines/{model}/chat/completions", routing::post(handle_completion))
        .route("/qwen2vl/v1/chat/completions", routing::post(handle_completion))
        .route("/models", routing::get(handle_models))
        .with_state(Arc::clone(state))
}

/// Address nothing listens on
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Server that answers one request with `status_line` and a body cut off
/// before its declared length
pub async fn truncated_body_base_url(status_line: &'static str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };

        // Drain the request head and its JSON body before answering
        let mut request = Vec::new();
        let mut buf = [0_u8; 4096];
        while let Ok(n) = socket.read(&mut buf).await {
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request_complete(&request) {
                break;
            }
        }

        let head = format!("HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: 4096\r\n\r\n");
        socket.write_all(head.as_bytes()).await.ok();
        socket.write_all(br#"{"error": {"mess"#).await.ok();
        socket.flush().await.ok();
    });

    format!("http://{addr}")
}

fn request_complete(request: &[u8]) -> bool {
    let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    request.len() >= end + 4 + length
}

// -- Handlers --

fn record(uri: &Uri, headers: HeaderMap, body: &[u8]) -> RecordedRequest {
    RecordedRequest {
        path: uri.path().to_owned(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        headers,
        body: serde_json::from_slice(body).unwrap_or(serde_json::Value::Null),
    }
}

async fn handle_completion(
    State(state): State<Arc<MockLlmState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = record(&uri, headers, &body);
    let model = request.body["model"].as_str().map(str::to_owned);
    state.completions.lock().unwrap().push(request);

    if let Some(delay) = state.options.delay {
        tokio::time::sleep(delay).await;
    }

    state.options.completion.clone().into_response(model.as_deref())
}

async fn handle_models(State(state): State<Arc<MockLlmState>>, uri: Uri, headers: HeaderMap) -> Response {
    state.model_lists.lock().unwrap().push(record(&uri, headers, &[]));
    state.options.models.clone().into_response(None)
}
