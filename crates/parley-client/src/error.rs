use std::error::Error as _;

/// Client-specific result type
pub type Result<T> = std::result::Result<T, ParleyError>;

/// Errors from the chat-completions adapter
#[derive(Debug, thiserror::Error)]
pub enum ParleyError {
    /// Missing or invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request exceeded the configured timeout
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured ceiling in milliseconds
        timeout_ms: u64,
    },

    /// No response was obtained (DNS, refused connection, TLS handshake)
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-2xx status
    #[error("{status} {status_text}{}", describe_body(.body.as_deref()))]
    Http {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        status_text: String,
        /// Response body, when one was sent
        body: Option<String>,
    },

    /// The endpoint answered 2xx without a body
    #[error("endpoint returned an empty response")]
    EmptyResponse,

    /// The 2xx body could not be interpreted
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The caller cancelled the request
    #[error("request cancelled")]
    Cancelled,

    /// Single-prompt generation failed; the cause is reported to the observer
    #[error("failed to generate text from the chat-completions endpoint")]
    GenerationFailed,
}

/// Discriminant of [`ParleyError`] for callers that branch on failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Timeout,
    Network,
    Http,
    EmptyResponse,
    Decode,
    Cancelled,
    GenerationFailed,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::Http => "http",
            Self::EmptyResponse => "empty_response",
            Self::Decode => "decode",
            Self::Cancelled => "cancelled",
            Self::GenerationFailed => "generation_failed",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ParleyError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Network(_) => ErrorKind::Network,
            Self::Http { .. } => ErrorKind::Http,
            Self::EmptyResponse => ErrorKind::EmptyResponse,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::GenerationFailed => ErrorKind::GenerationFailed,
        }
    }

    /// Build an HTTP error from a status and raw body
    pub(crate) fn http(status: reqwest::StatusCode, body: String) -> Self {
        Self::Http {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_owned(),
            body: (!body.is_empty()).then_some(body),
        }
    }

    /// Classify a transport failure
    ///
    /// Timeouts are reported separately from every other failure to obtain
    /// a response.
    pub(crate) fn from_transport(error: &reqwest::Error, timeout_ms: u64) -> Self {
        if error.is_timeout() {
            return Self::Timeout { timeout_ms };
        }

        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        Self::Network(message)
    }
}

/// Render an error body, preferring an OpenAI-style `error.message`
fn describe_body(body: Option<&str>) -> String {
    let Some(body) = body else {
        return String::new();
    };

    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(str::to_owned));

    format!(": {}", message.as_deref().unwrap_or(body))
}
