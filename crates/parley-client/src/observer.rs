//! Levelled diagnostic events emitted by the client
//!
//! The client never logs directly. Events go to a [`DiagnosticObserver`];
//! the default [`TracingObserver`] turns them into `tracing` events.

use std::fmt;

use tracing::Level;

use crate::error::ErrorKind;

/// Which call mode produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPath {
    /// Single prompt in, plain text out
    Generate,
    /// Full history in, reply messages out
    Chat,
}

impl fmt::Display for CallPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generate => f.write_str("generate"),
            Self::Chat => f.write_str("chat"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    RequestDispatched {
        path: CallPath,
        url: String,
        model: String,
        messages: usize,
        tools: usize,
    },
    ResponseReceived {
        path: CallPath,
        status: u16,
        choices: usize,
    },
    RequestFailed {
        path: CallPath,
        kind: ErrorKind,
        message: String,
    },
    ToolsReplaced {
        count: usize,
    },
    ModelsListed {
        count: usize,
    },
    CatalogUnavailable {
        url: String,
        message: String,
    },
    /// The client was built with `verify_tls = false`
    TlsVerificationDisabled {
        base_url: String,
    },
}

impl DiagnosticEvent {
    pub const fn level(&self) -> Level {
        match self {
            Self::RequestDispatched { .. } | Self::ToolsReplaced { .. } | Self::ModelsListed { .. } => Level::DEBUG,
            Self::ResponseReceived { .. } => Level::TRACE,
            Self::CatalogUnavailable { .. } | Self::TlsVerificationDisabled { .. } => Level::WARN,
            Self::RequestFailed { .. } => Level::ERROR,
        }
    }
}

/// Receives diagnostic events from a client
pub trait DiagnosticObserver: Send + Sync {
    fn observe(&self, event: &DiagnosticEvent);
}

/// Forwards events to the `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DiagnosticObserver for TracingObserver {
    fn observe(&self, event: &DiagnosticEvent) {
        match event {
            DiagnosticEvent::RequestDispatched {
                path,
                url,
                model,
                messages,
                tools,
            } => {
                tracing::debug!(%path, %url, %model, messages, tools, "dispatching chat completion");
            }
            DiagnosticEvent::ResponseReceived { path, status, choices } => {
                tracing::trace!(%path, status, choices, "chat completion received");
            }
            DiagnosticEvent::RequestFailed { path, kind, message } => {
                tracing::error!(%path, %kind, error = %message, "chat completion failed");
            }
            DiagnosticEvent::ToolsReplaced { count } => {
                tracing::debug!(count, "replaced active tools");
            }
            DiagnosticEvent::ModelsListed { count } => {
                tracing::debug!(count, "listed models");
            }
            DiagnosticEvent::CatalogUnavailable { url, message } => {
                tracing::warn!(%url, error = %message, "failed to list models");
            }
            DiagnosticEvent::TlsVerificationDisabled { base_url } => {
                tracing::warn!(%base_url, "TLS certificate verification is disabled");
            }
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DiagnosticObserver for NoopObserver {
    fn observe(&self, _event: &DiagnosticEvent) {}
}
