#![allow(clippy::must_use_candidate)]

//! Configuration for the parley chat-completions adapter
//!
//! Loaded from TOML with `{{ env.VAR }}` placeholder expansion, or built in
//! code through the `new`/`with_*` constructors

mod env;
mod loader;
pub mod model;
pub mod transport;

use serde::Deserialize;

pub use model::*;
pub use transport::*;

/// Top-level adapter configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Endpoint connection settings
    pub transport: TransportConfig,
    /// Model identifier and sampling parameters
    #[serde(default)]
    pub model: ModelConfig,
}

impl Config {
    /// Pair a transport with a model
    pub const fn new(transport: TransportConfig, model: ModelConfig) -> Self {
        Self { transport, model }
    }
}
