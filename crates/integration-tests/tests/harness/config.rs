//! Programmatic configuration builder for integration tests

use parley_config::{Config, ModelConfig, TransportConfig};

pub const TEST_API_KEY: &str = "test-key";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Point a client at `base_url` with a test credential and model
    pub fn new(base_url: &str) -> Self {
        Self {
            config: Config::new(
                TransportConfig::new(base_url.parse().expect("valid URL"), TEST_API_KEY),
                ModelConfig::new("test-model"),
            ),
        }
    }

    pub fn with_model(mut self, name: &str) -> Self {
        self.config.model.name = name.to_owned();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.config.model.temperature = Some(temperature);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.transport.timeout_ms = timeout_ms;
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.config.transport.endpoint = endpoint.to_owned();
        self
    }

    pub fn with_proxy_url(mut self, proxy_url: &str) -> Self {
        self.config.transport.proxy_url = Some(proxy_url.parse().expect("valid URL"));
        self
    }

    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.config.transport.verify_tls = verify_tls;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.config.transport.headers.insert(name.to_owned(), value.to_owned());
        self
    }

    pub fn with_base_options(mut self, json: &str) -> Self {
        self.config.transport.base_options = Some(json.to_owned());
        self
    }

    /// Enable sampling forwarding with a token cap and stop list
    pub fn with_forwarded_sampling(mut self, max_tokens: u32, stop: &str) -> Self {
        self.config.model.max_tokens = Some(max_tokens);
        self.config.model.stop = Some(stop.to_owned());
        self.config.model.forward_sampling = true;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
