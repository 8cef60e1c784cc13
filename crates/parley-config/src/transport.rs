use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 180_000;

/// Default chat-completions path template
pub const DEFAULT_ENDPOINT: &str = "/engines/{model}/chat/completions";

/// Placeholder substituted with the model identifier in `endpoint`
pub const MODEL_PLACEHOLDER: &str = "{model}";

/// Connection settings for the remote chat-completions endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Endpoint base URL, e.g. `https://llm.internal:8001`
    pub base_url: Url,
    /// Bearer credential sent on completion requests
    pub api_key: SecretString,
    /// Hard ceiling for a single request
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Verify the server's TLS certificate
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
    /// HTTP(S) proxy for all requests
    #[serde(default)]
    pub proxy_url: Option<Url>,
    /// Chat-completions path appended to `base_url`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Extra headers attached to every request
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    /// JSON object merged over the fields above
    #[serde(default)]
    pub base_options: Option<String>,
}

impl TransportConfig {
    /// Create a transport with default timeout, TLS policy and endpoint
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: SecretString::from(api_key.into()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            verify_tls: true,
            proxy_url: None,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            headers: IndexMap::new(),
            base_options: None,
        }
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    #[must_use]
    pub fn with_proxy_url(mut self, proxy_url: Url) -> Self {
        self.proxy_url = Some(proxy_url);
        self
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_base_options(mut self, base_options: impl Into<String>) -> Self {
        self.base_options = Some(base_options.into());
        self
    }

    /// Full chat-completions URL for `model`
    pub fn completions_url(&self, model: &str) -> String {
        let mut url = self.base_url.clone();

        // Each segment is percent-encoded, so `?`, `#` and `/` in a model id
        // stay inside its path segment
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            for segment in self.endpoint.trim_start_matches('/').split('/') {
                segments.push(&segment.replace(MODEL_PLACEHOLDER, model));
            }
        }

        url.into()
    }

    /// Model catalog URL
    pub fn models_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/models")
    }

    /// Merge `base_options` into this config
    ///
    /// Consumes the raw JSON so applying twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_options` is not a JSON object or a field
    /// has the wrong type
    pub fn apply_base_options(&mut self) -> anyhow::Result<()> {
        let Some(raw) = self.base_options.take() else {
            return Ok(());
        };

        let value: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("invalid JSON in base_options: {e}"))?;

        if !value.is_object() {
            anyhow::bail!("invalid JSON in base_options: expected an object");
        }

        let options: BaseOptions = serde_json::from_value(value)
            .map_err(|e| anyhow::anyhow!("invalid JSON in base_options: {e}"))?;

        tracing::debug!("applying base_options overrides");
        options.merge_into(self);

        Ok(())
    }

    /// Check the config is usable
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not http(s), the timeout is zero,
    /// or the endpoint template is not an absolute path
    pub fn validate(&self) -> anyhow::Result<()> {
        if !matches!(self.base_url.scheme(), "http" | "https") {
            anyhow::bail!("transport.base_url must use http or https, got '{}'", self.base_url.scheme());
        }

        if self.base_url.host_str().is_none_or(str::is_empty) {
            anyhow::bail!("transport.base_url must include a host");
        }

        if self.timeout_ms == 0 {
            anyhow::bail!("transport.timeout_ms must be greater than 0");
        }

        if !self.endpoint.starts_with('/') {
            anyhow::bail!("transport.endpoint must start with '/', got '{}'", self.endpoint);
        }

        Ok(())
    }
}

/// Overrides supplied as a JSON object in `base_options`
///
/// Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct BaseOptions {
    #[serde(default)]
    pub base_url: Option<Url>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub verify_tls: Option<bool>,
    #[serde(default)]
    pub proxy_url: Option<Url>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
}

impl BaseOptions {
    fn merge_into(self, config: &mut TransportConfig) {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(verify_tls) = self.verify_tls {
            config.verify_tls = verify_tls;
        }
        if let Some(proxy_url) = self.proxy_url {
            config.proxy_url = Some(proxy_url);
        }
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        config.headers.extend(self.headers);
    }
}

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

const fn default_verify_tls() -> bool {
    true
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_owned()
}
