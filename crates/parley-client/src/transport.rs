//! HTTP execution with the configured timeout, TLS, and proxy policy

use std::time::Duration;

use parley_config::TransportConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::error::{ParleyError, Result};

/// A decoded 2xx reply
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub status: u16,
    pub body: serde_json::Value,
}

/// One configured HTTP client, shared by every call of a `ChatClient`
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    api_key: SecretString,
    timeout_ms: u64,
}

impl Transport {
    /// Build the HTTP client from transport settings
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Config` for an unusable proxy URL or header,
    /// or if the client cannot be built
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .danger_accept_invalid_certs(!config.verify_tls)
            .default_headers(default_headers(config)?);

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url.as_str())
                .map_err(|e| ParleyError::Config(format!("invalid proxy URL: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| ParleyError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    /// POST a JSON body with bearer authentication
    pub async fn post_json<T: Serialize + Sync>(&self, url: &str, body: &T) -> Result<Reply> {
        let request = self
            .http
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(body);

        self.execute(request).await
    }

    /// Unauthenticated GET
    pub async fn get_json(&self, url: &str) -> Result<Reply> {
        self.execute(self.http.get(url)).await
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Reply> {
        let response = request
            .send()
            .await
            .map_err(|e| ParleyError::from_transport(&e, self.timeout_ms))?;

        let status = response.status();

        if !status.is_success() {
            // The status is authoritative; the body is best effort
            let body = response.text().await.unwrap_or_default();
            return Err(ParleyError::http(status, body));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ParleyError::from_transport(&e, self.timeout_ms))?;

        if text.trim().is_empty() {
            return Err(ParleyError::EmptyResponse);
        }

        let body: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| ParleyError::Decode(format!("invalid JSON body: {e}")))?;

        if body.is_null() {
            return Err(ParleyError::EmptyResponse);
        }

        Ok(Reply {
            status: status.as_u16(),
            body,
        })
    }
}

fn default_headers(config: &TransportConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (key, value) in &config.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ParleyError::Config(format!("invalid header name '{key}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ParleyError::Config(format!("invalid header value for '{key}': {e}")))?;
        headers.insert(name, value);
    }

    Ok(headers)
}
