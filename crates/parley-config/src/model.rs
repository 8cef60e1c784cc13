use serde::Deserialize;

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "Qwen2.5-7B-Instruct";

/// Model identifier and sampling parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Model identifier sent as `model` and substituted into the endpoint
    #[serde(default = "default_model")]
    pub name: String,
    /// Sampling temperature; unset or zero falls back to 0.7
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Nucleus sampling threshold
    #[serde(default)]
    pub top_p: Option<f64>,
    #[serde(default)]
    pub frequency_penalty: Option<f64>,
    #[serde(default)]
    pub presence_penalty: Option<f64>,
    /// Comma-separated stop words
    #[serde(default)]
    pub stop: Option<String>,
    /// Serialize the sampling parameters above into the request
    ///
    /// Off by default: the endpoint receives only model, messages,
    /// temperature and tools.
    #[serde(default)]
    pub forward_sampling: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl ModelConfig {
    /// Names of the tunable parameters, in configuration order
    pub const PARAM_KEYS: [&'static str; 6] = [
        "temperature",
        "max_tokens",
        "top_p",
        "frequency_penalty",
        "presence_penalty",
        "stop",
    ];

    /// Create a config for `name` with every sampling parameter unset
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            temperature: None,
            max_tokens: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            stop: None,
            forward_sampling: false,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Stop words split on commas, trimmed, empties dropped
    pub fn stop_sequences(&self) -> Vec<String> {
        self.stop
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check the config is usable
    ///
    /// # Errors
    ///
    /// Returns an error if the model name is blank or a sampling value is
    /// not finite
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("model.name must not be empty");
        }

        let finite = [
            ("temperature", self.temperature),
            ("top_p", self.top_p),
            ("frequency_penalty", self.frequency_penalty),
            ("presence_penalty", self.presence_penalty),
        ];
        for (key, value) in finite {
            if value.is_some_and(|v| !v.is_finite()) {
                anyhow::bail!("model.{key} must be a finite number");
            }
        }

        Ok(())
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_owned()
}
