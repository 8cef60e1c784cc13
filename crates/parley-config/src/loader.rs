use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the contents fail
    /// [`Config::from_toml_str`]
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml_str(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// Expands `{{ env.VAR }}` placeholders, deserializes, merges
    /// `transport.base_options`, then validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if variable expansion, TOML parsing, the
    /// `base_options` merge, or validation fails
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let mut config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.transport.apply_base_options()?;
        config.validate()?;

        Ok(config)
    }

    /// Validate transport and model settings
    ///
    /// # Errors
    ///
    /// Returns the first validation failure
    pub fn validate(&self) -> anyhow::Result<()> {
        self.transport.validate()?;
        self.model.validate()?;
        Ok(())
    }
}
