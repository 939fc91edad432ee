//! Issuance configuration
//!
//! Configuration is an explicit value built once at start-up and shared by
//! the [`TokenFactory`](crate::TokenFactory). It can be loaded from TOML, YAML
//! or JSON, with environment variables (`CWTOKEN_*`) overriding file values.
//!
//! ```toml
//! service_name = "commonwell-sts"
//! redact_claim_values = true
//! allowed_name_options = ["Xspa", "Iua"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::contract::NameOption;
use crate::error::ConfigError;

/// Default environment variable prefix
pub const DEFAULT_ENV_PREFIX: &str = "CWTOKEN";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuanceConfig {
    /// Name recorded on every issuance span
    pub service_name: String,
    /// Keep claim values out of log events
    pub redact_claim_values: bool,
    /// JWT claim vocabularies this deployment issues
    pub allowed_name_options: Vec<NameOption>,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            service_name: "cwtoken".to_string(),
            redact_claim_values: true,
            allowed_name_options: NameOption::ALL.to_vec(),
        }
    }
}

impl IssuanceConfig {
    /// Load configuration from a file, with `CWTOKEN_*` environment overrides
    ///
    /// The format is chosen by extension: `toml`, `yaml`/`yml` or `json`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is missing, has an unsupported
    /// extension, cannot be parsed, or holds invalid values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_file_with_prefix(path, DEFAULT_ENV_PREFIX)
    }

    /// Load configuration from a file with a custom environment prefix
    ///
    /// # Errors
    ///
    /// See [`IssuanceConfig::from_file`].
    pub fn from_file_with_prefix(
        path: impl AsRef<Path>,
        env_prefix: &str,
    ) -> Result<Self, ConfigError> {
        use config::{Config, Environment, File, FileFormat};

        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("yaml" | "yml") => FileFormat::Yaml,
            Some("json") => FileFormat::Json,
            other => return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string())),
        };
        let source = path
            .to_str()
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        let config: Self = Config::builder()
            .add_source(File::new(source, format))
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values the deserializer cannot
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an empty service name or an
    /// empty list of allowed naming options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                reason: "service_name must not be empty".to_string(),
            });
        }
        if self.allowed_name_options.is_empty() {
            return Err(ConfigError::InvalidValue {
                reason: "allowed_name_options must name at least one option".to_string(),
            });
        }
        Ok(())
    }

    /// Whether JWTs may be issued with `option`
    pub fn allows(&self, option: NameOption) -> bool {
        self.allowed_name_options.contains(&option)
    }
}
