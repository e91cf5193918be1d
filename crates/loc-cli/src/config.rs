//! Configuration file.
//!
//! Settings are read from `config.toml` in the platform config directory
//! (`~/.config/loc-cmdlets/config.toml` on Linux) or from `--config`, then
//! overridden by command-line flags:
//!
//! ```toml
//! [general]
//! default_format = "json"
//! log_level = "warn"
//!
//! [client]
//! region = "eu-west-1"
//! timeout_seconds = 30
//!
//! [invocation]
//! confirm_threshold = "high"
//! missing_required = "reject"
//! ```

use crate::cli::GlobalArgs;
use anyhow::{Context, Result};
use loc_client::ClientConfig;
use loc_core::cli::OutputFormat;
use loc_core::{ClientContext, ConfirmImpact, InvocationOptions, MissingRequiredPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// All settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Service client settings
    #[serde(default)]
    pub client: ClientSettings,

    /// Invocation pipeline settings
    #[serde(default)]
    pub invocation: InvocationSettings,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralSettings {
    /// Default output format (json, text, pretty)
    pub default_format: String,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Service client settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ClientSettings {
    /// Service region
    pub region: Option<String>,

    /// Endpoint override
    pub endpoint_url: Option<String>,

    /// Named credential profile
    pub profile_name: Option<String>,

    /// API key for map requests
    pub api_key: Option<String>,

    /// Timeout for each service call
    pub timeout_seconds: Option<u64>,
}

/// Invocation pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InvocationSettings {
    /// Lowest impact that asks for confirmation (none, low, medium, high)
    pub confirm_threshold: String,

    /// Missing required parameter policy (warn, reject)
    pub missing_required: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            default_format: "pretty".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for InvocationSettings {
    fn default() -> Self {
        Self {
            confirm_threshold: "medium".to_string(),
            missing_required: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from the default location.
    ///
    /// A missing file at the default location yields defaults; a missing
    /// explicit file is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (default_path()?, false),
        };

        if !explicit && !path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        settings.validate()?;

        debug!("Loaded config from {}", path.display());
        Ok(settings)
    }

    /// Applies command-line flags on top of the file settings.
    #[must_use]
    pub fn with_overrides(mut self, args: &GlobalArgs) -> Self {
        if let Some(format) = &args.format {
            self.general.default_format.clone_from(format);
        }
        if args.region.is_some() {
            self.client.region.clone_from(&args.region);
        }
        if args.endpoint_url.is_some() {
            self.client.endpoint_url.clone_from(&args.endpoint_url);
        }
        if args.profile_name.is_some() {
            self.client.profile_name.clone_from(&args.profile_name);
        }
        if args.api_key.is_some() {
            self.client.api_key.clone_from(&args.api_key);
        }
        if args.timeout.is_some() {
            self.client.timeout_seconds = args.timeout;
        }
        if args.strict_required {
            self.invocation.missing_required = "reject".to_string();
        }
        self
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range or not recognised.
    pub fn validate(&self) -> Result<()> {
        self.output_format()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            anyhow::bail!(
                "invalid log_level '{}', must be one of: {}",
                self.general.log_level,
                valid_levels.join(", ")
            );
        }

        if let Some(endpoint) = &self.client.endpoint_url {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                anyhow::bail!("client.endpoint_url must start with http:// or https://, got '{endpoint}'");
            }
        }

        match self.client.timeout_seconds {
            Some(0) => anyhow::bail!("client.timeout_seconds must be greater than 0"),
            Some(secs) if secs > 3600 => {
                anyhow::bail!("client.timeout_seconds cannot exceed 3600 seconds (1 hour)");
            }
            _ => {}
        }

        self.invocation_options()?;
        Ok(())
    }

    /// Output format.
    ///
    /// # Errors
    ///
    /// Returns an error if `default_format` is not recognised.
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.general
            .default_format
            .parse::<OutputFormat>()
            .map_err(|e| anyhow::anyhow!("invalid default_format: {e}"))
    }

    /// Invocation pipeline options.
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold or policy is not recognised.
    pub fn invocation_options(&self) -> Result<InvocationOptions> {
        let confirm_threshold = self
            .invocation
            .confirm_threshold
            .parse::<ConfirmImpact>()
            .context("invalid invocation.confirm_threshold")?;
        let missing_required = self
            .invocation
            .missing_required
            .parse::<MissingRequiredPolicy>()
            .context("invalid invocation.missing_required")?;

        Ok(InvocationOptions {
            confirm_threshold,
            missing_required,
            timeout: self.timeout(),
        })
    }

    /// Client context carried by each invocation.
    #[must_use]
    pub fn client_context(&self) -> ClientContext {
        ClientContext {
            region: self.client.region.clone(),
            endpoint_url: self.client.endpoint_url.clone(),
            profile_name: self.client.profile_name.clone(),
        }
    }

    /// Settings for the HTTP client.
    ///
    /// `timeout_seconds` is enforced per invocation by the pipeline; the
    /// transport gets no deadline of its own.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::from_context(&self.client_context());
        match &self.client.api_key {
            Some(key) => config.with_api_key(key.clone()),
            None => config,
        }
    }

    fn timeout(&self) -> Option<Duration> {
        self.client.timeout_seconds.map(Duration::from_secs)
    }
}

/// Default configuration file path.
///
/// - Linux: `~/.config/loc-cmdlets/config.toml`
/// - macOS: `~/Library/Application Support/loc-cmdlets/config.toml`
/// - Windows: `%APPDATA%\loc-cmdlets\config.toml`
///
/// # Errors
///
/// Returns an error if the platform has no config directory.
pub fn default_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("failed to determine config directory")?;

    Ok(config_dir.join("loc-cmdlets").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.output_format().unwrap(), OutputFormat::Pretty);

        let options = settings.invocation_options().unwrap();
        assert_eq!(options, InvocationOptions::default());
    }

    #[test]
    fn test_load_file() {
        let file = write_config(
            r#"
            [general]
            default_format = "json"

            [client]
            region = "eu-west-1"
            api_key = "v1.public.key"
            timeout_seconds = 30

            [invocation]
            confirm_threshold = "high"
            missing_required = "reject"
            "#,
        );

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.output_format().unwrap(), OutputFormat::Json);
        assert_eq!(settings.general.log_level, "info");
        assert_eq!(settings.client.region.as_deref(), Some("eu-west-1"));

        let options = settings.invocation_options().unwrap();
        assert_eq!(options.confirm_threshold, ConfirmImpact::High);
        assert_eq!(options.missing_required, MissingRequiredPolicy::Reject);
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));

        let config = settings.client_config();
        assert!(config.api_key.is_some());
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let file = write_config("[invocation]\nmissing_required = \"ignore\"\n");
        assert!(Settings::load(Some(file.path())).is_err());

        let file = write_config("[general]\ndefault_format = \"yaml\"\n");
        assert!(Settings::load(Some(file.path())).is_err());

        let file = write_config("[client]\ntimeout_seconds = 0\n");
        assert!(Settings::load(Some(file.path())).is_err());

        let file = write_config("[client]\nendpoint_url = \"localhost:4566\"\n");
        assert!(Settings::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let file = write_config("[general\n");
        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn test_flags_override_file() {
        let file = write_config("[client]\nregion = \"eu-west-1\"\n[general]\ndefault_format = \"json\"\n");
        let args = GlobalArgs {
            region: Some("us-east-1".to_string()),
            format: Some("text".to_string()),
            strict_required: true,
            timeout: Some(7),
            ..GlobalArgs::default()
        };

        let settings = Settings::load(Some(file.path())).unwrap().with_overrides(&args);
        assert_eq!(settings.client.region.as_deref(), Some("us-east-1"));
        assert_eq!(settings.output_format().unwrap(), OutputFormat::Text);
        assert_eq!(
            settings.invocation_options().unwrap().missing_required,
            MissingRequiredPolicy::Reject
        );
        assert_eq!(settings.client.timeout_seconds, Some(7));
        assert_eq!(settings.client_context().region.as_deref(), Some("us-east-1"));
    }
}
