//! Configuration file support for the CLI.
//!
//! Loads the initializer's settings from TOML files. Command-line
//! arguments and environment variables are merged on top in `main`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use dfdl_client::ClientConfig;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Google Cloud project id.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Bigtable instance id.
    #[serde(default)]
    pub instance_id: Option<String>,

    /// Table to initialize.
    #[serde(default)]
    pub table_id: Option<String>,

    /// App profile for data requests.
    #[serde(default)]
    pub app_profile_id: Option<String>,

    /// `host:port` of a Bigtable emulator.
    #[serde(default)]
    pub emulator_host: Option<String>,

    /// OAuth2 access token (read from the file, never written back).
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,

    /// Data API endpoint override.
    #[serde(default)]
    pub data_endpoint: Option<String>,

    /// Admin API endpoint override.
    #[serde(default)]
    pub admin_endpoint: Option<String>,

    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whether to use the in-memory store.
    #[serde(skip)]
    pub mock_mode: bool,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            instance_id: None,
            table_id: None,
            app_profile_id: None,
            emulator_host: None,
            access_token: None,
            data_endpoint: None,
            admin_endpoint: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            mock_mode: false,
        }
    }
}

impl CliConfig {
    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Overlays every value set in `overrides` on top of this configuration.
    pub fn merge(&mut self, overrides: CliConfig) {
        let CliConfig {
            project_id,
            instance_id,
            table_id,
            app_profile_id,
            emulator_host,
            access_token,
            data_endpoint,
            admin_endpoint,
            ..
        } = overrides;

        overlay(&mut self.project_id, project_id);
        overlay(&mut self.instance_id, instance_id);
        overlay(&mut self.table_id, table_id);
        overlay(&mut self.app_profile_id, app_profile_id);
        overlay(&mut self.emulator_host, emulator_host);
        overlay(&mut self.access_token, access_token);
        overlay(&mut self.data_endpoint, data_endpoint);
        overlay(&mut self.admin_endpoint, admin_endpoint);
    }

    /// Loads the default configuration file.
    ///
    /// Looks in the following locations:
    /// 1. ~/.config/dfdl-store/config.toml
    /// 2. ~/.dfdl-store/config.toml
    /// 3. Returns default if not found
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let path = home.join(".dfdl-store").join("config.toml");
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Returns the default configuration file path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("dfdl-store").join("config.toml"))
    }

    /// Returns a builder for configuration.
    pub fn builder() -> CliConfigBuilder {
        CliConfigBuilder::new()
    }

    /// Returns the table id, failing if it was never set.
    pub fn table_id(&self) -> Result<&str> {
        required(&self.table_id, "table id", "--table", "BIGTABLE_TABLE_ID")
    }

    /// Builds the client configuration, failing if the project or instance
    /// is missing.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let project = required(&self.project_id, "project id", "--project", "BIGTABLE_PROJECT_ID")?;
        let instance = required(
            &self.instance_id,
            "instance id",
            "--instance",
            "BIGTABLE_INSTANCE_ID",
        )?;

        let mut config = ClientConfig::new(project, instance)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs));
        if let Some(profile) = &self.app_profile_id {
            config = config.app_profile_id(profile);
        }
        if let Some(endpoint) = &self.data_endpoint {
            config = config.data_endpoint(endpoint);
        }
        if let Some(endpoint) = &self.admin_endpoint {
            config = config.admin_endpoint(endpoint);
        }
        if let Some(host) = &self.emulator_host {
            config = config.emulator_host(host);
        }
        if let Some(token) = &self.access_token {
            config = config.access_token(token);
        }
        Ok(config)
    }
}

fn overlay(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

fn required<'a>(value: &'a Option<String>, what: &str, flag: &str, env: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => bail!("missing required {what} (set {flag} or {env})"),
    }
}

/// Builder for CLI configuration.
#[derive(Default)]
pub struct CliConfigBuilder {
    config: CliConfig,
}

impl CliConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project id.
    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.config.project_id = Some(project_id.into());
        self
    }

    /// Sets the instance id.
    pub fn instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.config.instance_id = Some(instance_id.into());
        self
    }

    /// Sets the table id.
    pub fn table_id(mut self, table_id: impl Into<String>) -> Self {
        self.config.table_id = Some(table_id.into());
        self
    }

    /// Sets the app profile.
    pub fn app_profile_id(mut self, app_profile_id: impl Into<String>) -> Self {
        self.config.app_profile_id = Some(app_profile_id.into());
        self
    }

    /// Sets the emulator host.
    pub fn emulator_host(mut self, host: impl Into<String>) -> Self {
        self.config.emulator_host = Some(host.into());
        self
    }

    /// Sets the access token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.access_token = Some(token.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> CliConfig {
        self.config
    }
}
