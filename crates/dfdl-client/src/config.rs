//! Client configuration.
//!
//! Identifies the Bigtable instance to talk to and how to reach it.

use std::time::Duration;

use super::error::{ClientError, ClientResult};

/// Default data API endpoint.
pub const DEFAULT_DATA_ENDPOINT: &str = "https://bigtable.googleapis.com";

/// Default table admin API endpoint.
pub const DEFAULT_ADMIN_ENDPOINT: &str = "https://bigtableadmin.googleapis.com";

/// Longest table id the service accepts.
pub const MAX_TABLE_ID_LEN: usize = 50;

/// Client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Google Cloud project id.
    pub project_id: String,
    /// Bigtable instance id.
    pub instance_id: String,
    /// App profile used for data requests.
    pub app_profile_id: Option<String>,
    /// Data API endpoint.
    pub data_endpoint: String,
    /// Table admin API endpoint.
    pub admin_endpoint: String,
    /// `host:port` of a local emulator. Overrides both endpoints.
    pub emulator_host: Option<String>,
    /// OAuth2 bearer token sent with every request.
    pub access_token: Option<String>,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Largest response message accepted.
    pub max_decoding_message_size: usize,
    /// User agent reported to the service.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            instance_id: String::new(),
            app_profile_id: None,
            data_endpoint: DEFAULT_DATA_ENDPOINT.to_string(),
            admin_endpoint: DEFAULT_ADMIN_ENDPOINT.to_string(),
            emulator_host: None,
            access_token: None,
            connect_timeout: Duration::from_secs(10),
            max_decoding_message_size: 256 * 1024 * 1024,
            user_agent: format!("dfdl-store/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("project_id", &self.project_id)
            .field("instance_id", &self.instance_id)
            .field("app_profile_id", &self.app_profile_id)
            .field("data_endpoint", &self.data_endpoint)
            .field("admin_endpoint", &self.admin_endpoint)
            .field("emulator_host", &self.emulator_host)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a configuration for the given project and instance.
    pub fn new(project_id: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            instance_id: instance_id.into(),
            ..Self::default()
        }
    }

    /// Sets the app profile.
    pub fn app_profile_id(mut self, app_profile_id: impl Into<String>) -> Self {
        self.app_profile_id = Some(app_profile_id.into());
        self
    }

    /// Sets the data endpoint.
    pub fn data_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.data_endpoint = endpoint.into();
        self
    }

    /// Sets the admin endpoint.
    pub fn admin_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.admin_endpoint = endpoint.into();
        self
    }

    /// Points both handles at an emulator.
    pub fn emulator_host(mut self, host: impl Into<String>) -> Self {
        self.emulator_host = Some(host.into());
        self
    }

    /// Sets the bearer token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Returns true when talking to an emulator.
    pub fn is_emulator(&self) -> bool {
        self.emulator_host.is_some()
    }

    /// Returns `projects/{project}/instances/{instance}`.
    pub fn instance_name(&self) -> String {
        format!(
            "projects/{}/instances/{}",
            self.project_id, self.instance_id
        )
    }

    /// Returns the fully-qualified name of a table.
    pub fn table_name(&self, table_id: &str) -> String {
        format!("{}/tables/{}", self.instance_name(), table_id)
    }

    /// Returns the URI of the data API.
    pub fn data_uri(&self) -> String {
        match &self.emulator_host {
            Some(host) => emulator_uri(host),
            None => self.data_endpoint.clone(),
        }
    }

    /// Returns the URI of the admin API.
    pub fn admin_uri(&self) -> String {
        match &self.emulator_host {
            Some(host) => emulator_uri(host),
            None => self.admin_endpoint.clone(),
        }
    }

    /// Checks that the instance is fully identified.
    pub fn validate(&self) -> ClientResult<()> {
        if self.project_id.trim().is_empty() {
            return Err(ClientError::InvalidConfig(
                "project id must not be empty".to_string(),
            ));
        }
        if self.instance_id.trim().is_empty() {
            return Err(ClientError::InvalidConfig(
                "instance id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn emulator_uri(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Checks a table id against the service's naming rules.
///
/// Ids start with a letter, digit or underscore, continue with letters,
/// digits, `-`, `_` or `.`, and are at most [`MAX_TABLE_ID_LEN`] long.
pub fn validate_table_id(table_id: &str) -> ClientResult<()> {
    let mut chars = table_id.chars();
    let Some(first) = chars.next() else {
        return Err(ClientError::InvalidConfig(
            "table id must not be empty".to_string(),
        ));
    };
    if table_id.len() > MAX_TABLE_ID_LEN {
        return Err(ClientError::InvalidConfig(format!(
            "table id {table_id:?} is longer than {MAX_TABLE_ID_LEN} characters"
        )));
    }
    let valid_first = first.is_ascii_alphanumeric() || first == '_';
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid_first || !valid_rest {
        return Err(ClientError::InvalidConfig(format!(
            "table id {table_id:?} contains invalid characters"
        )));
    }
    Ok(())
}
