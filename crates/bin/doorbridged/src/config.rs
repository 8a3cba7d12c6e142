//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `doorbridge.toml` in the working directory unless a path is
//! given via the `--config` flag or `DOORBRIDGE_CONFIG`. Listener settings
//! have sensible defaults; the upstream URLs, credentials, and door
//! mappings have none and are validated as required. Environment variables
//! take precedence over file values.

use serde::Deserialize;

use doorbridge_domain::door::Door;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inbound webhook listener settings.
    pub server: ServerConfig,
    /// Access Controller API settings.
    pub controller: ControllerConfig,
    /// Home Automation Hub API settings.
    pub hub: HubConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Door mappings, one `[[doors]]` table per physical door.
    pub doors: Vec<DoorConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Public base URL under which both origin systems can reach this
    /// listener; used when registering the controller webhook.
    pub base_url: String,
    /// Shared token both origins must present on inbound requests.
    pub auth_token: String,
}

/// Access Controller API configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Controller base URL.
    pub base_url: String,
    /// Bearer token for the controller's developer API.
    pub api_key: String,
}

/// Home Automation Hub API configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Maker API base URL, including the app id path segment.
    pub base_url: String,
    /// Maker API access token.
    pub access_token: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// One door mapping between a controller door and its hub device slots.
#[derive(Debug, Deserialize)]
pub struct DoorConfig {
    /// Controller-side door id.
    pub controller_id: String,
    /// Hub contact sensor device id.
    pub contact_id: String,
    /// Hub lock device id; omit for doors without a lock device.
    #[serde(default)]
    pub lock_id: Option<String>,
    /// Hub switch device id.
    pub switch_id: String,
}

impl DoorConfig {
    /// Convert into the domain mapping. An empty `lock_id` counts as
    /// absent.
    #[must_use]
    pub fn to_door(&self) -> Door {
        Door {
            controller_id: self.controller_id.clone(),
            contact_id: self.contact_id.clone(),
            lock_id: self
                .lock_id
                .clone()
                .filter(|lock_id| !lock_id.is_empty()),
            switch_id: self.switch_id.clone(),
        }
    }
}

/// Path used when neither `--config` nor `DOORBRIDGE_CONFIG` is given.
const DEFAULT_CONFIG_PATH: &str = "doorbridge.toml";

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// The file path is `--config <path>` if given, else `DOORBRIDGE_CONFIG`,
    /// else `doorbridge.toml` in the working directory. An explicitly named
    /// file must exist; only the default path may be absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file is unreadable or malformed, or if a
    /// required field is missing after overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit =
            Self::explicit_path(std::env::args(), std::env::var("DOORBRIDGE_CONFIG").ok());
        let mut config = match explicit {
            Some(path) => Self::from_explicit_file(&path)?,
            None => Self::from_file(DEFAULT_CONFIG_PATH)?,
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Config path override from the CLI or the environment, if any.
    /// The `--config` flag wins over `DOORBRIDGE_CONFIG`.
    fn explicit_path(
        mut args: impl Iterator<Item = String>,
        env_override: Option<String>,
    ) -> Option<String> {
        while let Some(arg) = args.next() {
            if arg == "--config" {
                if let Some(path) = args.next() {
                    return Some(path);
                }
            }
        }
        env_override
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn from_explicit_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(ConfigError::Parse)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DOORBRIDGE_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("DOORBRIDGE_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("DOORBRIDGE_BASE_URL") {
            self.server.base_url = val;
        }
        if let Ok(val) = std::env::var("DOORBRIDGE_AUTH_TOKEN") {
            self.server.auth_token = val;
        }
        if let Ok(val) = std::env::var("DOORBRIDGE_CONTROLLER_BASE_URL") {
            self.controller.base_url = val;
        }
        if let Ok(val) = std::env::var("DOORBRIDGE_CONTROLLER_API_KEY") {
            self.controller.api_key = val;
        }
        if let Ok(val) = std::env::var("DOORBRIDGE_HUB_BASE_URL") {
            self.hub.base_url = val;
        }
        if let Ok(val) = std::env::var("DOORBRIDGE_HUB_ACCESS_TOKEN") {
            self.hub.access_token = val;
        }
        if let Ok(val) = std::env::var("DOORBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        for (value, name) in [
            (&self.server.base_url, "server.base_url"),
            (&self.server.auth_token, "server.auth_token"),
            (&self.controller.base_url, "controller.base_url"),
            (&self.controller.api_key, "controller.api_key"),
            (&self.hub.base_url, "hub.base_url"),
            (&self.hub.access_token, "hub.access_token"),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Validation(format!("{name} is required")));
            }
        }
        if self.doors.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[doors]] mapping is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9423,
            base_url: String::new(),
            auth_token: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "doorbridged=info,doorbridge=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
