//! Configuration management for the document store
//!
//! Values come from built-in defaults, then an optional `config.toml`, then
//! `RAX_DOCS_*` environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_NAME: &str = "config";
const ENV_PREFIX: &str = "RAX_DOCS";

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 2323;
const DEFAULT_DOCUMENTS_ROOT: &str = "./data/documents";
const DEFAULT_SETTINGS_ROOT: &str = "./data/settings";
const DEFAULT_DICTIONARIES_ROOT: &str = "./data/dictionaries";
const DEFAULT_MAX_CLIENTS: usize = 32;
const DEFAULT_MAX_COMMAND_LENGTH: usize = 1024;
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
const DEFAULT_EVENT_BUFFER: usize = 64;

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to listen on
    pub bind_address: String,

    /// Port to listen on
    pub port: u16,

    /// Root directory holding `<name>.txt` documents
    pub documents_root: String,

    /// Root directory holding `<level>.<key>.json` settings
    pub settings_root: String,

    /// Read-only root for dictionary data files
    pub dictionaries_root: String,

    /// Maximum concurrent connections
    pub max_clients: usize,

    /// Maximum length of a request line, in bytes
    pub max_command_length: usize,

    /// Maximum size of a request body, in bytes
    pub max_body_bytes: usize,

    /// Settings-update events buffered per observer
    pub event_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            documents_root: DEFAULT_DOCUMENTS_ROOT.to_string(),
            settings_root: DEFAULT_SETTINGS_ROOT.to_string(),
            dictionaries_root: DEFAULT_DICTIONARIES_ROOT.to_string(),
            max_clients: DEFAULT_MAX_CLIENTS,
            max_command_length: DEFAULT_MAX_COMMAND_LENGTH,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl ServerConfig {
    /// Load configuration from ./config.toml (if present) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, reading `path` instead of ./config.toml when given.
    ///
    /// An explicitly named file must exist.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", defaults.port as i64)?
            .set_default("documents_root", defaults.documents_root)?
            .set_default("settings_root", defaults.settings_root)?
            .set_default("dictionaries_root", defaults.dictionaries_root)?
            .set_default("max_clients", defaults.max_clients as i64)?
            .set_default("max_command_length", defaults.max_command_length as i64)?
            .set_default("max_body_bytes", defaults.max_body_bytes as i64)?
            .set_default("event_buffer", defaults.event_buffer as i64)?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        for (name, root) in [
            ("documents_root", &self.documents_root),
            ("settings_root", &self.settings_root),
            ("dictionaries_root", &self.dictionaries_root),
        ] {
            if root.is_empty() {
                return Err(ConfigError::Message(format!("{} cannot be empty", name)));
            }
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_command_length == 0 || self.max_body_bytes == 0 {
            return Err(ConfigError::Message(
                "max_command_length and max_body_bytes must be greater than 0".into(),
            ));
        }

        if self.event_buffer == 0 {
            return Err(ConfigError::Message(
                "event_buffer must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn documents_root_path(&self) -> PathBuf {
        PathBuf::from(&self.documents_root)
    }

    pub fn settings_root_path(&self) -> PathBuf {
        PathBuf::from(&self.settings_root)
    }

    pub fn dictionaries_root_path(&self) -> PathBuf {
        PathBuf::from(&self.dictionaries_root)
    }
}
