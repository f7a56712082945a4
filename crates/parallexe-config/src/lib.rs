//! # Parallexe Configuration
//!
//! YAML inventory parser for parallexe.
//!
//! An inventory lists the hosts of a fleet with their groups and SSH
//! settings, plus the global, group and host variable tiers used when
//! rendering templates.

#![warn(missing_docs)]

use parallexe_core::VariableTiers;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod parser;
pub mod resolver;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read inventory file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Invalid configuration
    #[error("Invalid inventory: {0}")]
    ValidationError(String),

    /// Environment variable not found
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    /// Host not found
    #[error("Host '{0}' not found")]
    HostNotFound(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Root inventory structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    /// Inventory format version
    pub version: String,

    /// Optional fleet name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Global settings
    #[serde(default, skip_serializing_if = "Settings::is_default")]
    pub settings: Settings,

    /// SSH settings applied to every host unless the host overrides them
    #[serde(default)]
    pub defaults: SshSettings,

    /// Hosts of the fleet, in execution order
    pub hosts: Vec<HostEntry>,

    /// Template variables
    #[serde(default)]
    pub variables: VariableTiers,
}

/// Global settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Default log level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Addresses executed locally instead of over SSH
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_aliases: Option<Vec<String>>,
}

impl Settings {
    fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

/// One host of the fleet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostEntry {
    /// Hostname or IP address
    pub host: String,

    /// Group labels
    #[serde(default)]
    pub groups: Vec<String>,

    /// Per-host SSH settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<SshSettings>,
}

/// SSH settings as written in the inventory.
///
/// String values may reference environment variables as `${VAR}` or
/// `${VAR:-default}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SshSettings {
    /// Login user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Port, 22 when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Inline private key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,

    /// Path to a private key file; `~` expands to `$HOME`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<String>,

    /// Extra arguments for the ssh client
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,
}

impl SshSettings {
    /// Fill every unset field from `defaults`
    pub fn or(&self, defaults: &SshSettings) -> SshSettings {
        SshSettings {
            user: self.user.clone().or_else(|| defaults.user.clone()),
            port: self.port.or(defaults.port),
            password: self.password.clone().or_else(|| defaults.password.clone()),
            private_key: self.private_key.clone().or_else(|| defaults.private_key.clone()),
            private_key_path: self
                .private_key_path
                .clone()
                .or_else(|| defaults.private_key_path.clone()),
            extra_args: if self.extra_args.is_empty() {
                defaults.extra_args.clone()
            } else {
                self.extra_args.clone()
            },
        }
    }
}
