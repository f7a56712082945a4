//! Remote session seam
//!
//! A [`SessionProvider`] turns a host address and an [`SshConfig`] into a live
//! [`Session`]. Every command run against a session gets its own [`Channel`],
//! so one session can serve many concurrent commands.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;

use crate::error::Result;
use crate::process::CommandOutput;

/// SSH connection configuration for one host
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SshConfig {
    /// SSH user (optional, uses system default if not specified)
    pub user: Option<String>,
    /// SSH port (optional, defaults to 22)
    pub port: Option<u16>,
    /// Password authentication
    pub password: Option<String>,
    /// Raw private key material
    pub private_key: Option<Vec<u8>>,
    /// Path to identity file (private key)
    pub private_key_path: Option<PathBuf>,
    /// Additional SSH arguments
    pub extra_args: Vec<String>,
}

impl SshConfig {
    /// Create an empty configuration that authenticates through the agent
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SSH user
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the SSH port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Authenticate with a password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Authenticate with in-memory key material
    pub fn with_private_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    /// Set the identity file (private key)
    pub fn with_private_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_key_path = Some(path.into());
        self
    }

    /// Add extra SSH arguments
    pub fn with_extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Pick the credentials to present, in priority order: password, raw key,
    /// key file, then the ambient agent. Empty values count as absent.
    pub fn credentials(&self) -> Credentials<'_> {
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            return Credentials::Password(password);
        }
        if let Some(key) = self.private_key.as_deref().filter(|k| !k.is_empty()) {
            return Credentials::PrivateKey(key);
        }
        if let Some(path) = self
            .private_key_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
        {
            return Credentials::PrivateKeyPath(path);
        }
        Credentials::Agent
    }

    /// Get the destination string (user@host if user is specified)
    pub fn destination(&self, host: &str) -> String {
        match self.user.as_deref().filter(|u| !u.is_empty()) {
            Some(user) => format!("{}@{}", user, host),
            None => host.to_string(),
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for SshConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshConfig")
            .field("user", &self.user)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("private_key_path", &self.private_key_path)
            .field("extra_args", &self.extra_args)
            .finish()
    }
}

/// Credentials selected from an [`SshConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials<'a> {
    /// Password authentication
    Password(&'a str),
    /// Raw private key bytes
    PrivateKey(&'a [u8]),
    /// Private key read from a file
    PrivateKeyPath(&'a std::path::Path),
    /// Keys offered by the agent at `SSH_AUTH_SOCK`
    Agent,
}

/// Opens authenticated sessions to remote hosts
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Connect and authenticate to `host`
    async fn connect(&self, host: &str, config: &SshConfig) -> Result<Box<dyn Session>>;
}

/// A live, authenticated connection to one host
#[async_trait]
pub trait Session: Send + Sync {
    /// Open a fresh execution channel
    async fn open_channel(&self) -> Result<Box<dyn Channel>>;

    /// Close the session. Channels opened afterwards fail.
    async fn close(&self) -> Result<()>;
}

/// A single-use execution channel on a [`Session`]
#[async_trait]
pub trait Channel: Send {
    /// Run `command` to completion, capturing stdout and stderr in full.
    ///
    /// A non-zero exit is reported through the returned status, not as an error.
    async fn run(&mut self, command: &str) -> Result<CommandOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_priority() {
        let config = SshConfig::new()
            .with_password("secret")
            .with_private_key(b"KEY".to_vec())
            .with_private_key_path("/home/alice/.ssh/id_rsa");
        assert_eq!(config.credentials(), Credentials::Password("secret"));

        let config = SshConfig::new()
            .with_private_key(b"KEY".to_vec())
            .with_private_key_path("/home/alice/.ssh/id_rsa");
        assert_eq!(config.credentials(), Credentials::PrivateKey(b"KEY"));

        let config = SshConfig::new().with_private_key_path("/home/alice/.ssh/id_rsa");
        assert_eq!(
            config.credentials(),
            Credentials::PrivateKeyPath(std::path::Path::new("/home/alice/.ssh/id_rsa"))
        );

        assert_eq!(SshConfig::new().credentials(), Credentials::Agent);
    }

    #[test]
    fn test_empty_values_fall_through() {
        let config = SshConfig::new()
            .with_password("")
            .with_private_key(Vec::new())
            .with_private_key_path("");
        assert_eq!(config.credentials(), Credentials::Agent);
    }

    #[test]
    fn test_destination() {
        let config = SshConfig::new().with_user("alice");
        assert_eq!(config.destination("example.com"), "alice@example.com");
        assert_eq!(SshConfig::new().destination("example.com"), "example.com");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = SshConfig::new().with_password("hunter2");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
