//! Connection registry
//!
//! The registry connects every host of the fleet exactly once and owns the
//! resulting connections until teardown.

use crate::error::{Error, HostError, Result};
use crate::host::{HostConfig, LOCAL_ALIASES};
use command_executor::{Session, SessionProvider, SshConfig};
use futures::future::join_all;
use std::fmt;
use tracing::{debug, info, warn};

/// Options for building a [`ConnectionRegistry`]
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Host addresses that run commands locally instead of over SSH
    pub local_aliases: Vec<String>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            local_aliases: LOCAL_ALIASES.iter().map(|alias| alias.to_string()).collect(),
        }
    }
}

/// A host and, for remote hosts, its live session
pub struct Connection {
    config: HostConfig,
    session: Option<Box<dyn Session>>,
}

impl Connection {
    /// A connection that runs commands on this machine
    pub fn local(config: HostConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// A connection backed by a remote session
    pub fn remote(config: HostConfig, session: Box<dyn Session>) -> Self {
        Self {
            config,
            session: Some(session),
        }
    }

    /// Host address
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Group labels
    pub fn groups(&self) -> &[String] {
        &self.config.groups
    }

    /// Full host configuration
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// The remote session, absent for local hosts
    pub fn session(&self) -> Option<&dyn Session> {
        self.session.as_deref()
    }

    /// True when commands run on this machine
    pub fn is_local(&self) -> bool {
        self.session.is_none()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.config.host)
            .field("groups", &self.config.groups)
            .field("local", &self.is_local())
            .finish()
    }
}

/// The live connections of a fleet, in configuration order
#[derive(Debug)]
pub struct ConnectionRegistry {
    connections: Vec<Connection>,
}

impl ConnectionRegistry {
    /// Connect every host with the default local aliases
    pub async fn build(configs: Vec<HostConfig>, provider: &dyn SessionProvider) -> Result<Self> {
        Self::build_with(configs, provider, &RegistryOptions::default()).await
    }

    /// Connect every host concurrently.
    ///
    /// Either every host connects, or the call fails naming every host that
    /// did not; sessions opened for the other hosts are closed first.
    pub async fn build_with(
        configs: Vec<HostConfig>,
        provider: &dyn SessionProvider,
        options: &RegistryOptions,
    ) -> Result<Self> {
        info!(hosts = configs.len(), "connecting to fleet");

        let attempts = configs
            .into_iter()
            .map(|config| connect(config, provider, &options.local_aliases));
        let outcomes = join_all(attempts).await;

        let mut connections = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(connection) => connections.push(connection),
                Err(error) => {
                    warn!(host = %error.host, error = %error.source, "failed to connect");
                    failures.push(error);
                }
            }
        }

        if !failures.is_empty() {
            let opened = Self { connections };
            if let Err(close_error) = opened.teardown().await {
                warn!(error = %close_error, "failed to close partially built registry");
            }
            return Err(Error::Connect(failures));
        }

        info!(hosts = connections.len(), "fleet connected");
        Ok(Self { connections })
    }

    /// Wrap connections that were established elsewhere
    pub fn from_connections(connections: Vec<Connection>) -> Self {
        Self { connections }
    }

    /// All connections, in configuration order
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Connection for `host`, if configured
    pub fn get(&self, host: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.host() == host)
    }

    /// Number of connections
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// True when the fleet is empty
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Close every session.
    ///
    /// A failing close does not stop the remaining ones; all failures are
    /// reported together.
    pub async fn teardown(self) -> Result<()> {
        let mut failures = Vec::new();

        for connection in &self.connections {
            let Some(session) = connection.session() else {
                continue;
            };
            debug!(host = connection.host(), "closing session");
            if let Err(source) = session.close().await {
                warn!(host = connection.host(), error = %source, "failed to close session");
                failures.push(HostError::new(connection.host(), source));
            }
        }

        if failures.is_empty() {
            info!(hosts = self.connections.len(), "fleet disconnected");
            Ok(())
        } else {
            Err(Error::Teardown(failures))
        }
    }
}

/// Connect one host, or bind it locally when its address is a local alias
async fn connect(
    config: HostConfig,
    provider: &dyn SessionProvider,
    local_aliases: &[String],
) -> std::result::Result<Connection, HostError> {
    if config.is_local(local_aliases) {
        debug!(host = %config.host, "using local execution");
        return Ok(Connection::local(config));
    }

    let default_ssh = SshConfig::default();
    let ssh = config.ssh.as_ref().unwrap_or(&default_ssh);

    match provider.connect(&config.host, ssh).await {
        Ok(session) => {
            debug!(host = %config.host, "connected");
            Ok(Connection::remote(config, session))
        }
        Err(source) => Err(HostError::new(config.host, source)),
    }
}
