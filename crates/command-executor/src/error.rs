//! Error types for command execution

use thiserror::Error;

/// Unified error type for command execution
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to spawn a process
    #[error("failed to spawn process: {reason}")]
    SpawnFailed {
        /// The reason for the spawn failure
        reason: String,
    },

    /// SSH connection failed
    #[error("SSH connection failed to {host}: {reason}")]
    SshConnectionFailed {
        /// The hostname or IP address that failed to connect
        host: String,
        /// The detailed reason for the connection failure
        reason: String,
    },

    /// SSH authentication failed
    #[error("SSH authentication failed for {host}")]
    SshAuthenticationFailed {
        /// The host that rejected the credentials
        host: String,
    },

    /// SSH key not found
    #[error("SSH key not found: {path}")]
    SshKeyNotFound {
        /// The path where the SSH key was expected to be found
        path: String,
    },

    /// No credentials were supplied and no agent is reachable
    #[error("can't connect to local SSH agent: {reason}")]
    SshAgentUnavailable {
        /// Why the agent could not be used
        reason: String,
    },

    /// A new execution channel could not be opened on a session
    #[error("can't open SSH channel to {host}: {reason}")]
    ChannelFailed {
        /// The host whose session refused the channel
        host: String,
        /// The detailed reason for the failure
        reason: String,
    },

    /// Closing a session failed
    #[error("failed to close SSH session to {host}: {reason}")]
    SessionCloseFailed {
        /// The host whose session could not be closed
        host: String,
        /// The detailed reason for the failure
        reason: String,
    },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// For convenience, re-export specific error constructors
impl Error {
    /// Create a spawn failed error
    pub fn spawn_failed(reason: impl Into<String>) -> Self {
        Self::SpawnFailed {
            reason: reason.into(),
        }
    }

    /// Create a connection failed error
    pub fn connection_failed(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SshConnectionFailed {
            host: host.into(),
            reason: reason.into(),
        }
    }

    /// Create a channel failed error
    pub fn channel_failed(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ChannelFailed {
            host: host.into(),
            reason: reason.into(),
        }
    }

    /// Create a session close error
    pub fn close_failed(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SessionCloseFailed {
            host: host.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
