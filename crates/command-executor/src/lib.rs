//! Runtime-agnostic command transports
//!
//! This crate provides the two ways parallexe reaches a host: a local shell
//! process, and a remote SSH session on which one channel is opened per
//! command. Both produce the same fully captured [`CommandOutput`].

#![warn(missing_docs)]

pub mod backends;
pub mod command;
pub mod error;
pub mod process;
pub mod session;

pub use backends::LocalRunner;
#[cfg(feature = "ssh")]
pub use backends::OpenSshProvider;
pub use command::Command;
pub use error::{Error, Result};
pub use process::{CommandOutput, ExitStatus};
pub use session::{Channel, Credentials, Session, SessionProvider, SshConfig};
