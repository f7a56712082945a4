//! Backend implementations for different execution contexts
//!
//! [`LocalRunner`] runs command text through a local shell. With the `ssh`
//! feature, [`OpenSshProvider`] opens remote sessions through the system
//! OpenSSH client. Other transports plug in by implementing
//! [`SessionProvider`](crate::session::SessionProvider).

pub mod local;
pub use local::LocalRunner;

#[cfg(feature = "ssh")]
pub mod ssh;
#[cfg(feature = "ssh")]
pub use ssh::OpenSshProvider;
