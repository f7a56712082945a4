//! # Parallexe Core
//!
//! Runs shell commands across a fleet of hosts.
//!
//! A [`ConnectionRegistry`] connects every host once, in parallel and
//! all-or-nothing. Commands are then fanned out to a filtered subset of the
//! fleet and joined ([`runner`]), or run as an ordered sequence that halts the
//! whole fleet at the first failing step ([`sequence`]). [`variables`] merges
//! global, group and host overrides for per-host templating.
//!
//! A host counts as failed when its command could not be run at all or wrote
//! anything to stderr. The exit code alone never fails a host.

#![warn(missing_docs)]

pub mod error;
pub mod executor;
pub mod filter;
pub mod fleet;
pub mod host;
pub mod ops;
pub mod registry;
pub mod result;
pub mod runner;
pub mod sequence;
pub mod template;
pub mod variables;

pub use error::{Error, ExecError, HostError, Result, SequenceError};
pub use filter::ExecFilter;
pub use fleet::Fleet;
pub use host::{HostConfig, LOCAL_ALIASES};
pub use ops::{LineInFileConfig, SendConfig};
pub use registry::{Connection, ConnectionRegistry, RegistryOptions};
pub use result::{BatchResult, CommandResult, StepResult, StepStatus};
pub use template::{PlaceholderRenderer, Renderer, TemplateError};
pub use variables::{VariableMap, VariableTiers, resolve_variables};

pub use command_executor::{SessionProvider, SshConfig};
