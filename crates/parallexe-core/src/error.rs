//! Error types for fleet execution

use crate::result::{BatchResult, StepResult};
use crate::template::TemplateError;
use thiserror::Error;

/// A transport error attributed to one host
#[derive(Error, Debug)]
#[error("{host}: {source}")]
pub struct HostError {
    /// The host the error belongs to
    pub host: String,
    /// What went wrong
    #[source]
    pub source: command_executor::Error,
}

impl HostError {
    /// Attribute `source` to `host`
    pub fn new(host: impl Into<String>, source: command_executor::Error) -> Self {
        Self {
            host: host.into(),
            source,
        }
    }
}

/// One command failed on at least one host.
///
/// Owns the complete batch, so callers keep every host's result.
#[derive(Error, Debug)]
#[error("error on hosts: [{}]", .hosts.join(", "))]
pub struct ExecError {
    /// Results for every targeted host
    pub batch: BatchResult,
    /// Hosts that failed
    pub hosts: Vec<String>,
}

impl ExecError {
    /// `Ok(batch)` when no host failed
    pub(crate) fn check(batch: BatchResult, hosts: Vec<String>) -> std::result::Result<BatchResult, Self> {
        if hosts.is_empty() {
            Ok(batch)
        } else {
            Err(Self { batch, hosts })
        }
    }

    /// Take the batch back
    pub fn into_batch(self) -> BatchResult {
        self.batch
    }
}

/// A sequence halted because a step failed on at least one host.
///
/// Steps after the halting one are left skipped.
#[derive(Error, Debug)]
#[error("error on hosts: [{}]", .hosts.join(", "))]
pub struct SequenceError {
    /// Every step, in order
    pub steps: Vec<StepResult>,
    /// Hosts that failed in the halting step
    pub hosts: Vec<String>,
}

impl SequenceError {
    /// Index of the step that halted the sequence
    pub fn halted_at(&self) -> Option<usize> {
        self.steps
            .iter()
            .rposition(|step| step.status == crate::result::StepStatus::Done)
    }

    /// Take the steps back
    pub fn into_steps(self) -> Vec<StepResult> {
        self.steps
    }
}

/// Fleet-level error type
#[derive(Error, Debug)]
pub enum Error {
    /// One or more hosts could not be connected; no registry was built
    #[error("error while connecting to hosts: {}", join_host_errors(.0))]
    Connect(Vec<HostError>),

    /// One or more sessions failed to close
    #[error("error while closing connections: {}", join_host_errors(.0))]
    Teardown(Vec<HostError>),

    /// A command failed on some hosts
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// A template could not be rendered
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Hosts named by this error
    pub fn hosts(&self) -> Vec<&str> {
        match self {
            Error::Connect(errors) | Error::Teardown(errors) => {
                errors.iter().map(|e| e.host.as_str()).collect()
            }
            Error::Exec(e) => e.hosts.iter().map(String::as_str).collect(),
            Error::Template(_) | Error::Io(_) => Vec::new(),
        }
    }
}

fn join_host_errors(errors: &[HostError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
