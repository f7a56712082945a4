//! Per-host, per-command and per-step results

use command_executor::CommandOutput;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Outcome of one command on one host
#[derive(Debug, Serialize)]
pub struct CommandResult {
    /// Everything the command wrote to stdout
    pub stdout: String,
    /// Everything the command wrote to stderr
    pub stderr: String,
    /// Why the command could not be run at all, if it could not
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<command_executor::Error>,
    /// Exit code, or -1 when none was produced
    pub code: i32,
    /// No execution error and empty stderr. The exit code is not consulted.
    pub success: bool,
}

impl CommandResult {
    /// Result of a command that ran to completion
    pub fn from_output(output: CommandOutput) -> Self {
        let code = output.exit_code();
        let success = output.stderr.is_empty();
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            error: None,
            code,
            success,
        }
    }

    /// Result of a command that could not be launched
    pub fn from_error(error: command_executor::Error) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            error: Some(error),
            code: -1,
            success: false,
        }
    }

    /// Whether this result counts against its host when aggregating
    pub fn is_failure(&self) -> bool {
        self.error.is_some() || !self.stderr.is_empty()
    }
}

impl From<command_executor::Result<CommandOutput>> for CommandResult {
    fn from(result: command_executor::Result<CommandOutput>) -> Self {
        match result {
            Ok(output) => Self::from_output(output),
            Err(error) => Self::from_error(error),
        }
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<command_executor::Error>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_some(&error.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Results of one command, keyed by host
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct BatchResult {
    results: BTreeMap<String, CommandResult>,
}

impl BatchResult {
    /// Record the result for `host`
    pub(crate) fn insert(&mut self, host: impl Into<String>, result: CommandResult) {
        self.results.insert(host.into(), result);
    }

    /// Result for `host`
    pub fn get(&self, host: &str) -> Option<&CommandResult> {
        self.results.get(host)
    }

    /// Number of hosts with a result
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True when no host produced a result
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results ordered by host name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandResult)> {
        self.results.iter().map(|(host, result)| (host.as_str(), result))
    }

    /// Hosts whose result counts as a failure, ordered by name
    pub fn failed_hosts(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, result)| result.is_failure())
            .map(|(host, _)| host)
            .collect()
    }

    /// True when every host succeeded
    pub fn succeeded(&self) -> bool {
        self.results.values().all(|result| !result.is_failure())
    }

    /// Non-empty stdout lines per host
    pub fn stdout_lines(&self) -> BTreeMap<String, Vec<String>> {
        self.lines(|result| &result.stdout)
    }

    /// Non-empty stderr lines per host
    pub fn stderr_lines(&self) -> BTreeMap<String, Vec<String>> {
        self.lines(|result| &result.stderr)
    }

    fn lines(&self, stream: impl Fn(&CommandResult) -> &String) -> BTreeMap<String, Vec<String>> {
        self.results
            .iter()
            .map(|(host, result)| (host.clone(), split_lines(stream(result))))
            .collect()
    }
}

impl IntoIterator for BatchResult {
    type Item = (String, CommandResult);
    type IntoIter = std::collections::btree_map::IntoIter<String, CommandResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether a sequence step ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// The step ran on every targeted host
    Done,
    /// An earlier step failed, so this one never ran
    Skipped,
}

/// One command of a sequence and its outcome
#[derive(Debug, Serialize)]
pub struct StepResult {
    /// The command text
    pub command: String,
    /// Whether the step ran
    pub status: StepStatus,
    /// Per-host results; empty when skipped
    pub batch: BatchResult,
}

impl StepResult {
    /// A step that has not run
    pub fn skipped(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            status: StepStatus::Skipped,
            batch: BatchResult::default(),
        }
    }
}
