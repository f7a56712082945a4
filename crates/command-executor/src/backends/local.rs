//! Local process execution backend

use async_process::Stdio;
use tracing::debug;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::process::{CommandOutput, ExitStatus};

/// Runs commands as local child processes, capturing their output
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRunner;

impl LocalRunner {
    /// Run `command` to completion.
    ///
    /// Fails only when the process cannot be launched; a non-zero exit is
    /// reported through the returned status.
    pub async fn run(&self, command: &Command) -> Result<CommandOutput> {
        let mut cmd = command.prepare();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        debug!(command = %command.display(), "running local process");

        let output = cmd
            .output()
            .await
            .map_err(|e| Error::spawn_failed(format!("Failed to spawn process: {}", e)))?;

        Ok(output.into())
    }

    /// Run `command` with its stdio detached, returning only the exit status.
    ///
    /// Used for programs that leave a background child holding their output
    /// pipes open, which would stall a captured run.
    pub async fn status(&self, command: &Command) -> Result<ExitStatus> {
        let mut cmd = command.prepare();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        debug!(command = %command.display(), "running detached local process");

        let status = cmd
            .status()
            .await
            .map_err(|e| Error::spawn_failed(format!("Failed to spawn process: {}", e)))?;

        Ok(status.into())
    }

    /// Run command text through `sh -c`
    pub async fn run_shell(&self, text: &str) -> Result<CommandOutput> {
        self.run(&Command::shell(text)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[smol_potat::test]
    async fn test_captures_both_streams() {
        let output = LocalRunner
            .run_shell("echo out; echo err >&2")
            .await
            .unwrap();
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.exit_code(), 0);
    }

    #[smol_potat::test]
    async fn test_status_reports_exit_code() {
        let status = LocalRunner.status(&Command::shell("exit 7")).await.unwrap();
        assert_eq!(status.code, Some(7));
    }

    #[smol_potat::test]
    async fn test_missing_program_is_spawn_error() {
        let result = LocalRunner
            .run(&Command::new("this_command_does_not_exist_12345"))
            .await;
        assert!(matches!(result, Err(Error::SpawnFailed { .. })));
    }
}
