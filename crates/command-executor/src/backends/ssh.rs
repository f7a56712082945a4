//! SSH remote execution backend using the OpenSSH CLI
//!
//! A session is an OpenSSH control master: `connect` starts a backgrounded
//! master bound to a private control socket, every channel is a client
//! multiplexed over that socket, and `close` asks the master to exit.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::backends::local::LocalRunner;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::process::CommandOutput;
use crate::session::{Channel, Credentials, Session, SessionProvider, SshConfig};

/// `sshpass` exit code for a rejected password
const SSHPASS_BAD_PASSWORD: i32 = 5;

/// Opens sessions by driving the system `ssh` binary
#[derive(Debug, Clone)]
pub struct OpenSshProvider {
    /// The ssh client binary
    program: String,
    /// The sshpass binary, used for password authentication
    sshpass: String,
    runner: LocalRunner,
}

impl Default for OpenSshProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenSshProvider {
    /// Use `ssh` and `sshpass` from `PATH`
    pub fn new() -> Self {
        Self {
            program: "ssh".to_string(),
            sshpass: "sshpass".to_string(),
            runner: LocalRunner,
        }
    }

    /// Use a specific ssh client binary
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Use a specific sshpass binary
    pub fn with_sshpass(mut self, sshpass: impl Into<String>) -> Self {
        self.sshpass = sshpass.into();
        self
    }

    /// Build the master command for `host`, preparing key material in `scratch`
    async fn master_command(
        &self,
        host: &str,
        config: &SshConfig,
        scratch: &Path,
        control_path: &Path,
        log_path: &Path,
    ) -> Result<Command> {
        let credentials = config.credentials();

        let mut cmd = match credentials {
            Credentials::Password(password) => {
                let mut cmd = Command::new(&self.sshpass);
                cmd.arg("-e").arg(&self.program).env("SSHPASS", password);
                cmd
            }
            _ => Command::new(&self.program),
        };

        cmd.args(["-M", "-N", "-f"])
            .arg("-o")
            .arg(format!("ControlPath={}", control_path.display()))
            .args(["-o", "ControlPersist=yes"])
            .arg("-E")
            .arg(log_path);
        cmd.args(common_options(config));

        match credentials {
            Credentials::Password(_) => {
                cmd.args([
                    "-o",
                    "PreferredAuthentications=password,keyboard-interactive",
                    "-o",
                    "PubkeyAuthentication=no",
                ]);
            }
            Credentials::PrivateKey(key) => {
                let identity = scratch.join("identity");
                write_private_key(&identity, key).await?;
                cmd.arg("-i")
                    .arg(&identity)
                    .args(["-o", "IdentitiesOnly=yes", "-o", "BatchMode=yes"]);
            }
            Credentials::PrivateKeyPath(path) => {
                if async_fs::metadata(path).await.is_err() {
                    return Err(Error::SshKeyNotFound {
                        path: path.display().to_string(),
                    });
                }
                cmd.arg("-i")
                    .arg(path)
                    .args(["-o", "IdentitiesOnly=yes", "-o", "BatchMode=yes"]);
            }
            Credentials::Agent => {
                if std::env::var_os("SSH_AUTH_SOCK").is_none_or(|sock| sock.is_empty()) {
                    return Err(Error::SshAgentUnavailable {
                        reason: "SSH_AUTH_SOCK is not set".to_string(),
                    });
                }
                cmd.args(["-o", "BatchMode=yes"]);
            }
        }

        cmd.arg(config.destination(host));
        Ok(cmd)
    }
}

#[async_trait]
impl SessionProvider for OpenSshProvider {
    async fn connect(&self, host: &str, config: &SshConfig) -> Result<Box<dyn Session>> {
        let control_dir = tempfile::Builder::new().prefix("parallexe-").tempdir()?;
        let control_path = control_dir.path().join("control");
        let log_path = control_dir.path().join("master.log");

        let master = self
            .master_command(host, config, control_dir.path(), &control_path, &log_path)
            .await?;

        debug!(host, "starting ssh control master");

        // The backgrounded master keeps inherited pipes open, so only the
        // status is awaited and diagnostics come from the -E log.
        let status = self
            .runner
            .status(&master)
            .await
            .map_err(|e| Error::connection_failed(host, e.to_string()))?;

        if !status.success() {
            if matches!(config.credentials(), Credentials::Password(_))
                && status.code == Some(SSHPASS_BAD_PASSWORD)
            {
                return Err(Error::SshAuthenticationFailed {
                    host: host.to_string(),
                });
            }

            let log = async_fs::read_to_string(&log_path).await.unwrap_or_default();
            let reason = match log.trim() {
                "" => format!("ssh exited with status {:?}", status.code),
                reason => reason.to_string(),
            };
            return Err(Error::connection_failed(host, reason));
        }

        info!(host, "ssh session established");

        Ok(Box::new(OpenSshSession {
            host: host.to_string(),
            program: self.program.clone(),
            destination: config.destination(host),
            options: common_options(config),
            control_path,
            _control_dir: control_dir,
            runner: self.runner,
            closed: AtomicBool::new(false),
        }))
    }
}

/// A control master owned by one connection.
///
/// Dropping a session that was never closed stops its master.
struct OpenSshSession {
    host: String,
    program: String,
    destination: String,
    options: Vec<String>,
    control_path: PathBuf,
    /// Holds the socket directory alive until the session is dropped
    _control_dir: TempDir,
    runner: LocalRunner,
    closed: AtomicBool,
}

impl OpenSshSession {
    /// A client command multiplexed over the control socket
    fn client(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-S")
            .arg(&self.control_path)
            .args(["-o", "ControlMaster=no"])
            .args(&self.options);
        cmd
    }

    /// A control request (`check`, `exit`) for the master
    fn control_command(&self, request: &str) -> Command {
        let mut cmd = self.client();
        cmd.arg("-O").arg(request).arg(&self.destination);
        cmd
    }

    /// Send a control request to the master
    async fn control(&self, request: &str) -> Result<CommandOutput> {
        self.runner.run(&self.control_command(request)).await
    }
}

#[async_trait]
impl Session for OpenSshSession {
    async fn open_channel(&self) -> Result<Box<dyn Channel>> {
        let output = self
            .control("check")
            .await
            .map_err(|e| Error::channel_failed(&self.host, e.to_string()))?;

        if !output.status.success() {
            return Err(Error::channel_failed(&self.host, output.stderr.trim()));
        }

        let mut command = self.client();
        command.arg(&self.destination);

        Ok(Box::new(OpenSshChannel {
            command,
            runner: self.runner,
        }))
    }

    async fn close(&self) -> Result<()> {
        let output = self
            .control("exit")
            .await
            .map_err(|e| Error::close_failed(&self.host, e.to_string()))?;

        if !output.status.success() {
            return Err(Error::close_failed(&self.host, output.stderr.trim()));
        }

        self.closed.store(true, Ordering::Release);
        info!(host = %self.host, "ssh session closed");
        Ok(())
    }
}

impl Drop for OpenSshSession {
    fn drop(&mut self) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }

        // Must finish before the control directory is removed with its socket
        let status = self
            .control_command("exit")
            .prepare_blocking()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => {
                debug!(host = %self.host, "ssh master stopped on drop")
            }
            Ok(status) => {
                warn!(host = %self.host, code = ?status.code(), "ssh master did not stop on drop")
            }
            Err(error) => warn!(host = %self.host, %error, "failed to stop ssh master on drop"),
        }
    }
}

/// One remote command over the control socket
struct OpenSshChannel {
    command: Command,
    runner: LocalRunner,
}

#[async_trait]
impl Channel for OpenSshChannel {
    async fn run(&mut self, command: &str) -> Result<CommandOutput> {
        let mut cmd = self.command.clone();
        cmd.arg(command);
        self.runner.run(&cmd).await
    }
}

/// Options shared by the master and its clients
fn common_options(config: &SshConfig) -> Vec<String> {
    let mut options = vec![
        "-o".to_string(),
        "StrictHostKeyChecking=no".to_string(),
        "-o".to_string(),
        "UserKnownHostsFile=/dev/null".to_string(),
        "-o".to_string(),
        "LogLevel=ERROR".to_string(),
        "-p".to_string(),
        config.port.unwrap_or(22).to_string(),
    ];
    options.extend(config.extra_args.iter().cloned());
    options
}

/// Write key material readable only by the owner, as ssh requires
async fn write_private_key(path: &Path, key: &[u8]) -> Result<()> {
    let mut contents = key.to_vec();
    if !contents.ends_with(b"\n") {
        contents.push(b'\n');
    }

    async_fs::write(path, &contents).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        async_fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    }

    Ok(())
}
