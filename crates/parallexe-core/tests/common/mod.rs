//! Scripted session provider for tests

#![allow(dead_code)]

use async_trait::async_trait;
use command_executor::{
    Channel, CommandOutput, Error, ExitStatus, Result, Session, SessionProvider, SshConfig,
};
use std::sync::{Arc, Mutex};

/// What the fake fleet did
#[derive(Default)]
pub struct Log {
    pub connected: Mutex<Vec<String>>,
    pub closed: Mutex<Vec<String>>,
    pub commands: Mutex<Vec<(String, String)>>,
}

impl Log {
    pub fn connected(&self) -> Vec<String> {
        sorted(&self.connected)
    }

    pub fn closed(&self) -> Vec<String> {
        sorted(&self.closed)
    }

    pub fn commands(&self) -> Vec<(String, String)> {
        let mut commands = self.commands.lock().unwrap().clone();
        commands.sort();
        commands
    }
}

fn sorted(list: &Mutex<Vec<String>>) -> Vec<String> {
    let mut items = list.lock().unwrap().clone();
    items.sort();
    items
}

/// Provider whose hosts answer commands from a fixed script:
///
/// - `warn`: writes to stderr, exits 0
/// - `exit N`: exits N silently
/// - `break HOST`: writes to stderr on HOST only
/// - anything else: echoes `HOST: COMMAND` to stdout
#[derive(Default, Clone)]
pub struct FakeProvider {
    pub unreachable: Vec<String>,
    pub failing_close: Vec<String>,
    pub broken_channel: Vec<String>,
    pub log: Arc<Log>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable(mut self, host: &str) -> Self {
        self.unreachable.push(host.to_string());
        self
    }

    pub fn failing_close(mut self, host: &str) -> Self {
        self.failing_close.push(host.to_string());
        self
    }

    pub fn broken_channel(mut self, host: &str) -> Self {
        self.broken_channel.push(host.to_string());
        self
    }
}

#[async_trait]
impl SessionProvider for FakeProvider {
    async fn connect(&self, host: &str, _config: &SshConfig) -> Result<Box<dyn Session>> {
        // Yield so concurrent connects interleave
        smol::future::yield_now().await;

        if self.unreachable.iter().any(|h| h == host) {
            return Err(Error::connection_failed(host, "connection refused"));
        }

        self.log.connected.lock().unwrap().push(host.to_string());
        Ok(Box::new(FakeSession {
            host: host.to_string(),
            provider: self.clone(),
        }))
    }
}

struct FakeSession {
    host: String,
    provider: FakeProvider,
}

#[async_trait]
impl Session for FakeSession {
    async fn open_channel(&self) -> Result<Box<dyn Channel>> {
        if self.provider.broken_channel.contains(&self.host) {
            return Err(Error::channel_failed(&self.host, "session is gone"));
        }
        Ok(Box::new(FakeChannel {
            host: self.host.clone(),
            log: self.provider.log.clone(),
        }))
    }

    async fn close(&self) -> Result<()> {
        self.provider.log.closed.lock().unwrap().push(self.host.clone());
        if self.provider.failing_close.contains(&self.host) {
            return Err(Error::close_failed(&self.host, "broken pipe"));
        }
        Ok(())
    }
}

struct FakeChannel {
    host: String,
    log: Arc<Log>,
}

#[async_trait]
impl Channel for FakeChannel {
    async fn run(&mut self, command: &str) -> Result<CommandOutput> {
        smol::future::yield_now().await;
        self.log
            .commands
            .lock()
            .unwrap()
            .push((self.host.clone(), command.to_string()));

        let output = if command == "warn" {
            output("", "warning\n", 0)
        } else if let Some(code) = command.strip_prefix("exit ") {
            output("", "", code.parse().unwrap())
        } else if command == format!("break {}", self.host) {
            output("", &format!("broken on {}\n", self.host), 1)
        } else {
            output(&format!("{}: {}\n", self.host, command), "", 0)
        };
        Ok(output)
    }
}

fn output(stdout: &str, stderr: &str, code: i32) -> CommandOutput {
    CommandOutput {
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        status: ExitStatus::exited(code),
    }
}
