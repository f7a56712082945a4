//! High-level fleet handle

use crate::error::{ExecError, Result, SequenceError};
use crate::filter::ExecFilter;
use crate::host::HostConfig;
use crate::ops::{self, LineInFileConfig, SendConfig};
use crate::registry::{Connection, ConnectionRegistry, RegistryOptions};
use crate::result::{BatchResult, StepResult};
use crate::template::{PlaceholderRenderer, Renderer};
use crate::{runner, sequence};
use command_executor::SessionProvider;
use std::path::Path;

/// A connected fleet.
///
/// Wraps a [`ConnectionRegistry`] and exposes every fleet operation. Call
/// [`Fleet::close`] when done to close the remote sessions.
pub struct Fleet {
    registry: ConnectionRegistry,
    renderer: Box<dyn Renderer>,
}

impl Fleet {
    /// Connect every host over OpenSSH, running local aliases locally
    #[cfg(feature = "ssh")]
    pub async fn connect(configs: Vec<HostConfig>, options: &RegistryOptions) -> Result<Self> {
        let provider = command_executor::OpenSshProvider::new();
        Self::connect_with(configs, &provider, options).await
    }

    /// Connect every host through `provider`
    pub async fn connect_with(
        configs: Vec<HostConfig>,
        provider: &dyn SessionProvider,
        options: &RegistryOptions,
    ) -> Result<Self> {
        let registry = ConnectionRegistry::build_with(configs, provider, options).await?;
        Ok(Self::from_registry(registry))
    }

    /// Wrap an existing registry
    pub fn from_registry(registry: ConnectionRegistry) -> Self {
        Self {
            registry,
            renderer: Box::new(PlaceholderRenderer),
        }
    }

    /// Use `renderer` for templated sends
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// The underlying registry
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// All connections, in configuration order
    pub fn connections(&self) -> &[Connection] {
        self.registry.connections()
    }

    /// Run one command on the selected hosts in parallel
    pub async fn exec(
        &self,
        command: &str,
        filter: &ExecFilter,
    ) -> std::result::Result<BatchResult, ExecError> {
        runner::exec(&self.registry, command, filter).await
    }

    /// Run commands in order, halting the fleet at the first failing step
    pub async fn multi_exec<S: AsRef<str>>(
        &self,
        commands: &[S],
        filter: &ExecFilter,
    ) -> std::result::Result<Vec<StepResult>, SequenceError> {
        sequence::multi_exec(&self.registry, commands, filter).await
    }

    /// Ensure a line is present in (or absent from) a file
    pub async fn line_in_file(
        &self,
        path: &str,
        line: &str,
        config: &LineInFileConfig,
    ) -> std::result::Result<BatchResult, ExecError> {
        ops::line_in_file(&self.registry, path, line, config).await
    }

    /// Send a local file, optionally rendered per host
    pub async fn send(
        &self,
        source: impl AsRef<Path>,
        dest: &str,
        config: &SendConfig,
    ) -> Result<BatchResult> {
        ops::send(&self.registry, source.as_ref(), dest, config, self.renderer.as_ref()).await
    }

    /// Close every remote session
    pub async fn close(self) -> Result<()> {
        self.registry.teardown().await
    }
}
