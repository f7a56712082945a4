//! Host identities

use command_executor::SshConfig;

/// Addresses that mean "run on this machine" unless configured otherwise
pub const LOCAL_ALIASES: &[&str] = &["localhost", "127.0.0.1"];

/// A host of the fleet: its address, group labels and SSH settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Hostname or IP address
    pub host: String,
    /// Group labels, in declaration order
    pub groups: Vec<String>,
    /// SSH settings; `None` authenticates through the agent with defaults
    pub ssh: Option<SshConfig>,
}

impl HostConfig {
    /// Create a host with no groups and default SSH settings
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            groups: Vec::new(),
            ssh: None,
        }
    }

    /// Add the host to a group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Add the host to several groups
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    /// Set the SSH settings
    pub fn with_ssh(mut self, ssh: SshConfig) -> Self {
        self.ssh = Some(ssh);
        self
    }

    /// Check membership in `group`
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    /// Check whether the address is one of `aliases`
    pub fn is_local<S: AsRef<str>>(&self, aliases: &[S]) -> bool {
        aliases.iter().any(|alias| alias.as_ref() == self.host)
    }
}
