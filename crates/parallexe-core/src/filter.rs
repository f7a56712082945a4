//! Host selection

use crate::registry::Connection;

/// Selects which connections a command runs on.
///
/// An empty filter selects every connection. Host names and group names are
/// matched in two separate passes whose results are concatenated: a
/// connection matching both a listed host and a listed group is selected
/// twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecFilter {
    /// Host addresses to select
    pub hosts: Vec<String>,
    /// Group labels to select
    pub groups: Vec<String>,
}

impl ExecFilter {
    /// Filter that selects every connection
    pub fn all() -> Self {
        Self::default()
    }

    /// Select hosts by address
    pub fn hosts<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().with_hosts(hosts)
    }

    /// Select hosts by group
    pub fn groups<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().with_groups(groups)
    }

    /// Also select these host addresses
    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts.extend(hosts.into_iter().map(Into::into));
        self
    }

    /// Also select these groups
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    /// True when the filter selects everything
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.groups.is_empty()
    }

    /// Pick connections in registry order: host matches first, then group matches
    pub fn select<'a>(&self, connections: &'a [Connection]) -> Vec<&'a Connection> {
        if self.is_empty() {
            return connections.iter().collect();
        }

        let by_host = connections
            .iter()
            .filter(|c| self.hosts.iter().any(|host| host == c.host()));
        let by_group = connections
            .iter()
            .filter(|c| c.groups().iter().any(|group| self.groups.contains(group)));

        by_host.chain(by_group).collect()
    }
}
