//! Inventory parser and conversion to fleet host configurations

use crate::{
    ConfigError, HostEntry, Inventory, Result, SshSettings,
    resolver::{ResolutionContext, expand_home, resolve_collecting},
};
use parallexe_core::{HostConfig, RegistryOptions, SshConfig};
use std::collections::HashSet;
use std::path::Path;

/// Supported inventory version
pub const VERSION: &str = "1.0";

/// Parse a YAML inventory file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Inventory> {
    let content = std::fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parse a YAML inventory from a string
pub fn parse_str(content: &str) -> Result<Inventory> {
    let inventory: Inventory = serde_yaml::from_str(content)?;
    validate_inventory(&inventory)?;
    Ok(inventory)
}

/// Validate inventory structure
fn validate_inventory(inventory: &Inventory) -> Result<()> {
    if inventory.version != VERSION {
        return Err(ConfigError::ValidationError(format!(
            "Unsupported version: {}, expected {}",
            inventory.version, VERSION
        )));
    }

    if inventory.hosts.is_empty() {
        return Err(ConfigError::ValidationError(
            "Inventory must list at least one host".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in &inventory.hosts {
        if entry.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Host address must not be empty".to_string(),
            ));
        }
        if !seen.insert(entry.host.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Host '{}' is listed more than once",
                entry.host
            )));
        }
        if let Some(ssh) = &entry.ssh {
            validate_ssh(&entry.host, ssh)?;
        }
    }
    validate_ssh("defaults", &inventory.defaults)?;

    let groups: HashSet<&str> = inventory
        .hosts
        .iter()
        .flat_map(|entry| entry.groups.iter().map(String::as_str))
        .collect();

    for group in inventory.variables.groups.keys() {
        if !groups.contains(group.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Variables reference unknown group '{}'",
                group
            )));
        }
    }

    for host in inventory.variables.hosts.keys() {
        if !seen.contains(host.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Variables reference unknown host '{}'",
                host
            )));
        }
    }

    Ok(())
}

fn validate_ssh(owner: &str, ssh: &SshSettings) -> Result<()> {
    if ssh.port == Some(0) {
        return Err(ConfigError::ValidationError(format!(
            "SSH port for '{}' must not be 0",
            owner
        )));
    }
    Ok(())
}

/// Convert every inventory host, resolving environment variables.
///
/// All missing variables across the inventory are reported in one error.
pub fn to_host_configs(
    inventory: &Inventory,
    context: &ResolutionContext,
) -> Result<Vec<HostConfig>> {
    let mut missing = Vec::new();
    let hosts = inventory
        .hosts
        .iter()
        .map(|entry| convert_host(entry, &inventory.defaults, context, &mut missing))
        .collect();

    if !missing.is_empty() {
        return Err(ConfigError::EnvVarNotFound(missing.join(", ")));
    }

    Ok(hosts)
}

/// Look up one host of the inventory
pub fn find_host(
    inventory: &Inventory,
    host: &str,
    context: &ResolutionContext,
) -> Result<HostConfig> {
    to_host_configs(inventory, context)?
        .into_iter()
        .find(|config| config.host == host)
        .ok_or_else(|| ConfigError::HostNotFound(host.to_string()))
}

/// Registry options from inventory settings
pub fn registry_options(inventory: &Inventory) -> RegistryOptions {
    match &inventory.settings.local_aliases {
        Some(aliases) => RegistryOptions {
            local_aliases: aliases.clone(),
        },
        None => RegistryOptions::default(),
    }
}

fn convert_host(
    entry: &HostEntry,
    defaults: &SshSettings,
    context: &ResolutionContext,
    missing: &mut Vec<String>,
) -> HostConfig {
    let settings = match &entry.ssh {
        Some(ssh) => ssh.or(defaults),
        None => defaults.clone(),
    };

    let mut resolve = |value: &Option<String>| {
        value
            .as_deref()
            .map(|value| resolve_collecting(value, context, missing))
    };

    let mut ssh = SshConfig::new();
    ssh.user = resolve(&settings.user);
    ssh.port = settings.port;
    ssh.password = resolve(&settings.password);
    ssh.private_key = resolve(&settings.private_key).map(String::into_bytes);
    ssh.private_key_path = resolve(&settings.private_key_path)
        .map(|path| expand_home(&path, context).into());
    ssh.extra_args = settings.extra_args.clone();

    HostConfig::new(&entry.host)
        .with_groups(entry.groups.iter().cloned())
        .with_ssh(ssh)
}
