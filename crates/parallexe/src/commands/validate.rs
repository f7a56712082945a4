use crate::GlobalArgs;
use anyhow::Result;
use parallexe_config::resolver::ResolutionContext;
use parallexe_config::{ConfigError, parser};
use std::collections::BTreeSet;

pub fn run(global: &GlobalArgs) -> Result<()> {
    println!("Validating {}...", global.inventory.display());

    // Structural validation is done during parsing
    let inventory = super::load_inventory(global)?;

    println!("✓ Inventory valid");
    println!("  Version: {}", inventory.version);

    if let Some(name) = &inventory.name {
        println!("  Name: {}", name);
    }

    let groups: BTreeSet<&str> = inventory
        .hosts
        .iter()
        .flat_map(|entry| entry.groups.iter().map(String::as_str))
        .collect();
    let aliases = parser::registry_options(&inventory).local_aliases;
    let local = inventory
        .hosts
        .iter()
        .filter(|entry| aliases.contains(&entry.host))
        .count();

    println!("  Hosts: {} ({} local)", inventory.hosts.len(), local);
    if !groups.is_empty() {
        println!(
            "  Groups: {}",
            groups.into_iter().collect::<Vec<_>>().join(", ")
        );
    }

    // Missing variables only matter once we connect
    match parser::to_host_configs(&inventory, &ResolutionContext::new()) {
        Ok(_) => {}
        Err(ConfigError::EnvVarNotFound(names)) => {
            println!("  ⚠ References undefined environment variables: {}", names);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
