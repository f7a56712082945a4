//! Subcommand implementations

pub mod exec;
pub mod line_in_file;
pub mod run;
pub mod send;
pub mod validate;
pub mod vars;

use crate::GlobalArgs;
use anyhow::{Context, Result};
use parallexe_config::resolver::ResolutionContext;
use parallexe_config::{Inventory, parser};
use parallexe_core::{ExecFilter, Fleet};

/// Parse and validate the inventory named on the command line
pub fn load_inventory(global: &GlobalArgs) -> Result<Inventory> {
    parser::parse_file(&global.inventory)
        .with_context(|| format!("Failed to load inventory {}", global.inventory.display()))
}

/// Host selection from `--hosts` and `--groups`
pub fn filter(global: &GlobalArgs) -> ExecFilter {
    ExecFilter::hosts(&global.hosts).with_groups(&global.groups)
}

/// Load the inventory and connect to every host in it
pub async fn connect(global: &GlobalArgs) -> Result<(Inventory, Fleet)> {
    let inventory = load_inventory(global)?;
    let configs = parser::to_host_configs(&inventory, &ResolutionContext::new())
        .context("Failed to resolve inventory")?;
    let options = parser::registry_options(&inventory);

    let fleet = Fleet::connect(configs, &options)
        .await
        .context("Failed to connect to fleet")?;
    Ok((inventory, fleet))
}

/// Close every session of `fleet`
pub async fn close(fleet: Fleet) -> Result<()> {
    fleet.close().await.context("Failed to close connections")
}

/// Turn failing hosts into the process error
pub fn ensure_succeeded(failed: &[String]) -> Result<()> {
    if failed.is_empty() {
        return Ok(());
    }
    anyhow::bail!("error on hosts: [{}]", failed.join(", "))
}
