use crate::{GlobalArgs, output};
use anyhow::Result;
use parallexe_core::{Error, SendConfig};
use std::path::Path;

/// Flags of the `send` subcommand
pub struct SendOptions {
    /// Render per host before sending
    pub template: bool,
    /// Destination owner
    pub owner: Option<String>,
    /// Destination mode
    pub mode: Option<String>,
    /// Skip hosts that already have the destination
    pub ignore_if_exists: bool,
}

pub async fn run(
    global: &GlobalArgs,
    source: &Path,
    dest: &str,
    options: SendOptions,
) -> Result<()> {
    let (inventory, fleet) = super::connect(global).await?;
    let config = SendConfig {
        filter: super::filter(global),
        template: options.template,
        variables: Some(inventory.variables),
        owner: options.owner,
        mode: options.mode,
        ignore_if_exists: options.ignore_if_exists,
    };

    let (batch, failed) = match fleet.send(source, dest, &config).await {
        Ok(batch) => (batch, Vec::new()),
        Err(Error::Exec(e)) => (e.batch, e.hosts),
        Err(e) => {
            super::close(fleet).await?;
            return Err(e.into());
        }
    };

    let printed = output::print_batch(&batch, false);
    super::close(fleet).await?;
    printed?;
    super::ensure_succeeded(&failed)
}
