use crate::{GlobalArgs, output};
use anyhow::Result;

pub async fn run(global: &GlobalArgs, command: &str, json: bool) -> Result<()> {
    let (_, fleet) = super::connect(global).await?;

    let (batch, failed) = match fleet.exec(command, &super::filter(global)).await {
        Ok(batch) => (batch, Vec::new()),
        Err(e) => (e.batch, e.hosts),
    };

    let printed = output::print_batch(&batch, json);
    super::close(fleet).await?;
    printed?;
    super::ensure_succeeded(&failed)
}
