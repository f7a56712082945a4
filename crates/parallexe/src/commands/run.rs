use crate::{GlobalArgs, output};
use anyhow::Result;

pub async fn run(global: &GlobalArgs, commands: &[String], json: bool) -> Result<()> {
    let (_, fleet) = super::connect(global).await?;

    let (steps, failed) = match fleet.multi_exec(commands, &super::filter(global)).await {
        Ok(steps) => (steps, Vec::new()),
        Err(e) => {
            if let Some(step) = e.halted_at() {
                tracing::warn!(step = step + 1, "sequence halted");
            }
            (e.steps, e.hosts)
        }
    };

    let printed = output::print_steps(&steps, json);
    super::close(fleet).await?;
    printed?;
    super::ensure_succeeded(&failed)
}
