use crate::{GlobalArgs, output};
use anyhow::Result;
use parallexe_core::LineInFileConfig;

pub async fn run(global: &GlobalArgs, path: &str, line: &str, absent: bool) -> Result<()> {
    let (_, fleet) = super::connect(global).await?;
    let config = LineInFileConfig {
        filter: super::filter(global),
        absent,
    };

    let (batch, failed) = match fleet.line_in_file(path, line, &config).await {
        Ok(batch) => (batch, Vec::new()),
        Err(e) => (e.batch, e.hosts),
    };

    let printed = output::print_batch(&batch, false);
    super::close(fleet).await?;
    printed?;
    super::ensure_succeeded(&failed)
}
