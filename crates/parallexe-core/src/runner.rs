//! Parallel fan-out of one command

use crate::error::ExecError;
use crate::executor::execute_on;
use crate::filter::ExecFilter;
use crate::registry::{Connection, ConnectionRegistry};
use crate::result::BatchResult;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{info, warn};

/// Run `command` on every connection selected by `filter` and wait for all.
///
/// Returns the complete batch, or an [`ExecError`] carrying the complete batch
/// and the failing hosts.
pub async fn exec(
    registry: &ConnectionRegistry,
    command: &str,
    filter: &ExecFilter,
) -> Result<BatchResult, ExecError> {
    let targets = filter.select(registry.connections());
    info!(command, hosts = targets.len(), "executing on fleet");

    let (batch, failed) = fan_out(targets, |_| command.to_string()).await;
    ExecError::check(batch, failed)
}

/// Run one command per target concurrently and join.
///
/// `command_for` picks the command text for each target. Every worker's
/// result flows back to this single aggregator, which owns the batch and the
/// failure list. Failing hosts are returned sorted.
pub(crate) async fn fan_out<'a, F>(
    targets: Vec<&'a Connection>,
    command_for: F,
) -> (BatchResult, Vec<String>)
where
    F: Fn(&Connection) -> String,
{
    let mut workers: FuturesUnordered<_> = targets
        .into_iter()
        .map(|connection| {
            let command = command_for(connection);
            async move {
                let result = execute_on(connection, &command).await;
                (connection.host(), result)
            }
        })
        .collect();

    let mut batch = BatchResult::default();
    let mut failed = Vec::new();

    while let Some((host, result)) = workers.next().await {
        if result.is_failure() {
            match &result.error {
                Some(error) => warn!(host, %error, "execution failed"),
                None => warn!(host, stderr = %result.stderr.trim_end(), "command wrote to stderr"),
            }
            failed.push(host.to_string());
        }
        batch.insert(host, result);
    }

    failed.sort();
    (batch, failed)
}
