//! Ordered multi-command execution with fleet-wide halt

use crate::error::SequenceError;
use crate::filter::ExecFilter;
use crate::registry::ConnectionRegistry;
use crate::result::{StepResult, StepStatus};
use crate::runner::fan_out;
use tracing::{info, warn};

/// Run `commands` in order, each one fanned out across the filtered fleet.
///
/// A step starts only after the previous step finished on every host. When
/// any host fails a step, later steps are never attempted and stay
/// [`StepStatus::Skipped`]; the returned [`SequenceError`] holds every step
/// and names the hosts that failed.
pub async fn multi_exec<S: AsRef<str>>(
    registry: &ConnectionRegistry,
    commands: &[S],
    filter: &ExecFilter,
) -> Result<Vec<StepResult>, SequenceError> {
    let targets = filter.select(registry.connections());
    let mut steps: Vec<StepResult> = commands
        .iter()
        .map(|command| StepResult::skipped(command.as_ref()))
        .collect();
    let total = steps.len();

    for index in 0..total {
        let command = steps[index].command.clone();
        info!(step = index + 1, total, command = %command, hosts = targets.len(), "running step");

        let (batch, failed) = fan_out(targets.clone(), |_| command.clone()).await;

        let step = &mut steps[index];
        step.status = StepStatus::Done;
        step.batch = batch;

        if !failed.is_empty() {
            warn!(
                step = index + 1,
                skipped = total - index - 1,
                hosts = ?failed,
                "step failed, halting sequence"
            );
            return Err(SequenceError {
                steps,
                hosts: failed,
            });
        }
    }

    Ok(steps)
}
