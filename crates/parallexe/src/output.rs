//! Result rendering

use anyhow::Result;
use comfy_table::{Cell, Color, Table};
use parallexe_core::{BatchResult, CommandResult, StepResult, StepStatus};

/// Print a batch as a table, or as JSON
pub fn print_batch(batch: &BatchResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(batch)?);
    } else {
        println!("{}", batch_table(batch));
    }
    Ok(())
}

/// Print every step of a sequence with its per-host table, or as JSON
pub fn print_steps(steps: &[StepResult], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(steps)?);
        return Ok(());
    }

    for (index, step) in steps.iter().enumerate() {
        let status = match step.status {
            StepStatus::Done => "done",
            StepStatus::Skipped => "skipped",
        };
        println!("[{}] {}: {}", index + 1, status, step.command);
        if step.status == StepStatus::Done {
            println!("{}", batch_table(&step.batch));
        }
    }
    Ok(())
}

fn batch_table(batch: &BatchResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["HOST", "STATUS", "CODE", "OUTPUT"]);

    for (host, result) in batch.iter() {
        let (status, color) = if result.success {
            ("ok", Color::Green)
        } else {
            ("failed", Color::Red)
        };

        table.add_row(vec![
            Cell::new(host),
            Cell::new(status).fg(color),
            Cell::new(result.code),
            Cell::new(summary(result)),
        ]);
    }

    table
}

fn summary(result: &CommandResult) -> String {
    match &result.error {
        Some(error) => error.to_string(),
        None if !result.stderr.is_empty() => result.stderr.trim_end().to_string(),
        None => result.stdout.trim_end().to_string(),
    }
}
