//! Distribute a file, optionally rendered per host, to the fleet

use super::shell_quote;
use crate::error::{ExecError, Result};
use crate::filter::ExecFilter;
use crate::registry::{Connection, ConnectionRegistry};
use crate::result::BatchResult;
use crate::runner::{exec, fan_out};
use crate::template::Renderer;
use crate::variables::{VariableTiers, resolve_variables};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Options for [`send`]
#[derive(Debug, Clone, Default)]
pub struct SendConfig {
    /// Hosts to send to
    pub filter: ExecFilter,
    /// Render the source as a template for each host before sending
    pub template: bool,
    /// Variables available to the template
    pub variables: Option<VariableTiers>,
    /// Owner to `chown` the destination to
    pub owner: Option<String>,
    /// Mode to `chmod` the destination to
    pub mode: Option<String>,
    /// Leave an existing destination untouched
    pub ignore_if_exists: bool,
}

/// Write the contents of the local file `source` to `dest` on every selected host.
///
/// Reading and rendering happen before anything is executed, so a bad source
/// or template touches no host. The returned batch is the one of the last
/// command that completed: the write, or `chown` when an owner is set. A
/// failing `chmod` names its hosts but keeps that batch.
pub async fn send(
    registry: &ConnectionRegistry,
    source: &Path,
    dest: &str,
    config: &SendConfig,
    renderer: &dyn Renderer,
) -> Result<BatchResult> {
    let content = async_fs::read_to_string(source).await?;
    let targets = config.filter.select(registry.connections());

    let rendered = if config.template {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());
        render_per_host(&targets, &name, &content, config.variables.as_ref(), renderer)?
    } else {
        HashMap::new()
    };

    info!(source = %source.display(), dest, hosts = targets.len(), "sending file");

    let (batch, failed) = fan_out(targets, |connection| {
        let body = rendered
            .get(connection.host())
            .map(String::as_str)
            .unwrap_or(&content);
        write_command(dest, body, config.ignore_if_exists)
    })
    .await;
    let mut batch = ExecError::check(batch, failed)?;

    if let Some(owner) = &config.owner {
        let command = format!("chown {} {}", shell_quote(owner), shell_quote(dest));
        batch = exec(registry, &command, &config.filter).await?;
    }

    // A failing chmod reports its hosts against the last completed batch
    if let Some(mode) = &config.mode {
        let command = format!("chmod {} {}", shell_quote(mode), shell_quote(dest));
        if let Err(e) = exec(registry, &command, &config.filter).await {
            return Err(ExecError { batch, hosts: e.hosts }.into());
        }
    }

    Ok(batch)
}

fn render_per_host(
    targets: &[&Connection],
    name: &str,
    source: &str,
    tiers: Option<&VariableTiers>,
    renderer: &dyn Renderer,
) -> Result<HashMap<String, String>> {
    let mut rendered = HashMap::with_capacity(targets.len());
    for connection in targets {
        if rendered.contains_key(connection.host()) {
            continue;
        }
        let variables = resolve_variables(connection.config(), tiers);
        let body = renderer.render(name, source, &variables)?;
        rendered.insert(connection.host().to_string(), body);
    }
    Ok(rendered)
}

fn write_command(dest: &str, content: &str, ignore_if_exists: bool) -> String {
    let dest = shell_quote(dest);
    let guard = if ignore_if_exists {
        format!("[ -f {dest} ] || ")
    } else {
        String::new()
    };
    format!("{guard}printf '%s' {} > {dest}", shell_quote(content))
}
