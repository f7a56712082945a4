//! Ensure a line is present in, or absent from, a file

use super::shell_quote;
use crate::error::ExecError;
use crate::filter::ExecFilter;
use crate::registry::ConnectionRegistry;
use crate::result::BatchResult;
use crate::runner::exec;

/// Options for [`line_in_file`]
#[derive(Debug, Clone, Default)]
pub struct LineInFileConfig {
    /// Hosts to act on
    pub filter: ExecFilter,
    /// Remove the line instead of adding it
    pub absent: bool,
}

/// Make sure `line` is (or, with `absent`, is not) a whole line of `path`.
///
/// Adding creates the file when missing and appends the line only when no
/// identical line exists. Removing deletes every identical line; a missing
/// file is left alone.
pub async fn line_in_file(
    registry: &ConnectionRegistry,
    path: &str,
    line: &str,
    config: &LineInFileConfig,
) -> Result<BatchResult, ExecError> {
    let command = if config.absent {
        absent_command(path, line)
    } else {
        present_command(path, line)
    };
    exec(registry, &command, &config.filter).await
}

fn present_command(path: &str, line: &str) -> String {
    let path = shell_quote(path);
    let line = shell_quote(line);
    // A file not ending in a newline gets one before the appended line.
    format!(
        "[ -f {path} ] || : > {path}; \
         grep -qxF -- {line} {path} || {{ \
         [ ! -s {path} ] || [ -z \"$(tail -c 1 {path})\" ] || printf '\\n' >> {path}; \
         printf '%s\\n' {line} >> {path}; }}"
    )
}

fn absent_command(path: &str, line: &str) -> String {
    let tmp = shell_quote(&format!("{path}.tmp"));
    let path = shell_quote(path);
    let line = shell_quote(line);
    // grep exits 1 when every line was removed, which is still a success here.
    format!(
        "[ ! -f {path} ] || {{ grep -vxF -- {line} {path} > {tmp}; \
         [ $? -le 1 ] && cat {tmp} > {path}; rm -f {tmp}; }}"
    )
}
