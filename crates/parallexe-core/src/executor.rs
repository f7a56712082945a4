//! Single-host command execution

use crate::registry::Connection;
use crate::result::CommandResult;
use command_executor::LocalRunner;
use tracing::debug;

/// Run `command` on one connection.
///
/// Local connections run it through `sh -c`; remote connections open a new
/// channel on their session. Launch and channel failures become the result's
/// execution error instead of an `Err`.
pub async fn execute_on(connection: &Connection, command: &str) -> CommandResult {
    debug!(host = connection.host(), command, "executing");

    let result: CommandResult = match connection.session() {
        None => LocalRunner.run_shell(command).await.into(),
        Some(session) => match session.open_channel().await {
            Ok(mut channel) => channel.run(command).await.into(),
            Err(error) => CommandResult::from_error(error),
        },
    };

    debug!(
        host = connection.host(),
        code = result.code,
        success = result.success,
        "command finished"
    );
    result
}
