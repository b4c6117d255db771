//! Read-only command execution.

use log::{debug, warn};

use crate::batch::{CommandBatch, CommandFailure, ExecutionResult};
use crate::broker::Session;
use crate::driver::CliSession;

/// Send each command in order and collect its output.
///
/// Device error text is returned as output, not treated as a failure. A
/// session failure stops the batch: earlier outputs are kept, the failing
/// command is reported and later commands are never sent.
pub async fn run<S: CliSession>(session: &mut Session<S>, batch: &CommandBatch) -> ExecutionResult {
    let mut result = ExecutionResult::new(session.device());

    for (index, command) in batch.iter().enumerate() {
        debug!("{}: [{}] {}", session.device(), index, command);

        match session.cli().send_command(command).await {
            Ok(response) => result.outputs.push(response.into()),
            Err(e) => {
                warn!("{}: '{}' failed: {}", session.device(), command, e);
                result.fail(CommandFailure::from_error(index, command, &e));
                break;
            }
        }
    }

    result
}
