//! Command batches and the results of running them.

use serde::{Deserialize, Serialize};

use crate::driver::Response;
use crate::error::{ChannelError, Error, TransportError};
use crate::platform::FinalizeAction;

/// Ordered commands for one device. Never reordered or deduplicated.
///
/// Deserializes from a list of strings or from a single string; a single
/// string is split into its non-blank lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany", into = "Vec<String>")]
pub struct CommandBatch(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for CommandBatch {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(text) => Self(
                text.lines()
                    .map(|line| line.trim_end_matches('\r'))
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            OneOrMany::Many(commands) => Self(commands),
        }
    }
}

impl From<CommandBatch> for Vec<String> {
    fn from(batch: CommandBatch) -> Self {
        batch.0
    }
}

impl<S: Into<String>> FromIterator<S> for CommandBatch {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl CommandBatch {
    /// Batch of commands, sent in the given order.
    pub fn new(commands: Vec<String>) -> Self {
        Self(commands)
    }

    /// Commands in send order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Output of one completed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub command: String,
    pub output: String,
}

impl From<Response> for CommandOutput {
    fn from(response: Response) -> Self {
        Self {
            command: response.command,
            output: response.result,
        }
    }
}

/// Why a batch stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The device answered with an error.
    Rejected,
    /// No prompt within the command timeout.
    Timeout,
    /// The connection went away.
    Disconnected,
    /// Any other session failure.
    Session,
}

impl FailureReason {
    /// Map a session error to the reason reported to callers.
    pub fn classify(error: &Error) -> Self {
        match error {
            Error::Channel(ChannelError::PatternTimeout(_))
            | Error::Transport(TransportError::Timeout(_)) => Self::Timeout,
            Error::Channel(ChannelError::Closed)
            | Error::Channel(ChannelError::Ssh(_))
            | Error::Transport(TransportError::Disconnected)
            | Error::Transport(TransportError::Ssh(_))
            | Error::Transport(TransportError::Io(_)) => Self::Disconnected,
            _ => Self::Session,
        }
    }
}

/// The command that stopped a batch. `index` is zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandFailure {
    pub index: usize,
    pub command: String,
    pub reason: FailureReason,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl CommandFailure {
    /// The device rejected the command.
    pub fn rejected(index: usize, response: Response) -> Self {
        Self {
            index,
            message: response
                .failure_message
                .unwrap_or_else(|| "command rejected".to_string()),
            command: response.command,
            reason: FailureReason::Rejected,
            output: Some(response.result),
        }
    }

    /// The session failed while the command was running.
    pub fn from_error(index: usize, command: &str, error: &Error) -> Self {
        Self {
            index,
            command: command.to_string(),
            reason: FailureReason::classify(error),
            message: error.to_string(),
            output: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Completed,
    CommandFailure,
}

/// Result of a read-only batch.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub device: String,
    pub status: ExecutionStatus,
    pub outputs: Vec<CommandOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<CommandFailure>,
}

impl ExecutionResult {
    /// Empty, completed result for `device`.
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            status: ExecutionStatus::Completed,
            outputs: Vec::new(),
            failure: None,
        }
    }

    /// Record the failure that stopped the batch.
    pub fn fail(&mut self, failure: CommandFailure) {
        self.status = ExecutionStatus::CommandFailure;
        self.failure = Some(failure);
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// What happened after the configuration commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Finalization {
    Committed {
        output: String,
    },
    Saved {
        output: String,
    },
    /// A command failed, so nothing was committed or saved.
    FinalizationSkipped {
        reason: String,
    },
    FinalizationFailed {
        #[serde(skip_serializing_if = "Option::is_none")]
        action: Option<FinalizeAction>,
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<String>,
    },
    /// Empty batch: configuration mode was never entered.
    NothingToApply,
}

impl Finalization {
    /// Successful finalization for the dialect's action.
    pub fn succeeded(action: FinalizeAction, output: String) -> Self {
        match action {
            FinalizeAction::Commit => Self::Committed { output },
            FinalizeAction::Save => Self::Saved { output },
        }
    }

    /// Whether the change is durable (or there was no change).
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Committed { .. } | Self::Saved { .. } | Self::NothingToApply
        )
    }
}

/// Result of a configuration batch.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigResult {
    pub device: String,
    /// Echo/output of each command that was accepted.
    pub echoes: Vec<CommandOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<CommandFailure>,
    pub finalization: Finalization,
}

impl ConfigResult {
    /// Result for an empty batch.
    pub fn nothing_to_apply(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            echoes: Vec::new(),
            failure: None,
            finalization: Finalization::NothingToApply,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.finalization.is_success()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_batch_from_list() {
        let batch: CommandBatch =
            serde_json::from_value(json!(["show version", "show version", "show clock"])).unwrap();
        assert_eq!(
            batch.iter().collect::<Vec<_>>(),
            ["show version", "show version", "show clock"]
        );
    }

    #[test]
    fn test_batch_from_string() {
        let batch: CommandBatch = serde_json::from_value(json!("show version")).unwrap();
        assert_eq!(batch.len(), 1);

        let batch: CommandBatch =
            serde_json::from_value(json!("set system host-name qfx1\r\n\nset system ntp server 10.0.0.1\n"))
                .unwrap();
        assert_eq!(
            batch.iter().collect::<Vec<_>>(),
            ["set system host-name qfx1", "set system ntp server 10.0.0.1"]
        );

        let batch: CommandBatch = serde_json::from_value(json!("")).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_batch_rejects_other_types() {
        assert!(serde_json::from_value::<CommandBatch>(json!(42)).is_err());
        assert!(serde_json::from_value::<CommandBatch>(json!([1, 2])).is_err());
    }

    #[test]
    fn test_rejected_failure_carries_output() {
        let response = Response::new(
            "set foo",
            "syntax error.",
            "set foo\r\nsyntax error.\r\n",
            "rouser@qfx1#",
            Duration::ZERO,
        )
        .with_failure("syntax error.");

        let failure = CommandFailure::rejected(2, response);
        assert_eq!(failure.index, 2);
        assert_eq!(failure.command, "set foo");
        assert_eq!(failure.reason, FailureReason::Rejected);
        assert_eq!(failure.output.as_deref(), Some("syntax error."));
    }

    #[test]
    fn test_error_failure_classified() {
        let error = Error::Channel(ChannelError::PatternTimeout(Duration::from_secs(60)));
        let failure = CommandFailure::from_error(0, "show log", &error);
        assert_eq!(failure.reason, FailureReason::Timeout);

        let error = Error::Transport(TransportError::Disconnected);
        assert_eq!(FailureReason::classify(&error), FailureReason::Disconnected);
    }

    #[test]
    fn test_finalization_json() {
        let value = serde_json::to_value(Finalization::succeeded(FinalizeAction::Commit, "commit complete".into()))
            .unwrap();
        assert_eq!(value, json!({"status": "committed", "output": "commit complete"}));

        let value = serde_json::to_value(Finalization::NothingToApply).unwrap();
        assert_eq!(value, json!({"status": "nothing_to_apply"}));

        let value = serde_json::to_value(Finalization::FinalizationFailed {
            action: Some(FinalizeAction::Save),
            reason: "Error: flash full".into(),
            output: None,
        })
        .unwrap();
        assert_eq!(
            value,
            json!({"status": "finalization_failed", "action": "save", "reason": "Error: flash full"})
        );
    }

    #[test]
    fn test_execution_result_json() {
        let mut result = ExecutionResult::new("qfx1");
        result.outputs.push(CommandOutput {
            command: "show version".into(),
            output: "Junos: 21.4R3".into(),
        });
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "device": "qfx1",
                "status": "completed",
                "outputs": [{"command": "show version", "output": "Junos: 21.4R3"}]
            })
        );

        result.fail(CommandFailure::from_error(1, "show log", &Error::Channel(ChannelError::Closed)));
        assert!(!result.is_success());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "command_failure");
        assert_eq!(value["failure"]["reason"], "disconnected");
    }
}
