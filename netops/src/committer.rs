//! Configuration changes with commit-or-save finalization.

use log::{info, warn};

use crate::batch::{CommandBatch, CommandFailure, ConfigResult, Finalization};
use crate::broker::Session;
use crate::driver::CliSession;
use crate::error::Result;

/// Warns if a configuration run is abandoned after changes were sent.
///
/// Changes already sent are not rolled back.
struct PendingChanges<'a> {
    device: &'a str,
    sent: usize,
    settled: bool,
}

impl Drop for PendingChanges<'_> {
    fn drop(&mut self) {
        if !self.settled && self.sent > 0 {
            warn!(
                "{}: configuration abandoned after {} command(s), nothing committed or saved",
                self.device, self.sent
            );
        }
    }
}

/// Enter configuration mode, send the batch, then commit or save.
///
/// Returns an error only when configuration mode cannot be entered; a
/// command or finalization failure is reported inside the result.
pub async fn apply<S: CliSession>(session: &mut Session<S>, batch: &CommandBatch) -> Result<ConfigResult> {
    let device = session.device().to_string();

    if batch.is_empty() {
        info!("{}: empty configuration batch, nothing to apply", device);
        return Ok(ConfigResult::nothing_to_apply(device));
    }

    let cli = session.cli();
    cli.enter_config_mode().await?;

    let mut result = ConfigResult::nothing_to_apply(device.as_str());
    let mut pending = PendingChanges {
        device: &device,
        sent: 0,
        settled: false,
    };

    for (index, command) in batch.iter().enumerate() {
        let failure = match cli.send_command(command).await {
            Ok(response) if response.is_success() => {
                pending.sent += 1;
                result.echoes.push(response.into());
                continue;
            }
            Ok(response) => CommandFailure::rejected(index, response),
            Err(e) => CommandFailure::from_error(index, command, &e),
        };

        warn!(
            "{}: '{}' failed ({:?}), skipping finalization",
            device, command, failure.reason
        );
        result.finalization = Finalization::FinalizationSkipped {
            reason: format!("command {} '{}' failed: {}", index, command, failure.message),
        };
        result.failure = Some(failure);
        pending.settled = true;
        return Ok(result);
    }

    let action = cli.finalize_action();
    result.finalization = match cli.finalize().await {
        Ok(response) if response.is_success() => match action {
            Some(action) => {
                info!("{}: {} succeeded", device, action);
                Finalization::succeeded(action, response.result)
            }
            None => Finalization::FinalizationFailed {
                action: None,
                reason: "dialect reported no commit or save action".to_string(),
                output: Some(response.result),
            },
        },
        Ok(response) => {
            let reason = response
                .failure_message
                .clone()
                .unwrap_or_else(|| "finalization rejected".to_string());
            warn!("{}: finalization rejected: {}", device, reason);
            Finalization::FinalizationFailed {
                action,
                reason,
                output: Some(response.result),
            }
        }
        Err(e) => {
            warn!("{}: finalization failed: {}", device, e);
            Finalization::FinalizationFailed {
                action,
                reason: e.to_string(),
                output: None,
            }
        }
    };

    pending.settled = true;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::FailureReason;
    use crate::error::{DriverError, Error};
    use crate::mock::{FINALIZE, Reply, open_session};
    use crate::platform::FinalizeAction;

    fn batch(commands: &[&str]) -> CommandBatch {
        commands.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_commit_dialect_commits() {
        let (connector, mut session) = open_session("qfx1", "juniper_junos").await;
        connector.set_reply(FINALIZE, Reply::Output("commit complete".into()));

        let result = apply(
            &mut session,
            &batch(&["set system host-name qfx1", "set system ntp server 10.0.0.1"]),
        )
        .await
        .unwrap();

        assert!(result.is_success());
        assert_eq!(result.echoes.len(), 2);
        assert_eq!(
            result.finalization,
            Finalization::Committed {
                output: "commit complete".into()
            }
        );
        assert_eq!(
            connector.events(),
            [
                "open qfx1",
                "configure qfx1",
                "send qfx1 set system host-name qfx1",
                "send qfx1 set system ntp server 10.0.0.1",
                "commit qfx1",
            ]
        );
    }

    #[tokio::test]
    async fn test_save_dialect_saves() {
        let (connector, mut session) = open_session("sw1", "cisco_ios").await;

        let result = apply(&mut session, &batch(&["hostname sw1"])).await.unwrap();

        assert!(matches!(result.finalization, Finalization::Saved { .. }));
        assert_eq!(connector.events().last().map(String::as_str), Some("save sw1"));
    }

    #[tokio::test]
    async fn test_rejected_command_skips_finalization() {
        let (connector, mut session) = open_session("qfx1", "juniper_junos").await;
        connector.set_reply("set foo bar", Reply::Rejected("syntax error.".into()));

        let result = apply(
            &mut session,
            &batch(&["set system host-name qfx1", "set foo bar", "set system ntp server 10.0.0.1"]),
        )
        .await
        .unwrap();

        assert_eq!(result.echoes.len(), 1);
        let failure = result.failure.as_ref().unwrap();
        assert_eq!(failure.index, 1);
        assert_eq!(failure.reason, FailureReason::Rejected);
        assert!(matches!(result.finalization, Finalization::FinalizationSkipped { .. }));

        let events = connector.events();
        assert_eq!(events.last().map(String::as_str), Some("send qfx1 set foo bar"));
        assert!(!events.iter().any(|e| e.starts_with("commit")));
        assert!(!events.iter().any(|e| e.contains("ntp")));
    }

    #[tokio::test]
    async fn test_transport_failure_skips_finalization() {
        let (connector, mut session) = open_session("qfx1", "juniper_junos").await;
        connector.set_reply("set system host-name qfx1", Reply::Disconnect);

        let result = apply(&mut session, &batch(&["set system host-name qfx1"])).await.unwrap();

        assert_eq!(result.failure.unwrap().reason, FailureReason::Disconnected);
        assert!(matches!(result.finalization, Finalization::FinalizationSkipped { .. }));
    }

    #[tokio::test]
    async fn test_failed_commit() {
        let (connector, mut session) = open_session("qfx1", "juniper_junos").await;
        connector.set_reply(
            FINALIZE,
            Reply::Rejected("error: configuration check-out failed".into()),
        );

        let result = apply(&mut session, &batch(&["set system host-name qfx1"])).await.unwrap();

        assert!(!result.is_success());
        match result.finalization {
            Finalization::FinalizationFailed { action, reason, .. } => {
                assert_eq!(action, Some(FinalizeAction::Commit));
                assert!(reason.contains("check-out failed"));
            }
            other => panic!("unexpected finalization {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_batch_touches_nothing() {
        let (connector, mut session) = open_session("qfx1", "juniper_junos").await;

        let result = apply(&mut session, &CommandBatch::default()).await.unwrap();

        assert_eq!(result.finalization, Finalization::NothingToApply);
        assert!(result.echoes.is_empty());
        assert_eq!(connector.events(), ["open qfx1"]);
    }

    #[tokio::test]
    async fn test_dialect_without_config_mode() {
        let (_, mut session) = open_session("jump1", "linux").await;

        let err = apply(&mut session, &batch(&["echo hi"])).await.unwrap_err();
        assert!(matches!(err, Error::Driver(DriverError::NoConfigMode { .. })));
    }
}
