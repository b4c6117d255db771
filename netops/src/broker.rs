//! Session broker: one session per operation, closed on every exit path.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::batch::{CommandBatch, ConfigResult, ExecutionResult};
use crate::driver::{CliSession, DriverBuilder, GenericDriver};
use crate::error::{BrokerError, ConnectError, ConnectFailureReason, Result};
use crate::inventory::DeviceProfile;
use crate::{committer, executor};

/// Opens CLI sessions for device profiles.
pub trait Connector: Send + Sync {
    type Session: CliSession;

    /// Connect and prepare a session ready for commands.
    fn connect(&self, profile: &DeviceProfile) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// Connects with a [`GenericDriver`] over SSH or Telnet.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverConnector;

impl Connector for DriverConnector {
    type Session = GenericDriver;

    async fn connect(&self, profile: &DeviceProfile) -> Result<GenericDriver> {
        let mut driver = DriverBuilder::from_profile(profile).build()?;
        driver.open().await?;
        Ok(driver)
    }
}

/// A live session owned by one operation.
///
/// Dropping a session without [`Session::close`] (e.g. a cancelled
/// operation) still releases the connection when the inner session drops.
pub struct Session<S: CliSession> {
    device: String,
    host: String,
    inner: S,
    permit: Option<OwnedMutexGuard<()>>,
}

impl<S: CliSession> Session<S> {
    /// Inventory name of the device.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Hostname or address the session connected to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The underlying CLI session.
    pub fn cli(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Whether the connection is still up.
    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    /// Close the connection and release the device lock. Idempotent.
    pub async fn close(&mut self) -> Result<()> {
        let result = self.inner.close().await;
        self.permit = None;
        result
    }
}

impl<S: CliSession> Drop for Session<S> {
    fn drop(&mut self) {
        if self.inner.is_open() {
            warn!("{}: session dropped without close", self.device);
        }
    }
}

/// Opens and closes sessions on behalf of the tool surface.
pub struct SessionBroker<C: Connector = DriverConnector> {
    connector: C,
    /// Per-device locks, present when locking is enabled.
    locks: Option<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl SessionBroker<DriverConnector> {
    /// Broker that connects with [`GenericDriver`], without device locking.
    pub fn new() -> Self {
        Self::with_connector(DriverConnector)
    }
}

impl Default for SessionBroker<DriverConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> SessionBroker<C> {
    /// Broker using a custom connector.
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            locks: None,
        }
    }

    /// Serialize operations per device. Waiters are served in arrival order;
    /// different devices never wait on each other.
    pub fn with_device_locking(mut self, enabled: bool) -> Self {
        self.locks = enabled.then(|| Mutex::new(HashMap::new()));
        self
    }

    async fn lock_device(&self, device: &str) -> Option<OwnedMutexGuard<()>> {
        let locks = self.locks.as_ref()?;

        let lock = {
            let mut locks = locks.lock().await;
            locks.entry(device.to_string()).or_default().clone()
        };

        debug!("{}: waiting for device lock", device);
        Some(lock.lock_owned().await)
    }

    /// Open a session, holding the device lock (if enabled) until it closes.
    pub async fn open(&self, profile: &DeviceProfile) -> std::result::Result<Session<C::Session>, ConnectError> {
        let permit = self.lock_device(&profile.name).await;

        debug!(
            "{}: opening {} session to {}:{}",
            profile.name,
            profile.protocol(),
            profile.hostname,
            profile.port()
        );

        match self.connector.connect(profile).await {
            Ok(inner) => Ok(Session {
                device: profile.name.clone(),
                host: profile.hostname.clone(),
                inner,
                permit,
            }),
            Err(source) => {
                let reason = ConnectFailureReason::classify(&source);
                warn!("{}: connect failed ({}): {}", profile.name, reason, source);
                Err(ConnectError {
                    device: profile.name.clone(),
                    host: profile.hostname.clone(),
                    port: profile.port(),
                    reason,
                    source,
                })
            }
        }
    }

    /// Close a session; a failed close is logged, never returned.
    pub async fn close(&self, mut session: Session<C::Session>) {
        if let Err(e) = session.close().await {
            warn!("{}: close failed: {}", session.device(), e);
        }
    }

    /// Run read-only commands in a fresh session.
    pub async fn execute(
        &self,
        profile: &DeviceProfile,
        batch: &CommandBatch,
    ) -> std::result::Result<ExecutionResult, ConnectError> {
        let mut session = self.open(profile).await?;
        let result = executor::run(&mut session, batch).await;
        self.close(session).await;

        info!(
            "{}: {} of {} commands completed",
            profile.name,
            result.outputs.len(),
            batch.len()
        );
        Ok(result)
    }

    /// Apply configuration commands in a fresh session, then commit or save.
    pub async fn configure(
        &self,
        profile: &DeviceProfile,
        batch: &CommandBatch,
    ) -> std::result::Result<ConfigResult, BrokerError> {
        let mut session = self.open(profile).await?;
        let result = committer::apply(&mut session, batch).await;
        self.close(session).await;

        result.map_err(|source| BrokerError::Session {
            device: profile.name.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::batch::{ExecutionStatus, FailureReason, Finalization};
    use crate::inventory::Inventory;
    use crate::mock::{MockConnector, Reply};

    const DOC: &str = r#"
[default]
username = "rouser"
password = "rouserpassword"

[qfx1]
hostname = "172.16.0.40"
device_type = "juniper_junos"

[nexus1]
hostname = "172.16.0.10"
device_type = "cisco_nxos"
"#;

    fn inventory() -> Inventory {
        Inventory::load(DOC).unwrap()
    }

    fn batch(commands: &[&str]) -> CommandBatch {
        commands.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_execute_opens_and_closes() {
        let inventory = inventory();
        let connector = MockConnector::new();
        let broker = SessionBroker::with_connector(connector.clone());

        let result = broker
            .execute(inventory.resolve("qfx1").unwrap(), &batch(&["show version"]))
            .await
            .unwrap();

        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(connector.live_sessions(), 0);
        assert_eq!(connector.events(), ["open qfx1", "send qfx1 show version", "close qfx1"]);
    }

    #[tokio::test]
    async fn test_unreachable_device() {
        let inventory = inventory();
        let connector = MockConnector::new().refuse("nexus1");
        let broker = SessionBroker::with_connector(connector.clone());

        let err = broker
            .execute(inventory.resolve("nexus1").unwrap(), &batch(&["show version"]))
            .await
            .unwrap_err();

        assert_eq!(err.reason, ConnectFailureReason::Unreachable);
        assert_eq!(err.host, "172.16.0.10");
        assert_eq!(err.port, 22);
        assert_eq!(connector.live_sessions(), 0);
        assert!(connector.events().is_empty());
    }

    #[tokio::test]
    async fn test_session_closed_after_mid_batch_failure() {
        let inventory = inventory();
        let connector = MockConnector::new().reply("show log", Reply::Disconnect);
        let broker = SessionBroker::with_connector(connector.clone());

        let result = broker
            .execute(
                inventory.resolve("qfx1").unwrap(),
                &batch(&["show version", "show log", "show clock"]),
            )
            .await
            .unwrap();

        assert_eq!(result.outputs.len(), 1);
        assert_eq!(result.failure.unwrap().reason, FailureReason::Disconnected);
        assert_eq!(connector.live_sessions(), 0);
        assert_eq!(connector.events().last().map(String::as_str), Some("close qfx1"));
    }

    #[tokio::test]
    async fn test_configure_commits() {
        let inventory = inventory();
        let connector = MockConnector::new();
        let broker = SessionBroker::with_connector(connector.clone());

        let result = broker
            .configure(
                inventory.resolve("qfx1").unwrap(),
                &batch(&["set system host-name qfx1"]),
            )
            .await
            .unwrap();

        assert!(matches!(result.finalization, Finalization::Committed { .. }));
        assert_eq!(connector.live_sessions(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_operation_releases_session() {
        let inventory = inventory();
        let connector = MockConnector::new().reply("show log", Reply::Delay(Duration::from_secs(5)));
        let broker = SessionBroker::with_connector(connector.clone());

        let profile = inventory.resolve("qfx1").unwrap();
        let commands = batch(&["show log"]);
        let outcome =
            tokio::time::timeout(Duration::from_millis(50), broker.execute(profile, &commands)).await;

        assert!(outcome.is_err());
        assert_eq!(connector.live_sessions(), 0);
        assert!(!connector.events().contains(&"close qfx1".to_string()));
    }

    #[tokio::test]
    async fn test_device_lock_serializes_same_device() {
        let inventory = Arc::new(inventory());
        let connector = MockConnector::new().reply("show log", Reply::Delay(Duration::from_millis(30)));
        let broker = Arc::new(SessionBroker::with_connector(connector.clone()).with_device_locking(true));

        let mut tasks = Vec::new();
        for _ in 0..2 {
            let broker = broker.clone();
            let inventory = inventory.clone();
            tasks.push(tokio::spawn(async move {
                let profile = inventory.resolve("qfx1").unwrap();
                broker.execute(profile, &batch(&["show log"])).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let events = connector.events();
        assert_eq!(
            events,
            [
                "open qfx1",
                "send qfx1 show log",
                "close qfx1",
                "open qfx1",
                "send qfx1 show log",
                "close qfx1",
            ]
        );
    }

    #[tokio::test]
    async fn test_lock_does_not_block_other_devices() {
        let inventory = Arc::new(inventory());
        let connector = MockConnector::new().reply("show log", Reply::Delay(Duration::from_millis(30)));
        let broker = Arc::new(SessionBroker::with_connector(connector.clone()).with_device_locking(true));

        let mut tasks = Vec::new();
        for device in ["qfx1", "nexus1"] {
            let broker = broker.clone();
            let inventory = inventory.clone();
            tasks.push(tokio::spawn(async move {
                let profile = inventory.resolve(device).unwrap();
                broker.execute(profile, &batch(&["show log"])).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        // both devices were open at the same time
        assert_eq!(connector.max_live_sessions(), 2);
    }
}
