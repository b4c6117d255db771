//! Scripted connector and session for tests.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::broker::{Connector, Session, SessionBroker};
use crate::driver::{CliSession, Response};
use crate::error::{ChannelError, DriverError, Result, TransportError};
use crate::inventory::DeviceProfile;
use crate::platform::{FinalizeAction, PlatformDefinition};

/// Key used with [`MockConnector::set_reply`] for the commit/save step.
pub const FINALIZE: &str = "<finalize>";

/// What the mock device does with a command.
#[derive(Debug, Clone)]
pub enum Reply {
    Output(String),
    /// Output that the dialect flags as an error.
    Rejected(String),
    Timeout(Duration),
    Disconnect,
    /// Answer after a delay.
    Delay(Duration),
}

#[derive(Default)]
struct State {
    replies: Mutex<HashMap<String, Reply>>,
    refused: Mutex<HashSet<String>>,
    events: Mutex<Vec<String>>,
    live: AtomicUsize,
    max_live: AtomicUsize,
}

impl State {
    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<State>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, command: &str, reply: Reply) -> Self {
        self.set_reply(command, reply);
        self
    }

    pub fn set_reply(&self, command: &str, reply: Reply) {
        self.state
            .replies
            .lock()
            .unwrap()
            .insert(command.to_string(), reply);
    }

    /// Refuse TCP connections for `device`.
    pub fn refuse(self, device: &str) -> Self {
        self.state.refused.lock().unwrap().insert(device.to_string());
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.state.events.lock().unwrap().clone()
    }

    /// Sessions whose connection has not been released yet.
    pub fn live_sessions(&self) -> usize {
        self.state.live.load(Ordering::SeqCst)
    }

    pub fn max_live_sessions(&self) -> usize {
        self.state.max_live.load(Ordering::SeqCst)
    }
}

impl Connector for MockConnector {
    type Session = MockSession;

    async fn connect(&self, profile: &DeviceProfile) -> Result<MockSession> {
        if self.state.refused.lock().unwrap().contains(&profile.name) {
            return Err(TransportError::ConnectionFailed {
                host: profile.hostname.clone(),
                port: profile.port(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            }
            .into());
        }

        let live = self.state.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_live.fetch_max(live, Ordering::SeqCst);
        self.state.record(format!("open {}", profile.name));

        Ok(MockSession {
            device: profile.name.clone(),
            platform: profile.dialect().platform(),
            state: self.state.clone(),
            open: true,
        })
    }
}

pub struct MockSession {
    device: String,
    platform: PlatformDefinition,
    state: Arc<State>,
    open: bool,
}

impl MockSession {
    fn lookup(&self, key: &str) -> Option<Reply> {
        self.state.replies.lock().unwrap().get(key).cloned()
    }

    async fn answer(&self, command: &str, reply: Option<Reply>) -> Result<Response> {
        let response = |output: String| Response::new(command, output.clone(), output, "mock#", Duration::ZERO);

        match reply {
            None => Ok(response(String::new())),
            Some(Reply::Output(output)) => Ok(response(output)),
            Some(Reply::Rejected(output)) => Ok(response(output.clone()).with_failure(output)),
            Some(Reply::Timeout(timeout)) => Err(ChannelError::PatternTimeout(timeout).into()),
            Some(Reply::Disconnect) => Err(ChannelError::Closed.into()),
            Some(Reply::Delay(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(response(String::new()))
            }
        }
    }
}

impl CliSession for MockSession {
    fn dialect(&self) -> &str {
        &self.platform.name
    }

    async fn send_command(&mut self, command: &str) -> Result<Response> {
        if !self.open {
            return Err(DriverError::NotConnected.into());
        }
        self.state.record(format!("send {} {}", self.device, command));
        let reply = self.lookup(command);
        self.answer(command, reply).await
    }

    async fn enter_config_mode(&mut self) -> Result<()> {
        if self.platform.config_privilege.is_none() {
            return Err(DriverError::NoConfigMode {
                platform: self.platform.name.clone(),
            }
            .into());
        }
        self.state.record(format!("configure {}", self.device));
        Ok(())
    }

    fn finalize_action(&self) -> Option<FinalizeAction> {
        self.platform.finalize.as_ref().map(|s| s.action)
    }

    async fn finalize(&mut self) -> Result<Response> {
        let step = self.platform.finalize.clone().ok_or_else(|| DriverError::NoFinalizeAction {
            platform: self.platform.name.clone(),
        })?;
        self.state.record(format!("{} {}", step.action, self.device));
        let reply = self.lookup(FINALIZE);
        self.answer(&step.command, reply).await
    }

    async fn close(&mut self) -> Result<()> {
        if self.open {
            self.open = false;
            self.state.live.fetch_sub(1, Ordering::SeqCst);
            self.state.record(format!("close {}", self.device));
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        if self.open {
            self.state.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Open a mock session for a device of the given type.
pub async fn open_session(name: &str, device_type: &str) -> (MockConnector, Session<MockSession>) {
    let profile = DeviceProfile {
        name: name.to_string(),
        hostname: format!("{name}.lab"),
        device_type: device_type.parse().unwrap(),
        username: Some("rouser".to_string()),
        password: None,
        port: None,
        secret: None,
        key_file: None,
        connect_timeout: None,
        command_timeout: None,
        host_key_verification: None,
    };

    let connector = MockConnector::new();
    let broker = SessionBroker::with_connector(connector.clone());
    let session = broker.open(&profile).await.unwrap();
    (connector, session)
}
