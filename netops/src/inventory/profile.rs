//! Resolved connection parameters for one device.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::platform::{DeviceType, Dialect};
use crate::transport::{AuthMethod, HostKeyVerification, Protocol, TransportConfig};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// One inventory entry after default inheritance. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    /// Section name in the inventory.
    pub name: String,

    pub hostname: String,

    pub device_type: DeviceType,

    pub username: Option<String>,

    pub password: Option<SecretString>,

    /// Explicit port; see [`DeviceProfile::port`] for the effective one.
    pub port: Option<u16>,

    /// Enable-mode password.
    pub secret: Option<SecretString>,

    /// Private key for SSH public-key auth.
    pub key_file: Option<PathBuf>,

    pub connect_timeout: Option<Duration>,

    pub command_timeout: Option<Duration>,

    pub host_key_verification: Option<HostKeyVerification>,
}

impl DeviceProfile {
    /// CLI dialect, without the transport suffix.
    pub fn dialect(&self) -> Dialect {
        self.device_type.dialect
    }

    /// Telnet for `_telnet` device types, SSH otherwise.
    pub fn protocol(&self) -> Protocol {
        self.device_type.protocol
    }

    /// Configured port, else 22 for SSH and 23 for Telnet.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.protocol().default_port())
    }

    /// Password for escalation prompts; falls back to the login password.
    pub fn enable_secret(&self) -> Option<&SecretString> {
        self.secret.as_ref().or(self.password.as_ref())
    }

    /// Configured connect timeout, 10 seconds by default.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT)
    }

    /// Configured command timeout, 60 seconds by default.
    pub fn command_timeout(&self) -> Duration {
        self.command_timeout.unwrap_or(DEFAULT_COMMAND_TIMEOUT)
    }

    /// Transport settings for this device. A key file takes precedence over
    /// the password for SSH login.
    pub fn transport_config(&self) -> TransportConfig {
        let auth = match (&self.key_file, &self.password) {
            (Some(path), _) if self.protocol() == Protocol::Ssh => AuthMethod::PrivateKey {
                path: path.clone(),
                passphrase: None,
            },
            (_, Some(password)) => AuthMethod::Password(password.clone()),
            _ => AuthMethod::None,
        };

        TransportConfig {
            host: self.hostname.clone(),
            port: self.port(),
            username: self.username.clone().unwrap_or_default(),
            auth,
            protocol: self.protocol(),
            connect_timeout: self.connect_timeout(),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: self.host_key_verification.unwrap_or_default(),
            known_hosts_path: None,
        }
    }
}
