//! Builder for creating device drivers.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::generic::GenericDriver;
use crate::error::Result;
use crate::inventory::DeviceProfile;
use crate::platform::Dialect;
use crate::transport::{AuthMethod, HostKeyVerification, Protocol, TransportConfig};

/// Builder for constructing device drivers.
///
/// # Example
///
/// ```rust,no_run
/// use netops::driver::{CliSession, DriverBuilder};
/// use netops::platform::Dialect;
///
/// # async fn example() -> Result<(), netops::Error> {
/// let mut driver = DriverBuilder::new("192.168.1.1", Dialect::CiscoIos)
///     .username("admin")
///     .password("secret")
///     .build()?;
///
/// driver.open().await?;
/// let response = driver.send_command("show version").await?;
/// println!("{}", response.result);
/// driver.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct DriverBuilder {
    config: TransportConfig,
    dialect: Dialect,
    command_timeout: Duration,
    enable_secret: Option<SecretString>,
}

impl DriverBuilder {
    /// Create a new driver builder for the specified host, over SSH.
    pub fn new(host: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            config: TransportConfig {
                host: host.into(),
                port: Protocol::Ssh.default_port(),
                username: String::new(),
                auth: AuthMethod::None,
                protocol: Protocol::Ssh,
                connect_timeout: Duration::from_secs(10),
                terminal_width: 511,
                terminal_height: 24,
                host_key_verification: HostKeyVerification::default(),
                known_hosts_path: None,
            },
            dialect,
            command_timeout: Duration::from_secs(60),
            enable_secret: None,
        }
    }

    /// Builder preloaded with everything a device profile specifies.
    pub fn from_profile(profile: &DeviceProfile) -> Self {
        Self {
            config: profile.transport_config(),
            dialect: profile.dialect(),
            command_timeout: profile.command_timeout(),
            enable_secret: profile.enable_secret().cloned(),
        }
    }

    /// Switch transport; resets the port to the protocol default.
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.config.protocol = protocol;
        self.config.port = protocol.default_port();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the login username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    /// Use password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    /// Use public-key authentication with the key at `key_path`.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.config.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        };
        self
    }

    /// Password sent when escalation asks for one.
    pub fn enable_secret(mut self, secret: impl Into<String>) -> Self {
        self.enable_secret = Some(SecretString::from(secret.into()));
        self
    }

    /// Set the timeout for connecting and logging in.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Bound on waiting for each command's prompt.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set how SSH host keys are checked.
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.config.host_key_verification = mode;
        self
    }

    /// Use a known_hosts file other than `~/.ssh/known_hosts`.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.known_hosts_path = Some(path.into());
        self
    }

    /// Build the driver.
    ///
    /// This creates the driver but does not connect. Call `open()` on the
    /// returned driver to establish the connection.
    pub fn build(self) -> Result<GenericDriver> {
        let platform = self.dialect.platform();

        let mut config = self.config;
        config.terminal_width = platform.terminal_width;
        config.terminal_height = platform.terminal_height;

        Ok(GenericDriver::new(config, platform)?
            .with_timeout(self.command_timeout)
            .with_enable_secret(self.enable_secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::CliSession;

    #[test]
    fn test_builder_defaults() {
        let driver = DriverBuilder::new("10.0.0.1", Dialect::AristaEos)
            .username("admin")
            .password("pw")
            .build()
            .unwrap();

        assert_eq!(driver.host(), "10.0.0.1");
        assert_eq!(driver.dialect(), "arista_eos");
        assert!(!driver.is_open());
    }

    #[test]
    fn test_telnet_switches_port() {
        let builder = DriverBuilder::new("10.0.0.1", Dialect::CiscoIos).protocol(Protocol::Telnet);
        assert_eq!(builder.config.port, 23);

        let builder = builder.port(2323);
        assert_eq!(builder.config.port, 2323);
    }
}
