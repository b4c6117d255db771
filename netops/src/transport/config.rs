//! Transport connection configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

/// Wire protocol used to reach the device CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Ssh,
    Telnet,
}

impl Protocol {
    /// Port used when the inventory does not set one.
    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Ssh => 22,
            Protocol::Telnet => 23,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Ssh => f.write_str("ssh"),
            Protocol::Telnet => f.write_str("telnet"),
        }
    }
}

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys.
    Strict,

    /// Accept and learn unknown keys, reject changed keys.
    #[default]
    AcceptNew,

    /// Accept all keys without checking. Lab use only.
    Disabled,
}

impl FromStr for HostKeyVerification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" | "yes" => Ok(Self::Strict),
            "accept-new" | "accept_new" => Ok(Self::AcceptNew),
            "disabled" | "no" | "off" => Ok(Self::Disabled),
            other => Err(format!(
                "unknown host_key_verification '{other}' (expected strict, accept-new or disabled)"
            )),
        }
    }
}

/// Authentication method for the login.
#[derive(Clone)]
pub enum AuthMethod {
    /// No credentials; SSH `none` auth or a telnet line without login prompts.
    None,

    /// Password authentication.
    Password(SecretString),

    /// SSH private key authentication.
    PrivateKey {
        /// Path to the private key file.
        path: PathBuf,
        /// Optional passphrase for encrypted keys.
        passphrase: Option<SecretString>,
    },
}

impl AuthMethod {
    /// The password, when password auth is in use.
    pub fn password(&self) -> Option<&str> {
        match self {
            AuthMethod::Password(p) => Some(p.expose_secret()),
            _ => None,
        }
    }
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::None => f.write_str("None"),
            AuthMethod::Password(_) => f.write_str("Password(<redacted>)"),
            AuthMethod::PrivateKey { path, .. } => f
                .debug_struct("PrivateKey")
                .field("path", path)
                .finish_non_exhaustive(),
        }
    }
}

/// Everything needed to reach and log in to a device.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// TCP port.
    pub port: u16,

    /// Username for authentication. Empty means "not configured".
    pub username: String,

    /// Authentication method.
    pub auth: AuthMethod,

    /// SSH or Telnet.
    pub protocol: Protocol,

    /// Bound on TCP connect, handshake and login.
    pub connect_timeout: Duration,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,

    /// Host key verification mode (SSH only).
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file; `None` uses `~/.ssh/known_hosts`.
    pub known_hosts_path: Option<PathBuf>,
}

impl TransportConfig {
    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports() {
        assert_eq!(Protocol::Ssh.default_port(), 22);
        assert_eq!(Protocol::Telnet.default_port(), 23);
    }

    #[test]
    fn test_host_key_verification_parse() {
        assert_eq!(
            "strict".parse::<HostKeyVerification>().unwrap(),
            HostKeyVerification::Strict
        );
        assert_eq!(
            "Accept-New".parse::<HostKeyVerification>().unwrap(),
            HostKeyVerification::AcceptNew
        );
        assert_eq!(
            "disabled".parse::<HostKeyVerification>().unwrap(),
            HostKeyVerification::Disabled
        );
        assert!("sometimes".parse::<HostKeyVerification>().is_err());
    }

    #[test]
    fn test_auth_debug_redacts_password() {
        let auth = AuthMethod::Password(SecretString::from("hunter2".to_string()));
        let rendered = format!("{:?}", auth);
        assert!(!rendered.contains("hunter2"));
        assert_eq!(auth.password(), Some("hunter2"));
    }
}
