//! Error types for netops.

use std::fmt;
use std::io;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Main error type for netops operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH / Telnet transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Platform/dialect errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Device inventory errors
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

/// Transport layer errors (TCP connection, SSH handshake, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// The server presented a key that differs from the known_hosts entry
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Strict verification is on and the host is not in known_hosts
    #[error("Host key for {host}:{port} is not in known_hosts")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Telnet negotiation or login error
    #[error("Telnet error: {0}")]
    Telnet(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors (pattern matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Failed to open PTY channel
    #[error("Failed to open PTY channel")]
    PtyOpenFailed,

    /// Pattern matching timed out
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Driver layer errors (command execution, privilege escalation).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Driver not connected
    #[error("Driver not connected - call open() first")]
    NotConnected,

    /// Driver already connected
    #[error("Driver already connected")]
    AlreadyConnected,

    /// Command execution failed
    #[error("Command failed: {message}")]
    CommandFailed { message: String },

    /// Failed to acquire target privilege level
    #[error("Failed to acquire privilege level '{target}'")]
    PrivilegeAcquisitionFailed { target: String },

    /// Invalid configuration in the driver builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Unknown privilege level detected
    #[error("Unknown privilege level from prompt: '{prompt}'")]
    UnknownPrivilege { prompt: String },

    /// No path found between privilege levels
    #[error("No path from privilege '{from}' to '{to}'")]
    NoPrivilegePath { from: String, to: String },

    /// The dialect has no configuration mode
    #[error("Platform '{platform}' has no configuration mode")]
    NoConfigMode { platform: String },

    /// The dialect defines no commit or save step
    #[error("Platform '{platform}' has no commit or save action")]
    NoFinalizeAction { platform: String },
}

/// Platform/dialect definition errors.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Invalid platform definition
    #[error("Invalid platform definition: {message}")]
    InvalidDefinition { message: String },

    /// The device type does not name a supported dialect
    #[error("Unsupported device type '{name}'")]
    UnknownPlatform { name: String },
}

/// Device inventory errors.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// The inventory file could not be read
    #[error("Failed to read inventory '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The document is not valid TOML
    #[error("Failed to parse inventory: {0}")]
    Parse(#[from] toml::de::Error),

    /// A device section failed validation after default inheritance
    #[error("Invalid device config for '{device}': {message}")]
    InvalidDeviceConfig { device: String, message: String },

    /// The requested device is not in the inventory
    #[error("Unknown device '{name}'")]
    UnknownDevice { name: String },
}

/// Why a session could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectFailureReason {
    /// Nothing answered on the address, or the connection was refused
    Unreachable,
    /// Connect, login or the first prompt took too long
    Timeout,
    AuthenticationRejected,
    HostKeyRejected,
    UnsupportedDialect,
    /// Connected, but the CLI session could not be prepared
    SessionSetup,
}

impl ConnectFailureReason {
    /// Pick the reason reported for a failed connect.
    pub fn classify(error: &Error) -> Self {
        match error {
            Error::Transport(TransportError::ConnectionFailed { .. }) => Self::Unreachable,
            Error::Transport(TransportError::Io(e))
                if matches!(
                    e.kind(),
                    io::ErrorKind::ConnectionRefused | io::ErrorKind::AddrNotAvailable
                ) =>
            {
                Self::Unreachable
            }
            Error::Transport(TransportError::Timeout(_))
            | Error::Channel(ChannelError::PatternTimeout(_)) => Self::Timeout,
            Error::Transport(TransportError::AuthenticationFailed { .. })
            | Error::Transport(TransportError::Key(_)) => Self::AuthenticationRejected,
            Error::Transport(TransportError::HostKeyChanged { .. })
            | Error::Transport(TransportError::HostKeyUnknown { .. })
            | Error::Transport(TransportError::KnownHosts(_)) => Self::HostKeyRejected,
            Error::Platform(_) => Self::UnsupportedDialect,
            _ => Self::SessionSetup,
        }
    }
}

impl fmt::Display for ConnectFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unreachable => "unreachable",
            Self::Timeout => "timeout",
            Self::AuthenticationRejected => "authentication_rejected",
            Self::HostKeyRejected => "host_key_rejected",
            Self::UnsupportedDialect => "unsupported_dialect",
            Self::SessionSetup => "session_setup",
        };
        f.write_str(s)
    }
}

/// A session to a device could not be opened.
#[derive(Error, Debug)]
#[error("Cannot connect to {device} ({host}:{port}): {reason}: {source}")]
pub struct ConnectError {
    pub device: String,
    pub host: String,
    pub port: u16,
    pub reason: ConnectFailureReason,
    #[source]
    pub source: Error,
}

/// Failure of a brokered operation.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// The session opened but a step outside the command batch failed
    #[error("Session to {device} failed: {source}")]
    Session {
        device: String,
        #[source]
        source: Error,
    },
}

/// Result type alias using netops' Error.
pub type Result<T> = std::result::Result<T, Error>;
