//! Transport layer: SSH (russh) and Telnet.
//!
//! A transport carries one interactive CLI stream. Both variants expose the
//! same small surface so the channel above them does not care which is in use.

pub mod config;
mod ssh;
pub mod telnet;

use std::time::Duration;

use regex::bytes::Regex;
use tokio::time::Instant;

pub use config::{AuthMethod, HostKeyVerification, Protocol, TransportConfig};
pub use ssh::SshTransport;
pub use telnet::TelnetTransport;

use crate::error::Result;

/// A connected, logged-in CLI stream.
pub enum Transport {
    Ssh(SshTransport),
    Telnet(TelnetTransport),
}

impl Transport {
    /// Connect and log in.
    ///
    /// `prompt` matches any device prompt; telnet login uses it to tell when
    /// the credential exchange is over. Returns the transport together with
    /// any output already consumed during login.
    pub async fn connect(config: &TransportConfig, prompt: &Regex) -> Result<(Self, Vec<u8>)> {
        match config.protocol {
            Protocol::Ssh => {
                let transport = SshTransport::connect(config).await?;
                Ok((Transport::Ssh(transport), Vec::new()))
            }
            Protocol::Telnet => {
                let mut transport = TelnetTransport::connect(config).await?;
                let leftover = transport
                    .login(
                        &config.username,
                        config.auth.password(),
                        prompt,
                        config.connect_timeout,
                    )
                    .await?;
                Ok((Transport::Telnet(transport), leftover))
            }
        }
    }

    /// Write raw bytes to the device.
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        match self {
            Transport::Ssh(t) => t.write(data).await,
            Transport::Telnet(t) => t.write(data).await,
        }
    }

    /// Next chunk of output, or `PatternTimeout` once `deadline` passes.
    pub async fn read_chunk(&mut self, deadline: Instant, timeout: Duration) -> Result<Vec<u8>> {
        match self {
            Transport::Ssh(t) => t.read_chunk(deadline, timeout).await,
            Transport::Telnet(t) => t.read_chunk(deadline, timeout).await,
        }
    }

    /// Close the connection.
    pub async fn close(self) -> Result<()> {
        match self {
            Transport::Ssh(t) => t.close().await,
            Transport::Telnet(t) => t.close().await,
        }
    }

    /// Protocol of this transport.
    pub fn protocol(&self) -> Protocol {
        match self {
            Transport::Ssh(_) => Protocol::Ssh,
            Transport::Telnet(_) => Protocol::Telnet,
        }
    }
}
