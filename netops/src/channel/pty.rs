//! PTY channel: a transport plus a pattern buffer.

use std::time::Duration;

use log::debug;
use regex::bytes::Regex;
use tokio::time::Instant;

use super::buffer::PatternBuffer;
use crate::error::Result;
use crate::transport::{Protocol, Transport};
use crate::transport::telnet::TELNET_RETURN;

/// Configuration for PTY channel behavior.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    /// Search depth for pattern matching.
    pub search_depth: usize,

    /// Line terminator appended by [`PtyChannel::send`].
    pub return_char: String,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            search_depth: 1000,
            return_char: "\n".to_string(),
        }
    }
}

impl PtyConfig {
    /// Use the line terminator the protocol expects.
    pub fn for_protocol(mut self, protocol: Protocol) -> Self {
        if protocol == Protocol::Telnet {
            self.return_char = TELNET_RETURN.to_string();
        }
        self
    }
}

/// Interactive channel to a device: send lines, read up to a pattern.
pub struct PtyChannel {
    transport: Transport,
    buffer: PatternBuffer,
    config: PtyConfig,
}

impl PtyChannel {
    /// Wrap a connected transport.
    pub fn new(transport: Transport, config: PtyConfig) -> Self {
        Self {
            transport,
            buffer: PatternBuffer::new(config.search_depth),
            config,
        }
    }

    /// Send `line` followed by the configured return character.
    pub async fn send(&mut self, line: &str) -> Result<()> {
        debug!("channel: sending {:?}", line);
        let mut payload = Vec::with_capacity(line.len() + self.config.return_char.len());
        payload.extend_from_slice(line.as_bytes());
        payload.extend_from_slice(self.config.return_char.as_bytes());
        self.transport.write(&payload).await
    }

    /// Read until `pattern` matches the buffer tail, returning everything read.
    ///
    /// Fails with `PatternTimeout` when nothing matches within `timeout`.
    pub async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<Vec<u8>> {
        let deadline = Instant::now() + timeout;

        while !self.buffer.tail_contains(pattern) {
            let chunk = self.transport.read_chunk(deadline, timeout).await?;
            self.buffer.extend(&chunk);
        }

        Ok(self.buffer.take())
    }

    /// Seed the buffer with output consumed elsewhere (telnet login).
    pub fn extend_buffer(&mut self, data: &[u8]) {
        self.buffer.extend(data);
    }

    /// Close the underlying transport.
    pub async fn close(self) -> Result<()> {
        self.transport.close().await
    }
}
