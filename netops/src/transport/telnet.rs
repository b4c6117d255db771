//! Telnet transport.
//!
//! Just enough of RFC 854 to drive a network device CLI: option negotiation
//! is answered once per option (we let the server echo and suppress go-ahead,
//! and refuse everything else), subnegotiations are discarded, and `IAC IAC`
//! is unescaped. Login is a prompt-driven username/password exchange.

use std::collections::HashSet;
use std::time::Duration;

use bytes::{BufMut, BytesMut};
use log::debug;
use regex::bytes::Regex;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::Instant;

use super::config::TransportConfig;
use crate::channel::PatternBuffer;
use crate::channel::patterns::{login_failure_pattern, password_prompt_pattern, username_prompt_pattern};
use crate::error::{ChannelError, Error, Result, TransportError};

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

const OPT_ECHO: u8 = 1;
const OPT_SGA: u8 = 3;

/// Line terminator for the telnet NVT.
pub const TELNET_RETURN: &str = "\r\n";

/// Anything a telnet session can run over.
pub trait TelnetStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> TelnetStream for T {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Data,
    Iac,
    Negotiate(u8),
    Subnegotiation,
    SubnegotiationIac,
}

/// Incremental telnet protocol decoder.
///
/// Splits a raw byte stream into application data and the negotiation
/// replies we owe the server. State survives across reads, so commands split
/// between two TCP segments are handled.
#[derive(Debug)]
pub struct TelnetCodec {
    state: State,
    answered: HashSet<(u8, u8)>,
}

impl TelnetCodec {
    pub fn new() -> Self {
        Self {
            state: State::Data,
            answered: HashSet::new(),
        }
    }

    /// Decode `input`, appending payload bytes to `data` and replies to `replies`.
    pub fn decode(&mut self, mut input: &[u8], data: &mut BytesMut, replies: &mut BytesMut) {
        while !input.is_empty() {
            if matches!(self.state, State::Data) {
                // plain run up to the next IAC or NUL
                let end = memchr::memchr2(IAC, 0, input).unwrap_or(input.len());
                data.put_slice(&input[..end]);
                input = &input[end..];
                if input.is_empty() {
                    break;
                }
            }

            let byte = input[0];
            input = &input[1..];

            self.state = match self.state {
                State::Data => match byte {
                    IAC => State::Iac,
                    0 => State::Data,
                    b => {
                        data.put_u8(b);
                        State::Data
                    }
                },
                State::Iac => match byte {
                    IAC => {
                        data.put_u8(IAC);
                        State::Data
                    }
                    DO | DONT | WILL | WONT => State::Negotiate(byte),
                    SB => State::Subnegotiation,
                    _ => State::Data,
                },
                State::Negotiate(command) => {
                    self.answer(command, byte, replies);
                    State::Data
                }
                State::Subnegotiation => match byte {
                    IAC => State::SubnegotiationIac,
                    _ => State::Subnegotiation,
                },
                State::SubnegotiationIac => match byte {
                    SE => State::Data,
                    _ => State::Subnegotiation,
                },
            };
        }
    }

    fn answer(&mut self, command: u8, option: u8, replies: &mut BytesMut) {
        if !self.answered.insert((command, option)) {
            return;
        }
        let reply = match command {
            WILL if option == OPT_ECHO || option == OPT_SGA => DO,
            WILL => DONT,
            DO => WONT,
            // WONT/DONT need no acknowledgement from a peer that never enabled anything
            _ => return,
        };
        replies.put_slice(&[IAC, reply, option]);
    }

    /// Escape outgoing payload (`IAC` becomes `IAC IAC`).
    pub fn encode(payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(payload.len() + 2);
        for &byte in payload {
            if byte == IAC {
                out.push(IAC);
            }
            out.push(byte);
        }
        out
    }
}

impl Default for TelnetCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Telnet transport over any byte stream (TCP in production).
pub struct TelnetTransport {
    stream: Box<dyn TelnetStream>,
    codec: TelnetCodec,
}

impl TelnetTransport {
    /// Open the TCP connection. Call [`login`](Self::login) next.
    pub async fn connect(config: &TransportConfig) -> Result<Self> {
        debug!("telnet: connecting to {}", config.socket_addr());

        let stream = tokio::time::timeout(
            config.connect_timeout,
            TcpStream::connect((config.host.as_str(), config.port)),
        )
        .await
        .map_err(|_| TransportError::Timeout(config.connect_timeout))?
        .map_err(|source| TransportError::ConnectionFailed {
            host: config.host.clone(),
            port: config.port,
            source,
        })?;

        let _ = stream.set_nodelay(true);

        Ok(Self::from_stream(Box::new(stream)))
    }

    /// Wrap an already-connected stream.
    pub fn from_stream(stream: Box<dyn TelnetStream>) -> Self {
        Self {
            stream,
            codec: TelnetCodec::new(),
        }
    }

    /// Answer login prompts until the device prompt shows up.
    ///
    /// Returns everything read after the last credential was sent, including
    /// the first device prompt, so the caller can seed its own buffer with it.
    pub async fn login(
        &mut self,
        username: &str,
        password: Option<&str>,
        prompt: &Regex,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let username_prompt = username_prompt_pattern();
        let password_prompt = password_prompt_pattern();
        let failure = login_failure_pattern();

        let deadline = Instant::now() + timeout;
        let mut buffer = PatternBuffer::default();
        let mut sent_username = false;
        let mut sent_password = false;

        loop {
            let chunk = match self.read_chunk(deadline, timeout).await {
                Ok(chunk) => chunk,
                Err(Error::Channel(ChannelError::PatternTimeout(_))) => {
                    return Err(TransportError::Timeout(timeout).into());
                }
                Err(e) => return Err(e),
            };
            buffer.extend(&chunk);

            let rejected = || TransportError::AuthenticationFailed {
                user: username.to_string(),
            };

            if (sent_username || sent_password) && buffer.tail_contains(failure) {
                return Err(rejected().into());
            }

            if buffer.tail_contains(password_prompt) {
                let Some(password) = password.filter(|_| !sent_password) else {
                    return Err(rejected().into());
                };
                debug!("telnet: sending password");
                self.write_line(password).await?;
                sent_password = true;
                buffer.clear();
                continue;
            }

            if buffer.tail_contains(username_prompt) {
                if sent_username || username.is_empty() {
                    return Err(rejected().into());
                }
                debug!("telnet: sending username {}", username);
                self.write_line(username).await?;
                sent_username = true;
                buffer.clear();
                continue;
            }

            if buffer.tail_contains(prompt) {
                return Ok(buffer.take());
            }
        }
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        let mut payload = line.as_bytes().to_vec();
        payload.extend_from_slice(TELNET_RETURN.as_bytes());
        self.write(&payload).await
    }

    /// Write payload bytes, escaping `IAC`.
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        let encoded = TelnetCodec::encode(data);
        self.stream
            .write_all(&encoded)
            .await
            .map_err(TransportError::Io)?;
        self.stream.flush().await.map_err(TransportError::Io)?;
        Ok(())
    }

    /// Read until at least one payload byte arrives, answering negotiation on the way.
    pub async fn read_chunk(&mut self, deadline: Instant, timeout: Duration) -> Result<Vec<u8>> {
        let mut raw = [0u8; 4096];
        loop {
            let n = tokio::time::timeout_at(deadline, self.stream.read(&mut raw))
                .await
                .map_err(|_| ChannelError::PatternTimeout(timeout))?
                .map_err(TransportError::Io)?;

            if n == 0 {
                return Err(ChannelError::Closed.into());
            }

            let mut data = BytesMut::with_capacity(n);
            let mut replies = BytesMut::new();
            self.codec.decode(&raw[..n], &mut data, &mut replies);

            if !replies.is_empty() {
                self.stream
                    .write_all(&replies)
                    .await
                    .map_err(TransportError::Io)?;
                self.stream.flush().await.map_err(TransportError::Io)?;
            }

            if !data.is_empty() {
                return Ok(data.to_vec());
            }
        }
    }

    /// Shut the connection down.
    pub async fn close(mut self) -> Result<()> {
        self.stream.shutdown().await.map_err(TransportError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(codec: &mut TelnetCodec, input: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let mut data = BytesMut::new();
        let mut replies = BytesMut::new();
        codec.decode(input, &mut data, &mut replies);
        (data.to_vec(), replies.to_vec())
    }

    #[test]
    fn test_plain_data_passes_through() {
        let mut codec = TelnetCodec::new();
        let (data, replies) = decode(&mut codec, b"router>");
        assert_eq!(data, b"router>");
        assert!(replies.is_empty());
    }

    #[test]
    fn test_negotiation_replies() {
        let mut codec = TelnetCodec::new();
        let input = [IAC, WILL, OPT_ECHO, IAC, WILL, OPT_SGA, IAC, DO, 24, IAC, WILL, 31];
        let (data, replies) = decode(&mut codec, &input);
        assert!(data.is_empty());
        assert_eq!(
            replies,
            vec![IAC, DO, OPT_ECHO, IAC, DO, OPT_SGA, IAC, WONT, 24, IAC, DONT, 31]
        );
    }

    #[test]
    fn test_each_option_answered_once() {
        let mut codec = TelnetCodec::new();
        let (_, first) = decode(&mut codec, &[IAC, DO, 24]);
        let (_, second) = decode(&mut codec, &[IAC, DO, 24]);
        assert_eq!(first, vec![IAC, WONT, 24]);
        assert!(second.is_empty());
    }

    #[test]
    fn test_command_split_across_reads() {
        let mut codec = TelnetCodec::new();
        let (data, replies) = decode(&mut codec, &[b'a', IAC]);
        assert_eq!(data, b"a");
        assert!(replies.is_empty());

        let (data, replies) = decode(&mut codec, &[WILL, OPT_ECHO, b'b']);
        assert_eq!(data, b"b");
        assert_eq!(replies, vec![IAC, DO, OPT_ECHO]);
    }

    #[test]
    fn test_subnegotiation_discarded_and_iac_unescaped() {
        let mut codec = TelnetCodec::new();
        let input = [b'x', IAC, SB, 24, 1, IAC, SE, IAC, IAC, b'y', 0];
        let (data, _) = decode(&mut codec, &input);
        assert_eq!(data, vec![b'x', IAC, b'y']);
    }

    #[test]
    fn test_encode_escapes_iac() {
        assert_eq!(TelnetCodec::encode(&[b'a', IAC, b'b']), vec![b'a', IAC, IAC, b'b']);
        assert_eq!(TelnetCodec::encode(b"show version"), b"show version".to_vec());
    }

    #[tokio::test]
    async fn test_login_sequence() {
        let mock = tokio_test::io::Builder::new()
            .read(&[IAC, WILL, OPT_ECHO])
            .write(&[IAC, DO, OPT_ECHO])
            .read(b"\r\nUser Access Verification\r\n\r\nUsername: ")
            .write(b"admin\r\n")
            .read(b"admin\r\nPassword: ")
            .write(b"secret\r\n")
            .read(b"\r\nedge1>")
            .build();

        let mut transport = TelnetTransport::from_stream(Box::new(mock));
        let prompt = Regex::new(r"(?m)^[\w.\-]+>\s?$").unwrap();
        let leftover = transport
            .login("admin", Some("secret"), &prompt, Duration::from_secs(5))
            .await
            .unwrap();

        assert!(String::from_utf8_lossy(&leftover).ends_with("edge1>"));
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let mock = tokio_test::io::Builder::new()
            .read(b"Username: ")
            .write(b"admin\r\n")
            .read(b"Password: ")
            .write(b"wrong\r\n")
            .read(b"\r\n% Login invalid\r\n\r\n% Authentication failed\r\n")
            .build();

        let mut transport = TelnetTransport::from_stream(Box::new(mock));
        let prompt = Regex::new(r"(?m)^[\w.\-]+>\s?$").unwrap();
        let err = transport
            .login("admin", Some("wrong"), &prompt, Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Transport(TransportError::AuthenticationFailed { .. })
        ));
    }
}
