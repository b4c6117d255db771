//! Pattern buffer with tail search.
//!
//! Prompt detection only looks at the last N bytes of the accumulated output,
//! which keeps large outputs (full routing tables) cheap to scan.

use std::fmt;

use regex::bytes::Regex;
use vte::{Parser, Perform};

/// Collects printable output from the vte state machine.
///
/// Escape sequences (CSI, OSC, DCS) are consumed by the parser and never
/// reach `print`, which is all the stripping there is.
#[derive(Default)]
struct Printable {
    out: Vec<u8>,
}

impl Perform for Printable {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.out
            .extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.out.push(byte);
        }
    }
}

/// Buffer for accumulating output and searching it for patterns.
pub struct PatternBuffer {
    buffer: Vec<u8>,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,

    /// Parser state persists between chunks so an escape sequence split
    /// across two reads is still removed.
    parser: Parser,
}

impl PatternBuffer {
    /// Create an empty buffer that searches the last `search_depth` bytes.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
            parser: Parser::new(),
        }
    }

    /// Extend the buffer with new data, stripping ANSI escape codes.
    pub fn extend(&mut self, data: &[u8]) {
        let mut printable = Printable::default();
        self.parser.advance(&mut printable, data);
        self.buffer.extend_from_slice(&printable.out);
    }

    /// Whether the pattern matches within the last `search_depth` bytes.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        pattern.is_match(self.tail())
    }

    fn tail(&self) -> &[u8] {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        &self.buffer[start..]
    }

    /// Take the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Drop everything read so far, e.g. once a login prompt is answered.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl fmt::Debug for PatternBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternBuffer")
            .field("len", &self.buffer.len())
            .field("search_depth", &self.search_depth)
            .finish()
    }
}
