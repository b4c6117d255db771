//! Channel layer: output buffering, ANSI stripping and prompt detection.

mod buffer;
pub mod patterns;
mod pty;

pub use buffer::PatternBuffer;
pub use pty::{PtyChannel, PtyConfig};
