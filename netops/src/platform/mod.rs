//! Platform definitions for multi-vendor support.
//!
//! A [`Dialect`] names a vendor CLI; its [`PlatformDefinition`] carries the
//! prompt patterns, privilege graph, failure strings, paging commands and the
//! commit-or-save step. Output quirks live behind [`VendorBehavior`].

mod definition;
mod dialect;
mod privilege_level;
pub mod vendors;

pub use definition::{Confirmation, FinalizeAction, FinalizeStep, PlatformDefinition};
pub use dialect::{DeviceType, Dialect};
pub use privilege_level::PrivilegeLevel;

/// Vendor-specific output handling.
///
/// Every method has a default, so a vendor only overrides what differs.
pub trait VendorBehavior: Send + Sync {
    /// Turn the text between sending `command` and the next prompt into the
    /// command's output. The default drops the echoed command line.
    fn normalize_output(&self, raw: &str, command: &str) -> String {
        strip_echo(raw, command)
    }

    /// Final cleanup after normalization.
    fn post_process_output(&self, output: &str) -> String {
        output.to_string()
    }

    /// Vendor-specific rejection detection beyond `failed_when_contains`.
    fn detect_failure(&self, _output: &str) -> Option<String> {
        None
    }
}

/// Behavior used by dialects without quirks.
pub struct DefaultBehavior;

impl VendorBehavior for DefaultBehavior {}

/// Normalize line endings, then drop the echoed command and surrounding blank lines.
pub fn strip_echo(raw: &str, command: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "");
    let command = command.trim();

    let body = match text.split_once('\n') {
        Some((first, rest)) if !command.is_empty() && first.trim_end().ends_with(command) => rest,
        None if !command.is_empty() && text.trim_end().ends_with(command) => "",
        _ => text.as_str(),
    };

    body.trim_start_matches('\n').trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_echo() {
        let raw = "show version\r\nCisco IOS Software\r\nuptime is 1 day\r\n";
        assert_eq!(
            strip_echo(raw, "show version"),
            "Cisco IOS Software\nuptime is 1 day"
        );
    }

    #[test]
    fn test_strip_echo_without_echo() {
        assert_eq!(strip_echo("line one\nline two\n", "show x"), "line one\nline two");
    }

    #[test]
    fn test_strip_echo_only_echo() {
        assert_eq!(strip_echo("terminal length 0\r\n", "terminal length 0"), "");
        assert_eq!(strip_echo("terminal length 0", "terminal length 0"), "");
    }

    #[test]
    fn test_default_behavior() {
        let behavior = DefaultBehavior;
        assert_eq!(behavior.normalize_output("ls\n  a  b\n", "ls"), "  a  b");
        assert_eq!(behavior.post_process_output("x"), "x");
        assert!(behavior.detect_failure("anything").is_none());
    }
}
