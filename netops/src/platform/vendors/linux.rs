//! Linux platform definition.
//!
//! Standard shells with `$` (user) and `#` (root) prompts. There is no
//! configuration mode, so configuration batches are refused for this dialect.
//!
//! Both prompts must end the buffer: shell output is full of lines ending in
//! `#` or `$` (markdown headings, shell comments).

use crate::platform::{PlatformDefinition, PrivilegeLevel};

/// Create the Linux platform definition.
pub fn platform() -> PlatformDefinition {
    let user = PrivilegeLevel::new("user", r"(?m)^[^\r\n]*[$][ \t]?\z").unwrap();

    let root = PrivilegeLevel::new("root", r"(?m)^[^\r\n]*[#][ \t]?\z")
        .unwrap()
        .with_parent("user")
        .with_escalate("sudo -i")
        .with_deescalate("exit")
        .with_auth(r"(?mi)password[^:\n]*:\s?$")
        .unwrap();

    PlatformDefinition::new("linux")
        .with_privilege(user)
        .with_privilege(root)
        .with_default_privilege("user")
        .with_failure_pattern("command not found")
        .with_failure_pattern("No such file or directory")
        .with_failure_pattern("Permission denied")
        .with_failure_pattern("Operation not permitted")
        .with_terminal_size(511, 24)
}
