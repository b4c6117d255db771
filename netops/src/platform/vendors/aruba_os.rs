//! Aruba OS (mobility controller) platform definition.
//!
//! Prompts carry the controller name in parentheses, and paging can only be
//! disabled from enable mode, so `no paging` runs after the default privilege
//! is reached. The controller expects a bare carriage return as line ending.
//!
//! ```text
//! (aruba-mc) >                     # exec
//! (aruba-mc) #                     # privilege_exec
//! (aruba-mc) (config) #            # configuration
//! (aruba-mc) (config-role) #       # configuration sub-mode
//! ```

use crate::platform::{FinalizeStep, PlatformDefinition, PrivilegeLevel};

/// Create the Aruba AOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?mi)^\([\w.\-@/: ]{1,63}\)\s?>\s?$").unwrap();

    let privilege_exec = PrivilegeLevel::new(
        "privilege_exec",
        r"(?mi)^\([\w.\-@/: ]{1,63}\)\s?#\s?$",
    )
    .unwrap()
    .with_parent("exec")
    .with_escalate("enable")
    .with_deescalate("disable")
    .with_auth(r"(?mi)^password:\s?$")
    .unwrap();

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?mi)^\([\w.\-@/: ]{1,63}\)\s?\(config[\w.\-@/: ]{0,63}\)\s?#\s?$",
    )
    .unwrap()
    .with_parent("privilege_exec")
    // "configure" alone is auto-completed on space, so spell it out
    .with_escalate("configure term")
    .with_deescalate("end");

    PlatformDefinition::new("aruba_os")
        .with_privilege(exec)
        .with_privilege(privilege_exec)
        .with_privilege(configuration)
        .with_default_privilege("privilege_exec")
        .with_config_privilege("configuration")
        .with_failure_pattern("% Invalid input")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("Parse error")
        .with_on_open_command("no paging")
        .with_finalize(FinalizeStep::save("write memory", "privilege_exec"))
        .with_return_char("\r")
}
