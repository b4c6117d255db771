//! Cisco NX-OS platform definition.
//!
//! Same level layout as IOS. NX-OS also has a `-tcl` privileged prompt, and
//! persists configuration with `copy running-config startup-config`.
//!
//! Prompt patterns are adapted from [scrapli](https://github.com/carlmontanari/scrapli).
//!
//! ```text
//! switch>                  # exec
//! switch#                  # privilege_exec
//! switch-tcl#              # privilege_exec (tclsh)
//! switch(config-if)#       # configuration
//! ```

use crate::platform::{FinalizeStep, PlatformDefinition, PrivilegeLevel};

/// Create the Cisco NX-OS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?mi)^[\w.\-]{1,63}>\s?$").unwrap();

    let privilege_exec = PrivilegeLevel::new("privilege_exec", r"(?mi)^[\w.\-]{1,63}(-tcl)?#\s?$")
        .unwrap()
        .with_parent("exec")
        .with_escalate("enable")
        .with_deescalate("disable")
        .with_auth(r"(?mi)^[pP]assword:\s?$")
        .unwrap();

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?mi)^[\w.\-]{1,63}\(config[\w.\-@/:+]{0,32}\)#\s?$",
    )
    .unwrap()
    .with_parent("privilege_exec")
    .with_escalate("configure terminal")
    .with_deescalate("end");

    PlatformDefinition::new("cisco_nxos")
        .with_privilege(exec)
        .with_privilege(privilege_exec)
        .with_privilege(configuration)
        .with_default_privilege("privilege_exec")
        .with_config_privilege("configuration")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid input detected")
        .with_failure_pattern("% Invalid command at")
        .with_failure_pattern("% Invalid parameter detected")
        .with_failure_pattern("% Permission denied")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 511")
        .with_finalize(FinalizeStep::save(
            "copy running-config startup-config",
            "privilege_exec",
        ))
}
