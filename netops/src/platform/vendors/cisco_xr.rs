//! Cisco IOS-XR platform definition.
//!
//! XR logs straight into privileged mode and uses a candidate configuration
//! that is activated with `commit`.
//!
//! ```text
//! RP/0/RP0/CPU0:xr1#                 # privilege_exec
//! RP/0/RP0/CPU0:xr1(config)#         # configuration
//! RP/0/RP0/CPU0:xr1(config-if)#      # configuration sub-mode
//! ```

use crate::platform::{FinalizeStep, PlatformDefinition, PrivilegeLevel};

/// Create the Cisco IOS-XR platform definition.
pub fn platform() -> PlatformDefinition {
    let privilege_exec = PrivilegeLevel::new("privilege_exec", r"(?mi)^[\w.\-@/:]{1,63}#\s?$").unwrap();

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?mi)^[\w.\-@/:]{1,63}\(config[\w.\-@/:]{0,32}\)#\s?$",
    )
    .unwrap()
    .with_parent("privilege_exec")
    .with_escalate("configure terminal")
    .with_deescalate("end");

    PlatformDefinition::new("cisco_xr")
        .with_privilege(privilege_exec)
        .with_privilege(configuration)
        .with_default_privilege("privilege_exec")
        .with_config_privilege("configuration")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid input detected")
        .with_failure_pattern("% Unknown command")
        .with_failure_pattern("% Failed to commit")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 512")
        .with_finalize(FinalizeStep::commit("commit", "configuration"))
}
