//! HP / H3C Comware platform definition.
//!
//! Comware has a user view (`<host>`) and a system view (`[host]`, with the
//! sub-view appended inside the brackets). `return` goes straight back to the
//! user view from any depth; `save force` writes the configuration without
//! asking for a file name.
//!
//! ```text
//! <H3C>                              # exec (user view)
//! [H3C]                              # configuration (system view)
//! [H3C-GigabitEthernet1/0/1]         # configuration sub-view
//! ```

use crate::platform::{FinalizeStep, PlatformDefinition, PrivilegeLevel};

/// Create the HP Comware platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?m)^<[\w.\-@/:~ ]{1,63}>\s?$").unwrap();

    let configuration = PrivilegeLevel::new("configuration", r"(?m)^\[[\w.\-@/:~ ]{1,63}\]\s?$")
        .unwrap()
        .with_parent("exec")
        .with_escalate("system-view")
        .with_deescalate("return");

    PlatformDefinition::new("hp_comware")
        .with_privilege(exec)
        .with_privilege(configuration)
        .with_default_privilege("exec")
        .with_config_privilege("configuration")
        .with_failure_pattern("% Unrecognized command")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Wrong parameter")
        .with_failure_pattern("% Too many parameters")
        .with_failure_pattern("% Ambiguous command")
        .with_on_open_command("screen-length disable")
        .with_finalize(FinalizeStep::save("save force", "exec"))
}
