//! Huawei VRP platform definitions.
//!
//! Classic VRP applies changes immediately and persists them with `save`,
//! which asks `Are you sure to continue?[Y/N]`. VRPv8 stages changes in a
//! candidate (the system-view prompt gains a `~` or `*` marker) that is
//! activated with `commit`.
//!
//! ```text
//! <HUAWEI>                           # exec (user view)
//! [HUAWEI]                           # configuration (system view)
//! [HUAWEI-GigabitEthernet0/0/1]      # configuration sub-view
//! [~HUAWEI]                          # VRPv8 system view, no pending changes
//! [*HUAWEI-Vlanif10]                 # VRPv8 sub-view with uncommitted changes
//! ```

use crate::platform::{FinalizeStep, PlatformDefinition, PrivilegeLevel};

/// Classic VRP (save model).
pub fn platform() -> PlatformDefinition {
    base("huawei").with_finalize(
        FinalizeStep::save("save", "exec").with_confirmation(r"(?i)\[Y/N\]", "y"),
    )
}

/// VRPv8 (commit model).
pub fn vrpv8_platform() -> PlatformDefinition {
    base("huawei_vrpv8").with_finalize(FinalizeStep::commit("commit", "configuration"))
}

fn base(name: &str) -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?m)^<[~*]?[\w.\-@/: ]{1,63}>\s?$").unwrap();

    let configuration =
        PrivilegeLevel::new("configuration", r"(?m)^\[[~*]?[\w.\-@/: ]{1,63}\]\s?$")
            .unwrap()
            .with_parent("exec")
            .with_escalate("system-view")
            .with_deescalate("return");

    PlatformDefinition::new(name)
        .with_privilege(exec)
        .with_privilege(configuration)
        .with_default_privilege("exec")
        .with_config_privilege("configuration")
        .with_failure_pattern("Error:")
        .with_failure_pattern("Unrecognized command")
        .with_failure_pattern("Incomplete command")
        .with_failure_pattern("Wrong parameter")
        .with_on_open_command("screen-length 0 temporary")
}
