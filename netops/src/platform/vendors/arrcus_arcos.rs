//! Arrcus ArcOS platform definition.
//!
//! ArcOS is built on ConfD with a J-style CLI: `user@host>` in exec mode,
//! `user@host%` in configuration mode, and a candidate configuration that is
//! activated with `commit`. ConfD reports rejected commits with `Aborted:`.

use crate::platform::{FinalizeStep, PlatformDefinition, PrivilegeLevel};

/// Create the Arrcus ArcOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?mi)^[\w\-.@()/:]{1,63}>\s?$").unwrap();

    let configuration = PrivilegeLevel::new("configuration", r"(?mi)^[\w\-.@()/:]{1,63}%\s?$")
        .unwrap()
        .with_parent("exec")
        .with_escalate("configure")
        .with_deescalate("exit configuration-mode");

    PlatformDefinition::new("arrcus_arcos")
        .with_privilege(exec)
        .with_privilege(configuration)
        .with_default_privilege("exec")
        .with_config_privilege("configuration")
        .with_failure_pattern("is ambiguous")
        .with_failure_pattern("No valid completions")
        .with_failure_pattern("unknown command")
        .with_failure_pattern("syntax error")
        .with_failure_pattern("Aborted:")
        .with_on_open_command("set cli screen-width 511")
        .with_on_open_command("set cli screen-length 0")
        .with_on_open_command("set cli complete-on-space off")
        .with_finalize(FinalizeStep::commit("commit", "configuration"))
}
