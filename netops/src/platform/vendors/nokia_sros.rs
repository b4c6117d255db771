//! Nokia SR OS platform definition (MD-CLI).
//!
//! MD-CLI prompts span two lines: a context line in brackets, then
//! `CPM:user@host#`. Configuration happens in an exclusive candidate that is
//! activated with `commit`.
//!
//! - `exec` - Operational mode
//! - `configuration` - Exclusive config mode at root
//! - `configuration_with_path` - Exclusive config mode at a deeper context
//!
//! # Prompt Examples
//!
//! ```text
//! [/]                                  # exec (line 1)
//! A:admin@router#                      # exec (line 2)
//!
//! (ex)[/]                              # exclusive config at root (line 1)
//! A:admin@router#                      # config (line 2)
//!
//! *(ex)[/configure router "Base"]      # config with path + uncommitted (line 1)
//! A:admin@router#                      # config (line 2)
//! ```
//!
//! # Privilege Graph
//!
//! ```text
//! ┌──────┐  edit-config exclusive  ┌───────────────┐
//! │ exec ├─────────────────────────► configuration │
//! │      │       quit-config       │               │
//! └──────┘◄────────────────────────┴───────────────┘
//!    ▲
//!    │ exit all    ┌─────────────────────────────┐
//!    └─────────────┤ configuration_with_path     │
//!                  └─────────────────────────────┘
//! ```
//!
//! `exit all` from a deeper context actually lands on the config root; the
//! driver re-reads the prompt after every transition and continues from
//! wherever it ended up.
//!
//! Prompt patterns adapted from
//! [scrapli](https://github.com/scrapli/scrapli_community/blob/main/scrapli_community/nokia/sros/nokia_sros.py).

use crate::platform::{FinalizeStep, PlatformDefinition, PrivilegeLevel};

/// Create the Nokia SR OS (MD-CLI) platform definition.
pub fn platform() -> PlatformDefinition {
    // Config prompts share the second line; the (ex)/(ro)/(gl)/(pr) markers
    // on the context line tell them apart.
    let exec = PrivilegeLevel::new(
        "exec",
        r"(?mi)^\[.*\]\r?\n\*?[abcd]:[\w._-]+@[\w\s_.-]+#\s?$",
    )
    .unwrap()
    .with_not_contains("(ex)")
    .with_not_contains("(ro)")
    .with_not_contains("(gl)")
    .with_not_contains("(pr)");

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?mi)^!?\*?\((?:ex|ex:bof)\)\[/?\]\r?\n\*?[abcd]:[\w._-]+@[\w\s_.-]+#\s?$",
    )
    .unwrap()
    .with_parent("exec")
    .with_escalate("edit-config exclusive")
    .with_deescalate("quit-config");

    let configuration_with_path = PrivilegeLevel::new(
        "configuration_with_path",
        r"(?mi)^!?\*?\((?:ex|ex:bof)\)\[(?:\S|\s){2,}\]\r?\n\*?[abcd]:[\w._-]+@[\w\s_.-]+#\s?$",
    )
    .unwrap()
    .with_parent("exec")
    .with_deescalate("exit all");

    PlatformDefinition::new("nokia_sros")
        .with_privilege(exec)
        .with_privilege(configuration)
        .with_privilege(configuration_with_path)
        .with_default_privilege("exec")
        .with_config_privilege("configuration")
        .with_on_open_command("environment command-completion space false")
        .with_on_open_command("environment console width 512")
        .with_on_open_command("environment more false")
        .with_failure_pattern("MINOR:")
        .with_failure_pattern("MAJOR:")
        .with_failure_pattern("CRITICAL:")
        .with_failure_pattern("Error:")
        .with_finalize(FinalizeStep::commit("commit", "configuration"))
        .with_terminal_size(512, 24)
}
