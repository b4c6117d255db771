//! Juniper JUNOS platform definition.
//!
//! Privilege levels:
//! - `exec` - Operational mode with `>` prompt
//! - `configuration` - Configuration mode with `#` prompt
//!
//! Candidate configuration model: changes are activated with `commit` from
//! configuration mode.
//!
//! Prompt patterns are adapted from [scrapli](https://github.com/carlmontanari/scrapli).
//!
//! # Prompt Examples
//!
//! ```text
//! user@router>              # exec mode
//! {master:0}                # routing-engine indicator (separate line)
//! user@router>              # exec prompt on next line
//! [edit]                    # config context (separate line)
//! user@router#              # configuration mode
//! ```
//!
//! # Privilege Graph
//!
//! ```text
//! ┌──────┐  configure   ┌───────────────┐
//! │ exec ├──────────────► configuration │
//! │  >   │    exit      │      #        │
//! └──────┘◄─────────────┴───────────────┘
//!     exit configuration-mode
//! ```

use std::sync::Arc;

use crate::platform::{FinalizeStep, PlatformDefinition, PrivilegeLevel, VendorBehavior};

/// Create the Juniper JUNOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new(
        "exec",
        r"(?mi)^(\{\w+(:(\w+)?\d)?\}\r?\n)?[\w\-@()/:\.]{1,63}>\s?$",
    )
    .unwrap();

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?mi)^(\{\w+(:(\w+)?\d)?\}\[edit\]\r?\n)?[\w\-@()/:\.]{1,63}#\s?$",
    )
    .unwrap()
    .with_parent("exec")
    .with_escalate("configure")
    .with_deescalate("exit configuration-mode");

    PlatformDefinition::new("juniper_junos")
        .with_privilege(exec)
        .with_privilege(configuration)
        .with_default_privilege("exec")
        .with_config_privilege("configuration")
        .with_failure_pattern("unknown command")
        .with_failure_pattern("syntax error")
        .with_failure_pattern("error:")
        .with_failure_pattern("missing argument")
        .with_failure_pattern("invalid value")
        .with_failure_pattern("is ambiguous")
        .with_failure_pattern("No valid completions")
        .with_failure_pattern("missing mandatory argument")
        .with_failure_pattern("invalid numeric value")
        .with_on_open_command("set cli screen-length 0")
        .with_on_open_command("set cli screen-width 511")
        .with_finalize(FinalizeStep::commit("commit", "configuration"))
        .with_terminal_size(511, 24)
        .with_behavior(Arc::new(JuniperBehavior))
}

/// Drops the `[edit ...]` context lines JUNOS prints in configuration mode.
pub struct JuniperBehavior;

impl VendorBehavior for JuniperBehavior {
    fn post_process_output(&self, output: &str) -> String {
        output
            .lines()
            .filter(|line| !line.trim().starts_with("[edit"))
            .collect::<Vec<_>>()
            .join("\n")
            .trim_end()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_prompt_match() {
        let platform = platform();
        let exec = platform.get_privilege("exec").unwrap();

        assert!(exec.pattern.is_match(b"admin@mx960>"));
        assert!(exec.pattern.is_match(b"root@srx300> "));
        assert!(exec.pattern.is_match(b"{master:0}\nuser@router> "));
        assert!(exec.pattern.is_match(b"user@router.lab>"));

        assert!(!exec.pattern.is_match(b"user@router# "));
        assert!(!exec.pattern.is_match(b"user@router% "));
    }

    #[test]
    fn test_configuration_prompt_match() {
        let platform = platform();
        let config = platform.get_privilege("configuration").unwrap();

        assert!(config.pattern.is_match(b"user@router#"));
        assert!(config.pattern.is_match(b"[edit]\nuser@router# "));
        assert!(config.pattern.is_match(b"{master:0}[edit]\nuser@router# "));

        assert!(!config.pattern.is_match(b"user@router> "));
    }

    #[test]
    fn test_commit_from_configuration() {
        let platform = platform();
        let step = platform.finalize.unwrap();
        assert_eq!(step.command, "commit");
        assert_eq!(step.privilege, "configuration");
        assert!(step.confirm.is_none());
    }

    fn clean(raw: &str, command: &str) -> String {
        JuniperBehavior.post_process_output(&JuniperBehavior.normalize_output(raw, command))
    }

    #[test]
    fn test_edit_lines_removed() {
        let raw = "set system host-name qfx1\r\n\r\n[edit]\r\n";
        let out = clean(raw, "set system host-name qfx1");
        assert_eq!(out, "");

        let raw = "show | compare\r\n[edit system]\r\n-  host-name old;\r\n+  host-name qfx1;\r\n\r\n[edit]\r\n";
        let out = clean(raw, "show | compare");
        assert_eq!(out, "-  host-name old;\n+  host-name qfx1;");
    }
}
