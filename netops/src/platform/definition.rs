//! Platform definition: everything dialect-specific the driver needs.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use super::VendorBehavior;
use super::privilege_level::PrivilegeLevel;

/// How a dialect makes configuration changes durable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalizeAction {
    /// Activate a staged candidate configuration.
    Commit,
    /// Persist the running configuration to startup storage.
    Save,
}

impl fmt::Display for FinalizeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalizeAction::Commit => f.write_str("commit"),
            FinalizeAction::Save => f.write_str("save"),
        }
    }
}

/// A question the device asks before finishing a command, and our answer.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub pattern: String,
    pub answer: String,
}

/// The command that finalizes a configuration change.
#[derive(Debug, Clone)]
pub struct FinalizeStep {
    pub action: FinalizeAction,

    /// Command to send.
    pub command: String,

    /// Privilege level the command must be sent from.
    pub privilege: String,

    /// Confirmation prompt to answer, if the device asks one.
    pub confirm: Option<Confirmation>,
}

impl FinalizeStep {
    /// Commit with `command` from the `privilege` level.
    pub fn commit(command: impl Into<String>, privilege: impl Into<String>) -> Self {
        Self {
            action: FinalizeAction::Commit,
            command: command.into(),
            privilege: privilege.into(),
            confirm: None,
        }
    }

    /// Save with `command` from the `privilege` level.
    pub fn save(command: impl Into<String>, privilege: impl Into<String>) -> Self {
        Self {
            action: FinalizeAction::Save,
            command: command.into(),
            privilege: privilege.into(),
            confirm: None,
        }
    }

    /// Answer `answer` when the device asks a question matching `pattern`.
    pub fn with_confirmation(mut self, pattern: impl Into<String>, answer: impl Into<String>) -> Self {
        self.confirm = Some(Confirmation {
            pattern: pattern.into(),
            answer: answer.into(),
        });
        self
    }
}

/// Platform definition for one dialect.
#[derive(Clone)]
pub struct PlatformDefinition {
    /// Dialect name (e.g. "cisco_ios", "juniper_junos").
    pub name: String,

    pub privilege_levels: IndexMap<String, PrivilegeLevel>,

    /// Level the session settles in after login.
    pub default_privilege: String,

    /// Level configuration commands are sent from; `None` when the dialect
    /// has no configuration mode.
    pub config_privilege: Option<String>,

    /// Substrings that mark a command as rejected.
    pub failed_when_contains: Vec<String>,

    /// Commands run once the default privilege is reached (paging off etc).
    pub on_open_commands: Vec<String>,

    /// Commit or save step, `None` for dialects without one.
    pub finalize: Option<FinalizeStep>,

    /// Line terminator override; the protocol default is used otherwise.
    pub return_char: Option<String>,

    pub terminal_width: u32,
    pub terminal_height: u32,

    /// Optional vendor-specific output handling.
    pub behavior: Option<Arc<dyn VendorBehavior>>,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            privilege_levels: IndexMap::new(),
            default_privilege: String::new(),
            config_privilege: None,
            failed_when_contains: vec![],
            on_open_commands: vec![],
            finalize: None,
            return_char: None,
            terminal_width: 511,
            terminal_height: 24,
            behavior: None,
        }
    }

    /// Add a privilege level.
    pub fn with_privilege(mut self, level: PrivilegeLevel) -> Self {
        self.privilege_levels.insert(level.name.clone(), level);
        self
    }

    /// Set the default privilege level.
    pub fn with_default_privilege(mut self, name: impl Into<String>) -> Self {
        self.default_privilege = name.into();
        self
    }

    /// Set the privilege level used for configuration.
    pub fn with_config_privilege(mut self, name: impl Into<String>) -> Self {
        self.config_privilege = Some(name.into());
        self
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Set the commit or save step.
    pub fn with_finalize(mut self, step: FinalizeStep) -> Self {
        self.finalize = Some(step);
        self
    }

    /// Override the line terminator sent after each command.
    pub fn with_return_char(mut self, return_char: impl Into<String>) -> Self {
        self.return_char = Some(return_char.into());
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Set vendor behavior.
    pub fn with_behavior(mut self, behavior: Arc<dyn VendorBehavior>) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Get a privilege level by name.
    pub fn get_privilege(&self, name: &str) -> Option<&PrivilegeLevel> {
        self.privilege_levels.get(name)
    }

    /// Check internal consistency: known default/config/finalize levels and
    /// parents that exist.
    pub fn validate(&self) -> Result<(), String> {
        let known = |name: &str| self.privilege_levels.contains_key(name);

        if !known(&self.default_privilege) {
            return Err(format!(
                "{}: default privilege '{}' is not defined",
                self.name, self.default_privilege
            ));
        }
        if let Some(config) = self.config_privilege.as_deref().filter(|c| !known(c)) {
            return Err(format!("{}: config privilege '{}' is not defined", self.name, config));
        }
        if let Some(step) = self.finalize.as_ref().filter(|s| !known(&s.privilege)) {
            return Err(format!(
                "{}: {} privilege '{}' is not defined",
                self.name, step.action, step.privilege
            ));
        }
        for level in self.privilege_levels.values() {
            if let Some(parent) = level.previous_priv.as_deref().filter(|p| !known(p)) {
                return Err(format!(
                    "{}: level '{}' has unknown parent '{}'",
                    self.name, level.name, parent
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PlatformDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformDefinition")
            .field("name", &self.name)
            .field("privilege_levels", &self.privilege_levels)
            .field("default_privilege", &self.default_privilege)
            .field("config_privilege", &self.config_privilege)
            .field("failed_when_contains", &self.failed_when_contains)
            .field("on_open_commands", &self.on_open_commands)
            .field("finalize", &self.finalize)
            .field("return_char", &self.return_char)
            .field(
                "behavior",
                &self.behavior.as_ref().map(|_| "<VendorBehavior>"),
            )
            .finish()
    }
}
