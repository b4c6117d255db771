//! Privilege level definition.

use regex::bytes::Regex;

/// A CLI mode identified by its prompt.
///
/// Levels form a tree through `previous_priv`; the driver walks it in both
/// directions using the escalate command of the child and the de-escalate
/// command of the level being left.
#[derive(Debug, Clone)]
pub struct PrivilegeLevel {
    /// Name of this level (e.g. "exec", "privilege_exec", "configuration").
    pub name: String,

    /// Prompt pattern for this level.
    pub pattern: Regex,

    /// Parent level, `None` for a root.
    pub previous_priv: Option<String>,

    /// Command that enters this level from the parent.
    pub escalate_command: Option<String>,

    /// Command that leaves this level for the parent.
    pub deescalate_command: Option<String>,

    /// Password prompt the device may show while escalating.
    pub escalate_prompt: Option<Regex>,

    /// Substrings that rule a prompt out even when `pattern` matches.
    pub not_contains: Vec<String>,
}

impl PrivilegeLevel {
    /// Create a new privilege level with minimal required fields.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            previous_priv: None,
            escalate_command: None,
            deescalate_command: None,
            escalate_prompt: None,
            not_contains: vec![],
        })
    }

    /// Set the parent privilege level.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.previous_priv = Some(parent.into());
        self
    }

    /// Set the escalation command.
    pub fn with_escalate(mut self, command: impl Into<String>) -> Self {
        self.escalate_command = Some(command.into());
        self
    }

    /// Set the de-escalation command.
    pub fn with_deescalate(mut self, command: impl Into<String>) -> Self {
        self.deescalate_command = Some(command.into());
        self
    }

    /// Escalation may ask for a password matching `prompt_pattern`.
    pub fn with_auth(mut self, prompt_pattern: &str) -> Result<Self, regex::Error> {
        self.escalate_prompt = Some(Regex::new(prompt_pattern)?);
        Ok(self)
    }

    /// Add a not_contains pattern.
    pub fn with_not_contains(mut self, pattern: impl Into<String>) -> Self {
        self.not_contains.push(pattern.into());
        self
    }

    /// Whether `prompt` belongs to this level.
    pub fn matches(&self, prompt: &str) -> bool {
        if self.not_contains.iter().any(|nc| prompt.contains(nc.as_str())) {
            return false;
        }
        self.pattern.is_match(prompt.as_bytes())
    }
}
