//! Interactive command support for prompts that need an answer.
//!
//! Some finalization commands ask before doing anything, e.g. Huawei `save`
//! prints `Are you sure to continue?[Y/N]`. A sequence of
//! [`InteractiveEvent`]s sends each input and waits for its pattern before
//! moving on.

use std::time::Duration;

use regex::bytes::Regex;

/// One input to send and the pattern that ends its output.
#[derive(Debug, Clone)]
pub struct InteractiveEvent {
    pub input: String,

    pub pattern: Regex,

    /// Keep the input out of logs and step records (passwords).
    pub hidden: bool,

    /// Timeout override for this event.
    pub timeout: Option<Duration>,
}

impl InteractiveEvent {
    /// Create an event that sends `input` and waits for `pattern`.
    pub fn new(input: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::with_pattern(input, Regex::new(pattern)?))
    }

    /// Like [`InteractiveEvent::new`] with a compiled pattern.
    pub fn with_pattern(input: impl Into<String>, pattern: Regex) -> Self {
        Self {
            input: input.into(),
            pattern,
            hidden: false,
            timeout: None,
        }
    }

    /// Mask the input in logs and results (passwords).
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Override the driver timeout for this step.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Outcome of an interactive sequence.
#[derive(Debug, Clone)]
pub struct InteractiveResult {
    pub steps: Vec<InteractiveStep>,
    pub elapsed: Duration,
    pub failed: bool,
}

impl InteractiveResult {
    /// Create a result from completed steps.
    pub fn new(steps: Vec<InteractiveStep>, elapsed: Duration) -> Self {
        let failed = steps.iter().any(|s| s.failure_message.is_some());
        Self {
            steps,
            elapsed,
            failed,
        }
    }

    /// Outputs of all steps joined by newlines, empty ones skipped.
    pub fn full_output(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.output.as_str())
            .filter(|o| !o.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// First failure message of any step.
    pub fn failure_message(&self) -> Option<&str> {
        self.steps.iter().find_map(|s| s.failure_message.as_deref())
    }
}

/// One step of an interactive sequence.
#[derive(Debug, Clone)]
pub struct InteractiveStep {
    /// Input sent, masked when hidden.
    pub input: String,
    pub output: String,
    pub raw_output: String,
    /// Device prompt that ended the step, empty if the step's own pattern did.
    pub prompt: String,
    pub failure_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(input: &str, output: &str, failure: Option<&str>) -> InteractiveStep {
        InteractiveStep {
            input: input.to_string(),
            output: output.to_string(),
            raw_output: output.to_string(),
            prompt: String::new(),
            failure_message: failure.map(str::to_string),
        }
    }

    #[test]
    fn test_event_builders() {
        let event = InteractiveEvent::new("save", r"\[Y/N\]").unwrap().with_timeout(Duration::from_secs(5));
        assert_eq!(event.input, "save");
        assert!(!event.hidden);
        assert_eq!(event.timeout, Some(Duration::from_secs(5)));

        assert!(InteractiveEvent::new("x", r"(").is_err());
        assert!(InteractiveEvent::new("pw", r"#").unwrap().hidden().hidden);
    }

    #[test]
    fn test_result_output_and_failure() {
        let result = InteractiveResult::new(
            vec![
                step("save", "Are you sure to continue?[Y/N]:", None),
                step("y", "Info: Save the configuration successfully.", None),
            ],
            Duration::from_millis(300),
        );
        assert!(!result.failed);
        assert_eq!(
            result.full_output(),
            "Are you sure to continue?[Y/N]:\nInfo: Save the configuration successfully."
        );

        let result = InteractiveResult::new(
            vec![step("save", "", None), step("y", "Error: flash full", Some("Error:"))],
            Duration::ZERO,
        );
        assert!(result.failed);
        assert_eq!(result.failure_message(), Some("Error:"));
        assert_eq!(result.full_output(), "Error: flash full");
    }
}
