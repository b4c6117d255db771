//! Prompt pattern helpers.

use std::sync::LazyLock;

use regex::bytes::Regex;

static USERNAME_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)(?:user\s?name|login)\s*:\s*$").unwrap());

static PASSWORD_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)pass(?:word|code)\s*:\s*$").unwrap());

static LOGIN_FAILURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)login incorrect|authentication failed|access denied|bad passwords?|login invalid|invalid (?:login|password|user)",
    )
    .unwrap()
});

/// Username prompt shown by telnet logins (`Username:`, `login:`).
pub fn username_prompt_pattern() -> &'static Regex {
    &USERNAME_PROMPT
}

/// Password or passcode prompt.
pub fn password_prompt_pattern() -> &'static Regex {
    &PASSWORD_PROMPT
}

/// Text devices print after rejecting credentials.
pub fn login_failure_pattern() -> &'static Regex {
    &LOGIN_FAILURE
}

/// Build one regex matching any of `patterns`.
///
/// Each pattern keeps its own inline flags because it is wrapped in its own
/// group.
pub fn combine_patterns<'a, I>(patterns: I) -> Result<Regex, regex::Error>
where
    I: IntoIterator<Item = &'a Regex>,
{
    let alternation = patterns
        .into_iter()
        .map(|p| format!("(?:{})", p.as_str()))
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&alternation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_prompts() {
        assert!(username_prompt_pattern().is_match(b"\r\nUser Access Verification\r\n\r\nUsername: "));
        assert!(username_prompt_pattern().is_match(b"switch login:"));
        assert!(!username_prompt_pattern().is_match(b"Last login: Mon Oct 19\r\nrouter>"));

        assert!(password_prompt_pattern().is_match(b"Password: "));
        assert!(password_prompt_pattern().is_match(b"Passcode:"));
        assert!(!password_prompt_pattern().is_match(b"router#"));
    }

    #[test]
    fn test_login_failure() {
        assert!(login_failure_pattern().is_match(b"% Authentication failed"));
        assert!(login_failure_pattern().is_match(b"Login incorrect"));
        assert!(!login_failure_pattern().is_match(b"router>"));
    }

    #[test]
    fn test_combine_patterns_keeps_flags() {
        let exec = Regex::new(r"(?m)^[\w.\-]+>\s?$").unwrap();
        let privileged = Regex::new(r"(?m)^[\w.\-]+#\s?$").unwrap();
        let any = combine_patterns([&exec, &privileged]).unwrap();

        assert!(any.is_match(b"show clock\r\nrouter>"));
        assert!(any.is_match(b"router#"));
        assert!(!any.is_match(b"router(config)#"));
    }
}
