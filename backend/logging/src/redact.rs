//! Log Redaction Layer
//!
//! Scrubs telephone numbers from call-context payloads before they are logged.

use regex::Regex;
use std::sync::LazyLock;

static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap());

/// Redacts telephone numbers in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    TELEPHONE_RE.replace_all(input, "[REDACTED_PHONE]").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = r#"{"remote":"+1-555-123-4567","state":0}"#;
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("+1-555-123-4567"));
        assert!(clean.contains("[REDACTED_PHONE]"));
        assert!(clean.contains(r#""state":0"#));
    }

    #[test]
    fn test_short_values_untouched() {
        assert_eq!(redact_sensitive_data("Silent"), "Silent");
        assert_eq!(redact_sensitive_data("state 6"), "state 6");
    }
}
