//! Input sanitation for prompts and queries.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ServiceError;

/// Log previews are cut to this many characters unless told otherwise.
pub const DEFAULT_LOG_PREVIEW: usize = 100;

/// Content rejected outright: SQL statements, script tags, exec/eval calls.
static DANGEROUS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(union\s+select|drop\s+table|delete\s+from|insert\s+into)",
        r"(?i)<script[^>]*>.*?</script>",
        r"(?i)(exec\s*\(|eval\s*\()",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid regex"))
    .collect()
});

/// C0 controls other than tab/newline/CR, DEL, and C1 controls.
fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}'..='\u{9F}')
}

/// Escape `&`, `<` and `>`; quotes are left alone.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Validates and normalizes free text before it reaches a workflow.
#[derive(Debug, Clone, Copy)]
pub struct InputValidator {
    max_length: usize,
}

impl InputValidator {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Strip control characters, reject dangerous content, HTML-escape,
    /// collapse whitespace runs to one space, trim.
    ///
    /// Rejects empty input, input over `max_length` characters, input that
    /// matches a dangerous pattern, and input that is empty once sanitized.
    pub fn sanitize(&self, raw: &str, field: &str) -> Result<String, ServiceError> {
        if raw.trim().is_empty() {
            return Err(ServiceError::Validation(format!("{field} cannot be empty")));
        }

        let length = raw.chars().count();
        if length > self.max_length {
            return Err(ServiceError::Validation(format!(
                "{field} too long: {length} > {}",
                self.max_length
            )));
        }

        let stripped: String = raw.chars().filter(|c| !is_stripped_control(*c)).collect();
        if DANGEROUS_PATTERNS.iter().any(|re| re.is_match(&stripped)) {
            return Err(ServiceError::Validation(format!(
                "{field} contains potentially dangerous content"
            )));
        }

        let escaped = escape_html(&stripped);
        let collapsed = escaped.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return Err(ServiceError::Validation(format!(
                "{field} is empty after sanitization"
            )));
        }
        Ok(collapsed)
    }
}

/// Render text safely for a log line: controls removed, HTML-escaped, at most
/// `max_length` characters, `"[empty]"` for empty input.
pub fn sanitize_for_logging(text: &str, max_length: usize) -> String {
    if text.is_empty() {
        return "[empty]".to_string();
    }

    let stripped: String = text.chars().filter(|c| !is_stripped_control(*c)).collect();
    let cleaned = escape_html(&stripped);
    if cleaned.chars().count() <= max_length {
        return cleaned;
    }

    let keep = max_length.saturating_sub(3);
    let mut truncated: String = cleaned.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_collapses_whitespace() {
        let validator = InputValidator::new(2000);
        assert_eq!(
            validator.sanitize("  what   is\n\trust?  ", "prompt").unwrap(),
            "what is rust?"
        );
    }

    #[test]
    fn test_strips_control_characters() {
        let validator = InputValidator::new(2000);
        assert_eq!(
            validator.sanitize("he\u{0}llo\u{7F} wor\u{1B}ld", "prompt").unwrap(),
            "hello world"
        );
    }

    #[test]
    fn test_rejects_empty_and_blank() {
        let validator = InputValidator::new(2000);
        for input in ["", "   ", "\n\t"] {
            assert!(matches!(
                validator.sanitize(input, "prompt"),
                Err(ServiceError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_rejects_only_control_characters() {
        let validator = InputValidator::new(2000);
        let err = validator.sanitize("\u{1}\u{2}\u{3}", "query").unwrap_err();
        assert!(err.to_string().contains("after sanitization"));
    }

    #[test]
    fn test_length_limit_counts_characters() {
        let validator = InputValidator::new(5);
        assert!(validator.sanitize("héllo", "prompt").is_ok());
        assert!(matches!(
            validator.sanitize("héllo!", "prompt"),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_dangerous_content() {
        let validator = InputValidator::new(2000);
        for input in [
            "please DROP TABLE users",
            "1 UNION   SELECT password FROM accounts",
            "delete from prompts",
            "Insert Into logs values (1)",
            "hi <script>alert(1)</script>",
            "<SCRIPT src=x></SCRIPT>",
            "exec (cmd)",
            "eval(payload)",
        ] {
            let err = validator.sanitize(input, "Prompt").unwrap_err();
            assert!(
                err.to_string().contains("potentially dangerous content"),
                "{input:?} should be rejected, got: {err}"
            );
            assert!(err.is_client_error());
        }
    }

    #[test]
    fn test_harmless_keywords_pass() {
        let validator = InputValidator::new(2000);
        for input in [
            "how do I select a table in the union?",
            "evaluate this executive summary",
            "drop the table cloth",
        ] {
            assert!(validator.sanitize(input, "Prompt").is_ok(), "{input:?}");
        }
    }

    #[test]
    fn test_escapes_html() {
        let validator = InputValidator::new(2000);
        assert_eq!(
            validator.sanitize("is 1 < 2 && 3 > 2 \"yes\"", "prompt").unwrap(),
            "is 1 &lt; 2 &amp;&amp; 3 &gt; 2 \"yes\""
        );
    }

    #[test]
    fn test_sanitize_for_logging() {
        assert_eq!(sanitize_for_logging("", 10), "[empty]");
        assert_eq!(sanitize_for_logging("short", 10), "short");
        assert_eq!(sanitize_for_logging("a\u{0}b", 10), "ab");
        assert_eq!(sanitize_for_logging("<b>", 10), "&lt;b&gt;");
        assert_eq!(sanitize_for_logging("abcdefghijklmnop", 10), "abcdefg...");
    }
}
