//! Redaction of sensitive substrings before logging
//!
//! Every piece of caller-supplied text (raw queue payloads, URLs, error
//! bodies) passes through `redact` before it reaches a log sink. Rules are
//! compiled once and target disjoint text shapes, so their order does not
//! affect the result.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

const MASK: &str = "<REDACTED>";

/// Ordered pattern/replacement rules
///
/// - SAS-style signed query parameters: `?sig=...`, `&token=...`,
///   `&secret=...`, `&password=...` up to the next `&`, whitespace, or quote.
/// - JSON-embedded `"Authorization"` and `"accountKey"` values
///   (key match case-insensitive).
static RULES: Lazy<Vec<(Regex, String)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r#"([?&](?:sig|token|secret|password)=)[^&\s"']+"#).unwrap(),
            format!("${{1}}{}", MASK),
        ),
        (
            Regex::new(r#"(?i)("Authorization"\s*:\s*")([^"]+)(")"#).unwrap(),
            format!("${{1}}{}${{3}}", MASK),
        ),
        (
            Regex::new(r#"(?i)("accountKey"\s*:\s*")([^"]+)(")"#).unwrap(),
            format!("${{1}}{}${{3}}", MASK),
        ),
    ]
});

/// Mask sensitive values in `text`, leaving everything else unchanged
///
/// Never fails: text with no matches is returned borrowed as-is.
pub fn redact(text: &str) -> Cow<'_, str> {
    let mut out = Cow::Borrowed(text);
    for (pattern, replacement) in RULES.iter() {
        if pattern.is_match(&out) {
            let replaced = pattern.replace_all(&out, replacement.as_str()).into_owned();
            out = Cow::Owned(replaced);
        }
    }
    out
}
