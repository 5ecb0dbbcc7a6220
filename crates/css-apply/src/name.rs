//! Recognizing property-set names.
//!
//! A set name is a custom property name (`--` followed by ASCII letters,
//! digits, `_` or `-`), optionally followed by whitespace and one `:`. Registry keys
//! drop the leading `--`.

use std::sync::OnceLock;

use css_apply_syntax::{balanced, Delimiter};
use regex::Regex;

static SET_NAME: OnceLock<Regex> = OnceLock::new();

fn set_name_pattern() -> &'static Regex {
    SET_NAME.get_or_init(|| {
        Regex::new(r"^--([A-Za-z0-9_-]+)\s*:?$").expect("set name pattern is a valid regex")
    })
}

/// The registry key named by `text`, if it is a set name.
///
/// ```
/// use css_apply::set_name;
///
/// assert_eq!(set_name("--toolbar-theme"), Some("toolbar-theme"));
/// assert_eq!(set_name("--toolbar-theme :"), Some("toolbar-theme"));
/// assert_eq!(set_name("toolbar-theme"), None);
/// ```
pub fn set_name(text: &str) -> Option<&str> {
    set_name_pattern()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// The registry key an `@apply` parameter refers to.
///
/// Accepts both `--name` and `(--name)`.
pub fn reference_name(params: &str) -> Option<&str> {
    let params = params.trim();
    if params.starts_with('(') {
        let split = balanced(params, Delimiter::Paren)?;
        if !split.post.trim().is_empty() {
            return None;
        }
        return set_name(split.body.trim());
    }
    set_name(params)
}

/// Check if a declaration value opens a set body.
pub(crate) fn is_set_body(value: &str) -> bool {
    value.starts_with('{')
}
