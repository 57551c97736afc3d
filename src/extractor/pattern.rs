use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

use crate::extractor::{cleaner::clean_whitespace, errors::ExtractError, selectors::MAX_MATCHES};

pub const PRESET_PREFIX: &str = "preset:";

pub const EMAIL_PATTERN: &str = r"[\w._%+-]+@[\w.-]+\.[a-zA-Z]{2,}";
pub const PHONE_PATTERN: &str = r"\+?\d[\d\s().-]{6,}\d";
pub const URL_PATTERN: &str = r"https?://[\w\-._~:/?#\[\]@!$&'()*+,;=]+";

/// Case-insensitive email matcher used by auto-find.
pub static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(EMAIL_PATTERN)
        .case_insensitive(true)
        .build()
        .expect("Failed to compile email regex")
});

/// Built-in patterns reachable as `preset:<name>`.
pub fn preset(name: &str) -> Option<&'static str> {
    match name.trim().to_ascii_lowercase().as_str() {
        "email" => Some(EMAIL_PATTERN),
        "phone" => Some(PHONE_PATTERN),
        "url" => Some(URL_PATTERN),
        _ => None,
    }
}

/// Compile a user pattern with dot-matches-newline so fields may span lines.
pub fn compile(pattern: &str) -> Result<Regex, ExtractError> {
    let source = match pattern.strip_prefix(PRESET_PREFIX) {
        Some(name) => preset(name).ok_or_else(|| ExtractError::UnknownPreset(name.to_string()))?,
        None => pattern,
    };

    Ok(RegexBuilder::new(source).dot_matches_new_line(true).build()?)
}

/// Text of every match; with capture groups, the first group's text.
pub fn find_all<'a>(re: &'a Regex, text: &'a str) -> impl Iterator<Item = String> + 'a {
    let grouped = re.captures_len() > 1;
    re.captures_iter(text).map(move |caps| {
        let m = if grouped { caps.get(1) } else { caps.get(0) };
        m.map(|m| m.as_str().to_string()).unwrap_or_default()
    })
}

/// Per-element filter: all matches joined by ", ", or empty when none.
pub fn filter_value(re: &Regex, value: &str) -> String {
    find_all(re, value).collect::<Vec<_>>().join(", ")
}

/// Whole-body strategy: up to `MAX_MATCHES` matches, one per row.
pub fn body_matches(re: &Regex, body: &str, clean: bool) -> Vec<String> {
    find_all(re, body)
        .take(MAX_MATCHES)
        .map(|m| if clean { clean_whitespace(&m) } else { m })
        .collect()
}
