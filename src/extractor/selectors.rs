use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::extractor::{cleaner::clean_whitespace, errors::ExtractError, pattern::filter_value};

/// Per-selector (and per-regex) cap on collected values.
pub const MAX_MATCHES: usize = 100;

const LABEL_WIDTH: usize = 20;
const FALLBACK_ATTRIBUTES: [&str; 4] = ["alt", "title", "src", "href"];

pub fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Visible text: each text node trimmed, empty nodes dropped, joined by one
/// space.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text, else the first non-empty of alt/title/src/href, else empty.
pub fn element_value(element: ElementRef<'_>) -> String {
    let text = element_text(element);
    if !text.is_empty() {
        return text;
    }

    FALLBACK_ATTRIBUTES
        .iter()
        .filter_map(|attr| element.value().attr(attr))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Values for one selector in document order, capped at `MAX_MATCHES`.
/// Whitespace cleaning runs before the optional per-element regex filter.
pub fn select_values(
    document: &Html,
    selector: &str,
    filter: Option<&Regex>,
    clean: bool,
) -> Result<Vec<String>, ExtractError> {
    let parsed = parse_selector(selector)?;

    let values: Vec<String> = document
        .select(&parsed)
        .take(MAX_MATCHES)
        .map(|element| {
            let mut value = element_value(element);
            if clean {
                value = clean_whitespace(&value);
            }
            match filter {
                Some(re) => filter_value(re, &value),
                None => value,
            }
        })
        .collect();

    tracing::debug!(selector, matches = values.len(), "selector evaluated");
    Ok(values)
}

/// Zip per-selector sequences by position. Row count is the longest
/// sequence; shorter sequences contribute empty strings.
pub fn align(columns: &[Vec<String>]) -> Vec<Vec<String>> {
    let height = columns.iter().map(Vec::len).max().unwrap_or(0);
    (0..height)
        .map(|i| {
            columns
                .iter()
                .map(|column| column.get(i).cloned().unwrap_or_default())
                .collect()
        })
        .collect()
}

/// The selector itself, cut to 20 characters with "..." when longer.
pub fn column_label(selector: &str) -> String {
    if selector.chars().count() > LABEL_WIDTH {
        let head: String = selector.chars().take(LABEL_WIDTH).collect();
        format!("{}...", head)
    } else {
        selector.to_string()
    }
}
