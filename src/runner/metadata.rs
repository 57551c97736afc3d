use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::fetcher::Method;
use crate::runner::form::RunMode;

/// Descriptive record attached to every run for display.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RunMetadata {
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub mode: RunMode,
    pub method: Method,
    pub url: String,
    /// Selectors and/or regex, or the response content type in curl mode.
    pub descriptor: String,
    pub row_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_candidates: Option<usize>,
    pub unique: bool,
    pub clean: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,
}

impl RunMetadata {
    pub fn new(mode: RunMode, method: Method, url: &url::Url, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, true),
            mode,
            method,
            url: url.to_string(),
            descriptor: String::new(),
            row_count: 0,
            contact_candidates: None,
            unique: false,
            clean: false,
            content_length: None,
        }
    }
}
