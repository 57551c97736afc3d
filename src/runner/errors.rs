use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::extractor::ExtractError;
use crate::fetcher::FetchError;

/// Stable category reported alongside every error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Fetch,
    Extraction,
    Serialization,
    NotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Fetch => "fetch",
            Self::Extraction => "extraction",
            Self::Serialization => "serialization",
            Self::NotFound => "not_found",
        }
    }
}

/// Bad input. Raised before any network call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid URL: '{0}' must be an absolute http(s) URL with a host")]
    InvalidUrl(String),

    #[error("Enter CSS selectors or regex for scrape mode (or use Auto Find)")]
    MissingScrapeInput,

    #[error("Unknown mode '{0}', expected 'curl' or 'scrape'")]
    UnknownMode(String),

    #[error("Timeout must be between {min} and {max} seconds, got {value}")]
    TimeoutOutOfRange { value: i64, min: u64, max: u64 },

    #[error("Invalid JSON in custom headers: {0}")]
    InvalidHeadersJson(String),

    #[error("Invalid custom header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Invalid JSON in POST data: {0}")]
    InvalidBodyJson(String),
}

/// Everything that can stop a pipeline run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Request error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractError),
}

impl RunError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::Extraction(_) => ErrorKind::Extraction,
        }
    }
}
