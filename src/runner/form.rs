use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;
use utoipa::ToSchema;

use crate::export::ExportFormat;
use crate::extractor::{ExtractionSpec, PostProcess};
use crate::fetcher::types::{FetchRequest, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS, Method};
use crate::runner::errors::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Curl,
    Scrape,
    AutoFind,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Curl => "curl",
            Self::Scrape => "scrape",
            Self::AutoFind => "autofind",
        }
    }
}

/// Raw form fields exactly as the presentation layer submits them.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct RunForm {
    pub url: String,
    /// `curl` (default) or `scrape`.
    pub mode: String,
    /// Comma separated CSS selectors (scrape mode).
    pub selectors: String,
    /// Regex, or `preset:email|phone|url` (scrape mode).
    pub regex_pattern: String,
    /// Crawl contact pages for emails, whatever the mode.
    pub autofind: bool,
    pub user_agent: String,
    /// Seconds, 1 to 120. Empty or non-numeric means the server default.
    #[serde(deserialize_with = "lenient_string")]
    pub timeout: String,
    pub headers_only: bool,
    pub post_method: bool,
    /// JSON object of extra request headers.
    #[serde(deserialize_with = "lenient_string")]
    pub custom_headers: String,
    /// JSON body sent with the request.
    #[serde(deserialize_with = "lenient_string")]
    pub post_data: String,
    pub unique: bool,
    pub clean_data: bool,
    /// Download format: csv, json, txt or xlsx.
    pub format: String,
}

/// Accept strings as-is and render any other JSON value as its text, so
/// API clients may send numbers or objects where a form sends strings.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

/// A validated run, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub mode: RunMode,
    /// The URL as entered, trimmed. `request.url` is its normalized form.
    pub target: String,
    pub request: FetchRequest,
    /// `None` in curl mode.
    pub spec: Option<ExtractionSpec>,
    pub flags: PostProcess,
    pub format: ExportFormat,
}

impl RunForm {
    pub fn validate(&self, default_timeout_secs: u64) -> Result<RunPlan, ValidationError> {
        let url = parse_target(&self.url)?;
        let mode = self.mode()?;

        let spec = match mode {
            RunMode::AutoFind => Some(ExtractionSpec::AutoFind),
            RunMode::Scrape => Some(self.scrape_spec()?),
            RunMode::Curl => None,
        };

        let timeout = self.timeout_secs(default_timeout_secs)?;
        let headers = parse_headers(&self.custom_headers)?;
        let body = parse_body(&self.post_data)?;

        let user_agent = Some(self.user_agent.trim())
            .filter(|ua| !ua.is_empty())
            .map(str::to_string);
        let method = if self.post_method {
            Method::Post
        } else {
            Method::Get
        };

        let request = FetchRequest::new(url)
            .with_method(method)
            .with_user_agent(user_agent)
            .with_timeout(Duration::from_secs(timeout))
            .with_headers(headers)
            .with_json_body(body)
            .with_headers_only(mode == RunMode::Curl && self.headers_only);

        Ok(RunPlan {
            mode,
            target: self.url.trim().to_string(),
            request,
            spec,
            flags: PostProcess {
                clean_whitespace: self.clean_data,
                unique_only: self.unique,
            },
            format: ExportFormat::from_form(&self.format),
        })
    }

    fn mode(&self) -> Result<RunMode, ValidationError> {
        if self.autofind {
            return Ok(RunMode::AutoFind);
        }
        match self.mode.trim().to_ascii_lowercase().as_str() {
            "" | "curl" => Ok(RunMode::Curl),
            "scrape" => Ok(RunMode::Scrape),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }

    fn scrape_spec(&self) -> Result<ExtractionSpec, ValidationError> {
        let selectors = split_selectors(&self.selectors);
        let pattern = Some(self.regex_pattern.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        match (selectors.is_empty(), pattern) {
            (false, pattern) => Ok(ExtractionSpec::Selectors { selectors, pattern }),
            (true, Some(pattern)) => Ok(ExtractionSpec::Regex { pattern }),
            (true, None) => Err(ValidationError::MissingScrapeInput),
        }
    }

    /// Empty or unparseable input falls back to the default; a parsed value
    /// must be within range.
    fn timeout_secs(&self, default_timeout_secs: u64) -> Result<u64, ValidationError> {
        let Ok(value) = self.timeout.trim().parse::<i64>() else {
            return Ok(default_timeout_secs);
        };

        u64::try_from(value)
            .ok()
            .filter(|secs| (MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(secs))
            .ok_or(ValidationError::TimeoutOutOfRange {
                value,
                min: MIN_TIMEOUT_SECS,
                max: MAX_TIMEOUT_SECS,
            })
    }
}

pub fn split_selectors(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_target(raw: &str) -> Result<Url, ValidationError> {
    let raw = raw.trim();
    let invalid = || ValidationError::InvalidUrl(raw.to_string());

    let url = Url::parse(raw).map_err(|_| invalid())?;
    let has_host = url.host_str().is_some_and(|h| !h.is_empty());
    if !matches!(url.scheme(), "http" | "https") || !has_host {
        return Err(invalid());
    }
    Ok(url)
}

/// A JSON object whose values are strings, numbers or booleans.
fn parse_headers(raw: &str) -> Result<BTreeMap<String, String>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(BTreeMap::new());
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ValidationError::InvalidHeadersJson(e.to_string()))?;
    let Value::Object(object) = value else {
        return Err(ValidationError::InvalidHeadersJson(
            "expected a JSON object".to_string(),
        ));
    };

    object
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(ValidationError::InvalidHeader {
                        name,
                        reason: "value must be a string, number or boolean".to_string(),
                    });
                }
            };
            if let Err(e) = HeaderName::from_bytes(name.as_bytes()) {
                return Err(ValidationError::InvalidHeader {
                    name,
                    reason: e.to_string(),
                });
            }
            if let Err(e) = HeaderValue::from_str(&value) {
                return Err(ValidationError::InvalidHeader {
                    name,
                    reason: e.to_string(),
                });
            }
            Ok((name, value))
        })
        .collect()
}

fn parse_body(raw: &str) -> Result<Option<Value>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|e| ValidationError::InvalidBodyJson(e.to_string()))
}
