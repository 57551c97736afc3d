use std::error::Error as StdError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("too many redirects")]
    RedirectLoop,

    #[error("http error {status}")]
    Http { status: reqwest::StatusCode },

    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("failed to render response headers: {0}")]
    Headers(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

impl FetchError {
    /// HTTP status carried by the failure, if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status } => Some(status.as_u16()),
            _ => None,
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_builder() {
            Self::InvalidUrl(err.to_string())
        } else if err.is_redirect() {
            Self::RedirectLoop
        } else if let Some(status) = err.status() {
            Self::Http { status }
        } else if err.is_connect() || err.is_request() {
            // DNS, refused connections, TLS handshakes
            Self::Connect(with_root_cause(&err))
        } else if err.is_body() || err.is_decode() {
            Self::Io(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

/// Top-level message followed by the innermost `source()`, which is where
/// reqwest keeps the OS or resolver reason.
fn with_root_cause(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut root = None;
    let mut source = err.source();
    while let Some(cause) = source {
        root = Some(cause);
        source = cause.source();
    }
    if let Some(root) = root {
        let reason = root.to_string();
        if !message.contains(&reason) {
            message.push_str(": ");
            message.push_str(&reason);
        }
    }
    message
}
