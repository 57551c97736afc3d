use crate::fetcher::{
    errors::FetchError,
    pipeline::{process_headers_only, process_response},
    types::{FetchRequest, FetchResult},
};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, instrument};

const MAX_REDIRECTS: usize = 10;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The fetch primitive the pipeline depends on. One call, one outbound
/// request, no retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, FetchError>;
}

/// reqwest-backed fetcher with a shared connection pool.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    default_user_agent: String,
}

impl HttpFetcher {
    pub fn new(default_user_agent: impl Into<String>) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .connect_timeout(CONNECT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| FetchError::Unknown(e.to_string()))?;

        Ok(Self {
            client,
            default_user_agent: default_user_agent.into(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip_all, fields(url = %request.url, method = %request.method))]
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, FetchError> {
        let headers = build_headers(request, &self.default_user_agent)?;

        let mut builder = self
            .client
            .request(request.method.into(), request.url.clone())
            .headers(headers)
            .timeout(request.timeout);
        if let Some(body) = &request.json_body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(FetchError::from_reqwest_error)?;

        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();

        if !(status.is_success() || status.is_redirection()) {
            return Err(FetchError::Http { status });
        }

        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(str::to_string);

        if request.headers_only {
            return process_headers_only(final_url, status, &headers, content_type.as_deref());
        }

        let body_bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Io(e.to_string()))?;
        debug!(status = %status, bytes = body_bytes.len(), "response received");

        Ok(process_response(
            final_url,
            status,
            &headers,
            body_bytes,
            content_type.as_deref(),
        ))
    }
}

/// Default user agent, then the caller's user agent, then extra headers.
/// Later layers overwrite earlier ones key by key.
pub fn build_headers(
    request: &FetchRequest,
    default_user_agent: &str,
) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();

    let user_agent = request
        .user_agent
        .as_deref()
        .unwrap_or(default_user_agent);
    headers.insert(USER_AGENT, header_value(USER_AGENT.as_str(), user_agent)?);

    for (name, value) in &request.extra_headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| FetchError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        headers.insert(header_name, header_value(name, value)?);
    }

    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value).map_err(|e| FetchError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
