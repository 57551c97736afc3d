use crate::fetcher::{
    errors::FetchError,
    types::{Charset, FetchResult},
};
use bytes::Bytes;
use chrono::Utc;
use encoding_rs::Encoding;
use regex::Regex;
use reqwest::{StatusCode, header::HeaderMap};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use url::Url;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

const SNIFF_WINDOW: usize = 4096;

/// Decode a full response. Never fails: undecodable bytes are replaced.
pub fn process_response(
    url_final: Url,
    status: StatusCode,
    headers: &HeaderMap,
    body_bytes: Bytes,
    content_type: Option<&str>,
) -> FetchResult {
    let declared = content_type.unwrap_or_default();
    let charset = detect_charset(declared, &body_bytes);
    let body = decode_to_utf8(&body_bytes, &charset);

    FetchResult {
        url_final,
        status,
        body,
        content_type: declared.to_string(),
        headers: flatten_headers(headers),
        charset: Some(charset),
        fetched_at: Utc::now(),
    }
}

/// Render the response headers as the body, leaving the payload untouched.
pub fn process_headers_only(
    url_final: Url,
    status: StatusCode,
    headers: &HeaderMap,
    content_type: Option<&str>,
) -> Result<FetchResult, FetchError> {
    let headers = flatten_headers(headers);
    let body = serde_json::to_string_pretty(&headers)?;

    Ok(FetchResult {
        url_final,
        status,
        body,
        content_type: content_type.unwrap_or("text/plain").to_string(),
        headers,
        charset: None,
        fetched_at: Utc::now(),
    })
}

/// Repeated headers are joined with ", " the way HTTP folds them.
pub fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    flat
}

fn charset_from_captures(captures: Option<regex::Captures<'_>>) -> Option<Charset> {
    let charset_name = captures?.get(1)?.as_str().to_lowercase();
    Encoding::for_label(charset_name.as_bytes()).map(Charset::from_encoding)
}

fn detect_charset(content_type: &str, body_bytes: &[u8]) -> Charset {
    // 1. Content-Type header
    if let Some(charset) = charset_from_captures(CHARSET_REGEX.captures(content_type)) {
        return charset;
    }

    // 2. <meta charset> or http-equiv in the first 4KB
    let search_bytes = &body_bytes[..body_bytes.len().min(SNIFF_WINDOW)];
    let search_str = String::from_utf8_lossy(search_bytes);

    if let Some(charset) = charset_from_captures(META_CHARSET_REGEX.captures(&search_str)) {
        return charset;
    }
    if let Some(charset) = charset_from_captures(META_HTTP_EQUIV_REGEX.captures(&search_str)) {
        return charset;
    }

    // 3. Heuristic sniffing
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(search_bytes, false);
    Charset::from_encoding(detector.guess(None, true))
}

fn decode_to_utf8(body_bytes: &[u8], charset: &Charset) -> String {
    let encoding = match charset {
        Charset::Utf8 => encoding_rs::UTF_8,
        Charset::Windows1252 => encoding_rs::WINDOWS_1252,
        Charset::ShiftJis => encoding_rs::SHIFT_JIS,
        Charset::Gb2312 => encoding_rs::GBK,
        Charset::Big5 => encoding_rs::BIG5,
        Charset::Other(name) => Encoding::for_label(name.as_bytes()).unwrap_or(encoding_rs::UTF_8),
    };

    let (decoded, _encoding, had_errors) = encoding.decode(body_bytes);
    if had_errors {
        tracing::debug!(
            encoding = encoding.name(),
            "decode produced errors, falling back to lossy utf-8"
        );
        return String::from_utf8_lossy(body_bytes).into_owned();
    }

    decoded.into_owned()
}
