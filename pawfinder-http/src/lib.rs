//! Minimal JSON HTTP client with safe logging and flexible auth.
//!
//! - Request options: headers, `Auth`, query params, timeout
//! - Redacts sensitive headers and query params and never logs secret values
//! - Exactly one attempt per call; callers decide whether to resubmit
//! - Optional *raw* request/response logging via `PAWFINDER_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), pawfinder_http::HttpError> {
//! let client = pawfinder_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", pawfinder_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Security: API keys passed through [`Auth::api_key_header`] are sanitized
//! before use, and logs only ever include the auth kind (header/query/none),
//! not the secret.
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines (target `http.raw`) when `PAWFINDER_HTTP_RAW=1`.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;
use std::env;
use std::time::Duration;
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "PAWFINDER_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const REDACTED: &str = "<redacted>";

const SECRET_HEADERS: &[&str] = &["authorization", "x-goog-api-key", "x-api-key"];
const SECRET_QUERY_KEYS: &[&str] = &[
    "access_token",
    "authorization",
    "auth",
    "key",
    "api_key",
    "token",
    "secret",
    "client_secret",
    "bearer",
];

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn is_secret_header(name: &str) -> bool {
    SECRET_HEADERS
        .iter()
        .any(|h| name.eq_ignore_ascii_case(h))
}

fn is_secret_query_key(name: &str) -> bool {
    SECRET_QUERY_KEYS.contains(&name.to_ascii_lowercase().as_str())
}

fn shown_header_value<'a>(name: &str, value: &'a HeaderValue) -> &'a str {
    if is_secret_header(name) {
        REDACTED
    } else {
        value.to_str().unwrap_or("")
    }
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let mut cmd = format!("curl -X{method}");
    for (name, value) in headers {
        let line = format!("{}: {}", name, shown_header_value(name.as_str(), value));
        cmd.push_str(&format!(" -H {}", shell_quote(&line)));
    }
    match body.map(std::str::from_utf8) {
        Some(Ok(text)) => {
            let mut text = text.to_string();
            if text.len() > RAW_MAX_BODY {
                truncate_on_char_boundary(&mut text, RAW_MAX_BODY);
                text.push('…');
            }
            cmd.push_str(&format!(" -d {}", shell_quote(&text)));
        }
        Some(Err(_)) => cmd.push_str(" --data-binary @-"),
        None => {}
    }
    cmd.push_str(&format!(" {}", shell_quote(&redact_url(url))));
    cmd
}

fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| (k.to_string(), shown_header_value(k.as_str(), v).to_string()))
        .collect()
}

/// The URL with secret query values replaced.
fn redact_url(url: &Url) -> String {
    let mut shown = url.clone();
    if url.query().is_none() {
        return shown.to_string();
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if is_secret_query_key(&k) { REDACTED.into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

// ==============================
// Auth & Request Options
// ==============================

/// Authentication strategies supported by the HTTP client helpers.
///
/// ```
/// use pawfinder_http::Auth;
///
/// let auth = Auth::api_key_header("x-goog-api-key", " \"abc123\"\n").unwrap();
/// match auth {
///     Auth::Header { name, value } => {
///         assert_eq!(name.as_str(), "x-goog-api-key");
///         assert_eq!(value.to_str().unwrap(), "abc123");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Custom header (e.g., Gemini: x-goog-api-key)
    Header {
        name: HeaderName,
        value: HeaderValue,
    },
    /// Auth via query param
    Query {
        name: &'a str,
        value: Cow<'a, str>,
    },
    None,
}

impl Auth<'static> {
    /// Build a header auth from a raw API key, stripping quotes and whitespace.
    pub fn api_key_header(name: &'static str, raw_key: &str) -> Result<Self, HttpError> {
        let key = sanitize_api_key(raw_key)?;
        let mut value =
            HeaderValue::from_str(&key).map_err(|e| HttpError::Build(e.to_string()))?;
        value.set_sensitive(true);
        let name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Auth::Header { name, value })
    }
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use pawfinder_http::{Auth, RequestOpts};
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     auth: Some(Auth::Query {
///         name: "fields",
///         value: Cow::Borrowed("lat,lon"),
///     }),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.headers.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>, // e.g. [("fields", "lat,lon".into())]
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// A trailing `/` is appended to the base path when missing so that
    /// relative paths join beneath it rather than replacing its last segment.
    ///
    /// ```no_run
    /// use pawfinder_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com/v1beta")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.base().as_str(), "https://api.example.com/v1beta/");
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        Self::with_connect_timeout(base, Duration::from_secs(5))
    }

    /// Like [`HttpClient::new`] with an explicit TCP/TLS connect timeout.
    pub fn with_connect_timeout(base: &str, connect_timeout: Duration) -> Result<Self, HttpError> {
        let mut base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let inner = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// Override the default per-request timeout.
    ///
    /// ```no_run
    /// use pawfinder_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?
    ///     .with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// GET JSON with per-request options (headers/query/auth/timeout).
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json_internal::<(), T>(Method::GET, path, None, opts)
            .await
    }

    /// POST JSON with per-request options (headers/query/auth/timeout).
    pub async fn post_json_opts<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json_internal(Method::POST, path, Some(body), opts)
            .await
    }

    fn resolve(&self, path: &str) -> Result<Url, HttpError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    async fn request_json_internal<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve(path)?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let body = body
            .map(|b| serde_json::to_vec(b).map_err(|e| HttpError::Build(e.to_string())))
            .transpose()?;

        let mut query: Vec<(&str, &str)> = opts
            .query
            .iter()
            .flatten()
            .map(|(k, v)| (*k, v.as_ref()))
            .collect();
        let mut headers = opts.headers.clone().unwrap_or_default();
        let auth_kind = match &opts.auth {
            Some(Auth::Header { name, value }) => {
                headers.insert(name.clone(), value.clone());
                "header"
            }
            Some(Auth::Query { name, value }) => {
                query.push((*name, value.as_ref()));
                "query"
            }
            Some(Auth::None) | None => "none",
        };

        let mut rb = self
            .inner
            .request(method.clone(), url.clone())
            .timeout(timeout)
            .headers(headers.clone());
        if !query.is_empty() {
            rb = rb.query(&query);
        }
        if let Some(bytes) = &body {
            rb = rb
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes.clone());
        }

        let req_id = uuid::Uuid::new_v4().simple().to_string();
        let shown_query: Vec<(&str, &str)> = query
            .iter()
            .map(|&(k, v)| (k, if is_secret_query_key(k) { REDACTED } else { v }))
            .collect();
        tracing::debug!(
            req_id = %req_id,
            method = %method,
            host_path = %format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            query = ?shown_query,
            timeout_ms = timeout.as_millis() as u64,
            auth_kind,
            has_body = body.is_some(),
            "http.request.start"
        );
        if raw_enabled() {
            let curl = make_curl(&method, &url, &headers, body.as_deref());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        let started = std::time::Instant::now();
        let (status, resp_headers, bytes) = send(rb).await.inspect_err(|e| {
            tracing::warn!(req_id = %req_id, error = %e, "http.network_error");
        })?;
        let duration_ms = started.elapsed().as_millis() as u64;
        let upstream_id = upstream_request_id(&resp_headers);

        tracing::debug!(
            req_id = %req_id,
            %status,
            duration_ms,
            body_len = bytes.len(),
            x_request_id = %upstream_id,
            "http.response.headers"
        );
        if raw_enabled() {
            let cap = bytes.len().min(RAW_MAX_BODY);
            tracing::info!(
                target: "http.raw",
                %req_id,
                %status,
                duration_ms,
                headers = ?redact_headers(&resp_headers),
                body = %String::from_utf8_lossy(&bytes[..cap]),
                truncated = bytes.len() > RAW_MAX_BODY
            );
        }

        let snippet = snip_body(&bytes);
        if !status.is_success() {
            let message = extract_error_message(&bytes);
            tracing::warn!(
                req_id = %req_id,
                %status,
                message = %message,
                x_request_id = %upstream_id,
                body_snippet = %snippet,
                "http.error"
            );
            return Err(HttpError::Api {
                status,
                message,
                request_id: upstream_id,
            });
        }

        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            tracing::warn!(
                req_id = %req_id,
                line = e.line(),
                column = e.column(),
                error = %e,
                body_snippet = %snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet)
        })
    }
}

async fn send(rb: reqwest::RequestBuilder) -> Result<(StatusCode, HeaderMap, Vec<u8>), HttpError> {
    let resp = rb
        .send()
        .await
        .map_err(|e| HttpError::Network(e.to_string()))?;
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| HttpError::Network(e.to_string()))?;
    Ok((status, headers, bytes.to_vec()))
}

fn upstream_request_id(headers: &HeaderMap) -> String {
    ["x-request-id", "x-correlation-id"]
        .iter()
        .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
        .unwrap_or("-")
        .to_string()
}

// ==============================
// Helpers
// ==============================

/// Best human-readable message from an error body.
///
/// Google envelopes (`{"error":{"message","status"}}`) become
/// `STATUS: message`; flat `message`/`detail`/`error` strings are used as-is;
/// anything else falls back to a body snippet.
fn extract_error_message(body: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) else {
        return snip_body(body);
    };
    let text = |v: &serde_json::Value| v.as_str().filter(|s| !s.is_empty()).map(str::to_string);

    if let Some(err) = value.get("error").filter(|e| e.is_object()) {
        if let Some(message) = err.get("message").and_then(text) {
            return match err.get("status").and_then(text) {
                Some(status) => format!("{status}: {message}"),
                None => message,
            };
        }
    }
    ["message", "detail", "error"]
        .iter()
        .find_map(|k| value.get(*k).and_then(text))
        .unwrap_or_else(|| snip_body(body))
}

fn snip_body(body: &[u8]) -> String {
    const MAX: usize = 500;
    let mut snip = String::from_utf8_lossy(body).into_owned();
    if snip.len() > MAX {
        truncate_on_char_boundary(&mut snip, MAX);
        snip.push_str("...");
    }
    snip
}

fn truncate_on_char_boundary(s: &mut String, max: usize) {
    let mut cut = max.min(s.len());
    while cut > 0 && !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    // 1) Trim outer spaces/quotes
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    // 2) Remove *all* ASCII whitespace (spaces, tabs, newlines, carriage returns)
    s.retain(|ch| !ch.is_ascii_whitespace());

    if s.is_empty() {
        return Err(HttpError::Build("API key is empty".into()));
    }
    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_error_envelope_includes_status() {
        let body = br#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            extract_error_message(body),
            "PERMISSION_DENIED: API key not valid"
        );
    }

    #[test]
    fn generic_message_fields_are_used() {
        assert_eq!(extract_error_message(br#"{"message":"invalid query"}"#), "invalid query");
        assert_eq!(extract_error_message(br#"{"detail":"nope"}"#), "nope");
        assert_eq!(extract_error_message(b"plain text"), "plain text");
    }

    #[test]
    fn long_bodies_are_snipped() {
        let body = "x".repeat(800);
        let snip = snip_body(body.as_bytes());
        assert_eq!(snip.len(), 503);
        assert!(snip.ends_with("..."));
    }

    #[test]
    fn snipping_respects_utf8_boundaries() {
        let body = "é".repeat(400);
        let snip = snip_body(body.as_bytes());
        assert!(snip.ends_with("..."));
    }

    #[test]
    fn api_keys_are_sanitized() {
        assert_eq!(sanitize_api_key(" 'ab c\n' ").unwrap(), "abc");
        assert!(sanitize_api_key("   ").is_err());
        assert!(sanitize_api_key("clé").is_err());
    }

    #[test]
    fn secret_headers_and_query_values_are_redacted() {
        let mut h = HeaderMap::new();
        h.insert("x-goog-api-key", HeaderValue::from_static("secret"));
        h.insert("accept", HeaderValue::from_static("application/json"));
        let red = redact_headers(&h);
        assert!(red.contains(&("x-goog-api-key".into(), "<redacted>".into())));
        assert!(red.contains(&("accept".into(), "application/json".into())));

        let url = Url::parse("https://example.com/a?key=secret&fields=lat").unwrap();
        let shown = redact_url(&url);
        assert!(!shown.contains("secret"));
        assert!(shown.contains("fields=lat"));
    }

    #[test]
    fn curl_never_contains_the_key() {
        let url = Url::parse("https://example.com/v1beta/models/m:generateContent").unwrap();
        let mut h = HeaderMap::new();
        h.insert("x-goog-api-key", HeaderValue::from_static("super-secret"));
        let curl = make_curl(&Method::POST, &url, &h, Some(br#"{"a":1}"#));
        assert!(!curl.contains("super-secret"));
        assert!(curl.starts_with("curl -XPOST"));
    }

    #[test]
    fn base_without_trailing_slash_keeps_its_last_segment() {
        let client = HttpClient::new("https://example.com/v1beta").unwrap();
        let url = client
            .resolve("models/gemini-2.5-flash:generateContent")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn leading_slash_path_stays_under_base() {
        let client = HttpClient::new("https://example.com/v1beta/").unwrap();
        let url = client.resolve("/models/m:generateContent").unwrap();
        assert_eq!(url.as_str(), "https://example.com/v1beta/models/m:generateContent");
    }
}
