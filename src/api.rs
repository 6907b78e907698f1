// API client module: a small blocking HTTP client for the Grafana HTTP
// API. One invocation sends exactly one request; there are no retries.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use std::path::Path;
use tracing::debug;

use crate::config::ApiConfig;

pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Failures the caller can act on. Everything else (I/O, connection
/// errors) travels as a plain `anyhow::Error` with context.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid query item '{0}'. Use key=value.")]
    InvalidQueryItem(String),
    #[error("Use only one of --data or --data-file.")]
    ConflictingBody,
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("HTTP {code} {reason}: {body}")]
    Status {
        code: u16,
        reason: String,
        body: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Query parameters in first-seen key order. Repeated keys keep every
/// value in the order they were given.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryParams {
    pub fn push(&mut self, key: &str, value: &str) {
        match self.entries.iter().position(|(k, _)| k == key) {
            Some(idx) => self.entries[idx].1.push(value.to_string()),
            None => self
                .entries
                .push((key.to_string(), vec![value.to_string()])),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flattened `(key, value)` pairs, one per value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())))
    }
}

/// Parse `key=value` items. Splits on the first `=` only, so values may
/// themselves contain `=`.
pub fn parse_query<S: AsRef<str>>(items: &[S]) -> Result<QueryParams, ApiError> {
    let mut params = QueryParams::default();
    for item in items {
        let item = item.as_ref();
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| ApiError::InvalidQueryItem(item.to_string()))?;
        params.push(key, value);
    }
    Ok(params)
}

/// Join base and path with exactly one `/` and append the encoded query.
pub fn build_url(base: &str, path: &str, query: &QueryParams) -> Result<Url, ApiError> {
    let base = base.trim_end_matches('/');
    let raw = if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    };
    let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query.pairs());
    }
    Ok(url)
}

/// Pick the request body from an inline string or a file. Giving both is
/// an error; giving neither means no body.
pub fn read_payload(data: Option<&str>, data_file: Option<&Path>) -> Result<Option<Vec<u8>>> {
    match (data, data_file) {
        (Some(_), Some(_)) => Err(ApiError::ConflictingBody.into()),
        (None, Some(path)) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read data file {}", path.display()))?;
            Ok(Some(bytes))
        }
        (Some(data), None) => Ok(Some(data.as_bytes().to_vec())),
        (None, None) => Ok(None),
    }
}

/// Everything needed to send one request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub body: Option<Vec<u8>>,
    pub content_type: String,
}

/// Blocking client holding the reqwest client and the bearer token.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    token: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            token: config.token.clone(),
        })
    }

    fn headers(&self, request: &ApiRequest) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .context("GRAFANA_API_KEY is not a valid header value")?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if request.body.is_some() {
            let content_type = HeaderValue::from_str(&request.content_type)
                .with_context(|| format!("Invalid content type '{}'", request.content_type))?;
            headers.insert(CONTENT_TYPE, content_type);
        }
        Ok(headers)
    }

    /// Send the request and return the body of a 2xx response. Any other
    /// status becomes `ApiError::Status` carrying the response text.
    pub fn send(&self, request: &ApiRequest) -> Result<Vec<u8>> {
        let headers = self.headers(request)?;
        debug!(method = ?request.method, url = %request.url, "sending request");

        let mut req = self
            .client
            .request(request.method.into(), request.url.clone())
            .headers(headers);
        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        let res = req
            .send()
            .with_context(|| format!("Failed to send request to {}", request.url))?;
        let status = res.status();
        debug!(status = status.as_u16(), "received response");
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            return Err(ApiError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                body,
            }
            .into());
        }
        let bytes = res.bytes().context("Failed to read response body")?;
        Ok(bytes.to_vec())
    }
}
