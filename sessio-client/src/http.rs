//! Reqwest-backed HTTP collaborator
//!
//! Default [`HttpClient`] implementation. Endpoints configured as
//! server-relative paths are resolved against the configured base URL;
//! non-success statuses are reported as transport errors carrying the
//! original status and body.

use async_trait::async_trait;
use sessio_core::{
    ErrorContext, HttpClient, HttpResponse, RequestOptions, SessioError, SessioResult,
};
use std::collections::HashMap;
use tracing::debug;

/// Configuration for [`ReqwestHttpClient`]
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL that server-relative endpoint paths are resolved against
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Headers sent with every request
    pub headers: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_seconds: 30,
            user_agent: "sessio/0.1".to_string(),
            headers: HashMap::new(),
        }
    }
}

impl HttpConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    /// Set additional header
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// HTTP collaborator backed by a shared `reqwest::Client`
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    config: HttpConfig,
}

impl ReqwestHttpClient {
    /// Create a new client with the common configuration applied
    pub fn new(config: HttpConfig) -> SessioResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();

        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_str(&config.user_agent).map_err(|e| {
                SessioError::Config {
                    message: format!("Invalid user agent: {}", e),
                    context: ErrorContext::new("http_client").with_operation("new"),
                }
            })?,
        );

        for (key, value) in &config.headers {
            let name =
                reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                    SessioError::Config {
                        message: format!("Invalid header name '{}': {}", key, e),
                        context: ErrorContext::new("http_client").with_operation("new"),
                    }
                })?;
            let value = reqwest::header::HeaderValue::from_str(value).map_err(|e| {
                SessioError::Config {
                    message: format!("Invalid header value for '{}': {}", key, e),
                    context: ErrorContext::new("http_client").with_operation("new"),
                }
            })?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| SessioError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("new"),
            })?;

        Ok(Self { client, config })
    }

    /// Resolve a server-relative endpoint path against the base URL
    fn resolve_url(&self, url: &str) -> SessioResult<String> {
        if !url.starts_with('/') {
            return Ok(url.to_string());
        }

        if self.config.base_url.is_empty() {
            return Err(SessioError::Config {
                message: format!("No base URL configured for relative endpoint {}", url),
                context: ErrorContext::new("http_client")
                    .with_operation("resolve_url")
                    .with_suggestion("Set HttpConfig::base_url or configure absolute URLs"),
            });
        }

        Ok(format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            url
        ))
    }

    async fn execute(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&serde_json::Value>,
        options: &RequestOptions,
    ) -> SessioResult<HttpResponse> {
        let url = self.resolve_url(url)?;
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url).query(&options.query);
        for (key, value) in &options.headers {
            request = request.header(key, value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| SessioError::Network {
            message: format!("Request to {} failed: {}", url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("execute"),
        })?;

        let status = response.status();
        let data = decode_body(response).await;

        if !status.is_success() {
            return Err(SessioError::Transport {
                status: status.as_u16(),
                body: data,
                message: status
                    .canonical_reason()
                    .unwrap_or("request rejected")
                    .to_string(),
                context: ErrorContext::new("http_client")
                    .with_operation("execute")
                    .with_suggestion(match status.as_u16() {
                        401 | 403 => "Check the session credentials",
                        404 => "Check the configured endpoint URLs",
                        _ => "Check backend availability",
                    }),
            });
        }

        Ok(HttpResponse::new(status.as_u16(), data))
    }
}

/// Decode a response body: empty bodies become `None`, JSON is parsed, and
/// anything else is kept verbatim as a JSON string.
async fn decode_body(response: reqwest::Response) -> Option<serde_json::Value> {
    let text = response.text().await.ok()?;
    if text.is_empty() {
        return None;
    }

    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(_) => Some(serde_json::Value::String(text)),
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, options: &RequestOptions) -> SessioResult<HttpResponse> {
        self.execute(reqwest::Method::GET, url, None, options).await
    }

    async fn post(
        &self,
        url: &str,
        body: Option<&serde_json::Value>,
        options: &RequestOptions,
    ) -> SessioResult<HttpResponse> {
        self.execute(reqwest::Method::POST, url, body, options)
            .await
    }

    async fn put(
        &self,
        url: &str,
        body: Option<&serde_json::Value>,
        options: &RequestOptions,
    ) -> SessioResult<HttpResponse> {
        self.execute(reqwest::Method::PUT, url, body, options).await
    }
}
