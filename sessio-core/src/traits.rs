//! Core trait definitions

use crate::error::SessioResult;
use crate::types::{HttpResponse, RequestOptions};
use async_trait::async_trait;

/// The injected HTTP collaborator the session client issues requests through.
///
/// Implementations must resolve only for success (2xx) statuses; any other
/// status is reported as [`SessioError::Transport`] carrying the original
/// status code and body so callers can inspect both. Connection-level
/// failures surface as [`SessioError::Network`].
///
/// [`SessioError::Transport`]: crate::error::SessioError::Transport
/// [`SessioError::Network`]: crate::error::SessioError::Network
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a GET request
    async fn get(&self, url: &str, options: &RequestOptions) -> SessioResult<HttpResponse>;

    /// Perform a POST request with an optional JSON body
    async fn post(
        &self,
        url: &str,
        body: Option<&serde_json::Value>,
        options: &RequestOptions,
    ) -> SessioResult<HttpResponse>;

    /// Perform a PUT request with an optional JSON body
    async fn put(
        &self,
        url: &str,
        body: Option<&serde_json::Value>,
        options: &RequestOptions,
    ) -> SessioResult<HttpResponse>;
}
