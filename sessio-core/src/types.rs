//! Core data type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The backend-supplied record describing the signed-in principal.
///
/// No schema is assumed beyond an optional `roles` field holding either a
/// single string or an array of strings, so the record stays an opaque JSON
/// value. It is replaced wholesale on every successful refresh.
pub type User = serde_json::Value;

/// Minimal view of an HTTP response as produced by the [`HttpClient`]
/// collaborator: status code plus the decoded JSON body, if any.
///
/// [`HttpClient`]: crate::traits::HttpClient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Decoded response body (absent for bodiless responses such as 204)
    pub data: Option<serde_json::Value>,
}

impl HttpResponse {
    pub fn new(status: u16, data: Option<serde_json::Value>) -> Self {
        Self { status, data }
    }
}

/// Per-request options forwarded to the HTTP collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Extra headers for this request only
    pub headers: HashMap<String, String>,
    /// Extra query string pairs
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    /// Add a header
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Add a query string pair
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}
