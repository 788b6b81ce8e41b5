//! Request specification type

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::HttpMethod;

/// The request half of a test case.
///
/// `path` is a URL reference resolved against the suite target's base
/// address at execution time, so it may be absolute (`/login`), relative
/// (`login`) or carry a query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method
    pub method: HttpMethod,
    /// Path or URL reference relative to the target
    pub path: String,
    /// HTTP headers, one value per name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Raw request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl RequestSpec {
    /// Creates a request without headers or body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Creates a GET request for the given path.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Adds a header, replacing any previous value under the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the body to send, if any.
    ///
    /// An empty string means "no body": verbs such as GET must not be
    /// forced to carry an empty payload.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.is_empty())
    }
}
