//! Test suite definitions.
//!
//! A suite is a named, ordered list of test cases that share one target.
//! These types are produced by the suite parser after schema validation and
//! are consumed read-only by the runner.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::duration;
use crate::error::{DomainError, DomainResult};
use crate::request::RequestSpec;

/// Timeout applied when a target leaves it unset or zero.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The endpoint every test in a suite is sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Absolute base URL.
    pub base_url: String,
    /// Per-request deadline; `None` or zero means [`DEFAULT_TIMEOUT`].
    #[serde(
        default,
        rename = "timeout_ms",
        with = "duration::option_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
}

impl Target {
    /// Creates a target with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Sets an explicit timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The timeout requests against this target must honor.
    #[must_use]
    pub fn effective_timeout(&self) -> Duration {
        self.timeout
            .filter(|t| !t.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Resolves `path` against the base URL using RFC 3986 reference
    /// resolution: `/x` replaces the base path, `x` is appended to the
    /// base's last directory, and a full URL replaces everything.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not absolute or the path is not
    /// a valid reference.
    pub fn resolve(&self, path: &str) -> DomainResult<Url> {
        resolve_url(&self.base_url, path)
    }
}

/// Resolves `path` against `base_url`, see [`Target::resolve`].
///
/// # Errors
///
/// Returns an error if the base URL is not absolute or the path is not a
/// valid reference.
pub fn resolve_url(base_url: &str, path: &str) -> DomainResult<Url> {
    let base = Url::parse(base_url).map_err(|e| DomainError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;
    base.join(path).map_err(|e| DomainError::InvalidPath {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

/// Rules for the response body.
///
/// Only one mode is ever evaluated, see [`BodyExpectation::rule`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BodyExpectation {
    /// Substrings that must all appear in the body.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<String>,
    /// Substrings that must all be absent from the body.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_contains: Vec<String>,
    /// Exact body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<String>,
    /// Regular expression the body must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

/// The single body check selected from a [`BodyExpectation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRule<'a> {
    /// Byte-for-byte equality.
    Exact(&'a str),
    /// Regular expression search.
    Regex(&'a str),
    /// Independent containment and exclusion lists.
    Substrings {
        /// Required substrings.
        contains: &'a [String],
        /// Forbidden substrings.
        not_contains: &'a [String],
    },
}

impl BodyExpectation {
    /// Requires the body to contain `text`.
    #[must_use]
    pub fn containing(mut self, text: impl Into<String>) -> Self {
        self.contains.push(text.into());
        self
    }

    /// Requires the body not to contain `text`.
    #[must_use]
    pub fn not_containing(mut self, text: impl Into<String>) -> Self {
        self.not_contains.push(text.into());
        self
    }

    /// Requires the body to equal `text`.
    #[must_use]
    pub fn exactly(mut self, text: impl Into<String>) -> Self {
        self.exact = Some(text.into());
        self
    }

    /// Requires the body to match `pattern`.
    #[must_use]
    pub fn matching(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    /// Picks the rule to evaluate: exact wins over regex, regex wins over
    /// the substring lists. Empty strings count as unset.
    #[must_use]
    pub fn rule(&self) -> BodyRule<'_> {
        if let Some(exact) = self.exact.as_deref().filter(|s| !s.is_empty()) {
            return BodyRule::Exact(exact);
        }
        if let Some(pattern) = self.regex.as_deref().filter(|s| !s.is_empty()) {
            return BodyRule::Regex(pattern);
        }
        BodyRule::Substrings {
            contains: &self.contains,
            not_contains: &self.not_contains,
        }
    }
}

/// Everything a response must satisfy for a test to pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpectationSpec {
    /// Acceptable status codes.
    #[serde(default)]
    pub status: Vec<u16>,
    /// Header name to expected substring of its value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Optional body rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodyExpectation>,
}

impl ExpectationSpec {
    /// Creates an expectation accepting the given status codes.
    #[must_use]
    pub fn status(codes: impl IntoIterator<Item = u16>) -> Self {
        Self {
            status: codes.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Expects `name` to be present with a value containing `value`.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attaches body rules.
    #[must_use]
    pub fn with_body(mut self, body: BodyExpectation) -> Self {
        self.body = Some(body);
        self
    }
}

/// A single named request/expectation pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Test name, unique within its suite by convention.
    pub name: String,
    /// Request to send.
    pub request: RequestSpec,
    /// Expected response.
    pub expected: ExpectationSpec,
}

impl TestCase {
    /// Creates a test case.
    #[must_use]
    pub fn new(name: impl Into<String>, request: RequestSpec, expected: ExpectationSpec) -> Self {
        Self {
            name: name.into(),
            request,
            expected,
        }
    }
}

/// A named, ordered collection of tests sharing one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    /// Suite name (from `metadata.name`).
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Shared target.
    pub target: Target,
    /// Tests in input order.
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    /// Creates an empty suite for `target`.
    #[must_use]
    pub fn new(name: impl Into<String>, target: Target) -> Self {
        Self {
            name: name.into(),
            description: None,
            target,
            tests: Vec::new(),
        }
    }

    /// Appends a test.
    #[must_use]
    pub fn with_test(mut self, test: TestCase) -> Self {
        self.tests.push(test);
        self
    }
}
