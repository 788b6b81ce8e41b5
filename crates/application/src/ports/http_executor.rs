//! HTTP executor port

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use wafguard_domain::{DomainError, RequestSpec, ResponseSnapshot, Url, resolve_url};

use super::CancellationReceiver;

/// Everything the executor needs to send one test's request.
#[derive(Debug, Clone, Copy)]
pub struct Dispatch<'a> {
    /// Name of the test, used for log correlation.
    pub test_name: &'a str,
    /// The request to send.
    pub request: &'a RequestSpec,
    /// Base URL the request path is resolved against.
    pub base_url: &'a str,
    /// Hard deadline for the whole exchange.
    pub timeout: Duration,
}

impl Dispatch<'_> {
    /// The absolute URL of this request.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::InvalidAddress`] if the base URL or the
    /// request path cannot be parsed.
    pub fn resolve_url(&self) -> Result<Url, ExecutorError> {
        Ok(resolve_url(self.base_url, &self.request.path)?)
    }
}

/// Reasons a request produced no response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecutorError {
    /// The target address or request path could not be resolved.
    #[error("invalid request address: {0}")]
    InvalidAddress(String),

    /// No response arrived before the deadline.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The deadline that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The run was cancelled while the request was in flight.
    #[error("request cancelled")]
    Cancelled,

    /// The connection could not be established (DNS, refused, TLS).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Any other transport failure.
    #[error("request failed: {0}")]
    Transport(String),
}

impl From<DomainError> for ExecutorError {
    fn from(error: DomainError) -> Self {
        Self::InvalidAddress(error.to_string())
    }
}

/// Port for sending a single HTTP request.
///
/// Implementations must be safe to share across concurrently running
/// tests; the runner calls `execute` from many tasks at once.
pub trait HttpExecutor: Send + Sync {
    /// Sends the request and buffers the full response.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid, the transport fails,
    /// the deadline elapses, or `cancel` fires first. Implementations do
    /// not retry.
    fn execute(
        &self,
        dispatch: &Dispatch<'_>,
        cancel: &CancellationReceiver,
    ) -> impl Future<Output = Result<ResponseSnapshot, ExecutorError>> + Send;
}
