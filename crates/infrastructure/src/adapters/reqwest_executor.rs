//! HTTP executor implementation using reqwest.
//!
//! This adapter implements the `HttpExecutor` port. One `reqwest::Client`
//! (and its connection pool) is built up front and shared by every test in
//! a run.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use wafguard_application::ports::{
    CancellationReceiver, Dispatch, ExecutorError, HttpExecutor, NullEventSink, RunEventSink,
};
use wafguard_domain::{HttpMethod, ResponseSnapshot};

/// HTTP executor backed by `reqwest`.
///
/// Redirects are followed (up to 10); requests are never retried.
#[derive(Clone)]
pub struct ReqwestHttpExecutor {
    client: Client,
    events: Arc<dyn RunEventSink>,
}

impl std::fmt::Debug for ReqwestHttpExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestHttpExecutor").finish_non_exhaustive()
    }
}

impl ReqwestHttpExecutor {
    /// Creates an executor with default client settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, ExecutorError> {
        let client = Client::builder()
            .user_agent(concat!("wafguard/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ExecutorError::Transport(e.to_string()))?;

        Ok(Self::with_client(client))
    }

    /// Creates an executor around an existing client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            events: Arc::new(NullEventSink),
        }
    }

    /// Routes request events to `events`.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn RunEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Collapses repeated headers into one `", "`-joined value per name.
    fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
        headers
            .keys()
            .map(|name| {
                let joined = headers
                    .get_all(name)
                    .iter()
                    .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                    .collect::<Vec<_>>()
                    .join(", ");
                (name.to_string(), joined)
            })
            .collect()
    }

    /// Maps reqwest errors to the port's `ExecutorError`.
    fn map_error(error: &reqwest::Error, timeout: Duration) -> ExecutorError {
        if error.is_timeout() {
            return ExecutorError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }
        if error.is_connect() {
            return ExecutorError::ConnectionFailed(Self::describe(error));
        }
        if error.is_body() || error.is_decode() {
            return ExecutorError::Body(Self::describe(error));
        }
        ExecutorError::Transport(Self::describe(error))
    }

    /// Renders an error together with its source chain; reqwest's top-level
    /// message rarely names the underlying cause.
    fn describe(error: &reqwest::Error) -> String {
        let mut message = error.to_string();
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }

    async fn send(&self, dispatch: &Dispatch<'_>) -> Result<ResponseSnapshot, ExecutorError> {
        let url = dispatch.resolve_url()?;
        let request = dispatch.request;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(dispatch.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.payload() {
            builder = builder.body(body.to_owned());
        }

        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, dispatch.timeout))?;

        let status = response.status().as_u16();
        let headers = Self::collect_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(&e, dispatch.timeout))?;

        Ok(ResponseSnapshot::new(status, headers, &body, start.elapsed()))
    }
}

impl HttpExecutor for ReqwestHttpExecutor {
    fn execute(
        &self,
        dispatch: &Dispatch<'_>,
        cancel: &CancellationReceiver,
    ) -> impl Future<Output = Result<ResponseSnapshot, ExecutorError>> + Send {
        let mut cancel = cancel.clone();

        async move {
            self.events
                .test_started(dispatch.test_name, dispatch.request.method, &dispatch.request.path);

            let result = tokio::select! {
                result = self.send(dispatch) => result,
                () = cancel.cancelled() => Err(ExecutorError::Cancelled),
            };

            if let Ok(response) = &result {
                self.events
                    .test_completed(dispatch.test_name, response.status, response.duration);
            }
            result
        }
    }
}
