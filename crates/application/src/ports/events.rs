//! Run event hook
//!
//! The executor, validator and runner report progress through this trait
//! instead of writing to a global logger. The infrastructure layer ships a
//! `tracing` adapter; [`NullEventSink`] drops everything.

use std::time::Duration;

use wafguard_domain::HttpMethod;

/// Receiver for structured run events.
pub trait RunEventSink: Send + Sync {
    /// A request is about to be sent.
    fn test_started(&self, test_name: &str, method: HttpMethod, path: &str);

    /// A response was fully received.
    fn test_completed(&self, test_name: &str, status: u16, duration: Duration);

    /// A response was validated.
    fn validation_completed(&self, test_name: &str, passed: bool, errors: usize, warnings: usize);

    /// A request produced no response.
    fn test_failed(&self, test_name: &str, error: &str) {
        let _ = (test_name, error);
    }

    /// A suite run is starting.
    fn suite_started(&self, suite_name: &str, tests: usize, concurrency: usize) {
        let _ = (suite_name, tests, concurrency);
    }

    /// A suite run finished.
    fn suite_finished(&self, suite_name: &str, passed: usize, failed: usize, duration: Duration) {
        let _ = (suite_name, passed, failed, duration);
    }
}

/// Event sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventSink;

impl RunEventSink for NullEventSink {
    fn test_started(&self, _test_name: &str, _method: HttpMethod, _path: &str) {}

    fn test_completed(&self, _test_name: &str, _status: u16, _duration: Duration) {}

    fn validation_completed(&self, _test_name: &str, _passed: bool, _errors: usize, _warnings: usize) {}
}
