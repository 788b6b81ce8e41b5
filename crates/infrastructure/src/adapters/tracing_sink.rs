//! `tracing` adapter for run events.

use std::time::Duration;

use wafguard_application::ports::RunEventSink;
use wafguard_domain::HttpMethod;

/// Writes run events as structured `tracing` events.
///
/// Per-request events are logged at `info`, transport failures at
/// `error`, and failed validations at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl RunEventSink for TracingEventSink {
    fn test_started(&self, test_name: &str, method: HttpMethod, path: &str) {
        tracing::info!(test_name, method = %method, path, "Executing test");
    }

    fn test_completed(&self, test_name: &str, status: u16, duration: Duration) {
        tracing::info!(test_name, status_code = status, duration = ?duration, "Test executed");
    }

    fn validation_completed(&self, test_name: &str, passed: bool, errors: usize, warnings: usize) {
        if passed {
            tracing::info!(test_name, passed, errors, warnings, "Validation completed");
        } else {
            tracing::warn!(test_name, passed, errors, warnings, "Validation completed");
        }
    }

    fn test_failed(&self, test_name: &str, error: &str) {
        tracing::error!(test_name, error, "Failed to execute test");
    }

    fn suite_started(&self, suite_name: &str, tests: usize, concurrency: usize) {
        tracing::info!(test_suite = suite_name, test_count = tests, concurrency, "Executing test suite");
    }

    fn suite_finished(&self, suite_name: &str, passed: usize, failed: usize, duration: Duration) {
        tracing::info!(
            test_suite = suite_name,
            passed,
            failed,
            duration = ?duration,
            "Test suite finished"
        );
    }
}
