//! Validation verdicts and run outcomes.
//!
//! Every type here is built once from completed work and is read-only
//! afterwards: pass/fail flags and suite counters are derived in the
//! constructors, never assigned by callers.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::duration;
use crate::request::RequestSpec;
use crate::response::ResponseSnapshot;
use crate::suite::Target;

/// Outcome of checking one response against one expectation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates an empty (passing) result.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Records a rule violation.
    pub fn push_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Records a non-fatal remark.
    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// True iff no error was recorded.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Warnings in the order they were found.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationResult", 3)?;
        state.serialize_field("passed", &self.passed())?;
        state.serialize_field("errors", &self.errors)?;
        state.serialize_field("warnings", &self.warnings)?;
        state.end()
    }
}

/// Final verdict of a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    /// Response received and every rule held.
    Pass,
    /// Transport failure or at least one validation error.
    Fail,
}

impl TestStatus {
    /// Returns the report label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestOutcome {
    test_name: String,
    status: TestStatus,
    #[serde(rename = "duration_ms", with = "duration::millis")]
    duration: Duration,
    request: RequestSpec,
    response: Option<ResponseSnapshot>,
    validation_result: Option<ValidationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transport_error: Option<String>,
    timestamp: DateTime<Utc>,
}

impl TestOutcome {
    /// Outcome for a test whose response was received and validated.
    #[must_use]
    pub fn completed(
        test_name: impl Into<String>,
        request: RequestSpec,
        response: ResponseSnapshot,
        validation: ValidationResult,
        duration: Duration,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let status = if validation.passed() {
            TestStatus::Pass
        } else {
            TestStatus::Fail
        };
        Self {
            test_name: test_name.into(),
            status,
            duration,
            request,
            response: Some(response),
            validation_result: Some(validation),
            transport_error: None,
            timestamp,
        }
    }

    /// Outcome for a test whose request never produced a response.
    #[must_use]
    pub fn transport_failure(
        test_name: impl Into<String>,
        request: RequestSpec,
        error: impl Into<String>,
        duration: Duration,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            status: TestStatus::Fail,
            duration,
            request,
            response: None,
            validation_result: None,
            transport_error: Some(error.into()),
            timestamp,
        }
    }

    /// The test's name, which identifies it even when outcomes arrive out of order.
    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// PASS or FAIL.
    #[must_use]
    pub const fn status(&self) -> TestStatus {
        self.status
    }

    /// Convenience for `status() == Pass`.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Pass
    }

    /// Time from dispatch to the end of validation.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// The request that was sent.
    #[must_use]
    pub const fn request(&self) -> &RequestSpec {
        &self.request
    }

    /// The response, absent on transport failure.
    #[must_use]
    pub const fn response(&self) -> Option<&ResponseSnapshot> {
        self.response.as_ref()
    }

    /// The validation verdict, absent on transport failure.
    #[must_use]
    pub const fn validation(&self) -> Option<&ValidationResult> {
        self.validation_result.as_ref()
    }

    /// The transport error message, if the request failed.
    #[must_use]
    pub fn transport_error(&self) -> Option<&str> {
        self.transport_error.as_deref()
    }

    /// All errors for this test: the transport error alone, or the
    /// validation errors in rule order.
    #[must_use]
    pub fn errors(&self) -> Vec<&str> {
        match (&self.transport_error, &self.validation_result) {
            (Some(error), _) => vec![error.as_str()],
            (None, Some(validation)) => validation.errors().iter().map(String::as_str).collect(),
            (None, None) => Vec::new(),
        }
    }

    /// Validation warnings, empty on transport failure.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        self.validation_result
            .as_ref()
            .map(ValidationResult::warnings)
            .unwrap_or_default()
    }

    /// When the outcome was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Aggregated result of a suite run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteOutcome {
    suite_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<Target>,
    total_tests: usize,
    passed_tests: usize,
    failed_tests: usize,
    #[serde(rename = "duration_ms", with = "duration::millis")]
    duration: Duration,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    cancelled: bool,
    tests: Vec<TestOutcome>,
    timestamp: DateTime<Utc>,
}

impl SuiteOutcome {
    /// Builds the summary from completed outcomes.
    ///
    /// `duration` is the wall-clock span of the run, not the sum of test
    /// durations, which overlap in concurrent mode.
    #[must_use]
    pub fn from_outcomes(
        suite_name: impl Into<String>,
        tests: Vec<TestOutcome>,
        duration: Duration,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let passed_tests = tests.iter().filter(|t| t.passed()).count();
        Self {
            suite_name: suite_name.into(),
            target: None,
            total_tests: tests.len(),
            passed_tests,
            failed_tests: tests.len() - passed_tests,
            duration,
            cancelled: false,
            tests,
            timestamp,
        }
    }

    /// Records the target the run was made against, for display only.
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Marks the run as stopped early by cancellation.
    #[must_use]
    pub const fn with_cancelled(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Suite name.
    #[must_use]
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    /// Informational target.
    #[must_use]
    pub const fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// Number of recorded outcomes.
    #[must_use]
    pub const fn total_tests(&self) -> usize {
        self.total_tests
    }

    /// Number of passing outcomes.
    #[must_use]
    pub const fn passed_tests(&self) -> usize {
        self.passed_tests
    }

    /// Number of failing outcomes.
    #[must_use]
    pub const fn failed_tests(&self) -> usize {
        self.failed_tests
    }

    /// Wall-clock duration of the run.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// True if cancellation stopped the run before every test was scheduled.
    #[must_use]
    pub const fn cancelled(&self) -> bool {
        self.cancelled
    }

    /// Outcomes in recording order.
    #[must_use]
    pub fn tests(&self) -> &[TestOutcome] {
        &self.tests
    }

    /// Consumes the summary, returning its outcomes.
    #[must_use]
    pub fn into_tests(self) -> Vec<TestOutcome> {
        self.tests
    }

    /// When the summary was built.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Percentage of passing tests, `0.0` for an empty run.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.total_tests == 0 {
            return 0.0;
        }
        self.passed_tests as f64 / self.total_tests as f64 * 100.0
    }
}
