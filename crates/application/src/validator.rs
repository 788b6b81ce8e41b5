//! Response validation.
//!
//! Checks a [`ResponseSnapshot`] against an [`ExpectationSpec`] and
//! collects every mismatch as a human-readable error.

use std::sync::Arc;

use regex::Regex;
use wafguard_domain::{BodyRule, ExpectationSpec, ResponseSnapshot, ValidationResult};

use crate::error::FaultError;
use crate::ports::{NullEventSink, RunEventSink};

/// Validates responses against expectations.
///
/// Status, header and body checks always all run, in that order, so one
/// result can carry errors from every group.
#[derive(Clone)]
pub struct ResponseValidator {
    events: Arc<dyn RunEventSink>,
}

impl std::fmt::Debug for ResponseValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseValidator").finish_non_exhaustive()
    }
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self::new(Arc::new(NullEventSink))
    }
}

impl ResponseValidator {
    /// Creates a validator that reports to `events`.
    #[must_use]
    pub fn new(events: Arc<dyn RunEventSink>) -> Self {
        Self { events }
    }

    /// Validates one response.
    #[must_use]
    pub fn validate(
        &self,
        response: &ResponseSnapshot,
        expected: &ExpectationSpec,
        test_name: &str,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();

        Self::check_status(&mut result, response, expected);
        Self::check_headers(&mut result, response, expected);
        Self::check_body(&mut result, response, expected);

        self.events.validation_completed(
            test_name,
            result.passed(),
            result.errors().len(),
            result.warnings().len(),
        );
        result
    }

    /// Validates responses pairwise with their expectations and labels.
    ///
    /// # Errors
    ///
    /// Returns [`FaultError::MismatchedBatch`] if the three slices differ in
    /// length.
    pub fn validate_multiple(
        &self,
        responses: &[ResponseSnapshot],
        expectations: &[ExpectationSpec],
        labels: &[&str],
    ) -> Result<Vec<ValidationResult>, FaultError> {
        if responses.len() != expectations.len() || responses.len() != labels.len() {
            return Err(FaultError::MismatchedBatch {
                responses: responses.len(),
                expectations: expectations.len(),
                labels: labels.len(),
            });
        }

        Ok(responses
            .iter()
            .zip(expectations)
            .zip(labels)
            .map(|((response, expected), label)| self.validate(response, expected, label))
            .collect())
    }

    fn check_status(result: &mut ValidationResult, response: &ResponseSnapshot, expected: &ExpectationSpec) {
        if expected.status.is_empty() {
            result.push_warning("No expected status codes defined");
            return;
        }
        if expected.status.contains(&response.status) {
            return;
        }

        let codes: Vec<String> = expected.status.iter().map(ToString::to_string).collect();
        result.push_error(format!(
            "Status code mismatch: expected one of [{}], got {}",
            codes.join(" "),
            response.status
        ));
    }

    fn check_headers(result: &mut ValidationResult, response: &ResponseSnapshot, expected: &ExpectationSpec) {
        for (name, want) in &expected.headers {
            match response.header(name) {
                None => result.push_error(format!("Missing expected header: {name}")),
                Some(actual) if !actual.contains(want.as_str()) => result.push_error(format!(
                    "Header value mismatch for {name}: expected to contain '{want}', got '{actual}'"
                )),
                Some(_) => {}
            }
        }
    }

    fn check_body(result: &mut ValidationResult, response: &ResponseSnapshot, expected: &ExpectationSpec) {
        let Some(body) = &expected.body else {
            return;
        };
        let actual = response.body.as_str();

        match body.rule() {
            BodyRule::Exact(want) => {
                if actual != want {
                    result.push_error(format!(
                        "Body exact match failed: expected '{want}', got '{actual}'"
                    ));
                }
            }
            BodyRule::Regex(pattern) => match Regex::new(pattern) {
                Ok(re) if re.is_match(actual) => {}
                Ok(_) => result.push_error(format!(
                    "Body regex match failed: pattern '{pattern}' did not match response body"
                )),
                Err(e) => result.push_error(format!("Invalid regex pattern '{pattern}': {e}")),
            },
            BodyRule::Substrings {
                contains,
                not_contains,
            } => {
                for needle in contains.iter().filter(|s| !actual.contains(s.as_str())) {
                    result.push_error(format!("Body should contain '{needle}' but it was not found"));
                }
                for needle in not_contains.iter().filter(|s| actual.contains(s.as_str())) {
                    result.push_error(format!("Body should not contain '{needle}' but it was found"));
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use wafguard_domain::{BodyExpectation, HttpMethod};

    use super::*;

    fn response(status: u16, body: &str) -> ResponseSnapshot {
        ResponseSnapshot::new(status, BTreeMap::new(), body.as_bytes(), Duration::from_millis(10))
    }

    fn with_headers(mut snapshot: ResponseSnapshot, headers: &[(&str, &str)]) -> ResponseSnapshot {
        snapshot.headers = headers
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        snapshot
    }

    #[test]
    fn test_status_and_contains_pass() {
        let validator = ResponseValidator::default();
        let expected = ExpectationSpec::status([200]).with_body(
            BodyExpectation::default().containing("success").containing("data"),
        );

        let result = validator.validate(
            &response(200, r#"{"message":"success","data":"test"}"#),
            &expected,
            "happy path",
        );

        assert!(result.passed());
        assert!(result.errors().is_empty());
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_status_mismatch_lists_expected_codes() {
        let validator = ResponseValidator::default();
        let result = validator.validate(&response(404, ""), &ExpectationSpec::status([200, 201]), "status");

        assert!(!result.passed());
        assert_eq!(
            result.errors(),
            ["Status code mismatch: expected one of [200 201], got 404"]
        );
    }

    #[test]
    fn test_not_contains_reports_present_text() {
        let validator = ResponseValidator::default();
        let expected = ExpectationSpec::status([200])
            .with_body(BodyExpectation::default().not_containing("error"));

        let result = validator.validate(&response(200, r#"{"message":"error occurred"}"#), &expected, "t");

        assert_eq!(result.errors(), ["Body should not contain 'error' but it was found"]);
    }

    #[test]
    fn test_regex_searches_body() {
        let validator = ResponseValidator::default();
        let anchored = ExpectationSpec::status([200])
            .with_body(BodyExpectation::default().matching(r#"^\{.*"id":\s*\d+.*\}$"#));
        assert!(validator.validate(&response(200, r#"{"id":123}"#), &anchored, "t").passed());

        let unanchored = ExpectationSpec::status([200])
            .with_body(BodyExpectation::default().matching(r"blocked"));
        assert!(
            validator
                .validate(&response(200, "request blocked by policy"), &unanchored, "t")
                .passed()
        );

        let result = validator.validate(&response(200, "allowed"), &unanchored, "t");
        assert_eq!(
            result.errors(),
            ["Body regex match failed: pattern 'blocked' did not match response body"]
        );
    }

    #[test]
    fn test_invalid_regex_is_single_error() {
        let validator = ResponseValidator::default();
        let expected = ExpectationSpec::status([200])
            .with_body(BodyExpectation::default().matching("[invalid"));

        let result = validator.validate(&response(200, "anything"), &expected, "t");

        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].starts_with("Invalid regex pattern '[invalid': "));
    }

    #[test]
    fn test_invalid_regex_keeps_status_errors() {
        let validator = ResponseValidator::default();
        let expected = ExpectationSpec::status([200])
            .with_body(BodyExpectation::default().matching("[invalid"));

        let result = validator.validate(&response(404, "anything"), &expected, "t");

        assert_eq!(result.errors().len(), 2);
        assert_eq!(result.errors()[0], "Status code mismatch: expected one of [200], got 404");
        assert!(result.errors()[1].starts_with("Invalid regex pattern '[invalid': "));
    }

    #[test]
    fn test_contains_and_not_contains_both_report() {
        let validator = ResponseValidator::default();
        let expected = ExpectationSpec::status([200]).with_body(
            BodyExpectation::default()
                .containing("blocked")
                .not_containing("sql"),
        );

        let result = validator.validate(&response(200, "sql error"), &expected, "t");

        assert_eq!(
            result.errors(),
            [
                "Body should contain 'blocked' but it was not found",
                "Body should not contain 'sql' but it was found",
            ]
        );
    }

    #[test]
    fn test_empty_status_is_warning_only() {
        let validator = ResponseValidator::default();
        let result = validator.validate(&response(500, ""), &ExpectationSpec::default(), "t");

        assert!(result.passed());
        assert_eq!(result.warnings(), ["No expected status codes defined"]);
    }

    #[test]
    fn test_exact_overrides_contains() {
        let validator = ResponseValidator::default();
        let expected = ExpectationSpec::status([200]).with_body(
            BodyExpectation::default()
                .exactly("ok")
                .containing("never evaluated"),
        );

        assert!(validator.validate(&response(200, "ok"), &expected, "t").passed());

        let result = validator.validate(&response(200, "ok!"), &expected, "t");
        assert_eq!(result.errors(), ["Body exact match failed: expected 'ok', got 'ok!'"]);
    }

    #[test]
    fn test_headers_match_name_case_insensitively() {
        let validator = ResponseValidator::default();
        let expected = ExpectationSpec::status([403])
            .with_header("Server", "cloudflare")
            .with_header("X-Block-Id", "")
            .with_header("Content-Type", "json");
        let snapshot = with_headers(
            response(403, ""),
            &[("server", "cloudflare-nginx"), ("content-type", "text/html")],
        );

        let result = validator.validate(&snapshot, &expected, "t");

        assert_eq!(
            result.errors(),
            [
                "Header value mismatch for Content-Type: expected to contain 'json', got 'text/html'",
                "Missing expected header: X-Block-Id",
            ]
        );
    }

    #[test]
    fn test_all_groups_run_in_order() {
        let validator = ResponseValidator::default();
        let expected = ExpectationSpec::status([403])
            .with_header("Server", "waf")
            .with_body(BodyExpectation::default().containing("blocked"));

        let result = validator.validate(&response(200, "welcome"), &expected, "t");

        assert_eq!(
            result.errors(),
            [
                "Status code mismatch: expected one of [403], got 200",
                "Missing expected header: Server",
                "Body should contain 'blocked' but it was not found",
            ]
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let validator = ResponseValidator::default();
        let expected = ExpectationSpec::status([403])
            .with_body(BodyExpectation::default().containing("blocked").not_containing("sql"));
        let snapshot = response(200, "sql error");

        let first = validator.validate(&snapshot, &expected, "t");
        let second = validator.validate(&snapshot, &expected, "t");

        assert_eq!(first, second);
        assert_eq!(first.passed(), first.errors().is_empty());
    }

    #[test]
    fn test_validate_multiple_rejects_mismatched_lengths() {
        let validator = ResponseValidator::default();
        let responses = [response(200, ""), response(403, "")];
        let expectations = [ExpectationSpec::status([200])];

        let result = validator.validate_multiple(&responses, &expectations, &["a", "b"]);

        assert_eq!(
            result,
            Err(FaultError::MismatchedBatch {
                responses: 2,
                expectations: 1,
                labels: 2,
            })
        );
    }

    #[test]
    fn test_validate_multiple_pairs_in_order() {
        let validator = ResponseValidator::default();
        let responses = [response(200, ""), response(403, "")];
        let expectations = [ExpectationSpec::status([200]), ExpectationSpec::status([200])];

        let results = validator
            .validate_multiple(&responses, &expectations, &["a", "b"])
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].passed());
        assert!(!results[1].passed());
    }

    #[derive(Default)]
    struct RecordingSink {
        validations: Mutex<Vec<(String, bool, usize, usize)>>,
    }

    impl RunEventSink for RecordingSink {
        fn test_started(&self, _test_name: &str, _method: HttpMethod, _path: &str) {}

        fn test_completed(&self, _test_name: &str, _status: u16, _duration: Duration) {}

        fn validation_completed(&self, test_name: &str, passed: bool, errors: usize, warnings: usize) {
            self.validations
                .lock()
                .push((test_name.to_string(), passed, errors, warnings));
        }
    }

    #[test]
    fn test_emits_validation_event() {
        let sink = Arc::new(RecordingSink::default());
        let validator = ResponseValidator::new(sink.clone());

        let _ = validator.validate(&response(404, ""), &ExpectationSpec::status([200]), "probe");

        assert_eq!(
            *sink.validations.lock(),
            vec![("probe".to_string(), false, 1, 0)]
        );
    }
}
