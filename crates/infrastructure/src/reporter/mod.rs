//! Result reporting.
//!
//! Prints per-test outcomes as they stream in, prints the final suite
//! summary, and optionally saves the summary as JSON.

mod json;

use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use parking_lot::Mutex;
use thiserror::Error;
use wafguard_application::ports::OutcomeListener;
use wafguard_domain::{SuiteOutcome, TestOutcome};

pub use self::json::to_json_stable;

const SUITE_RULE: &str = "====================================";
const TEST_RULE: &str = "---";

/// Errors that can occur while rendering or writing reports.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Serialized output was not valid UTF-8.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Writing to the console failed.
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),

    /// Writing the report file failed.
    #[error("failed to write report to {}: {source}", path.display())]
    Save {
        /// Destination path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// How reports are printed to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable blocks.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl ReportFormat {
    /// Returns the format name as used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown report format '{other}' (expected text or json)")),
        }
    }
}

/// Reporter settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportConfig {
    /// Console format.
    pub format: ReportFormat,
    /// Where to save the suite report, if anywhere.
    pub output: Option<PathBuf>,
}

/// Console and file reporter.
///
/// Shared between concurrently finishing tests; each outcome is written
/// as one block under a lock so blocks never interleave.
pub struct Reporter {
    config: ReportConfig,
    out: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Reporter {
    /// Creates a reporter that prints to stdout.
    #[must_use]
    pub fn new(config: ReportConfig) -> Self {
        Self::with_writer(config, io::stdout())
    }

    /// Creates a reporter that prints to `writer`.
    #[must_use]
    pub fn with_writer(config: ReportConfig, writer: impl Write + Send + 'static) -> Self {
        Self {
            config,
            out: Mutex::new(Box::new(writer)),
        }
    }

    /// The reporter's settings.
    #[must_use]
    pub const fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Renders one test outcome in the configured format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_test(&self, outcome: &TestOutcome) -> Result<String, ReportError> {
        match self.config.format {
            ReportFormat::Json => to_json_stable(outcome),
            ReportFormat::Text => Ok(render_test_text(outcome)),
        }
    }

    /// Renders the suite summary in the configured format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_suite(&self, outcome: &SuiteOutcome) -> Result<String, ReportError> {
        match self.config.format {
            ReportFormat::Json => to_json_stable(outcome),
            ReportFormat::Text => Ok(render_suite_text(outcome)),
        }
    }

    /// Prints one test outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn print_test(&self, outcome: &TestOutcome) -> Result<(), ReportError> {
        let rendered = self.render_test(outcome)?;
        self.emit(&rendered)
    }

    /// Prints the suite summary followed by every test.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn print_suite(&self, outcome: &SuiteOutcome) -> Result<(), ReportError> {
        let rendered = self.render_suite(outcome)?;
        self.emit(&rendered)
    }

    /// Saves the suite outcome as stable JSON when an output path is set.
    ///
    /// The file is always JSON, whatever the console format. Returns the
    /// path written, or `None` when no output is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub async fn save_suite(&self, outcome: &SuiteOutcome) -> Result<Option<&Path>, ReportError> {
        let Some(path) = self.config.output.as_deref() else {
            return Ok(None);
        };

        let json = to_json_stable(outcome)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|source| ReportError::Save {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::info!(file = %path.display(), format = %self.config.format, "Report saved to file");
        Ok(Some(path))
    }

    fn emit(&self, rendered: &str) -> Result<(), ReportError> {
        let mut out = self.out.lock();
        out.write_all(rendered.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

impl OutcomeListener for Reporter {
    fn on_test_outcome(&self, outcome: &TestOutcome) {
        if let Err(e) = self.print_test(outcome) {
            tracing::error!(test_name = outcome.test_name(), error = %e, "Failed to print test report");
        }
    }
}

fn render_test_text(outcome: &TestOutcome) -> String {
    let mut text = String::new();
    let request = outcome.request();

    let _ = writeln!(text, "Test: {}", outcome.test_name());
    let _ = writeln!(text, "Status: {}", outcome.status());
    let _ = writeln!(text, "Duration: {:?}", outcome.duration());
    let _ = writeln!(text, "Request: {} {}", request.method, request.path);

    match (outcome.response(), outcome.transport_error()) {
        (Some(response), _) => {
            let _ = writeln!(text, "Response Status: {}", response.status_code());
        }
        (None, Some(error)) => {
            let _ = writeln!(text, "Error: {error}");
        }
        (None, None) => {}
    }

    if let Some(validation) = outcome.validation() {
        write_list(&mut text, "Validation Errors:", validation.errors());
        write_list(&mut text, "Validation Warnings:", validation.warnings());
    }

    let _ = writeln!(text, "{TEST_RULE}");
    text
}

fn render_suite_text(outcome: &SuiteOutcome) -> String {
    let mut text = String::new();

    let _ = writeln!(text, "Suite: {}", outcome.suite_name());
    if let Some(target) = outcome.target() {
        let _ = writeln!(text, "Target: {}", target.base_url);
    }
    let _ = writeln!(text, "Total Tests: {}", outcome.total_tests());
    let _ = writeln!(text, "Passed: {}", outcome.passed_tests());
    let _ = writeln!(text, "Failed: {}", outcome.failed_tests());
    let _ = writeln!(text, "Duration: {:?}", outcome.duration());
    let _ = writeln!(text, "Success Rate: {:.2}%", outcome.success_rate());
    if outcome.cancelled() {
        let _ = writeln!(text, "Cancelled: run stopped before every test was started");
    }
    let _ = writeln!(text, "{SUITE_RULE}");

    for test in outcome.tests() {
        text.push_str(&render_test_text(test));
    }
    text
}

fn write_list(text: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(text, "{heading}");
    for item in items {
        let _ = writeln!(text, "  - {item}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use wafguard_domain::{RequestSpec, ResponseSnapshot, Target, ValidationResult};

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    fn timestamp() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn failing_outcome() -> TestOutcome {
        let mut validation = ValidationResult::new();
        validation.push_error("Status code mismatch: expected one of [403], got 200");
        TestOutcome::completed(
            "blocks sqli",
            RequestSpec::get("/search?q=1"),
            ResponseSnapshot::new(200, BTreeMap::new(), b"welcome", Duration::from_millis(12)),
            validation,
            Duration::from_millis(15),
            timestamp(),
        )
    }

    fn transport_outcome() -> TestOutcome {
        TestOutcome::transport_failure(
            "unreachable",
            RequestSpec::get("/"),
            "connection failed: connection refused",
            Duration::from_millis(3),
            timestamp(),
        )
    }

    #[test]
    fn test_text_test_block() {
        let reporter = Reporter::with_writer(ReportConfig::default(), io::sink());

        let text = reporter.render_test(&failing_outcome()).unwrap();

        assert_eq!(
            text,
            "Test: blocks sqli\n\
             Status: FAIL\n\
             Duration: 15ms\n\
             Request: GET /search?q=1\n\
             Response Status: 200 OK\n\
             Validation Errors:\n  \
             - Status code mismatch: expected one of [403], got 200\n\
             ---\n"
        );
    }

    #[test]
    fn test_text_transport_failure_shows_error() {
        let reporter = Reporter::with_writer(ReportConfig::default(), io::sink());

        let text = reporter.render_test(&transport_outcome()).unwrap();

        assert!(text.contains("Status: FAIL\n"));
        assert!(text.contains("Error: connection failed: connection refused\n"));
        assert!(!text.contains("Response Status"));
    }

    #[test]
    fn test_suite_summary_text() {
        let reporter = Reporter::with_writer(ReportConfig::default(), io::sink());
        let outcome = SuiteOutcome::from_outcomes(
            "All Tests",
            vec![failing_outcome(), transport_outcome()],
            Duration::from_millis(40),
            timestamp(),
        )
        .with_target(Target::new("https://example.com"));

        let text = reporter.render_suite(&outcome).unwrap();

        assert!(text.starts_with(
            "Suite: All Tests\n\
             Target: https://example.com\n\
             Total Tests: 2\n\
             Passed: 0\n\
             Failed: 2\n\
             Duration: 40ms\n\
             Success Rate: 0.00%\n\
             ====================================\n"
        ));
        assert_eq!(text.matches("---\n").count(), 2);
    }

    #[test]
    fn test_empty_suite_success_rate() {
        let reporter = Reporter::with_writer(ReportConfig::default(), io::sink());
        let outcome = SuiteOutcome::from_outcomes("empty", Vec::new(), Duration::ZERO, timestamp());

        let text = reporter.render_suite(&outcome).unwrap();

        assert!(text.contains("Success Rate: 0.00%\n"));
    }

    #[test]
    fn test_json_suite_is_stable() {
        let config = ReportConfig {
            format: ReportFormat::Json,
            output: None,
        };
        let reporter = Reporter::with_writer(config, io::sink());
        let outcome =
            SuiteOutcome::from_outcomes("json", vec![failing_outcome()], Duration::from_millis(20), timestamp());

        let json = reporter.render_suite(&outcome).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(json.ends_with("}\n"));
        assert_eq!(value["suite_name"], "json");
        assert_eq!(value["failed_tests"], 1);
        assert_eq!(value["tests"][0]["status"], "FAIL");
        assert_eq!(value["tests"][0]["validation_result"]["passed"], false);
        assert_eq!(json, reporter.render_suite(&outcome).unwrap());
    }

    #[test]
    fn test_listener_prints_each_outcome() {
        let buffer = SharedBuffer::default();
        let reporter = Reporter::with_writer(ReportConfig::default(), buffer.clone());

        reporter.on_test_outcome(&failing_outcome());
        reporter.on_test_outcome(&transport_outcome());

        let printed = buffer.contents();
        assert!(printed.starts_with("Test: blocks sqli\n"));
        assert!(printed.contains("Test: unreachable\n"));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert_eq!("TEXT".parse::<ReportFormat>(), Ok(ReportFormat::Text));
        assert!("xml".parse::<ReportFormat>().is_err());
    }

    #[tokio::test]
    async fn test_save_suite_writes_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let reporter = Reporter::with_writer(
            ReportConfig {
                format: ReportFormat::Text,
                output: Some(path.clone()),
            },
            io::sink(),
        );
        let outcome =
            SuiteOutcome::from_outcomes("saved", vec![transport_outcome()], Duration::from_millis(5), timestamp());

        let written = reporter.save_suite(&outcome).await.unwrap();

        assert_eq!(written, Some(path.as_path()));
        let saved = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(saved, to_json_stable(&outcome).unwrap());
    }

    #[tokio::test]
    async fn test_save_suite_without_output_is_noop() {
        let reporter = Reporter::with_writer(ReportConfig::default(), io::sink());
        let outcome = SuiteOutcome::from_outcomes("unsaved", Vec::new(), Duration::ZERO, timestamp());

        assert_eq!(reporter.save_suite(&outcome).await.unwrap(), None);
    }
}
