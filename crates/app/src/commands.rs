//! Subcommand implementations.

use std::sync::Arc;

use anyhow::Context;
use wafguard_application::{CancellationReceiver, SuiteRunner};
use wafguard_domain::SuiteOutcome;
use wafguard_infrastructure::{
    ReqwestHttpExecutor, Reporter, SuiteParser, SystemClock, TracingEventSink,
};

use crate::cli::{RunArgs, ValidateArgs};

/// Parses every suite under `args.path`, runs them and reports.
///
/// Returns the combined outcome, or `None` when the path held no suites.
/// A failed report save is logged and does not fail the run.
///
/// # Errors
///
/// Returns an error if a suite file cannot be read or is invalid, or the
/// report cannot be printed.
pub async fn run(args: &RunArgs, cancel: &CancellationReceiver) -> anyhow::Result<Option<SuiteOutcome>> {
    tracing::info!(
        path = %args.path.display(),
        concurrent = args.concurrent,
        format = ?args.format,
        "Starting WAF tests"
    );

    let suites = SuiteParser::new()
        .parse_path(&args.path)
        .await
        .context("failed to parse tests")?;
    if suites.is_empty() {
        tracing::warn!(path = %args.path.display(), "No tests found");
        return Ok(None);
    }

    let events = Arc::new(TracingEventSink);
    let executor = ReqwestHttpExecutor::new()
        .context("failed to build HTTP client")?
        .with_events(events.clone());
    let runner = SuiteRunner::new(executor, Arc::new(SystemClock::new()), args.run_config())
        .with_events(events);
    let reporter = Arc::new(Reporter::new(args.report_config()));

    let outcome = runner.run_combined(&suites, reporter.clone(), cancel).await;
    if outcome.cancelled() {
        tracing::warn!(completed = outcome.total_tests(), "Run cancelled");
    }

    reporter.print_suite(&outcome).context("failed to print report")?;
    if let Err(e) = reporter.save_suite(&outcome).await {
        tracing::error!(error = %e, "Failed to save report");
    }

    Ok(Some(outcome))
}

/// Parses and validates every suite under `args.path` without running
/// anything. Returns the number of valid suite files.
///
/// # Errors
///
/// Returns the first read or validation error.
pub async fn validate(args: &ValidateArgs) -> anyhow::Result<usize> {
    tracing::info!(path = %args.path.display(), "Validating WAF test files");

    let suites = SuiteParser::new()
        .parse_path(&args.path)
        .await
        .context("validation failed")?;

    let tests: usize = suites.iter().map(|s| s.tests.len()).sum();
    tracing::info!(file_count = suites.len(), test_count = tests, "All test files are valid");
    Ok(suites.len())
}
