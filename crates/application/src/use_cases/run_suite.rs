//! Run suite use case.
//!
//! Drives every test of a suite through the executor and the validator,
//! either one at a time or with a bounded number of requests in flight.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use wafguard_domain::{SuiteOutcome, Target, TestCase, TestOutcome, TestSuite};

use crate::config::RunConfig;
use crate::ports::{
    CancellationReceiver, Clock, Dispatch, HttpExecutor, NullEventSink, OutcomeListener,
    RunEventSink,
};
use crate::validator::ResponseValidator;

/// Name given to the outcome of [`SuiteRunner::run_combined`].
pub const COMBINED_SUITE_NAME: &str = "All Tests";

/// Use case for running test suites.
///
/// Once cancellation fires no new test is started; tests already in
/// flight observe the signal, fail fast and are still recorded.
pub struct SuiteRunner<E: HttpExecutor> {
    executor: Arc<E>,
    validator: ResponseValidator,
    clock: Arc<dyn Clock>,
    events: Arc<dyn RunEventSink>,
    config: RunConfig,
}

impl<E: HttpExecutor> std::fmt::Debug for SuiteRunner<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteRunner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<E: HttpExecutor + 'static> SuiteRunner<E> {
    /// Creates a runner that reports no events.
    #[must_use]
    pub fn new(executor: E, clock: Arc<dyn Clock>, config: RunConfig) -> Self {
        Self {
            executor: Arc::new(executor),
            validator: ResponseValidator::default(),
            clock,
            events: Arc::new(NullEventSink),
            config,
        }
    }

    /// Routes runner and validator events to `events`.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn RunEventSink>) -> Self {
        self.validator = ResponseValidator::new(Arc::clone(&events));
        self.events = events;
        self
    }

    /// The configuration this runner was built with.
    #[must_use]
    pub const fn config(&self) -> RunConfig {
        self.config
    }

    /// Runs every test of `suite` against its target.
    ///
    /// Each outcome is handed to `listener` as soon as it is recorded.
    /// Sequential runs keep input order; concurrent runs record outcomes
    /// in completion order.
    pub async fn run(
        &self,
        suite: &TestSuite,
        listener: Arc<dyn OutcomeListener>,
        cancel: &CancellationReceiver,
    ) -> SuiteOutcome {
        self.events
            .suite_started(&suite.name, suite.tests.len(), self.config.concurrency);
        let start = Instant::now();

        let (tests, stopped_early) = if self.config.is_sequential() {
            self.run_sequential(suite, listener.as_ref(), cancel).await
        } else {
            self.run_concurrent(suite, listener, cancel).await
        };

        let outcome = SuiteOutcome::from_outcomes(&suite.name, tests, start.elapsed(), self.clock.now())
            .with_target(suite.target.clone())
            .with_cancelled(stopped_early);
        self.events.suite_finished(
            outcome.suite_name(),
            outcome.passed_tests(),
            outcome.failed_tests(),
            outcome.duration(),
        );
        outcome
    }

    /// Runs several suites, each against its own target, and merges their
    /// outcomes into one named [`COMBINED_SUITE_NAME`].
    ///
    /// The concurrency bound applies per suite. Outcomes are concatenated
    /// in suite order; the first suite's target is kept for display.
    pub async fn run_combined(
        &self,
        suites: &[TestSuite],
        listener: Arc<dyn OutcomeListener>,
        cancel: &CancellationReceiver,
    ) -> SuiteOutcome {
        let start = Instant::now();
        let mut tests = Vec::with_capacity(suites.iter().map(|s| s.tests.len()).sum());
        let mut cancelled = false;

        for suite in suites {
            let outcome = self.run(suite, Arc::clone(&listener), cancel).await;
            cancelled |= outcome.cancelled();
            tests.extend(outcome.into_tests());
        }

        let mut combined =
            SuiteOutcome::from_outcomes(COMBINED_SUITE_NAME, tests, start.elapsed(), self.clock.now())
                .with_cancelled(cancelled);
        if let Some(first) = suites.first() {
            combined = combined.with_target(first.target.clone());
        }
        combined
    }

    /// Returns the recorded outcomes and whether cancellation kept any
    /// test from starting.
    async fn run_sequential(
        &self,
        suite: &TestSuite,
        listener: &dyn OutcomeListener,
        cancel: &CancellationReceiver,
    ) -> (Vec<TestOutcome>, bool) {
        let mut outcomes = Vec::with_capacity(suite.tests.len());
        for test in &suite.tests {
            if cancel.is_cancelled() {
                return (outcomes, true);
            }
            let outcome = self.test_context().run_test(test, &suite.target, cancel).await;
            listener.on_test_outcome(&outcome);
            outcomes.push(outcome);
        }
        (outcomes, false)
    }

    async fn run_concurrent(
        &self,
        suite: &TestSuite,
        listener: Arc<dyn OutcomeListener>,
        cancel: &CancellationReceiver,
    ) -> (Vec<TestOutcome>, bool) {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.min(Semaphore::MAX_PERMITS)));
        let results = Arc::new(Mutex::new(Vec::with_capacity(suite.tests.len())));
        let target = Arc::new(suite.target.clone());
        let mut watch = cancel.clone();
        let mut tasks = JoinSet::new();
        let mut stopped_early = false;

        for test in &suite.tests {
            let permit = tokio::select! {
                biased;
                () = watch.cancelled() => {
                    stopped_early = true;
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let context = self.test_context();
            let test = test.clone();
            let target = Arc::clone(&target);
            let listener = Arc::clone(&listener);
            let results = Arc::clone(&results);
            let cancel = cancel.clone();

            tasks.spawn(async move {
                let _permit = permit;
                let outcome = context.run_test(&test, &target, &cancel).await;
                listener.on_test_outcome(&outcome);
                results.lock().push(outcome);
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined
                && e.is_panic()
            {
                std::panic::resume_unwind(e.into_panic());
            }
        }

        let outcomes = std::mem::take(&mut *results.lock());
        (outcomes, stopped_early)
    }

    fn test_context(&self) -> TestContext<E> {
        TestContext {
            executor: Arc::clone(&self.executor),
            validator: self.validator.clone(),
            clock: Arc::clone(&self.clock),
            events: Arc::clone(&self.events),
        }
    }
}

/// The shared handles one test needs, owned so it can move into a task.
struct TestContext<E> {
    executor: Arc<E>,
    validator: ResponseValidator,
    clock: Arc<dyn Clock>,
    events: Arc<dyn RunEventSink>,
}

impl<E: HttpExecutor> TestContext<E> {
    async fn run_test(&self, test: &TestCase, target: &Target, cancel: &CancellationReceiver) -> TestOutcome {
        let dispatch = Dispatch {
            test_name: &test.name,
            request: &test.request,
            base_url: &target.base_url,
            timeout: target.effective_timeout(),
        };
        let start = Instant::now();

        match self.executor.execute(&dispatch, cancel).await {
            Ok(response) => {
                let validation = self.validator.validate(&response, &test.expected, &test.name);
                TestOutcome::completed(
                    test.name.clone(),
                    test.request.clone(),
                    response,
                    validation,
                    start.elapsed(),
                    self.clock.now(),
                )
            }
            Err(error) => {
                let message = error.to_string();
                self.events.test_failed(&test.name, &message);
                TestOutcome::transport_failure(
                    test.name.clone(),
                    test.request.clone(),
                    message,
                    start.elapsed(),
                    self.clock.now(),
                )
            }
        }
    }
}
