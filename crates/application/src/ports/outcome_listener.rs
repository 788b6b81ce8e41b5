//! Streaming hook for per-test outcomes.

use wafguard_domain::TestOutcome;

/// Receives each [`TestOutcome`] as soon as it is recorded.
///
/// In concurrent runs this is called from several tasks, in completion
/// order.
pub trait OutcomeListener: Send + Sync {
    /// Called once per finished test.
    fn on_test_outcome(&self, outcome: &TestOutcome);
}

/// Listener that ignores outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutcomeListener;

impl OutcomeListener for NullOutcomeListener {
    fn on_test_outcome(&self, _outcome: &TestOutcome) {}
}
