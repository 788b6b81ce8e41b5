//! Run configuration.

/// Settings the suite runner is constructed with.
///
/// Built by the caller (usually from command-line flags) and passed in
/// explicitly; nothing here is read from process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Maximum number of requests in flight per suite. `0` and `1` both
    /// mean strictly sequential execution in input order.
    pub concurrency: usize,
}

impl RunConfig {
    /// One test at a time, in input order.
    #[must_use]
    pub const fn sequential() -> Self {
        Self { concurrency: 1 }
    }

    /// Up to `limit` tests in flight.
    #[must_use]
    pub const fn concurrent(limit: usize) -> Self {
        Self { concurrency: limit }
    }

    /// Returns true if tests run one at a time.
    #[must_use]
    pub const fn is_sequential(&self) -> bool {
        self.concurrency <= 1
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::sequential()
    }
}
