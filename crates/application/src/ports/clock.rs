//! Clock port for outcome timestamps

use chrono::{DateTime, Utc};

/// Port for getting the current time.
///
/// Outcomes are stamped through this trait so tests can pin timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
