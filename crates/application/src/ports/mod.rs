//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the runner core and the outside
//! world. Each port is a trait implemented by adapters in the
//! infrastructure layer (or by test doubles).

mod cancellation;
mod clock;
mod events;
mod http_executor;
mod outcome_listener;

pub use cancellation::{CancellationReceiver, CancellationToken};
pub use clock::Clock;
pub use events::{NullEventSink, RunEventSink};
pub use http_executor::{Dispatch, ExecutorError, HttpExecutor};
pub use outcome_listener::{NullOutcomeListener, OutcomeListener};
