//! Port implementations.

mod reqwest_executor;
mod system_clock;
mod tracing_sink;

pub use reqwest_executor::ReqwestHttpExecutor;
pub use system_clock::SystemClock;
pub use tracing_sink::TracingEventSink;
