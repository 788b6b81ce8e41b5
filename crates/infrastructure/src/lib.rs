//! WafGuard Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus the suite file parser and
//! the result reporter.

pub mod adapters;
pub mod parser;
pub mod reporter;

pub use adapters::{ReqwestHttpExecutor, SystemClock, TracingEventSink};
pub use parser::{DurationError, KIND, ParseError, SuiteParser, parse_duration};
pub use reporter::{ReportConfig, ReportError, ReportFormat, Reporter, to_json_stable};
