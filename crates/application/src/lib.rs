//! WafGuard Application - Validation and suite orchestration
//!
//! This crate defines the application layer with:
//! - Port traits (HTTP execution, run events, outcome streaming, clock)
//! - The response validator
//! - The suite runner use case
//! - Application-level error handling

pub mod config;
pub mod error;
pub mod ports;
pub mod use_cases;
pub mod validator;

pub use config::RunConfig;
pub use error::FaultError;
pub use ports::{
    CancellationReceiver, CancellationToken, Clock, Dispatch, ExecutorError, HttpExecutor,
    NullEventSink, NullOutcomeListener, OutcomeListener, RunEventSink,
};
pub use use_cases::{COMBINED_SUITE_NAME, SuiteRunner};
pub use validator::ResponseValidator;
