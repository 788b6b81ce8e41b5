//! WafGuard Domain - Core test runner types
//!
//! This crate defines the data model shared by the executor, the validator
//! and the suite runner. All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod request;
pub mod response;
pub mod suite;
pub mod testing;

mod duration;

pub use error::{DomainError, DomainResult};
pub use request::{HttpMethod, RequestSpec};
pub use response::{ResponseSnapshot, StatusCode};
pub use suite::{
    BodyExpectation, BodyRule, DEFAULT_TIMEOUT, ExpectationSpec, Target, TestCase, TestSuite,
    resolve_url,
};
pub use url::Url;
pub use testing::{SuiteOutcome, TestOutcome, TestStatus, ValidationResult};
