//! Application use cases (run orchestration).

mod run_suite;

pub use run_suite::{COMBINED_SUITE_NAME, SuiteRunner};
