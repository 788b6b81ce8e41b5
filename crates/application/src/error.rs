//! Application error types

use thiserror::Error;

/// Programming errors detected at an API boundary.
///
/// These are never the result of a bad response or a bad suite file; a
/// caller that receives one has broken a precondition and should treat it
/// like a failed assertion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FaultError {
    /// Batch validation received input slices of different lengths.
    #[error(
        "mismatched batch lengths: {responses} responses, {expectations} expectations, {labels} labels"
    )]
    MismatchedBatch {
        /// Number of responses supplied.
        responses: usize,
        /// Number of expectations supplied.
        expectations: usize,
        /// Number of labels supplied.
        labels: usize,
    },
}
