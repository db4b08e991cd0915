use crate::config::schema::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while patching a target file.
///
/// Unmatched substitution rules are not errors; they are recorded as
/// warnings in [`crate::substitute::SubstitutionOutcome`].
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Cannot read {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File is not valid UTF-8: {path}")]
    InvalidUtf8 { path: PathBuf },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid substitution pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Range [{start}, {end}) failed verification: {reason}")]
    RangeVerification {
        start: usize,
        end: usize,
        reason: String,
    },

    #[error("Invalid fix plan: {0}")]
    InvalidPlan(#[from] ValidationError),

    #[error("Invalid hash value: {0}")]
    InvalidHash(String),
}
