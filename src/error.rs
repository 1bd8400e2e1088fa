//! Error types for parsing, field validation and recomputation.
//!
//! Field problems are reported as [`ValidationError`] and are always scoped
//! to one field. Everything else surfaces as [`AchError`]. Line numbers are
//! stored 0-based and displayed 1-based.

use thiserror::Error;

use crate::layout::{Layout, RecordKind};

/// A proposed value was rejected by a single field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("\"{name}\" is required.")]
    Required { name: &'static str },

    #[error("\"{name}\" must be {length} {} long.", characters(.length))]
    TooLong { name: &'static str, length: usize },

    #[error("\"{name}\" does not match the pattern {pattern}")]
    PatternMismatch { name: &'static str, pattern: String },
}

fn characters(length: &usize) -> &'static str {
    if *length == 1 { "character" } else { "characters" }
}

/// Errors raised by document operations.
#[derive(Debug, Error)]
pub enum AchError {
    #[error("unknown record type '{code}'")]
    UnknownRecordType { code: char },

    #[error("line {}: {source}", .line + 1)]
    Validation {
        line: usize,
        key: String,
        #[source]
        source: ValidationError,
    },

    #[error("line {}: record type '{code}' has no field '{key}'", .line + 1)]
    UnknownField { line: usize, code: char, key: String },

    #[error("line {} does not exist", .line + 1)]
    NoSuchLine { line: usize },

    #[error("line {} has no segment {}", .line + 1, .part + 1)]
    NoSuchPart { line: usize, part: usize },

    #[error("line {}: \"{name}\" is computed and cannot be edited", .line + 1)]
    ComputedField { line: usize, name: &'static str },

    #[error("line {} is not inside a batch", .line + 1)]
    NotInBatch { line: usize },

    #[error("line {} is not a batch header", .line + 1)]
    NotBatchHeader { line: usize },

    #[error("document has no {0:?} record")]
    MissingRecord(RecordKind),

    #[error("\"{name}\" overflow: {value} does not fit in {length} digits")]
    Overflow {
        name: &'static str,
        value: u64,
        length: usize,
    },

    #[error("transaction row {row}: {reason}")]
    MalformedImportRow { row: usize, reason: String },

    #[error("{0} is not supported for {1} files")]
    Unsupported(&'static str, Layout),

    #[error("{} aggregate updates failed: {}", .0.len(), joined(.0))]
    Recompute(Vec<AchError>),

    #[error("script line {line}: {reason}")]
    Script { line: usize, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AchError>;

fn joined(errors: &[AchError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
