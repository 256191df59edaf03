//! Error types for AgriSense Core
//!
//! The engine itself is total and has no error type. Errors only arise when
//! free text from the completion service is checked against a response
//! contract; the adapter turns every one of them into a fallback.

use thiserror::Error;

use crate::contract::Shape;

/// Result type alias for contract checks
pub type Result<T> = std::result::Result<T, ContractError>;

/// Why a completion could not be turned into a structured result
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractError {
    /// No opening delimiter in the text
    #[error("no JSON {0} found in response")]
    MissingSpan(Shape),

    /// The first opening delimiter never closes
    #[error("unbalanced JSON {shape} starting at byte {start}")]
    UnbalancedSpan {
        /// Expected shape
        shape: Shape,
        /// Byte offset of the opening delimiter
        start: usize,
    },

    /// JSON did not deserialize into the expected wire shape
    #[error("response does not match the expected shape: {0}")]
    Schema(String),

    /// Enumerated field holds an unrecognised label
    #[error("unknown {field} label: {value:?}")]
    UnknownLabel {
        /// Wire field name
        field: &'static str,
        /// Offending label
        value: String,
    },

    /// Required string or sequence was empty
    #[error("{field} must not be empty")]
    Empty {
        /// Wire field name
        field: &'static str,
    },

    /// Sequence holds fewer usable entries than the result requires
    #[error("{field} has {len} entries, needs at least {min}")]
    Cardinality {
        /// Wire field name
        field: &'static str,
        /// Non-blank entries found
        len: usize,
        /// Fewest entries accepted
        min: usize,
    },

    /// Numeric field outside the values it can take
    #[error("{field} out of range: {value}")]
    OutOfRange {
        /// Wire field name
        field: &'static str,
        /// Offending value
        value: f64,
    },
}

impl From<serde_json::Error> for ContractError {
    fn from(e: serde_json::Error) -> Self {
        ContractError::Schema(e.to_string())
    }
}
