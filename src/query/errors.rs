//! # Query Text Errors
//!
//! Error types raised while turning caller text into a `DynamicQuery`.
//!
//! Error codes:
//! - DYNQ_FILTER_MALFORMED
//! - DYNQ_FILTER_UNKNOWN_OPERATOR
//! - DYNQ_FILTER_GRAMMAR
//! - DYNQ_PARAM_MUTUALLY_NECESSARY
//! - DYNQ_PARAM_MUTUALLY_EXCLUSIVE
//! - DYNQ_PARAM_NOT_INTEGER
//! - DYNQ_PARAM_NOT_BOOLEAN
//! - DYNQ_PARAM_OUT_OF_BOUNDS

use thiserror::Error;

/// Result type for query text operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors produced by the filter parser, the pagination calculator and the
/// query-text assembler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Filter text is not wrapped in `[` ... `]`
    #[error("Bad filter: expected '[...]', got '{0}'")]
    MalformedFilter(String),

    /// Operator token outside the fixed operator set
    #[error("Bad filter: unknown operator '{operator}' in '{expression}'")]
    UnknownOperator { operator: String, expression: String },

    /// Expression does not match the grammar
    #[error("Bad filter: {reason}: '{expression}'")]
    Grammar { reason: String, expression: String },

    /// Exactly one member of a required pair was supplied
    #[error("'{present}' and '{missing}' are mutually necessary")]
    MutuallyNecessary { present: String, missing: String },

    /// Parameters that may not be combined were supplied together
    #[error("{} are mutually exclusive", quote_all(.0))]
    MutuallyExclusive(Vec<String>),

    /// Non-integer text for a numeric parameter
    #[error("'{name}' must be an integer, got '{value}'")]
    NotAnInteger { name: String, value: String },

    /// Non-boolean text for a boolean parameter
    #[error("'{name}' must be true or false, got '{value}'")]
    NotABoolean { name: String, value: String },

    /// Numeric parameter outside its permitted range
    #[error("'{name}' must be {bound}, got {value}")]
    OutOfBounds {
        name: String,
        value: i64,
        bound: String,
    },
}

fn quote_all(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}

impl QueryError {
    pub(crate) fn grammar(reason: impl Into<String>, expression: impl Into<String>) -> Self {
        QueryError::Grammar {
            reason: reason.into(),
            expression: expression.into(),
        }
    }

    pub(crate) fn mutually_necessary(present: &str, missing: &str) -> Self {
        QueryError::MutuallyNecessary {
            present: present.to_string(),
            missing: missing.to_string(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::MalformedFilter(_) => "DYNQ_FILTER_MALFORMED",
            QueryError::UnknownOperator { .. } => "DYNQ_FILTER_UNKNOWN_OPERATOR",
            QueryError::Grammar { .. } => "DYNQ_FILTER_GRAMMAR",
            QueryError::MutuallyNecessary { .. } => "DYNQ_PARAM_MUTUALLY_NECESSARY",
            QueryError::MutuallyExclusive(_) => "DYNQ_PARAM_MUTUALLY_EXCLUSIVE",
            QueryError::NotAnInteger { .. } => "DYNQ_PARAM_NOT_INTEGER",
            QueryError::NotABoolean { .. } => "DYNQ_PARAM_NOT_BOOLEAN",
            QueryError::OutOfBounds { .. } => "DYNQ_PARAM_OUT_OF_BOUNDS",
        }
    }
}
