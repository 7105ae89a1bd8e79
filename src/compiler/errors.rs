//! # Compiler Errors

use thiserror::Error;

use crate::mapping::MappingError;

/// Result type for query compilation
pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Field or entity could not be resolved
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Filter text could not be converted to the column's type
    #[error("Cannot convert '{value}' for field '{field}' to {target}: {reason}")]
    Coercion {
        field: String,
        value: String,
        target: String,
        reason: String,
    },

    /// Comparison value does not fit the operator's arity
    #[error("Operator '{operator}' on field '{field}' expects {expected}")]
    ValueShape {
        field: String,
        operator: String,
        expected: String,
    },

    /// Junction without children
    #[error("Filter junction has no children")]
    EmptyJunction,
}

impl CompileError {
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::Mapping(e) => e.code(),
            CompileError::Coercion { .. } => "DYNQ_VALUE_COERCION",
            CompileError::ValueShape { .. } | CompileError::EmptyJunction => {
                "DYNQ_PREDICATE_SHAPE"
            }
        }
    }
}
