//! Error types for search argument construction and evaluation

use thiserror::Error;

use crate::literal::PredicateDataType;

/// Result type for search argument operations
pub type Result<T> = std::result::Result<T, SargError>;

/// Errors that can occur while building, binding or evaluating a search argument
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SargError {
    /// Unbalanced builder frames, empty frames, wrong arity or a literal that
    /// does not match the declared predicate type
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    /// A leaf references a column name or ordinal that the schema does not have
    #[error("Unresolved column: {0}")]
    UnresolvedColumn(String),

    /// Two literals of incompatible kinds were compared
    #[error("Cannot compare {left} literal with {right} literal")]
    IncomparableLiteral {
        left: PredicateDataType,
        right: PredicateDataType,
    },
}

impl SargError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        SargError::MalformedExpression(msg.into())
    }
}
