//! Predicate leaves: single column-comparison conditions

use std::fmt;

use crate::error::{Result, SargError};
use crate::literal::{Literal, PredicateDataType};

/// Comparison operator of a predicate leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    NullSafeEquals,
    LessThan,
    LessThanEquals,
    Between,
    IsNull,
    In,
}

impl Operator {
    fn check_arity(&self, count: usize) -> Result<()> {
        let ok = match self {
            Operator::Equals
            | Operator::NullSafeEquals
            | Operator::LessThan
            | Operator::LessThanEquals => count == 1,
            Operator::Between => count == 2,
            Operator::IsNull => count == 0,
            Operator::In => count >= 1,
        };
        if ok {
            Ok(())
        } else {
            Err(SargError::malformed(format!(
                "{} does not accept {} literal(s)",
                self, count
            )))
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operator::Equals => "EQUALS",
            Operator::NullSafeEquals => "NULL_SAFE_EQUALS",
            Operator::LessThan => "LESS_THAN",
            Operator::LessThanEquals => "LESS_THAN_EQUALS",
            Operator::Between => "BETWEEN",
            Operator::IsNull => "IS_NULL",
            Operator::In => "IN",
        };
        write!(f, "{}", name)
    }
}

/// Reference to a column by name or by zero-based field ordinal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnRef {
    Name(String),
    Id(usize),
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Name(name) => write!(f, "{}", name),
            ColumnRef::Id(id) => write!(f, "#{}", id),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        ColumnRef::Name(name)
    }
}

impl From<usize> for ColumnRef {
    fn from(id: usize) -> Self {
        ColumnRef::Id(id)
    }
}

/// A single condition on one column
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateLeaf {
    column: ColumnRef,
    operator: Operator,
    declared_type: PredicateDataType,
    literals: Vec<Literal>,
}

impl PredicateLeaf {
    /// Creates a leaf, checking the literal count against the operator and
    /// every literal's kind against the declared type
    pub fn new(
        column: ColumnRef,
        operator: Operator,
        declared_type: PredicateDataType,
        literals: Vec<Literal>,
    ) -> Result<Self> {
        operator.check_arity(literals.len())?;
        if let Some(bad) = literals.iter().find(|l| l.kind() != declared_type) {
            return Err(SargError::malformed(format!(
                "{} literal {} used with declared type {} on column {}",
                bad.kind(),
                bad,
                declared_type,
                column
            )));
        }
        Ok(Self {
            column,
            operator,
            declared_type,
            literals,
        })
    }

    pub fn column(&self) -> &ColumnRef {
        &self.column
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn declared_type(&self) -> PredicateDataType {
        self.declared_type
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }
}

impl fmt::Display for PredicateLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {}", self.operator, self.column)?;
        for literal in &self.literals {
            write!(f, " {}", literal)?;
        }
        write!(f, ")")
    }
}
