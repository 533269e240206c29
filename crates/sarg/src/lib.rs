//! Search arguments for predicate pushdown
//!
//! A [`SearchArgument`] is an immutable boolean expression over typed column
//! predicates. It is evaluated against per-partition [`ColumnStatistics`] into
//! a null-aware [`TruthValue`], which tells a reader whether a file, stripe or
//! row group can be skipped without decoding any rows.

pub mod builder;
pub mod error;
pub mod evaluator;
pub mod leaf;
pub mod literal;
pub mod statistics;
pub mod tree;
pub mod truth;

pub use builder::{SearchArgumentBuilder, SearchArgumentFactory};
pub use error::{Result, SargError};
pub use evaluator::{evaluate_leaf, BoundSearchArgument, ColumnResolver};
pub use leaf::{ColumnRef, Operator, PredicateLeaf};
pub use literal::{Decimal, Literal, PredicateDataType};
pub use statistics::ColumnStatistics;
pub use tree::{ExpressionTree, SearchArgument};
pub use truth::TruthValue;
