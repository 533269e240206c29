//! Immutable boolean expression tree over predicate leaves

use std::fmt;

use crate::leaf::PredicateLeaf;
use crate::truth::TruthValue;

/// Boolean tree whose leaves point into a [`SearchArgument`]'s leaf list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionTree {
    Leaf(usize),
    And(Vec<ExpressionTree>),
    Or(Vec<ExpressionTree>),
    Not(Box<ExpressionTree>),
}

impl ExpressionTree {
    /// Evaluates the tree given one truth value per leaf position
    pub fn evaluate(&self, leaves: &[TruthValue]) -> TruthValue {
        match self {
            ExpressionTree::Leaf(idx) => leaves.get(*idx).copied().unwrap_or(TruthValue::YesNoNull),
            ExpressionTree::And(children) => children
                .iter()
                .fold(TruthValue::Yes, |acc, child| acc.and(child.evaluate(leaves))),
            ExpressionTree::Or(children) => children
                .iter()
                .fold(TruthValue::No, |acc, child| acc.or(child.evaluate(leaves))),
            ExpressionTree::Not(child) => !child.evaluate(leaves),
        }
    }

    /// Collapses nested combinators of the same kind into their parent
    pub fn flatten(self) -> ExpressionTree {
        match self {
            ExpressionTree::And(children) => ExpressionTree::And(flatten_children(children, true)),
            ExpressionTree::Or(children) => ExpressionTree::Or(flatten_children(children, false)),
            ExpressionTree::Not(child) => ExpressionTree::Not(Box::new(child.flatten())),
            leaf => leaf,
        }
    }

    pub(crate) fn collect_leaves(&self, out: &mut Vec<usize>) {
        match self {
            ExpressionTree::Leaf(idx) => out.push(*idx),
            ExpressionTree::And(children) | ExpressionTree::Or(children) => {
                children.iter().for_each(|c| c.collect_leaves(out))
            }
            ExpressionTree::Not(child) => child.collect_leaves(out),
        }
    }
}

fn flatten_children(children: Vec<ExpressionTree>, and: bool) -> Vec<ExpressionTree> {
    let mut out = Vec::with_capacity(children.len());
    for child in children.into_iter().map(ExpressionTree::flatten) {
        match child {
            ExpressionTree::And(grand) if and => out.extend(grand),
            ExpressionTree::Or(grand) if !and => out.extend(grand),
            other => out.push(other),
        }
    }
    out
}

impl fmt::Display for ExpressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionTree::Leaf(idx) => write!(f, "leaf-{}", idx),
            ExpressionTree::And(children) => write_group(f, "and", children),
            ExpressionTree::Or(children) => write_group(f, "or", children),
            ExpressionTree::Not(child) => write!(f, "(not {})", child),
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, name: &str, children: &[ExpressionTree]) -> fmt::Result {
    write!(f, "({}", name)?;
    for child in children {
        write!(f, " {}", child)?;
    }
    write!(f, ")")
}

/// An immutable pushdown filter: a leaf list plus the tree over it.
///
/// Built through [`crate::SearchArgumentBuilder`]. Shared read-only across
/// row readers via `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchArgument {
    leaves: Vec<PredicateLeaf>,
    expression: ExpressionTree,
}

impl SearchArgument {
    pub(crate) fn new(leaves: Vec<PredicateLeaf>, expression: ExpressionTree) -> Self {
        Self { leaves, expression }
    }

    pub fn leaves(&self) -> &[PredicateLeaf] {
        &self.leaves
    }

    pub fn expression(&self) -> &ExpressionTree {
        &self.expression
    }

    /// Evaluates the expression over per-leaf truth values
    pub fn evaluate(&self, leaf_values: &[TruthValue]) -> TruthValue {
        self.expression.evaluate(leaf_values)
    }
}

impl fmt::Display for SearchArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, leaf) in self.leaves.iter().enumerate() {
            write!(f, "leaf-{} = {}, ", idx, leaf)?;
        }
        write!(f, "expr = {}", self.expression)
    }
}
