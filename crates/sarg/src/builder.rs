//! Stack-based construction of search arguments
//!
//! ```
//! use sarg::{PredicateDataType, SearchArgumentFactory};
//!
//! let sarg = SearchArgumentFactory::new_builder()
//!     .start_and()
//!     .start_not()
//!     .less_than("int1", PredicateDataType::Long, 300000i64)
//!     .end()
//!     .less_than("int1", PredicateDataType::Long, 600000i64)
//!     .end()
//!     .build()
//!     .unwrap();
//! assert_eq!(
//!     sarg.to_string(),
//!     "leaf-0 = (LESS_THAN int1 300000), leaf-1 = (LESS_THAN int1 600000), \
//!      expr = (and (not leaf-0) leaf-1)"
//! );
//! ```

use tracing::trace;

use crate::error::{Result, SargError};
use crate::leaf::{ColumnRef, Operator, PredicateLeaf};
use crate::literal::{Literal, PredicateDataType};
use crate::tree::{ExpressionTree, SearchArgument};

/// Entry point for creating builders
pub struct SearchArgumentFactory;

impl SearchArgumentFactory {
    pub fn new_builder() -> SearchArgumentBuilder {
        SearchArgumentBuilder::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    And,
    Or,
    Not,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    children: Vec<ExpressionTree>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }
}

/// Fluent builder for [`SearchArgument`].
///
/// Starts with an implicit top-level AND frame. The first error raised by any
/// call is kept and returned from [`build`](Self::build).
#[derive(Debug)]
pub struct SearchArgumentBuilder {
    leaves: Vec<PredicateLeaf>,
    stack: Vec<Frame>,
    error: Option<SargError>,
}

impl Default for SearchArgumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchArgumentBuilder {
    pub fn new() -> Self {
        Self {
            leaves: Vec::new(),
            stack: vec![Frame::new(FrameKind::Root)],
            error: None,
        }
    }

    pub fn start_and(self) -> Self {
        self.push_frame(FrameKind::And)
    }

    pub fn start_or(self) -> Self {
        self.push_frame(FrameKind::Or)
    }

    pub fn start_not(self) -> Self {
        self.push_frame(FrameKind::Not)
    }

    /// Closes the innermost frame and attaches it to its parent
    pub fn end(mut self) -> Self {
        if self.error.is_some() {
            return self;
        }
        if self.stack.len() <= 1 {
            return self.fail("end() called without a matching start");
        }
        let Some(frame) = self.stack.pop() else {
            return self;
        };
        match close_frame(frame) {
            Ok(node) => {
                if let Some(parent) = self.stack.last_mut() {
                    parent.children.push(node);
                }
                self
            }
            Err(e) => {
                self.error = Some(e);
                self
            }
        }
    }

    pub fn equals(
        self,
        column: impl Into<ColumnRef>,
        ty: PredicateDataType,
        literal: impl Into<Literal>,
    ) -> Self {
        self.leaf(column.into(), Operator::Equals, ty, vec![literal.into()])
    }

    /// Equality where null equals null; never null-qualified
    pub fn null_safe_equals(
        self,
        column: impl Into<ColumnRef>,
        ty: PredicateDataType,
        literal: impl Into<Literal>,
    ) -> Self {
        self.leaf(column.into(), Operator::NullSafeEquals, ty, vec![literal.into()])
    }

    pub fn less_than(
        self,
        column: impl Into<ColumnRef>,
        ty: PredicateDataType,
        literal: impl Into<Literal>,
    ) -> Self {
        self.leaf(column.into(), Operator::LessThan, ty, vec![literal.into()])
    }

    pub fn less_than_equals(
        self,
        column: impl Into<ColumnRef>,
        ty: PredicateDataType,
        literal: impl Into<Literal>,
    ) -> Self {
        self.leaf(column.into(), Operator::LessThanEquals, ty, vec![literal.into()])
    }

    /// Inclusive range. `lower <= upper` is the caller's responsibility.
    pub fn between(
        self,
        column: impl Into<ColumnRef>,
        ty: PredicateDataType,
        lower: impl Into<Literal>,
        upper: impl Into<Literal>,
    ) -> Self {
        self.leaf(
            column.into(),
            Operator::Between,
            ty,
            vec![lower.into(), upper.into()],
        )
    }

    pub fn is_null(self, column: impl Into<ColumnRef>, ty: PredicateDataType) -> Self {
        self.leaf(column.into(), Operator::IsNull, ty, Vec::new())
    }

    pub fn in_list<I, L>(self, column: impl Into<ColumnRef>, ty: PredicateDataType, literals: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Literal>,
    {
        let literals = literals.into_iter().map(Into::into).collect();
        self.leaf(column.into(), Operator::In, ty, literals)
    }

    /// Finalises the search argument
    pub fn build(mut self) -> Result<SearchArgument> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.stack.len() != 1 {
            return Err(SargError::malformed(format!(
                "{} frame(s) left open",
                self.stack.len() - 1
            )));
        }
        let mut root = match self.stack.pop() {
            Some(frame) => frame.children,
            None => Vec::new(),
        };
        let expression = match root.len() {
            0 => return Err(SargError::malformed("search argument is empty")),
            1 => root.remove(0),
            _ => ExpressionTree::And(root),
        }
        .flatten();
        trace!(leaves = self.leaves.len(), expr = %expression, "built search argument");
        Ok(SearchArgument::new(self.leaves, expression))
    }

    fn push_frame(mut self, kind: FrameKind) -> Self {
        if self.error.is_none() {
            self.stack.push(Frame::new(kind));
        }
        self
    }

    fn leaf(
        mut self,
        column: ColumnRef,
        operator: Operator,
        ty: PredicateDataType,
        literals: Vec<Literal>,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        let leaf = match PredicateLeaf::new(column, operator, ty, literals) {
            Ok(leaf) => leaf,
            Err(e) => {
                self.error = Some(e);
                return self;
            }
        };
        // identical leaves share one position
        let idx = match self.leaves.iter().position(|l| *l == leaf) {
            Some(idx) => idx,
            None => {
                self.leaves.push(leaf);
                self.leaves.len() - 1
            }
        };
        if let Some(frame) = self.stack.last_mut() {
            frame.children.push(ExpressionTree::Leaf(idx));
        }
        self
    }

    fn fail(mut self, msg: &str) -> Self {
        self.error = Some(SargError::malformed(msg));
        self
    }
}

fn close_frame(frame: Frame) -> Result<ExpressionTree> {
    let Frame { kind, mut children } = frame;
    if children.is_empty() {
        return Err(SargError::malformed(format!("empty {:?} frame", kind)));
    }
    match kind {
        FrameKind::And => Ok(ExpressionTree::And(children)),
        FrameKind::Or => Ok(ExpressionTree::Or(children)),
        FrameKind::Not if children.len() == 1 => {
            Ok(ExpressionTree::Not(Box::new(children.remove(0))))
        }
        FrameKind::Not => Err(SargError::malformed(format!(
            "NOT takes exactly one child, got {}",
            children.len()
        ))),
        FrameKind::Root => Err(SargError::malformed("cannot close the top-level frame")),
    }
}
