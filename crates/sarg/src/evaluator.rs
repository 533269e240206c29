//! Evaluation of search arguments against column statistics
//!
//! Leaves are evaluated once per partition into a vector of truth values, and
//! the expression tree is folded over that vector. Statistics the caller cannot
//! provide evaluate to `YesNoNull`, so the partition is retained.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::error::{Result, SargError};
use crate::leaf::{ColumnRef, Operator, PredicateLeaf};
use crate::literal::{Literal, PredicateDataType};
use crate::statistics::ColumnStatistics;
use crate::tree::SearchArgument;
use crate::truth::TruthValue;

/// Maps column references to a field ordinal and its type
pub trait ColumnResolver {
    fn resolve(&self, column: &ColumnRef) -> Option<(usize, PredicateDataType)>;
}

/// Evaluates a single leaf against one partition's statistics
pub fn evaluate_leaf(leaf: &PredicateLeaf, stats: &ColumnStatistics) -> Result<TruthValue> {
    let has_null = stats.has_null();

    if leaf.operator() == Operator::IsNull {
        return Ok(match (has_null, stats.value_count()) {
            (false, _) => TruthValue::No,
            (true, 0) => TruthValue::Yes,
            (true, _) => TruthValue::YesNo,
        });
    }

    if stats.value_count() == 0 {
        return Ok(TruthValue::No);
    }

    let (Some(min), Some(max)) = (stats.min(), stats.max()) else {
        return Ok(TruthValue::YesNoNull);
    };

    let literals = leaf.literals();
    let outcome = match leaf.operator() {
        Operator::Equals | Operator::NullSafeEquals => equals(&literals[0], min, max)?,
        Operator::LessThan => range(max.try_cmp(&literals[0])?, min.try_cmp(&literals[0])?, |hi, lo| {
            if hi == Ordering::Less {
                TruthValue::Yes
            } else if lo != Ordering::Less {
                TruthValue::No
            } else {
                TruthValue::YesNo
            }
        }),
        Operator::LessThanEquals => {
            range(max.try_cmp(&literals[0])?, min.try_cmp(&literals[0])?, |hi, lo| {
                if hi != Ordering::Greater {
                    TruthValue::Yes
                } else if lo == Ordering::Greater {
                    TruthValue::No
                } else {
                    TruthValue::YesNo
                }
            })
        }
        Operator::Between => between(&literals[0], &literals[1], min, max)?,
        Operator::In => in_list(literals, min, max)?,
        Operator::IsNull => TruthValue::YesNoNull,
    };

    if leaf.operator() == Operator::NullSafeEquals {
        // null <=> v is false, so a certain match becomes partial
        return Ok(match (outcome, has_null) {
            (TruthValue::Yes, true) => TruthValue::YesNo,
            (other, _) => other,
        });
    }
    Ok(outcome.with_nulls(has_null))
}

fn range(
    max_vs_v: Option<Ordering>,
    min_vs_v: Option<Ordering>,
    decide: impl Fn(Ordering, Ordering) -> TruthValue,
) -> TruthValue {
    match (max_vs_v, min_vs_v) {
        (Some(hi), Some(lo)) => decide(hi, lo),
        _ => TruthValue::YesNo,
    }
}

fn equals(v: &Literal, min: &Literal, max: &Literal) -> Result<TruthValue> {
    match (v.try_cmp(min)?, v.try_cmp(max)?) {
        (Some(lo), Some(hi)) => Ok(if lo == Ordering::Less || hi == Ordering::Greater {
            TruthValue::No
        } else if lo == Ordering::Equal && hi == Ordering::Equal {
            TruthValue::Yes
        } else {
            TruthValue::YesNo
        }),
        _ => Ok(TruthValue::YesNo),
    }
}

fn between(lower: &Literal, upper: &Literal, min: &Literal, max: &Literal) -> Result<TruthValue> {
    let max_vs_lower = max.try_cmp(lower)?;
    let min_vs_upper = min.try_cmp(upper)?;
    let min_vs_lower = min.try_cmp(lower)?;
    let max_vs_upper = max.try_cmp(upper)?;
    if max_vs_lower == Some(Ordering::Less) || min_vs_upper == Some(Ordering::Greater) {
        return Ok(TruthValue::No);
    }
    let inside = matches!(min_vs_lower, Some(Ordering::Greater | Ordering::Equal))
        && matches!(max_vs_upper, Some(Ordering::Less | Ordering::Equal));
    Ok(if inside {
        TruthValue::Yes
    } else {
        TruthValue::YesNo
    })
}

fn in_list(values: &[Literal], min: &Literal, max: &Literal) -> Result<TruthValue> {
    if min.try_cmp(max)? == Some(Ordering::Equal) {
        for v in values {
            match v.try_cmp(min)? {
                Some(Ordering::Equal) => return Ok(TruthValue::Yes),
                Some(_) => {}
                None => return Ok(TruthValue::YesNo),
            }
        }
        return Ok(TruthValue::No);
    }
    for v in values {
        let lo = v.try_cmp(min)?;
        let hi = v.try_cmp(max)?;
        let outside = lo == Some(Ordering::Less) || hi == Some(Ordering::Greater);
        if !outside {
            return Ok(TruthValue::YesNo);
        }
    }
    Ok(TruthValue::No)
}

/// A search argument whose leaves have been resolved against a schema
#[derive(Debug, Clone)]
pub struct BoundSearchArgument {
    sarg: Arc<SearchArgument>,
    columns: Vec<usize>,
}

impl BoundSearchArgument {
    /// Resolves every leaf's column and checks its declared type against the
    /// column's type
    pub fn bind(sarg: Arc<SearchArgument>, resolver: &dyn ColumnResolver) -> Result<Self> {
        let mut columns = Vec::with_capacity(sarg.leaves().len());
        for leaf in sarg.leaves() {
            let (ordinal, ty) = resolver
                .resolve(leaf.column())
                .ok_or_else(|| SargError::UnresolvedColumn(leaf.column().to_string()))?;
            if ty != leaf.declared_type() {
                return Err(SargError::MalformedExpression(format!(
                    "leaf {} declares {} but column {} is {}",
                    leaf,
                    leaf.declared_type(),
                    leaf.column(),
                    ty
                )));
            }
            columns.push(ordinal);
        }
        Ok(Self { sarg, columns })
    }

    pub fn search_argument(&self) -> &Arc<SearchArgument> {
        &self.sarg
    }

    /// Field ordinal of each leaf, by leaf position
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// Distinct ordinals referenced by the search argument, ascending
    pub fn referenced_columns(&self) -> Vec<usize> {
        let mut cols = self.columns.clone();
        cols.sort_unstable();
        cols.dedup();
        cols
    }

    /// Evaluates the search argument for one partition.
    ///
    /// `stats_for` is called at most once per referenced column. `Ok(None)`
    /// means the statistics are unavailable and the leaf is treated as maybe.
    pub fn evaluate<E, F>(&self, mut stats_for: F) -> std::result::Result<TruthValue, E>
    where
        E: From<SargError>,
        F: FnMut(usize) -> std::result::Result<Option<ColumnStatistics>, E>,
    {
        let mut cache: HashMap<usize, Option<ColumnStatistics>> = HashMap::new();
        let mut values = Vec::with_capacity(self.columns.len());
        for (leaf, &column) in self.sarg.leaves().iter().zip(&self.columns) {
            if !cache.contains_key(&column) {
                let stats = stats_for(column)?;
                cache.insert(column, stats);
            }
            let value = match cache.get(&column).and_then(Option::as_ref) {
                Some(stats) => evaluate_leaf(leaf, stats)?,
                None => TruthValue::YesNoNull,
            };
            values.push(value);
        }
        let result = self.sarg.evaluate(&values);
        trace!(leaves = ?values, %result, "evaluated search argument");
        Ok(result)
    }
}
