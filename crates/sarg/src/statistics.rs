//! Per-column summaries at file, stripe and row-group granularity

use std::cmp::Ordering;

use crate::error::Result;
use crate::literal::{Literal, PredicateDataType};

/// Summary of one column inside one partition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStatistics {
    has_null: bool,
    value_count: u64,
    min: Option<Literal>,
    max: Option<Literal>,
}

impl ColumnStatistics {
    /// `value_count` counts non-null values only. A missing bound while
    /// `value_count > 0` means the bound is unknown.
    pub fn new(has_null: bool, value_count: u64, min: Option<Literal>, max: Option<Literal>) -> Self {
        Self {
            has_null,
            value_count,
            min,
            max,
        }
    }

    /// Statistics for a partition holding non-null values within `[min, max]`
    pub fn with_range(min: impl Into<Literal>, max: impl Into<Literal>, value_count: u64) -> Self {
        Self::new(false, value_count, Some(min.into()), Some(max.into()))
    }

    /// Statistics for a partition where every value is null
    pub fn all_null() -> Self {
        Self::new(true, 0, None, None)
    }

    pub fn has_null(&self) -> bool {
        self.has_null
    }

    pub fn value_count(&self) -> u64 {
        self.value_count
    }

    pub fn min(&self) -> Option<&Literal> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&Literal> {
        self.max.as_ref()
    }

    /// Marks the partition as also holding nulls
    pub fn with_nulls(mut self) -> Self {
        self.has_null = true;
        self
    }

    /// Kind of the bounds, if any are present
    pub fn kind(&self) -> Option<PredicateDataType> {
        self.min.as_ref().or(self.max.as_ref()).map(Literal::kind)
    }

    /// Union of two summaries: min of mins, max of maxes, OR of nulls and sum
    /// of counts.
    ///
    /// A side with values but an unknown bound makes the merged bound unknown.
    pub fn merge(&self, other: &ColumnStatistics) -> Result<ColumnStatistics> {
        let min = merge_bound(self, other, |s| s.min.as_ref(), Ordering::Less)?;
        let max = merge_bound(self, other, |s| s.max.as_ref(), Ordering::Greater)?;
        Ok(ColumnStatistics {
            has_null: self.has_null || other.has_null,
            value_count: self.value_count + other.value_count,
            min,
            max,
        })
    }
}

fn merge_bound<'a>(
    left: &'a ColumnStatistics,
    right: &'a ColumnStatistics,
    bound: impl Fn(&'a ColumnStatistics) -> Option<&'a Literal>,
    keep_left_when: Ordering,
) -> Result<Option<Literal>> {
    if left.value_count == 0 {
        return Ok(bound(right).cloned());
    }
    if right.value_count == 0 {
        return Ok(bound(left).cloned());
    }
    match (bound(left), bound(right)) {
        (Some(l), Some(r)) => match l.try_cmp(r)? {
            Some(ord) if ord == keep_left_when || ord == Ordering::Equal => Ok(Some(l.clone())),
            Some(_) => Ok(Some(r.clone())),
            // unordered bounds cannot be merged
            None => Ok(None),
        },
        _ => Ok(None),
    }
}
