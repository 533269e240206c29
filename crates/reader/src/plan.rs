//! Statistics-driven scan planning
//!
//! Pruning runs top-down: file statistics, then each stripe, then each row
//! group of a retained stripe. Each level is decided from its own statistics
//! only, so a coarse level that admits too much is still refined by the finer
//! one. The result is an ordered list of retained row ranges in absolute row
//! numbers. A range never crosses a stripe boundary or a skipped group.

use sarg::BoundSearchArgument;
use tracing::{debug, info, trace, warn};

use crate::error::Result;
use crate::metrics::ReaderMetrics;
use crate::source::StripeSource;

/// Which granularities consult statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PruningOptions {
    pub file: bool,
    pub stripe: bool,
    pub row_group: bool,
}

impl Default for PruningOptions {
    fn default() -> Self {
        Self {
            file: true,
            stripe: true,
            row_group: true,
        }
    }
}

/// Layout of one stripe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripeInfo {
    pub index: usize,
    /// Absolute row number of the stripe's first row
    pub first_row: u64,
    pub num_rows: u64,
    pub num_groups: usize,
}

impl StripeInfo {
    fn new(index: usize, first_row: u64, num_rows: u64, stride: u64) -> Self {
        let num_groups = if num_rows == 0 {
            0
        } else if stride == 0 {
            1
        } else {
            num_rows.div_ceil(stride) as usize
        };
        Self {
            index,
            first_row,
            num_rows,
            num_groups,
        }
    }

    /// Row bounds of a group relative to the stripe start
    pub fn group_bounds(&self, stride: u64, group: usize) -> (u64, u64) {
        if stride == 0 {
            return (0, self.num_rows);
        }
        let start = group as u64 * stride;
        (start, (start + stride).min(self.num_rows))
    }

    pub fn end_row(&self) -> u64 {
        self.first_row + self.num_rows
    }
}

/// A contiguous run of retained row groups within one stripe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub stripe: usize,
    pub first_group: usize,
    /// First absolute row, inclusive
    pub start: u64,
    /// Last absolute row, exclusive
    pub end: u64,
}

impl RowRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, row: u64) -> bool {
        self.start <= row && row < self.end
    }
}

/// Ordered retained ranges of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    stripes: Vec<StripeInfo>,
    ranges: Vec<RowRange>,
    total_rows: u64,
    stride: u64,
}

impl ScanPlan {
    /// Builds the plan, consulting statistics wherever a search argument is
    /// given and the granularity's pruning is enabled
    pub fn build<S: StripeSource + ?Sized>(
        source: &S,
        sarg: Option<&BoundSearchArgument>,
        pruning: PruningOptions,
        metrics: &mut ReaderMetrics,
    ) -> Result<Self> {
        let stride = source.row_index_stride();
        let mut stripes = Vec::with_capacity(source.stripe_count());
        let mut first_row = 0;
        for index in 0..source.stripe_count() {
            let num_rows = source.stripe_row_count(index)?;
            stripes.push(StripeInfo::new(index, first_row, num_rows, stride));
            first_row += num_rows;
        }
        let mut plan = ScanPlan {
            stripes,
            ranges: Vec::new(),
            total_rows: first_row,
            stride,
        };

        if let Some(sarg) = sarg.filter(|_| pruning.file) {
            let result = sarg.evaluate(|column| source.file_statistics(column))?;
            if !result.is_needed() {
                metrics.file_pruned = true;
                info!(
                    total_rows = plan.total_rows,
                    %result,
                    "file statistics exclude every row, skipping file"
                );
                return Ok(plan);
            }
        }

        for stripe in plan.stripes.clone() {
            if stripe.num_rows == 0 {
                continue;
            }
            metrics.stripes_evaluated += 1;
            if let Some(sarg) = sarg.filter(|_| pruning.stripe) {
                let result = sarg.evaluate(|column| source.stripe_statistics(stripe.index, column))?;
                if !result.is_needed() {
                    debug!(stripe = stripe.index, %result, "skipping stripe");
                    continue;
                }
            }
            metrics.stripes_selected += 1;

            let selected = filter_row_groups(
                source,
                sarg.filter(|_| pruning.row_group),
                &stripe,
                stride,
            )?;
            metrics.row_groups_evaluated += selected.len();
            metrics.row_groups_selected += selected.iter().filter(|keep| **keep).count();
            plan.push_runs(&stripe, &selected);
        }

        metrics.rows_selected = plan.ranges.iter().map(RowRange::len).sum();
        debug!(
            ranges = plan.ranges.len(),
            rows_selected = metrics.rows_selected,
            total_rows = plan.total_rows,
            "built scan plan"
        );
        Ok(plan)
    }

    fn push_runs(&mut self, stripe: &StripeInfo, selected: &[bool]) {
        let mut group = 0;
        while group < selected.len() {
            if !selected[group] {
                group += 1;
                continue;
            }
            let first_group = group;
            while group < selected.len() && selected[group] {
                group += 1;
            }
            let (start, _) = stripe.group_bounds(self.stride, first_group);
            let (_, end) = stripe.group_bounds(self.stride, group - 1);
            self.ranges.push(RowRange {
                stripe: stripe.index,
                first_group,
                start: stripe.first_row + start,
                end: stripe.first_row + end,
            });
        }
    }

    pub fn stripes(&self) -> &[StripeInfo] {
        &self.stripes
    }

    pub fn ranges(&self) -> &[RowRange] {
        &self.ranges
    }

    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    pub fn row_index_stride(&self) -> u64 {
        self.stride
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Index of the first range ending after `row`, if any
    pub fn locate(&self, row: u64) -> Option<usize> {
        let idx = self.ranges.partition_point(|r| r.end <= row);
        (idx < self.ranges.len()).then_some(idx)
    }

    /// Row group containing an absolute row of the stripe, with the row's
    /// offset inside that group
    pub fn group_of(&self, stripe: &StripeInfo, row: u64) -> (usize, u64) {
        let relative = row - stripe.first_row;
        if self.stride == 0 {
            return (0, relative);
        }
        let group = relative / self.stride;
        (group as usize, relative - group * self.stride)
    }
}

/// Decides which row groups of a stripe to keep.
///
/// Every group is kept when there is no search argument or no row index.
/// Groups the row index does not cover are kept.
pub fn filter_row_groups<S: StripeSource + ?Sized>(
    source: &S,
    sarg: Option<&BoundSearchArgument>,
    stripe: &StripeInfo,
    stride: u64,
) -> Result<Vec<bool>> {
    let mut selected = vec![true; stripe.num_groups];
    let Some(sarg) = sarg else {
        return Ok(selected);
    };
    if stride == 0 {
        return Ok(selected);
    }

    let indexed = source.row_group_count(stripe.index)?;
    if indexed != stripe.num_groups {
        warn!(
            stripe = stripe.index,
            expected = stripe.num_groups,
            actual = indexed,
            "row index group count disagrees with stripe layout"
        );
    }

    for (group, keep) in selected.iter_mut().enumerate().take(indexed) {
        let result =
            sarg.evaluate(|column| source.row_group_statistics(stripe.index, group, column))?;
        *keep = result.is_needed();
        trace!(stripe = stripe.index, group, %result, "evaluated row group");
    }
    Ok(selected)
}
