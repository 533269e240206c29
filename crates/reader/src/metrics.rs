//! Counters describing how much a scan pruned and produced

use std::fmt;

/// Pruning and output counters for one row reader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderMetrics {
    /// Whether file statistics ruled out the whole file
    pub file_pruned: bool,
    pub stripes_evaluated: usize,
    pub stripes_selected: usize,
    pub row_groups_evaluated: usize,
    pub row_groups_selected: usize,
    /// Rows in retained ranges
    pub rows_selected: u64,
    pub rows_produced: u64,
    pub batches_produced: u64,
}

impl ReaderMetrics {
    /// Fraction of evaluated row groups that survived pruning
    pub fn row_group_selectivity(&self) -> f64 {
        if self.row_groups_evaluated == 0 {
            return 1.0;
        }
        self.row_groups_selected as f64 / self.row_groups_evaluated as f64
    }
}

impl fmt::Display for ReaderMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stripes {}/{}, row groups {}/{}, rows {} selected {} produced in {} batches",
            self.stripes_selected,
            self.stripes_evaluated,
            self.row_groups_selected,
            self.row_groups_evaluated,
            self.rows_selected,
            self.rows_produced,
            self.batches_produced
        )
    }
}
