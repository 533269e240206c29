//! Absolute row cursor over a scan plan

use crate::plan::ScanPlan;

/// Lifecycle of a row reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    NotStarted,
    Scanning,
    Exhausted,
}

/// Position of a row reader.
///
/// `next_absolute_row` is the first unread row and always lies inside the
/// current retained range, or equals the total row count once exhausted.
/// `current_row_number` is the first row of the last produced batch, or the
/// next row to be read before any batch and right after a seek.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCursor {
    state: ScanState,
    current_stripe: Option<usize>,
    current_row_group: Option<usize>,
    next_absolute_row: u64,
    current_row_number: u64,
    range_index: usize,
}

impl ScanCursor {
    /// Cursor at the first retained row, or exhausted when nothing is retained
    pub(crate) fn start(plan: &ScanPlan) -> Self {
        let mut cursor = ScanCursor {
            state: ScanState::NotStarted,
            current_stripe: None,
            current_row_group: None,
            next_absolute_row: 0,
            current_row_number: 0,
            range_index: 0,
        };
        if !cursor.settle(plan, 0) {
            cursor.exhaust(plan.total_rows());
        }
        cursor.current_row_number = cursor.next_absolute_row;
        cursor
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn current_stripe(&self) -> Option<usize> {
        self.current_stripe
    }

    /// Row group within the current stripe
    pub fn current_row_group(&self) -> Option<usize> {
        self.current_row_group
    }

    pub fn next_absolute_row(&self) -> u64 {
        self.next_absolute_row
    }

    pub fn current_row_number(&self) -> u64 {
        self.current_row_number
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == ScanState::Exhausted
    }

    pub(crate) fn range_index(&self) -> usize {
        self.range_index
    }

    pub(crate) fn exhaust(&mut self, total_rows: u64) {
        self.state = ScanState::Exhausted;
        self.current_stripe = None;
        self.current_row_group = None;
        self.next_absolute_row = total_rows;
        self.current_row_number = total_rows;
        self.range_index = usize::MAX;
    }

    /// Positions at `target`, rounding forward past pruned rows.
    ///
    /// Returns false and exhausts when no retained row follows `target`.
    pub(crate) fn seek(&mut self, plan: &ScanPlan, target: u64) -> bool {
        if !self.settle(plan, target) {
            self.exhaust(plan.total_rows());
            return false;
        }
        if self.state == ScanState::Exhausted {
            self.state = ScanState::Scanning;
        }
        self.current_row_number = self.next_absolute_row;
        true
    }

    /// Records a produced batch of `rows` rows starting at `first_row`
    pub(crate) fn advance(&mut self, plan: &ScanPlan, first_row: u64, rows: u64) {
        self.state = ScanState::Scanning;
        self.current_row_number = first_row;
        let next = first_row + rows;
        if !self.settle(plan, next) {
            // stays here until the next read reports exhaustion
            self.next_absolute_row = next;
            self.range_index = plan.ranges().len();
            self.current_stripe = None;
            self.current_row_group = None;
        }
    }

    /// Moves `next_absolute_row` to the first retained row at or after `row`
    fn settle(&mut self, plan: &ScanPlan, row: u64) -> bool {
        let Some(index) = plan.locate(row) else {
            return false;
        };
        let range = plan.ranges()[index];
        self.range_index = index;
        self.next_absolute_row = row.max(range.start);
        self.current_stripe = Some(range.stripe);
        self.current_row_group = plan
            .stripes()
            .get(range.stripe)
            .map(|stripe| plan.group_of(stripe, self.next_absolute_row).0);
        true
    }
}
