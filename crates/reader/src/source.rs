//! Collaborator interface supplying layout, statistics and row data

use sarg::ColumnStatistics;

use crate::batch::RowBatch;
use crate::error::Result;
use crate::schema::Schema;

/// Source of stripe layout, statistics and decoded rows.
///
/// Statistics are expected to obey containment: coarser statistics are the
/// union of the finer ones they contain. The reader relies on this and does
/// not re-verify it. `Ok(None)` means no statistics are available and the
/// partition is retained.
pub trait StripeSource {
    /// Schema of the file
    fn schema(&self) -> &Schema;

    /// Rows per row group; 0 when the file has no row index
    fn row_index_stride(&self) -> u64;

    fn stripe_count(&self) -> usize;

    fn stripe_row_count(&self, stripe: usize) -> Result<u64>;

    fn file_statistics(&self, column: usize) -> Result<Option<ColumnStatistics>>;

    fn stripe_statistics(&self, stripe: usize, column: usize) -> Result<Option<ColumnStatistics>>;

    /// Number of row groups with statistics in the stripe's row index
    fn row_group_count(&self, stripe: usize) -> Result<usize>;

    fn row_group_statistics(
        &self,
        stripe: usize,
        group: usize,
        column: usize,
    ) -> Result<Option<ColumnStatistics>>;

    /// Decodes `count` rows of all columns, starting `row_offset` rows into
    /// the given row group
    fn materialize_rows(
        &self,
        stripe: usize,
        group: usize,
        row_offset: u64,
        count: u64,
    ) -> Result<RowBatch>;
}
