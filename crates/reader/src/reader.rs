//! File reader and row reader handles
//!
//! A [`Reader`] wraps a [`StripeSource`]. Each [`RowReader`] it creates binds
//! the search argument, plans the scan once and then walks the plan with its
//! own cursor.

use std::sync::Arc;

use sarg::{BoundSearchArgument, ColumnRef, ColumnResolver, SearchArgument};
use tracing::{debug, trace, warn};

use crate::batch::RowBatch;
use crate::cursor::{ScanCursor, ScanState};
use crate::error::{ReaderError, Result};
use crate::metrics::ReaderMetrics;
use crate::plan::{PruningOptions, ScanPlan};
use crate::schema::Schema;
use crate::source::StripeSource;

/// Default number of rows per batch
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Options for creating a row reader
#[derive(Debug, Clone)]
pub struct RowReaderOptions {
    search_argument: Option<Arc<SearchArgument>>,
    batch_size: usize,
    include: Option<Vec<ColumnRef>>,
    pruning: PruningOptions,
}

impl Default for RowReaderOptions {
    fn default() -> Self {
        Self {
            search_argument: None,
            batch_size: DEFAULT_BATCH_SIZE,
            include: None,
            pruning: PruningOptions::default(),
        }
    }
}

impl RowReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies batch size and pruning toggles from configuration
    pub fn from_config(config: &config::Config) -> Self {
        Self {
            batch_size: config.scan.batch_size,
            pruning: PruningOptions {
                file: config.scan.file_pruning,
                stripe: config.scan.stripe_pruning,
                row_group: config.scan.row_group_pruning,
            },
            ..Self::default()
        }
    }

    pub fn with_search_argument(mut self, sarg: impl Into<Arc<SearchArgument>>) -> Self {
        self.search_argument = Some(sarg.into());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Restricts produced batches to the given columns, in order
    pub fn with_include<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnRef>,
    {
        self.include = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_pruning(mut self, pruning: PruningOptions) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn search_argument(&self) -> Option<&Arc<SearchArgument>> {
        self.search_argument.as_ref()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn pruning(&self) -> PruningOptions {
        self.pruning
    }
}

/// Reader over one file
pub struct Reader<S: StripeSource> {
    source: Arc<S>,
    num_rows: u64,
}

impl<S: StripeSource> Reader<S> {
    /// Opens a reader over a stripe source
    pub fn open(source: S) -> Result<Self> {
        let mut num_rows = 0;
        for stripe in 0..source.stripe_count() {
            num_rows += source.stripe_row_count(stripe)?;
        }
        debug!(
            stripes = source.stripe_count(),
            num_rows,
            row_index_stride = source.row_index_stride(),
            "opened reader"
        );
        Ok(Self {
            source: Arc::new(source),
            num_rows,
        })
    }

    pub fn schema(&self) -> &Schema {
        self.source.schema()
    }

    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    pub fn num_stripes(&self) -> usize {
        self.source.stripe_count()
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Creates a row reader, binding the search argument and planning the scan
    pub fn row_reader(&self, options: &RowReaderOptions) -> Result<RowReader<S>> {
        if options.batch_size == 0 {
            return Err(ReaderError::InvalidBatch(
                "batch size must be greater than zero".to_string(),
            ));
        }
        let schema = self.source.schema();
        let sarg = options
            .search_argument
            .as_ref()
            .map(|sarg| BoundSearchArgument::bind(Arc::clone(sarg), schema))
            .transpose()?;

        let include = options
            .include
            .as_ref()
            .map(|columns| {
                columns
                    .iter()
                    .map(|column| {
                        schema
                            .resolve(column)
                            .map(|(ordinal, _)| ordinal)
                            .ok_or_else(|| ReaderError::MissingColumn(column.to_string()))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;
        let output_schema = match &include {
            Some(ordinals) => schema.project(ordinals)?,
            None => schema.clone(),
        };

        let mut metrics = ReaderMetrics::default();
        let plan = ScanPlan::build(self.source.as_ref(), sarg.as_ref(), options.pruning, &mut metrics)?;
        let cursor = ScanCursor::start(&plan);
        debug!(
            search_argument = ?sarg.as_ref().map(|s| s.search_argument().to_string()),
            first_row = cursor.next_absolute_row(),
            %metrics,
            "created row reader"
        );

        Ok(RowReader {
            source: Arc::clone(&self.source),
            schema: output_schema,
            include,
            batch_size: options.batch_size,
            plan,
            cursor,
            metrics,
        })
    }
}

/// Stateful scan over the retained rows of a file
pub struct RowReader<S: StripeSource> {
    source: Arc<S>,
    schema: Schema,
    include: Option<Vec<usize>>,
    batch_size: usize,
    plan: ScanPlan,
    cursor: ScanCursor,
    metrics: ReaderMetrics,
}

impl<S: StripeSource> RowReader<S> {
    /// Schema of produced batches after projection
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Batch size from the reader options
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Creates an empty batch for [`produce_batch`](Self::produce_batch)
    pub fn create_row_batch(&self, capacity: usize) -> Result<RowBatch> {
        RowBatch::with_capacity(&self.schema, capacity)
    }

    /// Creates an empty batch sized by the configured batch size
    pub fn create_default_batch(&self) -> Result<RowBatch> {
        self.create_row_batch(self.batch_size)
    }

    /// Fills `batch` with up to its capacity of rows from the current retained
    /// range.
    ///
    /// Returns false once no retained rows remain. A batch never spans a
    /// skipped row group or a stripe boundary.
    pub fn produce_batch(&mut self, batch: &mut RowBatch) -> Result<bool> {
        if self.cursor.state() == ScanState::Exhausted {
            batch.clear();
            return Ok(false);
        }
        let Some(range) = self.plan.ranges().get(self.cursor.range_index()).copied() else {
            debug!(total_rows = self.plan.total_rows(), metrics = %self.metrics, "scan exhausted");
            self.cursor.exhaust(self.plan.total_rows());
            batch.clear();
            return Ok(false);
        };
        let Some(stripe) = self.plan.stripes().get(range.stripe).copied() else {
            return Err(ReaderError::InvalidBatch(format!(
                "range references unknown stripe {}",
                range.stripe
            )));
        };

        let start = self.cursor.next_absolute_row();
        let count = (batch.capacity() as u64).min(range.end - start);
        let mut parts = Vec::new();
        let mut row = start;
        while row < start + count {
            let (group, offset) = self.plan.group_of(&stripe, row);
            let (_, group_end) = stripe.group_bounds(self.plan.row_index_stride(), group);
            let take = (stripe.first_row + group_end).min(start + count) - row;
            let part = self.source.materialize_rows(stripe.index, group, offset, take)?;
            if part.num_rows() as u64 != take {
                return Err(ReaderError::data_access(format!(
                    "stripe {} group {} returned {} rows, expected {}",
                    stripe.index,
                    group,
                    part.num_rows(),
                    take
                )));
            }
            parts.push(part);
            row += take;
        }

        let rows = RowBatch::concat(&parts)?;
        let rows = match &self.include {
            Some(ordinals) => rows.project(ordinals)?,
            None => rows,
        };
        batch.fill_from(rows)?;

        self.cursor.advance(&self.plan, start, count);
        self.metrics.rows_produced += count;
        self.metrics.batches_produced += 1;
        trace!(
            stripe = stripe.index,
            first_row = start,
            rows = count,
            "produced batch"
        );
        Ok(true)
    }

    /// First row of the most recently produced batch; before any batch or
    /// right after a seek, the next row to be read
    pub fn current_row_number(&self) -> u64 {
        self.cursor.current_row_number()
    }

    /// First unread row
    pub fn next_row_number(&self) -> u64 {
        self.cursor.next_absolute_row()
    }

    /// Moves the cursor to `row`, rounding forward past pruned row groups.
    ///
    /// Seeking to the total row count exhausts the scan; seeking beyond it
    /// fails and also leaves the scan exhausted.
    pub fn seek_to(&mut self, row: u64) -> Result<()> {
        let total = self.plan.total_rows();
        if row > total {
            warn!(target_row = row, total_rows = total, "seek beyond end of file");
            self.cursor.exhaust(total);
            return Err(ReaderError::OutOfRangeSeek { target: row, total });
        }
        if row == total {
            self.cursor.exhaust(total);
            return Ok(());
        }
        let positioned = self.cursor.seek(&self.plan, row);
        debug!(
            target_row = row,
            position = self.cursor.next_absolute_row(),
            exhausted = !positioned,
            "seek"
        );
        Ok(())
    }

    pub fn total_row_count(&self) -> u64 {
        self.plan.total_rows()
    }

    pub fn stripe_count(&self) -> usize {
        self.plan.stripes().len()
    }

    pub fn cursor(&self) -> &ScanCursor {
        &self.cursor
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn plan(&self) -> &ScanPlan {
        &self.plan
    }

    pub fn metrics(&self) -> &ReaderMetrics {
        &self.metrics
    }
}
