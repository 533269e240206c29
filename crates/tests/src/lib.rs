use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field};
use reader::{
    ColumnVector, Reader, ReaderError, RowBatch, RowReader, RowReaderOptions, Schema, StripeSource,
};
use sarg::{
    BoundSearchArgument, ColumnStatistics, ExpressionTree, Literal, Operator, PredicateLeaf,
    SearchArgument,
};

/// Row index stride of the shared datasets
pub const STRIDE: u64 = 1000;

/// Rows per stripe of the shared datasets
pub const STRIPE_ROWS: u64 = 3500;

struct MemoryStripe {
    rows: RowBatch,
    statistics: Vec<Option<ColumnStatistics>>,
    groups: Vec<Vec<Option<ColumnStatistics>>>,
}

/// In-memory stripe source whose statistics are derived from its rows.
///
/// Statistics can be overridden after derivation, which lets tests break the
/// containment between granularities on purpose.
pub struct MemoryFile {
    schema: Schema,
    stride: u64,
    stripes: Vec<MemoryStripe>,
    file_statistics: Vec<Option<ColumnStatistics>>,
    row_group_counts: HashMap<usize, usize>,
    fail_materialize: bool,
    fail_statistics: bool,
    materialize_calls: AtomicUsize,
}

impl MemoryFile {
    pub fn total_rows(&self) -> u64 {
        self.stripes.iter().map(|s| s.rows.num_rows() as u64).sum()
    }

    /// Number of `materialize_rows` calls served so far
    pub fn materialize_calls(&self) -> usize {
        self.materialize_calls.load(AtomicOrdering::SeqCst)
    }

    /// Value of a column at an absolute row; `None` for nulls
    pub fn value(&self, column: usize, row: u64) -> Option<Literal> {
        let mut first = 0u64;
        for stripe in &self.stripes {
            let len = stripe.rows.num_rows() as u64;
            if row < first + len {
                return stripe
                    .rows
                    .column_at(column)
                    .ok()?
                    .literal_at((row - first) as usize);
            }
            first += len;
        }
        None
    }

    fn stripe(&self, stripe: usize) -> reader::Result<&MemoryStripe> {
        self.stripes
            .get(stripe)
            .ok_or_else(|| ReaderError::data_access(format!("no stripe {}", stripe)))
    }

    fn check_statistics(&self) -> reader::Result<()> {
        if self.fail_statistics {
            return Err(ReaderError::data_access("statistics unavailable"));
        }
        Ok(())
    }
}

impl StripeSource for MemoryFile {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn row_index_stride(&self) -> u64 {
        self.stride
    }

    fn stripe_count(&self) -> usize {
        self.stripes.len()
    }

    fn stripe_row_count(&self, stripe: usize) -> reader::Result<u64> {
        Ok(self.stripe(stripe)?.rows.num_rows() as u64)
    }

    fn file_statistics(&self, column: usize) -> reader::Result<Option<ColumnStatistics>> {
        self.check_statistics()?;
        Ok(self.file_statistics.get(column).cloned().flatten())
    }

    fn stripe_statistics(
        &self,
        stripe: usize,
        column: usize,
    ) -> reader::Result<Option<ColumnStatistics>> {
        self.check_statistics()?;
        Ok(self.stripe(stripe)?.statistics.get(column).cloned().flatten())
    }

    fn row_group_count(&self, stripe: usize) -> reader::Result<usize> {
        match self.row_group_counts.get(&stripe) {
            Some(count) => Ok(*count),
            None => Ok(self.stripe(stripe)?.groups.len()),
        }
    }

    fn row_group_statistics(
        &self,
        stripe: usize,
        group: usize,
        column: usize,
    ) -> reader::Result<Option<ColumnStatistics>> {
        self.check_statistics()?;
        let groups = &self.stripe(stripe)?.groups;
        Ok(groups
            .get(group)
            .and_then(|columns| columns.get(column).cloned().flatten()))
    }

    fn materialize_rows(
        &self,
        stripe: usize,
        group: usize,
        row_offset: u64,
        count: u64,
    ) -> reader::Result<RowBatch> {
        if self.fail_materialize {
            return Err(ReaderError::data_access("injected read failure"));
        }
        self.materialize_calls.fetch_add(1, AtomicOrdering::SeqCst);
        let start = group as u64 * self.stride + row_offset;
        self.stripe(stripe)?.rows.slice(start as usize, count as usize)
    }
}

/// Builds a [`MemoryFile`] stripe by stripe
pub struct MemoryFileBuilder {
    schema: Schema,
    stride: u64,
    stripes: Vec<RowBatch>,
    file_overrides: Vec<(usize, Option<ColumnStatistics>)>,
    stripe_overrides: Vec<(usize, usize, Option<ColumnStatistics>)>,
    group_overrides: Vec<(usize, usize, usize, Option<ColumnStatistics>)>,
    row_group_counts: HashMap<usize, usize>,
    fail_materialize: bool,
    fail_statistics: bool,
}

impl MemoryFileBuilder {
    pub fn new(schema: Schema, stride: u64) -> Self {
        Self {
            schema,
            stride,
            stripes: Vec::new(),
            file_overrides: Vec::new(),
            stripe_overrides: Vec::new(),
            group_overrides: Vec::new(),
            row_group_counts: HashMap::new(),
            fail_materialize: false,
            fail_statistics: false,
        }
    }

    pub fn stripe(mut self, columns: Vec<ColumnVector>) -> anyhow::Result<Self> {
        self.stripes
            .push(RowBatch::try_new(self.schema.clone(), columns)?);
        Ok(self)
    }

    pub fn file_statistics(mut self, column: usize, stats: Option<ColumnStatistics>) -> Self {
        self.file_overrides.push((column, stats));
        self
    }

    pub fn stripe_statistics(
        mut self,
        stripe: usize,
        column: usize,
        stats: Option<ColumnStatistics>,
    ) -> Self {
        self.stripe_overrides.push((stripe, column, stats));
        self
    }

    pub fn row_group_statistics(
        mut self,
        stripe: usize,
        group: usize,
        column: usize,
        stats: Option<ColumnStatistics>,
    ) -> Self {
        self.group_overrides.push((stripe, group, column, stats));
        self
    }

    /// Reports a row index with `count` groups for the stripe
    pub fn row_group_count(mut self, stripe: usize, count: usize) -> Self {
        self.row_group_counts.insert(stripe, count);
        self
    }

    pub fn fail_materialize(mut self) -> Self {
        self.fail_materialize = true;
        self
    }

    pub fn fail_statistics(mut self) -> Self {
        self.fail_statistics = true;
        self
    }

    pub fn build(self) -> anyhow::Result<MemoryFile> {
        let columns = self.schema.len();
        let mut stripes = Vec::with_capacity(self.stripes.len());
        let mut file_statistics: Vec<Option<ColumnStatistics>> = vec![None; columns];

        for rows in self.stripes {
            let num_rows = rows.num_rows() as u64;
            let group_len = if self.stride == 0 { num_rows.max(1) } else { self.stride };
            let mut groups = Vec::new();
            let mut start = 0;
            while start < num_rows {
                let len = group_len.min(num_rows - start);
                let stats = (0..columns)
                    .map(|c| derive_statistics(rows.column_at(c)?, start as usize, len as usize).map(Some))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                groups.push(stats);
                start += len;
            }

            let mut statistics: Vec<Option<ColumnStatistics>> = vec![None; columns];
            for group in &groups {
                for (c, stats) in group.iter().enumerate() {
                    statistics[c] = merge(statistics[c].take(), stats.as_ref())?;
                }
            }
            for (c, stats) in statistics.iter().enumerate() {
                file_statistics[c] = merge(file_statistics[c].take(), stats.as_ref())?;
            }

            stripes.push(MemoryStripe {
                rows,
                statistics,
                groups,
            });
        }

        for (column, stats) in self.file_overrides {
            set(&mut file_statistics, column, stats)?;
        }
        for (stripe, column, stats) in self.stripe_overrides {
            let target = stripes
                .get_mut(stripe)
                .ok_or_else(|| anyhow::anyhow!("no stripe {}", stripe))?;
            set(&mut target.statistics, column, stats)?;
        }
        for (stripe, group, column, stats) in self.group_overrides {
            let target = stripes
                .get_mut(stripe)
                .and_then(|s| s.groups.get_mut(group))
                .ok_or_else(|| anyhow::anyhow!("no row group {} in stripe {}", group, stripe))?;
            set(target, column, stats)?;
        }

        Ok(MemoryFile {
            schema: self.schema,
            stride: self.stride,
            stripes,
            file_statistics,
            row_group_counts: self.row_group_counts,
            fail_materialize: self.fail_materialize,
            fail_statistics: self.fail_statistics,
            materialize_calls: AtomicUsize::new(0),
        })
    }
}

fn set(
    slots: &mut [Option<ColumnStatistics>],
    column: usize,
    stats: Option<ColumnStatistics>,
) -> anyhow::Result<()> {
    let slot = slots
        .get_mut(column)
        .ok_or_else(|| anyhow::anyhow!("no column {}", column))?;
    *slot = stats;
    Ok(())
}

fn merge(
    acc: Option<ColumnStatistics>,
    next: Option<&ColumnStatistics>,
) -> anyhow::Result<Option<ColumnStatistics>> {
    Ok(match (acc, next) {
        (Some(acc), Some(next)) => Some(acc.merge(next)?),
        (None, Some(next)) => Some(next.clone()),
        (acc, None) => acc,
    })
}

/// Statistics of `len` values starting at `offset`
pub fn derive_statistics(
    vector: &ColumnVector,
    offset: usize,
    len: usize,
) -> anyhow::Result<ColumnStatistics> {
    let mut has_null = false;
    let mut count = 0u64;
    let mut min: Option<Literal> = None;
    let mut max: Option<Literal> = None;
    for index in offset..offset + len {
        let Some(value) = vector.literal_at(index) else {
            has_null = true;
            continue;
        };
        count += 1;
        if min.as_ref().map_or(Ok(true), |m| is(&value, m, Ordering::Less))? {
            min = Some(value.clone());
        }
        if max.as_ref().map_or(Ok(true), |m| is(&value, m, Ordering::Greater))? {
            max = Some(value);
        }
    }
    Ok(ColumnStatistics::new(has_null, count, min, max))
}

fn is(a: &Literal, b: &Literal, ordering: Ordering) -> anyhow::Result<bool> {
    Ok(a.try_cmp(b)? == Some(ordering))
}

fn int_string_schema() -> anyhow::Result<Schema> {
    Ok(Schema::from_fields(vec![
        Field::new("int1", DataType::Int64, true),
        Field::new("string1", DataType::Utf8, true),
    ])?)
}

/// One stripe of 3500 rows: `int1 = 300 * i` and `string1 = (10 * i)` as text
pub fn int_string_builder() -> anyhow::Result<MemoryFileBuilder> {
    let ints: Vec<i64> = (0..STRIPE_ROWS as i64).map(|i| 300 * i).collect();
    let strings: Vec<String> = (0..STRIPE_ROWS as i64).map(|i| (10 * i).to_string()).collect();
    MemoryFileBuilder::new(int_string_schema()?, STRIDE).stripe(vec![
        ColumnVector::Long(Int64Array::from(ints)),
        ColumnVector::String(StringArray::from(strings)),
    ])
}

pub fn int_string_file() -> anyhow::Result<MemoryFile> {
    int_string_builder()?.build()
}

/// Two stripes of 3500 rows where `col1` holds the absolute row number
pub fn two_stripe_file() -> anyhow::Result<MemoryFile> {
    let schema = Schema::from_fields(vec![Field::new("col1", DataType::Int64, true)])?;
    let mut builder = MemoryFileBuilder::new(schema, STRIDE);
    for stripe in 0..2 {
        let first = stripe * STRIPE_ROWS as i64;
        let values: Vec<i64> = (first..first + STRIPE_ROWS as i64).collect();
        builder = builder.stripe(vec![ColumnVector::Long(Int64Array::from(values))])?;
    }
    builder.build()
}

/// Row reader over `file` with the given search argument
pub fn row_reader(
    file: MemoryFile,
    sarg: Option<SearchArgument>,
) -> anyhow::Result<RowReader<MemoryFile>> {
    let reader = Reader::open(file)?;
    let mut options = RowReaderOptions::new();
    if let Some(sarg) = sarg {
        options = options.with_search_argument(sarg);
    }
    Ok(reader.row_reader(&options)?)
}

/// A produced batch with the cursor position reported for it
pub struct ScannedBatch {
    pub first_row: u64,
    pub batch: RowBatch,
}

impl ScannedBatch {
    /// Absolute row numbers covered by the batch
    pub fn rows(&self) -> impl Iterator<Item = u64> + '_ {
        self.first_row..self.first_row + self.batch.num_rows() as u64
    }
}

/// Drains a row reader
pub fn scan_all(
    rows: &mut RowReader<MemoryFile>,
    capacity: usize,
) -> anyhow::Result<Vec<ScannedBatch>> {
    let mut batch = rows.create_row_batch(capacity)?;
    let mut out = Vec::new();
    while rows.produce_batch(&mut batch)? {
        out.push(ScannedBatch {
            first_row: rows.current_row_number(),
            batch: batch.clone(),
        });
    }
    Ok(out)
}

/// Absolute rows that satisfy the search argument under direct row-by-row
/// evaluation with SQL null semantics
pub fn matching_rows(file: &MemoryFile, sarg: &Arc<SearchArgument>) -> anyhow::Result<Vec<u64>> {
    let bound = BoundSearchArgument::bind(Arc::clone(sarg), file.schema())?;
    let mut rows = Vec::new();
    for row in 0..file.total_rows() {
        let leaves = sarg
            .leaves()
            .iter()
            .zip(bound.columns())
            .map(|(leaf, &column)| leaf_matches(leaf, file.value(column, row).as_ref()))
            .collect::<anyhow::Result<Vec<_>>>()?;
        if evaluate_row(sarg.expression(), &leaves) == Some(true) {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn leaf_matches(leaf: &PredicateLeaf, value: Option<&Literal>) -> anyhow::Result<Option<bool>> {
    let literals = leaf.literals();
    let Some(value) = value else {
        return Ok(match leaf.operator() {
            Operator::IsNull => Some(true),
            Operator::NullSafeEquals => Some(false),
            _ => None,
        });
    };
    let result = match leaf.operator() {
        Operator::IsNull => false,
        Operator::Equals | Operator::NullSafeEquals => is(value, &literals[0], Ordering::Equal)?,
        Operator::LessThan => is(value, &literals[0], Ordering::Less)?,
        Operator::LessThanEquals => !is(value, &literals[0], Ordering::Greater)?,
        Operator::Between => {
            !is(value, &literals[0], Ordering::Less)? && !is(value, &literals[1], Ordering::Greater)?
        }
        Operator::In => {
            let mut found = false;
            for literal in literals {
                found |= is(value, literal, Ordering::Equal)?;
            }
            found
        }
    };
    Ok(Some(result))
}

fn evaluate_row(expr: &ExpressionTree, leaves: &[Option<bool>]) -> Option<bool> {
    match expr {
        ExpressionTree::Leaf(idx) => leaves.get(*idx).copied().flatten(),
        ExpressionTree::Not(child) => evaluate_row(child, leaves).map(|v| !v),
        ExpressionTree::And(children) => {
            let values: Vec<_> = children.iter().map(|c| evaluate_row(c, leaves)).collect();
            if values.contains(&Some(false)) {
                Some(false)
            } else if values.contains(&None) {
                None
            } else {
                Some(true)
            }
        }
        ExpressionTree::Or(children) => {
            let values: Vec<_> = children.iter().map(|c| evaluate_row(c, leaves)).collect();
            if values.contains(&Some(true)) {
                Some(true)
            } else if values.contains(&None) {
                None
            } else {
                Some(false)
            }
        }
    }
}
