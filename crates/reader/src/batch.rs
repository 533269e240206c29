//! Row batches: a capacity plus one column vector per projected field

use arrow::array::{new_empty_array, ArrayRef};
use arrow::record_batch::RecordBatch;

use crate::error::{ReaderError, Result};
use crate::schema::{validate_batch_schema, Schema};
use crate::vector::ColumnVector;

/// A batch of rows with a fixed capacity.
///
/// The reader refills the same batch on every call, so a batch is created
/// once per scan and reused.
#[derive(Debug, Clone)]
pub struct RowBatch {
    schema: Schema,
    columns: Vec<ColumnVector>,
    num_rows: usize,
    capacity: usize,
}

impl RowBatch {
    /// Creates an empty batch able to hold `capacity` rows
    pub fn with_capacity(schema: &Schema, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ReaderError::InvalidBatch(
                "batch capacity must be greater than zero".to_string(),
            ));
        }
        let columns = schema
            .arrow_schema()
            .fields()
            .iter()
            .map(|f| ColumnVector::try_from_array(new_empty_array(f.data_type()).as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            schema: schema.clone(),
            columns,
            num_rows: 0,
            capacity,
        })
    }

    /// Creates a full batch from columns, checking kinds and lengths against
    /// the schema
    pub fn try_new(schema: Schema, columns: Vec<ColumnVector>) -> Result<Self> {
        if columns.len() != schema.len() {
            return Err(ReaderError::InvalidBatch(format!(
                "schema has {} columns, got {}",
                schema.len(),
                columns.len()
            )));
        }
        for (ordinal, column) in columns.iter().enumerate() {
            if let Some(expected) = schema.kind(ordinal) {
                if expected != column.kind() {
                    return Err(ReaderError::ColumnKindMismatch {
                        expected,
                        actual: column.kind(),
                    });
                }
            }
        }
        let num_rows = columns.first().map(ColumnVector::len).unwrap_or(0);
        if let Some(ragged) = columns.iter().find(|c| c.len() != num_rows) {
            return Err(ReaderError::InvalidBatch(format!(
                "ragged columns: {} rows vs {} rows",
                num_rows,
                ragged.len()
            )));
        }
        Ok(Self {
            schema,
            columns,
            num_rows,
            capacity: num_rows.max(1),
        })
    }

    /// Wraps an Arrow record batch
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        let schema = Schema::try_new(batch.schema())?;
        let columns = batch
            .columns()
            .iter()
            .map(|c| ColumnVector::try_from_array(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::try_new(schema, columns)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn columns(&self) -> &[ColumnVector] {
        &self.columns
    }

    pub fn column_at(&self, ordinal: usize) -> Result<&ColumnVector> {
        self.columns
            .get(ordinal)
            .ok_or_else(|| ReaderError::MissingColumn(format!("#{}", ordinal)))
    }

    pub fn column(&self, name: &str) -> Result<&ColumnVector> {
        let ordinal = self
            .schema
            .index_of(name)
            .ok_or_else(|| ReaderError::MissingColumn(name.to_string()))?;
        self.column_at(ordinal)
    }

    /// Drops all rows, keeping schema and capacity
    pub fn clear(&mut self) {
        for column in &mut self.columns {
            *column = column.slice(0, 0);
        }
        self.num_rows = 0;
    }

    /// Replaces the contents with `other`'s rows, keeping this batch's capacity
    pub(crate) fn fill_from(&mut self, other: RowBatch) -> Result<()> {
        if other.num_rows > self.capacity {
            return Err(ReaderError::InvalidBatch(format!(
                "{} rows exceed batch capacity {}",
                other.num_rows, self.capacity
            )));
        }
        validate_batch_schema(self.schema.arrow_schema(), other.schema.arrow_schema())?;
        self.columns = other.columns;
        self.num_rows = other.num_rows;
        Ok(())
    }

    /// Zero-copy slice of `length` rows starting at `offset`
    pub fn slice(&self, offset: usize, length: usize) -> Result<RowBatch> {
        if offset + length > self.num_rows {
            return Err(ReaderError::InvalidBatch(format!(
                "slice {}..{} out of bounds for {} rows",
                offset,
                offset + length,
                self.num_rows
            )));
        }
        Ok(RowBatch {
            schema: self.schema.clone(),
            columns: self.columns.iter().map(|c| c.slice(offset, length)).collect(),
            num_rows: length,
            capacity: length.max(1),
        })
    }

    /// Appends batches with identical schemas
    pub fn concat(batches: &[RowBatch]) -> Result<RowBatch> {
        let Some(first) = batches.first() else {
            return Err(ReaderError::InvalidBatch("nothing to concatenate".to_string()));
        };
        if batches.len() == 1 {
            return Ok(first.clone());
        }
        for other in &batches[1..] {
            validate_batch_schema(first.schema.arrow_schema(), other.schema.arrow_schema())?;
        }
        let columns = (0..first.columns.len())
            .map(|i| {
                let parts: Vec<&ColumnVector> = batches.iter().map(|b| &b.columns[i]).collect();
                ColumnVector::concat(&parts)
            })
            .collect::<Result<Vec<_>>>()?;
        RowBatch::try_new(first.schema.clone(), columns)
    }

    /// Keeps only the given column ordinals, in order
    pub fn project(&self, ordinals: &[usize]) -> Result<RowBatch> {
        let schema = self.schema.project(ordinals)?;
        let columns = ordinals
            .iter()
            .map(|&i| self.column_at(i).cloned())
            .collect::<Result<Vec<_>>>()?;
        Ok(RowBatch {
            schema,
            columns,
            num_rows: self.num_rows,
            capacity: self.capacity,
        })
    }

    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let arrays: Vec<ArrayRef> = self.columns.iter().map(ColumnVector::to_array_ref).collect();
        Ok(RecordBatch::try_new(self.schema.arrow_schema().clone(), arrays)?)
    }
}
