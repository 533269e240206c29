//! File schema and column resolution
//!
//! Columns are addressed by name or by zero-based field ordinal. Each field's
//! Arrow type maps to exactly one predicate type.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema as ArrowSchema, SchemaRef, TimeUnit};
use sarg::{ColumnRef, ColumnResolver, PredicateDataType};

use crate::error::{ReaderError, Result};

/// Schema of a file, backed by an Arrow schema
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    arrow: SchemaRef,
    kinds: Vec<PredicateDataType>,
}

impl Schema {
    /// Wraps an Arrow schema, rejecting field types with no predicate kind
    pub fn try_new(arrow: SchemaRef) -> Result<Self> {
        let kinds = arrow
            .fields()
            .iter()
            .map(|f| kind_of(f.name(), f.data_type()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { arrow, kinds })
    }

    pub fn from_fields(fields: Vec<Field>) -> Result<Self> {
        Self::try_new(Arc::new(ArrowSchema::new(fields)))
    }

    pub fn arrow_schema(&self) -> &SchemaRef {
        &self.arrow
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn field(&self, ordinal: usize) -> Option<&Field> {
        self.arrow.fields().get(ordinal).map(|f| f.as_ref())
    }

    pub fn kind(&self, ordinal: usize) -> Option<PredicateDataType> {
        self.kinds.get(ordinal).copied()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.arrow.index_of(name).ok()
    }

    /// Schema restricted to the given ordinals, in the given order
    pub fn project(&self, ordinals: &[usize]) -> Result<Schema> {
        let arrow = self.arrow.project(ordinals)?;
        let kinds = ordinals
            .iter()
            .map(|&i| {
                self.kind(i)
                    .ok_or_else(|| ReaderError::MissingColumn(format!("#{}", i)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Schema {
            arrow: Arc::new(arrow),
            kinds,
        })
    }
}

impl ColumnResolver for Schema {
    fn resolve(&self, column: &ColumnRef) -> Option<(usize, PredicateDataType)> {
        let ordinal = match column {
            ColumnRef::Name(name) => self.index_of(name)?,
            ColumnRef::Id(id) => *id,
        };
        self.kind(ordinal).map(|kind| (ordinal, kind))
    }
}

/// Predicate kind for an Arrow data type
pub fn kind_of(column: &str, data_type: &DataType) -> Result<PredicateDataType> {
    match data_type {
        DataType::Int64 => Ok(PredicateDataType::Long),
        DataType::Float64 => Ok(PredicateDataType::Float),
        DataType::Utf8 => Ok(PredicateDataType::String),
        DataType::Boolean => Ok(PredicateDataType::Boolean),
        DataType::Decimal128(_, _) => Ok(PredicateDataType::Decimal),
        DataType::Date32 => Ok(PredicateDataType::Date),
        DataType::Timestamp(TimeUnit::Nanosecond, _) => Ok(PredicateDataType::Timestamp),
        other => Err(ReaderError::UnsupportedType {
            column: column.to_string(),
            data_type: format!("{:?}", other),
        }),
    }
}

/// Checks that a batch's Arrow schema matches the expected one field by field
pub fn validate_batch_schema(expected: &ArrowSchema, actual: &ArrowSchema) -> Result<()> {
    if expected.fields().len() != actual.fields().len() {
        return Err(ReaderError::InvalidBatch(format!(
            "expected {} columns, got {}",
            expected.fields().len(),
            actual.fields().len()
        )));
    }
    for (e, a) in expected.fields().iter().zip(actual.fields()) {
        if e.name() != a.name() || e.data_type() != a.data_type() {
            return Err(ReaderError::InvalidBatch(format!(
                "column {} ({:?}) does not match {} ({:?})",
                a.name(),
                a.data_type(),
                e.name(),
                e.data_type()
            )));
        }
    }
    Ok(())
}
