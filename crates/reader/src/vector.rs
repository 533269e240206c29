//! Typed column vectors
//!
//! Each variant wraps the Arrow array for one predicate kind. Checked accessors
//! return `ColumnKindMismatch` instead of panicking on the wrong variant.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Decimal128Array, Float64Array, Int64Array,
    StringArray, TimestampNanosecondArray,
};
use arrow::compute::concat;
use sarg::{Decimal, Literal, PredicateDataType};

use crate::error::{ReaderError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnVector {
    Long(Int64Array),
    Float(Float64Array),
    String(StringArray),
    Boolean(BooleanArray),
    Decimal(Decimal128Array),
    Date(Date32Array),
    Timestamp(TimestampNanosecondArray),
}

macro_rules! checked_accessor {
    ($name:ident, $variant:ident, $array:ty, $kind:ident) => {
        pub fn $name(&self) -> Result<&$array> {
            match self {
                ColumnVector::$variant(array) => Ok(array),
                other => Err(ReaderError::ColumnKindMismatch {
                    expected: PredicateDataType::$kind,
                    actual: other.kind(),
                }),
            }
        }
    };
}

impl ColumnVector {
    pub fn kind(&self) -> PredicateDataType {
        match self {
            ColumnVector::Long(_) => PredicateDataType::Long,
            ColumnVector::Float(_) => PredicateDataType::Float,
            ColumnVector::String(_) => PredicateDataType::String,
            ColumnVector::Boolean(_) => PredicateDataType::Boolean,
            ColumnVector::Decimal(_) => PredicateDataType::Decimal,
            ColumnVector::Date(_) => PredicateDataType::Date,
            ColumnVector::Timestamp(_) => PredicateDataType::Timestamp,
        }
    }

    pub fn as_array(&self) -> &dyn Array {
        match self {
            ColumnVector::Long(a) => a,
            ColumnVector::Float(a) => a,
            ColumnVector::String(a) => a,
            ColumnVector::Boolean(a) => a,
            ColumnVector::Decimal(a) => a,
            ColumnVector::Date(a) => a,
            ColumnVector::Timestamp(a) => a,
        }
    }

    pub fn to_array_ref(&self) -> ArrayRef {
        match self {
            ColumnVector::Long(a) => Arc::new(a.clone()),
            ColumnVector::Float(a) => Arc::new(a.clone()),
            ColumnVector::String(a) => Arc::new(a.clone()),
            ColumnVector::Boolean(a) => Arc::new(a.clone()),
            ColumnVector::Decimal(a) => Arc::new(a.clone()),
            ColumnVector::Date(a) => Arc::new(a.clone()),
            ColumnVector::Timestamp(a) => Arc::new(a.clone()),
        }
    }

    /// Wraps an Arrow array whose type has a predicate kind
    pub fn try_from_array(array: &dyn Array) -> Result<Self> {
        let any = array.as_any();
        let vector = if let Some(a) = any.downcast_ref::<Int64Array>() {
            ColumnVector::Long(a.clone())
        } else if let Some(a) = any.downcast_ref::<Float64Array>() {
            ColumnVector::Float(a.clone())
        } else if let Some(a) = any.downcast_ref::<StringArray>() {
            ColumnVector::String(a.clone())
        } else if let Some(a) = any.downcast_ref::<BooleanArray>() {
            ColumnVector::Boolean(a.clone())
        } else if let Some(a) = any.downcast_ref::<Decimal128Array>() {
            ColumnVector::Decimal(a.clone())
        } else if let Some(a) = any.downcast_ref::<Date32Array>() {
            ColumnVector::Date(a.clone())
        } else if let Some(a) = any.downcast_ref::<TimestampNanosecondArray>() {
            ColumnVector::Timestamp(a.clone())
        } else {
            return Err(ReaderError::UnsupportedType {
                column: String::new(),
                data_type: format!("{:?}", array.data_type()),
            });
        };
        Ok(vector)
    }

    pub fn len(&self) -> usize {
        self.as_array().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        self.as_array().null_count()
    }

    checked_accessor!(as_long, Long, Int64Array, Long);
    checked_accessor!(as_float, Float, Float64Array, Float);
    checked_accessor!(as_string, String, StringArray, String);
    checked_accessor!(as_boolean, Boolean, BooleanArray, Boolean);
    checked_accessor!(as_decimal, Decimal, Decimal128Array, Decimal);
    checked_accessor!(as_date, Date, Date32Array, Date);
    checked_accessor!(as_timestamp, Timestamp, TimestampNanosecondArray, Timestamp);

    /// Value at `index` as a literal; `None` for nulls and out-of-range indexes
    pub fn literal_at(&self, index: usize) -> Option<Literal> {
        if index >= self.len() || self.as_array().is_null(index) {
            return None;
        }
        match self {
            ColumnVector::Long(a) => Some(Literal::Long(a.value(index))),
            ColumnVector::Float(a) => Some(Literal::Float(a.value(index))),
            ColumnVector::String(a) => Some(Literal::String(a.value(index).to_string())),
            ColumnVector::Boolean(a) => Some(Literal::Boolean(a.value(index))),
            ColumnVector::Decimal(a) => {
                Some(Literal::Decimal(Decimal::new(a.value(index), a.scale())))
            }
            ColumnVector::Date(a) => a.value_as_date(index).map(Literal::Date),
            ColumnVector::Timestamp(a) => a
                .value_as_datetime(index)
                .map(|ts| Literal::Timestamp(ts.and_utc())),
        }
    }

    /// Zero-copy slice
    pub fn slice(&self, offset: usize, length: usize) -> ColumnVector {
        match self {
            ColumnVector::Long(a) => ColumnVector::Long(a.slice(offset, length)),
            ColumnVector::Float(a) => ColumnVector::Float(a.slice(offset, length)),
            ColumnVector::String(a) => ColumnVector::String(a.slice(offset, length)),
            ColumnVector::Boolean(a) => ColumnVector::Boolean(a.slice(offset, length)),
            ColumnVector::Decimal(a) => ColumnVector::Decimal(a.slice(offset, length)),
            ColumnVector::Date(a) => ColumnVector::Date(a.slice(offset, length)),
            ColumnVector::Timestamp(a) => ColumnVector::Timestamp(a.slice(offset, length)),
        }
    }

    /// Concatenates vectors of the same kind
    pub fn concat(parts: &[&ColumnVector]) -> Result<ColumnVector> {
        let Some(first) = parts.first() else {
            return Err(ReaderError::InvalidBatch("nothing to concatenate".to_string()));
        };
        if let Some(other) = parts.iter().find(|p| p.kind() != first.kind()) {
            return Err(ReaderError::ColumnKindMismatch {
                expected: first.kind(),
                actual: other.kind(),
            });
        }
        let arrays: Vec<&dyn Array> = parts.iter().map(|p| p.as_array()).collect();
        let merged = concat(&arrays)?;
        ColumnVector::try_from_array(merged.as_ref())
    }
}
