//! Typed scalar values used by predicate leaves and column statistics

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{Result, SargError};

/// Declared type of a predicate leaf or of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateDataType {
    Long,
    Float,
    String,
    Date,
    Decimal,
    Timestamp,
    Boolean,
}

impl fmt::Display for PredicateDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PredicateDataType::Long => "LONG",
            PredicateDataType::Float => "FLOAT",
            PredicateDataType::String => "STRING",
            PredicateDataType::Date => "DATE",
            PredicateDataType::Decimal => "DECIMAL",
            PredicateDataType::Timestamp => "TIMESTAMP",
            PredicateDataType::Boolean => "BOOLEAN",
        };
        write!(f, "{}", name)
    }
}

/// Fixed-point decimal: `value * 10^-scale`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    pub value: i128,
    pub scale: i8,
}

impl Decimal {
    pub fn new(value: i128, scale: i8) -> Self {
        Self { value, scale }
    }

    /// Compares by numeric value, rescaling the operand with the smaller scale.
    ///
    /// When the rescale overflows `i128` the rescaled magnitude exceeds any
    /// representable value, so its sign alone decides the order.
    pub fn cmp_value(&self, other: &Decimal) -> Ordering {
        // zero has no magnitude to rescale
        if self.value == 0 || other.value == 0 {
            return self.value.signum().cmp(&other.value.signum());
        }
        match self.scale.cmp(&other.scale) {
            Ordering::Equal => self.value.cmp(&other.value),
            Ordering::Less => {
                let diff = (other.scale as i32 - self.scale as i32) as u32;
                match rescale(self.value, diff) {
                    Some(lhs) => lhs.cmp(&other.value),
                    None => self.value.signum().cmp(&0),
                }
            }
            Ordering::Greater => {
                let diff = (self.scale as i32 - other.scale as i32) as u32;
                match rescale(other.value, diff) {
                    Some(rhs) => self.value.cmp(&rhs),
                    None => 0.cmp(&other.value.signum()),
                }
            }
        }
    }
}

fn rescale(value: i128, digits: u32) -> Option<i128> {
    10i128.checked_pow(digits).and_then(|m| value.checked_mul(m))
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale <= 0 {
            write!(f, "{}", self.value)?;
            for _ in 0..(-(self.scale as i32)) {
                write!(f, "0")?;
            }
            return Ok(());
        }
        let scale = self.scale as usize;
        let digits = self.value.unsigned_abs().to_string();
        let sign = if self.value < 0 { "-" } else { "" };
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{}{}.{}", sign, int, frac)
        } else {
            write!(f, "{}0.{:0>width$}", sign, digits, width = scale)
        }
    }
}

/// A typed literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Long(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Decimal(Decimal),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl Literal {
    /// The kind this literal belongs to
    pub fn kind(&self) -> PredicateDataType {
        match self {
            Literal::Long(_) => PredicateDataType::Long,
            Literal::Float(_) => PredicateDataType::Float,
            Literal::String(_) => PredicateDataType::String,
            Literal::Boolean(_) => PredicateDataType::Boolean,
            Literal::Decimal(_) => PredicateDataType::Decimal,
            Literal::Date(_) => PredicateDataType::Date,
            Literal::Timestamp(_) => PredicateDataType::Timestamp,
        }
    }

    /// Orders two literals of the same kind.
    ///
    /// Returns `Ok(None)` when the order is undecidable (a NaN float) and
    /// `IncomparableLiteral` when the kinds differ.
    pub fn try_cmp(&self, other: &Literal) -> Result<Option<Ordering>> {
        let ordering = match (self, other) {
            (Literal::Long(a), Literal::Long(b)) => Some(a.cmp(b)),
            (Literal::Float(a), Literal::Float(b)) => a.partial_cmp(b),
            (Literal::String(a), Literal::String(b)) => Some(a.cmp(b)),
            (Literal::Boolean(a), Literal::Boolean(b)) => Some(a.cmp(b)),
            (Literal::Decimal(a), Literal::Decimal(b)) => Some(a.cmp_value(b)),
            (Literal::Date(a), Literal::Date(b)) => Some(a.cmp(b)),
            (Literal::Timestamp(a), Literal::Timestamp(b)) => Some(a.cmp(b)),
            _ => {
                return Err(SargError::IncomparableLiteral {
                    left: self.kind(),
                    right: other.kind(),
                })
            }
        };
        Ok(ordering)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Long(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::String(v) => write!(f, "{}", v),
            Literal::Boolean(v) => write!(f, "{}", v),
            Literal::Decimal(v) => write!(f, "{}", v),
            Literal::Date(v) => write!(f, "{}", v),
            Literal::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Long(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Long(v as i64)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::String(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::String(v)
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Boolean(v)
    }
}

impl From<Decimal> for Literal {
    fn from(v: Decimal) -> Self {
        Literal::Decimal(v)
    }
}

impl From<NaiveDate> for Literal {
    fn from(v: NaiveDate) -> Self {
        Literal::Date(v)
    }
}

impl From<DateTime<Utc>> for Literal {
    fn from(v: DateTime<Utc>) -> Self {
        Literal::Timestamp(v)
    }
}
