//! Null-aware three-valued logic over partition statistics

use std::fmt;
use std::ops::Not;

/// Result of evaluating a predicate against a partition's statistics.
///
/// `Yes`/`No` are certain, `YesNo` is "maybe". The `*Null` variants record
/// that the partition also holds nulls relevant to the predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TruthValue {
    Yes,
    No,
    YesNo,
    YesNull,
    NoNull,
    YesNoNull,
}

impl TruthValue {
    pub const ALL: [TruthValue; 6] = [
        TruthValue::Yes,
        TruthValue::No,
        TruthValue::YesNo,
        TruthValue::YesNull,
        TruthValue::NoNull,
        TruthValue::YesNoNull,
    ];

    /// Combines with OR semantics
    pub fn or(self, other: TruthValue) -> TruthValue {
        use TruthValue::*;
        if self == Yes || other == Yes {
            return Yes;
        }
        if self == YesNull || other == YesNull {
            return YesNull;
        }
        match (self, other) {
            (No, x) | (x, No) => x,
            (a, b) if a == b => a,
            _ => YesNoNull,
        }
    }

    /// Combines with AND semantics
    pub fn and(self, other: TruthValue) -> TruthValue {
        use TruthValue::*;
        if self == No || other == No {
            return No;
        }
        if self == NoNull || other == NoNull {
            return NoNull;
        }
        match (self, other) {
            (Yes, x) | (x, Yes) => x,
            (a, b) if a == b => a,
            _ => YesNoNull,
        }
    }

    /// Whether a partition with this value may contain matching rows
    pub fn is_needed(self) -> bool {
        !matches!(self, TruthValue::No | TruthValue::NoNull)
    }

    /// Adds the null qualifier to a comparison outcome
    pub(crate) fn with_nulls(self, has_null: bool) -> TruthValue {
        if !has_null {
            return self;
        }
        match self {
            TruthValue::Yes => TruthValue::YesNull,
            TruthValue::No => TruthValue::NoNull,
            TruthValue::YesNo => TruthValue::YesNoNull,
            other => other,
        }
    }
}

impl Not for TruthValue {
    type Output = TruthValue;

    fn not(self) -> TruthValue {
        match self {
            TruthValue::Yes => TruthValue::No,
            TruthValue::No => TruthValue::Yes,
            TruthValue::YesNull => TruthValue::NoNull,
            TruthValue::NoNull => TruthValue::YesNull,
            TruthValue::YesNo => TruthValue::YesNo,
            TruthValue::YesNoNull => TruthValue::YesNoNull,
        }
    }
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TruthValue::Yes => "YES",
            TruthValue::No => "NO",
            TruthValue::YesNo => "YES_NO",
            TruthValue::YesNull => "YES_NULL",
            TruthValue::NoNull => "NO_NULL",
            TruthValue::YesNoNull => "YES_NO_NULL",
        };
        write!(f, "{}", name)
    }
}
