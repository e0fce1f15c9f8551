// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between concrete property types and [`Record`].

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{MismatchKind, StateShapeMismatch};
use crate::record::{Record, RecordKind};

/// A type that can be persisted as a [`Record`].
///
/// Implemented for the scalar types components typically persist, and for
/// vectors of them.
///
/// # Example
///
/// ```rust
/// use holdover_record::{Record, StateValue};
///
/// let record = 42_i32.to_record();
/// assert_eq!(record, Record::Int(42));
/// assert_eq!(i32::from_record(&record), Ok(42));
///
/// // Values that do not fit are rejected, not truncated.
/// assert!(u8::from_record(&Record::Int(300)).is_err());
/// ```
pub trait StateValue: Sized {
    /// Converts this value into a record.
    fn to_record(&self) -> Record;

    /// Reads a value back from a record.
    ///
    /// # Errors
    ///
    /// Returns [`StateShapeMismatch`] if the record has the wrong kind or an
    /// out-of-range value.
    fn from_record(record: &Record) -> Result<Self, StateShapeMismatch>;
}

fn unexpected(expected: RecordKind, record: &Record) -> StateShapeMismatch {
    if record.is_tombstone() {
        StateShapeMismatch::new(MismatchKind::Tombstone)
    } else {
        StateShapeMismatch::kind(expected, record.kind())
    }
}

impl StateValue for Record {
    fn to_record(&self) -> Record {
        self.clone()
    }

    fn from_record(record: &Record) -> Result<Self, StateShapeMismatch> {
        if record.is_tombstone() {
            return Err(StateShapeMismatch::new(MismatchKind::Tombstone));
        }
        Ok(record.clone())
    }
}

impl StateValue for bool {
    fn to_record(&self) -> Record {
        Record::Bool(*self)
    }

    fn from_record(record: &Record) -> Result<Self, StateShapeMismatch> {
        match record {
            Record::Bool(value) => Ok(*value),
            other => Err(unexpected(RecordKind::Bool, other)),
        }
    }
}

macro_rules! impl_int {
    ($($ty:ty),* $(,)?) => {$(
        impl StateValue for $ty {
            fn to_record(&self) -> Record {
                Record::Int(i64::from(*self))
            }

            fn from_record(record: &Record) -> Result<Self, StateShapeMismatch> {
                match record {
                    Record::Int(value) => {
                        <$ty>::try_from(*value).map_err(|_| StateShapeMismatch::out_of_range())
                    }
                    other => Err(unexpected(RecordKind::Int, other)),
                }
            }
        }
    )*};
}

impl_int!(i8, i16, i32, i64, u8, u16, u32);

impl StateValue for f64 {
    fn to_record(&self) -> Record {
        Record::Float(*self)
    }

    fn from_record(record: &Record) -> Result<Self, StateShapeMismatch> {
        match record {
            Record::Float(value) => Ok(*value),
            other => Err(unexpected(RecordKind::Float, other)),
        }
    }
}

impl StateValue for String {
    fn to_record(&self) -> Record {
        Record::Str(self.clone())
    }

    fn from_record(record: &Record) -> Result<Self, StateShapeMismatch> {
        match record {
            Record::Str(value) => Ok(value.clone()),
            other => Err(unexpected(RecordKind::Str, other)),
        }
    }
}

impl<T: StateValue> StateValue for Vec<T> {
    fn to_record(&self) -> Record {
        Record::List(self.iter().map(StateValue::to_record).collect())
    }

    fn from_record(record: &Record) -> Result<Self, StateShapeMismatch> {
        match record {
            Record::List(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| T::from_record(item).map_err(|e| e.in_item(index)))
                .collect(),
            other => Err(unexpected(RecordKind::List, other)),
        }
    }
}
