// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positional record helpers.
//!
//! A positional record is an ordered list of nullable slots whose meaning is
//! fixed by the consuming type. Trailing empty slots are trimmed on capture,
//! so a consumer accepts any length up to its declared arity and treats the
//! missing tail as empty.

use alloc::vec::Vec;

use crate::error::StateShapeMismatch;
use crate::record::{Record, RecordKind};

/// Packs captured slots into a positional record.
///
/// Trailing `None` slots are trimmed. Returns `None` if every slot is `None`.
///
/// # Example
///
/// ```rust
/// use holdover_record::{Record, pack_slots};
///
/// assert_eq!(pack_slots([None, None]), None);
///
/// let packed = pack_slots([None, Some(Record::Int(1)), None]);
/// assert_eq!(packed, Some(Record::Slots(vec![None, Some(Record::Int(1))])));
/// ```
#[must_use]
pub fn pack_slots<I>(slots: I) -> Option<Record>
where
    I: IntoIterator<Item = Option<Record>>,
{
    let mut slots: Vec<Option<Record>> = slots.into_iter().collect();
    while matches!(slots.last(), Some(None)) {
        slots.pop();
    }
    if slots.is_empty() {
        None
    } else {
        Some(Record::Slots(slots))
    }
}

/// Unpacks a positional record of at most `N` slots.
///
/// `None` unpacks to all-empty slots. Shorter records are padded with `None`.
///
/// # Errors
///
/// Returns [`StateShapeMismatch`] if the record is not [`Record::Slots`] or
/// has more than `N` slots.
///
/// # Example
///
/// ```rust
/// use holdover_record::{Record, unpack_slots};
///
/// let record = Record::Slots(vec![None, Some(Record::Bool(true))]);
/// let [own, first, second] = unpack_slots::<3>(Some(record)).unwrap();
/// assert!(own.is_none());
/// assert_eq!(first, Some(Record::Bool(true)));
/// assert!(second.is_none());
///
/// let too_long = Record::Slots(vec![None, None, None, None]);
/// assert!(unpack_slots::<3>(Some(too_long)).is_err());
/// ```
pub fn unpack_slots<const N: usize>(
    record: Option<Record>,
) -> Result<[Option<Record>; N], StateShapeMismatch> {
    let mut out: [Option<Record>; N] = core::array::from_fn(|_| None);
    for (index, slot) in unpack_slots_dyn(record, N)?.into_iter().enumerate() {
        out[index] = slot;
    }
    Ok(out)
}

/// Unpacks a positional record of at most `max` slots into a vector of
/// exactly `max` slots.
///
/// This is the runtime-arity form of [`unpack_slots`], for consumers whose
/// slot count is only known once they are constructed.
///
/// # Errors
///
/// Same as [`unpack_slots`].
pub fn unpack_slots_dyn(
    record: Option<Record>,
    max: usize,
) -> Result<Vec<Option<Record>>, StateShapeMismatch> {
    let mut slots = match record {
        None => Vec::new(),
        Some(Record::Slots(slots)) => slots,
        Some(other) => return Err(StateShapeMismatch::kind(RecordKind::Slots, other.kind())),
    };
    if slots.len() > max {
        return Err(StateShapeMismatch::arity(max, slots.len()));
    }
    slots.resize(max, None);
    Ok(slots)
}
