// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::record::RecordKind;

/// What was wrong with a restored record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MismatchKind {
    /// A positional record had more slots than the consumer declares.
    Arity {
        /// Largest slot count the consumer accepts.
        max: usize,
        /// Slot count actually found.
        found: usize,
    },
    /// A record of the wrong kind was found.
    Kind {
        /// The kind the consumer expected.
        expected: RecordKind,
        /// The kind actually found.
        found: RecordKind,
    },
    /// A numeric value does not fit the consumer's type.
    OutOfRange,
    /// A tombstone appeared where a value is required.
    Tombstone,
    /// The blob could not be decoded at all.
    Malformed(String),
}

/// One step of the path from the root record to a mismatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    /// A positional slot index.
    Slot(usize),
    /// A named child of a composite node.
    Child(&'static str),
    /// An attribute-store key.
    Key(String),
    /// An item index in a collection.
    Item(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(index) => write!(f, "[{index}]"),
            Self::Child(name) => write!(f, ".{name}"),
            Self::Key(key) => write!(f, "[{key:?}]"),
            Self::Item(index) => write!(f, "#{index}"),
        }
    }
}

/// A restored record does not have the shape its consumer expects.
///
/// This indicates that the blob was produced by a different component type
/// (or a different version of it) than the one consuming it, or that the blob
/// itself was corrupt. It is not recoverable locally and is distinct from any
/// validation failure of the values themselves.
///
/// The path is recorded outermost-first as the error propagates up through
/// nested state holders.
///
/// # Example
///
/// ```rust
/// use holdover_record::{MismatchKind, RecordKind, StateShapeMismatch};
///
/// let err = StateShapeMismatch::kind(RecordKind::Entries, RecordKind::Int)
///     .in_key("Text")
///     .in_slot(0);
/// assert!(matches!(err.mismatch(), MismatchKind::Kind { .. }));
/// assert_eq!(
///     err.to_string(),
///     "state shape mismatch at [0][\"Text\"]: expected entries, found int"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateShapeMismatch {
    mismatch: MismatchKind,
    path: Vec<PathSegment>,
}

impl StateShapeMismatch {
    /// Creates an error of the given kind at the root.
    #[must_use]
    pub fn new(mismatch: MismatchKind) -> Self {
        Self {
            mismatch,
            path: Vec::new(),
        }
    }

    /// A positional record with too many slots.
    #[must_use]
    pub fn arity(max: usize, found: usize) -> Self {
        Self::new(MismatchKind::Arity { max, found })
    }

    /// A record of the wrong kind.
    #[must_use]
    pub fn kind(expected: RecordKind, found: RecordKind) -> Self {
        Self::new(MismatchKind::Kind { expected, found })
    }

    /// A number that does not fit.
    #[must_use]
    pub fn out_of_range() -> Self {
        Self::new(MismatchKind::OutOfRange)
    }

    /// An undecodable blob.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::new(MismatchKind::Malformed(reason.into()))
    }

    /// Returns what was wrong.
    #[must_use]
    pub fn mismatch(&self) -> &MismatchKind {
        &self.mismatch
    }

    /// Returns the path from the root to the mismatch.
    #[must_use]
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Returns `true` if the blob itself could not be decoded.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self.mismatch, MismatchKind::Malformed(_))
    }

    /// Prefixes the path with an enclosing segment.
    #[must_use]
    pub fn within(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }

    /// Prefixes the path with a slot index.
    #[must_use]
    pub fn in_slot(self, index: usize) -> Self {
        self.within(PathSegment::Slot(index))
    }

    /// Prefixes the path with a child name.
    #[must_use]
    pub fn in_child(self, name: &'static str) -> Self {
        self.within(PathSegment::Child(name))
    }

    /// Prefixes the path with a store key.
    #[must_use]
    pub fn in_key(self, key: impl Into<String>) -> Self {
        self.within(PathSegment::Key(key.into()))
    }

    /// Prefixes the path with an item index.
    #[must_use]
    pub fn in_item(self, index: usize) -> Self {
        self.within(PathSegment::Item(index))
    }
}

impl fmt::Display for StateShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("state shape mismatch")?;
        if !self.path.is_empty() {
            f.write_str(" at ")?;
            for segment in &self.path {
                write!(f, "{segment}")?;
            }
        }
        match &self.mismatch {
            MismatchKind::Arity { max, found } => {
                write!(f, ": expected at most {max} slots, found {found}")
            }
            MismatchKind::Kind { expected, found } => {
                write!(f, ": expected {expected}, found {found}")
            }
            MismatchKind::OutOfRange => f.write_str(": value out of range"),
            MismatchKind::Tombstone => f.write_str(": unexpected tombstone"),
            MismatchKind::Malformed(reason) => write!(f, ": malformed blob ({reason})"),
        }
    }
}

impl core::error::Error for StateShapeMismatch {}

/// A codec backend failed to encode a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeError {
    reason: String,
}

impl EncodeError {
    /// Creates an encode error with a backend-provided reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns the backend-provided reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to encode state record: {}", self.reason)
    }
}

impl core::error::Error for EncodeError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn path_is_outermost_first() {
        let err = StateShapeMismatch::arity(2, 3)
            .in_item(4)
            .in_child("Items")
            .in_slot(1);
        assert_eq!(
            err.path(),
            &[
                PathSegment::Slot(1),
                PathSegment::Child("Items"),
                PathSegment::Item(4),
            ]
        );
        assert_eq!(
            err.to_string(),
            "state shape mismatch at [1].Items#4: expected at most 2 slots, found 3"
        );
    }

    #[test]
    fn root_error_has_no_path() {
        let err = StateShapeMismatch::out_of_range();
        assert!(err.path().is_empty());
        assert_eq!(err.to_string(), "state shape mismatch: value out of range");
    }

    #[test]
    fn malformed_is_flagged() {
        let err = StateShapeMismatch::malformed("unexpected end of input");
        assert!(err.is_malformed());
        assert!(!StateShapeMismatch::out_of_range().is_malformed());
        assert_eq!(
            err.to_string(),
            "state shape mismatch: malformed blob (unexpected end of input)"
        );
    }

    #[test]
    fn key_segment_is_quoted() {
        let err = StateShapeMismatch::new(MismatchKind::Tombstone).in_key("Text");
        assert_eq!(err.path(), vec![PathSegment::Key("Text".into())].as_slice());
        assert_eq!(
            err.to_string(),
            "state shape mismatch at [\"Text\"]: unexpected tombstone"
        );
    }

    #[test]
    fn encode_error_display() {
        let err = EncodeError::new("buffer full");
        assert_eq!(err.reason(), "buffer full");
        assert_eq!(
            err.to_string(),
            "failed to encode state record: buffer full"
        );
    }
}
