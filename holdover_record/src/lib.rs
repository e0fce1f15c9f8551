// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Holdover Record: the structural state model and its snapshot codecs.
//!
//! Every state holder in Holdover captures into, and restores from, a
//! [`Record`]. This crate defines that model and the pieces that sit directly
//! on it:
//!
//! - [`Record`] / [`RecordKind`]: a closed, recursive, nameless value type.
//! - [`StateValue`]: conversions between concrete property types and records.
//! - [`pack_slots`] / [`unpack_slots`]: positional records with trailing-empty
//!   trimming and arity checks.
//! - [`StateShapeMismatch`]: the one error a restore can fail with, carrying a
//!   path to the offending slot, child, key, or item.
//! - [`SnapshotCodec`]: [`BinaryCodec`], [`TextCodec`], and (with the `json`
//!   feature) `JsonCodec`.
//!
//! ## Quick Start
//!
//! ```rust
//! use holdover_record::{BinaryCodec, Record, SnapshotCodec, TextCodec, pack_slots, unpack_slots};
//!
//! // A component with its own state plus two children, only the second of
//! // which changed.
//! let own = None;
//! let first_child = None;
//! let second_child = Some(Record::Entries(vec![("Bold".into(), Record::Bool(true))]));
//! let record = pack_slots([own, first_child, second_child]).unwrap();
//!
//! let codec = TextCodec::new(BinaryCodec::new());
//! let blob = codec.encode(&record).unwrap();
//!
//! let [own, first_child, second_child] = unpack_slots::<3>(Some(codec.decode(&blob).unwrap())).unwrap();
//! assert!(own.is_none() && first_child.is_none());
//! assert!(second_child.is_some());
//! ```
//!
//! ## Features
//!
//! - `json`: enables `JsonCodec`, a human-readable codec for debugging.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod codec;
mod error;
mod record;
mod slots;
mod value;

#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use codec::{
    BinaryCodec, CodecOptions, DEFAULT_MAX_BLOB_LEN, DEFAULT_MAX_DEPTH, SnapshotCodec, TextCodec,
};
pub use error::{EncodeError, MismatchKind, PathSegment, StateShapeMismatch};
pub use record::{Record, RecordKind};
pub use slots::{pack_slots, unpack_slots, unpack_slots_dyn};
pub use value::StateValue;
