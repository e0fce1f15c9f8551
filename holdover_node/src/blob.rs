// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Blob entry points: the two calls a host makes per request.

use alloc::vec::Vec;

use holdover_record::{EncodeError, SnapshotCodec, StateShapeMismatch};
use holdover_store::StateManager;

/// Restores a state tree from the blob the previous request produced.
///
/// A missing or empty blob leaves the tree at its defaults.
///
/// # Errors
///
/// Returns [`StateShapeMismatch`] if the blob is malformed or its record does
/// not match the tree's shape.
pub fn restore_blob<M, C>(
    manager: &mut M,
    blob: Option<&[u8]>,
    codec: &C,
) -> Result<(), StateShapeMismatch>
where
    M: StateManager + ?Sized,
    C: SnapshotCodec + ?Sized,
{
    let record = match blob {
        Some(bytes) if !bytes.is_empty() => Some(codec.decode(bytes)?),
        _ => None,
    };
    manager.restore(record)
}

/// Captures a state tree into a blob for the next request.
///
/// Returns `Ok(None)` when nothing changed since tracking began.
///
/// # Errors
///
/// Returns [`EncodeError`] if the codec fails.
pub fn capture_blob<M, C>(manager: &M, codec: &C) -> Result<Option<Vec<u8>>, EncodeError>
where
    M: StateManager + ?Sized,
    C: SnapshotCodec + ?Sized,
{
    manager
        .capture()
        .map(|record| codec.encode(&record))
        .transpose()
}
