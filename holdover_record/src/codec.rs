// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapshot codecs: turning a [`Record`] into an opaque blob and back.
//!
//! Codecs are purely structural. They carry no type names, so a decoded
//! record is only meaningful to the state holder that expects its shape; the
//! codec itself checks nothing beyond well-formedness and the configured
//! [`CodecOptions`] limits.

use alloc::string::String;
use alloc::vec::Vec;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeSeed as _;

use crate::error::{EncodeError, StateShapeMismatch};
use crate::record::{Record, RecordSeed};

/// Default upper bound on an encoded blob, in bytes.
pub const DEFAULT_MAX_BLOB_LEN: usize = 1 << 20;

/// Default upper bound on record nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Limits applied when decoding.
///
/// Both limits are enforced while the blob is read: an oversized blob is
/// rejected before decoding starts, and nesting is counted as it is decoded.
///
/// # Example
///
/// ```rust
/// use holdover_record::CodecOptions;
///
/// let options = CodecOptions::new().with_max_blob_len(4096).with_max_depth(16);
/// assert_eq!(options.max_blob_len(), 4096);
/// assert_eq!(options.max_depth(), 16);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CodecOptions {
    max_blob_len: usize,
    max_depth: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecOptions {
    /// Creates options with the default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_blob_len: DEFAULT_MAX_BLOB_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the largest blob, in bytes, that decode accepts.
    #[must_use]
    pub const fn with_max_blob_len(mut self, max_blob_len: usize) -> Self {
        self.max_blob_len = max_blob_len;
        self
    }

    /// Sets the deepest record nesting that decode accepts.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns the largest accepted blob length.
    #[must_use]
    pub const fn max_blob_len(&self) -> usize {
        self.max_blob_len
    }

    /// Returns the deepest accepted nesting.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn check_len(&self, len: usize) -> Result<(), StateShapeMismatch> {
        if len > self.max_blob_len {
            return Err(StateShapeMismatch::malformed(alloc::format!(
                "blob of {len} bytes exceeds limit of {}",
                self.max_blob_len
            )));
        }
        Ok(())
    }

    fn seed(&self) -> RecordSeed {
        RecordSeed::new(self.max_depth)
    }
}

fn malformed(err: impl core::fmt::Display) -> StateShapeMismatch {
    StateShapeMismatch::malformed(alloc::format!("{err}"))
}

/// Encodes records into opaque blobs and decodes them back.
pub trait SnapshotCodec {
    /// Encodes a record.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] if the backend fails.
    fn encode(&self, record: &Record) -> Result<Vec<u8>, EncodeError>;

    /// Decodes a blob.
    ///
    /// # Errors
    ///
    /// Returns a [`StateShapeMismatch`] with a
    /// [`Malformed`](crate::MismatchKind::Malformed) kind if the blob is not
    /// well formed or exceeds the configured limits.
    fn decode(&self, blob: &[u8]) -> Result<Record, StateShapeMismatch>;
}

impl<C: SnapshotCodec + ?Sized> SnapshotCodec for &C {
    fn encode(&self, record: &Record) -> Result<Vec<u8>, EncodeError> {
        (**self).encode(record)
    }

    fn decode(&self, blob: &[u8]) -> Result<Record, StateShapeMismatch> {
        (**self).decode(blob)
    }
}

/// Compact binary codec.
///
/// # Example
///
/// ```rust
/// use holdover_record::{BinaryCodec, Record, SnapshotCodec};
///
/// let codec = BinaryCodec::new();
/// let record = Record::Slots(vec![None, Some(Record::Flags(0b101))]);
/// let blob = codec.encode(&record).unwrap();
/// assert_eq!(codec.decode(&blob).unwrap(), record);
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct BinaryCodec {
    options: CodecOptions,
}

impl BinaryCodec {
    /// Creates a codec with default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            options: CodecOptions::new(),
        }
    }

    /// Creates a codec with the given limits.
    #[must_use]
    pub const fn with_options(options: CodecOptions) -> Self {
        Self { options }
    }

    /// Returns the decode limits.
    #[must_use]
    pub const fn options(&self) -> &CodecOptions {
        &self.options
    }
}

impl SnapshotCodec for BinaryCodec {
    fn encode(&self, record: &Record) -> Result<Vec<u8>, EncodeError> {
        postcard::to_allocvec(record).map_err(|e| EncodeError::new(alloc::format!("{e}")))
    }

    fn decode(&self, blob: &[u8]) -> Result<Record, StateShapeMismatch> {
        self.options.check_len(blob.len())?;
        let mut deserializer = postcard::Deserializer::from_bytes(blob);
        let record = self
            .options
            .seed()
            .deserialize(&mut deserializer)
            .map_err(malformed)?;
        let rest = deserializer.finalize().map_err(malformed)?;
        if !rest.is_empty() {
            return Err(StateShapeMismatch::malformed(alloc::format!(
                "{} trailing bytes",
                rest.len()
            )));
        }
        log::trace!("decoded {} byte state blob", blob.len());
        Ok(record)
    }
}

/// Wraps another codec's output in standard base64.
///
/// The resulting blob is plain ASCII and can travel in a hidden form field.
///
/// # Example
///
/// ```rust
/// use holdover_record::{BinaryCodec, Record, TextCodec};
///
/// let codec = TextCodec::new(BinaryCodec::new());
/// let text = codec.encode_text(&Record::Str("Name".into())).unwrap();
/// assert!(text.is_ascii());
/// assert_eq!(codec.decode_text(&text).unwrap(), Record::Str("Name".into()));
/// assert!(codec.decode_text("not base64!").is_err());
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct TextCodec<C = BinaryCodec> {
    inner: C,
}

impl<C: SnapshotCodec> TextCodec<C> {
    /// Wraps `inner`.
    #[must_use]
    pub const fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Returns the wrapped codec.
    #[must_use]
    pub const fn inner(&self) -> &C {
        &self.inner
    }

    /// Encodes a record as a base64 string.
    ///
    /// # Errors
    ///
    /// Propagates the wrapped codec's [`EncodeError`].
    pub fn encode_text(&self, record: &Record) -> Result<String, EncodeError> {
        Ok(STANDARD.encode(self.inner.encode(record)?))
    }

    /// Decodes a base64 string.
    ///
    /// # Errors
    ///
    /// Returns a malformed [`StateShapeMismatch`] if the text is not valid
    /// base64 or the wrapped codec rejects the payload.
    pub fn decode_text(&self, text: &str) -> Result<Record, StateShapeMismatch> {
        self.decode(text.as_bytes())
    }
}

impl<C: SnapshotCodec> SnapshotCodec for TextCodec<C> {
    fn encode(&self, record: &Record) -> Result<Vec<u8>, EncodeError> {
        self.encode_text(record).map(String::into_bytes)
    }

    fn decode(&self, blob: &[u8]) -> Result<Record, StateShapeMismatch> {
        let bytes = STANDARD.decode(blob).map_err(malformed)?;
        self.inner.decode(&bytes)
    }
}

/// Human-readable JSON codec.
///
/// Useful when inspecting what a component tree persists. The output is
/// considerably larger than [`BinaryCodec`].
#[cfg(feature = "json")]
#[derive(Copy, Clone, Debug, Default)]
pub struct JsonCodec {
    options: CodecOptions,
}

#[cfg(feature = "json")]
impl JsonCodec {
    /// Creates a codec with default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            options: CodecOptions::new(),
        }
    }

    /// Creates a codec with the given limits.
    #[must_use]
    pub const fn with_options(options: CodecOptions) -> Self {
        Self { options }
    }
}

#[cfg(feature = "json")]
impl SnapshotCodec for JsonCodec {
    fn encode(&self, record: &Record) -> Result<Vec<u8>, EncodeError> {
        serde_json::to_vec(record).map_err(|e| EncodeError::new(alloc::format!("{e}")))
    }

    fn decode(&self, blob: &[u8]) -> Result<Record, StateShapeMismatch> {
        self.options.check_len(blob.len())?;
        let mut deserializer = serde_json::Deserializer::from_slice(blob);
        let record = self
            .options
            .seed()
            .deserialize(&mut deserializer)
            .map_err(malformed)?;
        deserializer.end().map_err(malformed)?;
        Ok(record)
    }
}
