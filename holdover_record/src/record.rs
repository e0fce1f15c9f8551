// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The structural value model shared by every state holder.
//!
//! A [`Record`] is what a state holder hands out from `capture` and accepts in
//! `restore`. It carries no type names: the shape a consumer expects is fixed
//! by the consumer's own type, and any disagreement surfaces as a
//! [`StateShapeMismatch`](crate::StateShapeMismatch).

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::de::{self, DeserializeSeed, Deserializer, EnumAccess, SeqAccess, VariantAccess, Visitor};
use serde::{Deserialize, Serialize};

/// A captured piece of state.
///
/// "Nothing to persist" is always expressed as `Option<Record>::None` rather
/// than as a variant, so a positional slot can be empty without allocating.
///
/// Deserializing a record refuses nesting deeper than
/// [`DEFAULT_MAX_DEPTH`](crate::DEFAULT_MAX_DEPTH) while it reads, so hostile
/// input is rejected before it can exhaust the stack. Codecs apply their own
/// configured limit the same way.
///
/// # Example
///
/// ```rust
/// use holdover_record::{Record, RecordKind};
///
/// let delta = Record::Entries(vec![
///     ("Text".into(), Record::Str("hello".into())),
///     ("Width".into(), Record::Tombstone),
/// ]);
/// assert_eq!(delta.kind(), RecordKind::Entries);
/// assert_eq!(delta.depth(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Record {
    /// A boolean value.
    Bool(bool),
    /// A signed integer. Narrower integers widen into this.
    Int(i64),
    /// A floating point value.
    Float(f64),
    /// A string value.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// A captured bit mask.
    Flags(u64),
    /// An explicit "this key was removed" marker.
    Tombstone,
    /// A sequence of values.
    List(Vec<Record>),
    /// An attribute-store delta, in key order.
    Entries(Vec<(String, Record)>),
    /// A positional record. `None` marks a slot with nothing to persist.
    Slots(Vec<Option<Record>>),
}

/// The variant of a [`Record`], without its payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// [`Record::Bool`].
    Bool,
    /// [`Record::Int`].
    Int,
    /// [`Record::Float`].
    Float,
    /// [`Record::Str`].
    Str,
    /// [`Record::Bytes`].
    Bytes,
    /// [`Record::Flags`].
    Flags,
    /// [`Record::Tombstone`].
    Tombstone,
    /// [`Record::List`].
    List,
    /// [`Record::Entries`].
    Entries,
    /// [`Record::Slots`].
    Slots,
}

impl RecordKind {
    /// Returns a short lowercase name, used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "string",
            Self::Bytes => "bytes",
            Self::Flags => "flags",
            Self::Tombstone => "tombstone",
            Self::List => "list",
            Self::Entries => "entries",
            Self::Slots => "slots",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Record {
    /// Returns the variant of this record.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Bool(_) => RecordKind::Bool,
            Self::Int(_) => RecordKind::Int,
            Self::Float(_) => RecordKind::Float,
            Self::Str(_) => RecordKind::Str,
            Self::Bytes(_) => RecordKind::Bytes,
            Self::Flags(_) => RecordKind::Flags,
            Self::Tombstone => RecordKind::Tombstone,
            Self::List(_) => RecordKind::List,
            Self::Entries(_) => RecordKind::Entries,
            Self::Slots(_) => RecordKind::Slots,
        }
    }

    /// Returns `true` for [`Record::Tombstone`].
    #[must_use]
    #[inline]
    pub const fn is_tombstone(&self) -> bool {
        matches!(self, Self::Tombstone)
    }

    /// Returns the nesting depth of this record.
    ///
    /// Scalars have depth 1; each container adds one level above its deepest
    /// element. Empty containers have depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        // Decoded input may be arbitrarily deep; keep this off the call stack.
        let mut deepest = 0;
        let mut stack: Vec<(&Self, usize)> = Vec::new();
        stack.push((self, 1));
        while let Some((record, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            match record {
                Self::List(items) => stack.extend(items.iter().map(|r| (r, depth + 1))),
                Self::Entries(entries) => {
                    stack.extend(entries.iter().map(|(_, r)| (r, depth + 1)));
                }
                Self::Slots(slots) => stack.extend(slots.iter().flatten().map(|r| (r, depth + 1))),
                _ => {}
            }
        }
        deepest
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RecordSeed::new(crate::codec::DEFAULT_MAX_DEPTH).deserialize(deserializer)
    }
}

const VARIANTS: &[&str] = &[
    "Bool",
    "Int",
    "Float",
    "Str",
    "Bytes",
    "Flags",
    "Tombstone",
    "List",
    "Entries",
    "Slots",
];

/// Variant tags, in declaration order so binary indices line up.
#[derive(Deserialize)]
#[serde(variant_identifier)]
enum Tag {
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    Flags,
    Tombstone,
    List,
    Entries,
    Slots,
}

/// Keep the cautious preallocation well below what a forged length could ask
/// for.
const MAX_PREALLOC: usize = 1024;

/// Deserializes a [`Record`] at most `remaining` levels deep.
#[derive(Copy, Clone, Debug)]
pub(crate) struct RecordSeed {
    remaining: usize,
}

impl RecordSeed {
    pub(crate) const fn new(max_depth: usize) -> Self {
        Self {
            remaining: max_depth,
        }
    }

    const fn nested(self) -> Self {
        Self {
            remaining: self.remaining.saturating_sub(1),
        }
    }
}

impl<'de> DeserializeSeed<'de> for RecordSeed {
    type Value = Record;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Record, D::Error> {
        if self.remaining == 0 {
            return Err(de::Error::custom("record nesting exceeds limit"));
        }
        deserializer.deserialize_enum("Record", VARIANTS, self)
    }
}

impl<'de> Visitor<'de> for RecordSeed {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a state record")
    }

    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<Record, A::Error> {
        let (tag, variant) = data.variant::<Tag>()?;
        let inner = self.nested();
        Ok(match tag {
            Tag::Bool => Record::Bool(variant.newtype_variant()?),
            Tag::Int => Record::Int(variant.newtype_variant()?),
            Tag::Float => Record::Float(variant.newtype_variant()?),
            Tag::Str => Record::Str(variant.newtype_variant()?),
            Tag::Bytes => Record::Bytes(variant.newtype_variant()?),
            Tag::Flags => Record::Flags(variant.newtype_variant()?),
            Tag::Tombstone => {
                variant.unit_variant()?;
                Record::Tombstone
            }
            Tag::List => Record::List(variant.newtype_variant_seed(ListSeed(inner))?),
            Tag::Entries => Record::Entries(variant.newtype_variant_seed(EntriesSeed(inner))?),
            Tag::Slots => Record::Slots(variant.newtype_variant_seed(SlotsSeed(inner))?),
        })
    }
}

#[derive(Copy, Clone)]
struct ListSeed(RecordSeed);

impl<'de> DeserializeSeed<'de> for ListSeed {
    type Value = Vec<Record>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for ListSeed {
    type Value = Vec<Record>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of records")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(MAX_PREALLOC));
        while let Some(item) = seq.next_element_seed(self.0)? {
            items.push(item);
        }
        Ok(items)
    }
}

#[derive(Copy, Clone)]
struct EntriesSeed(RecordSeed);

impl<'de> DeserializeSeed<'de> for EntriesSeed {
    type Value = Vec<(String, Record)>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for EntriesSeed {
    type Value = Vec<(String, Record)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of named records")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(MAX_PREALLOC));
        while let Some(entry) = seq.next_element_seed(EntrySeed(self.0))? {
            entries.push(entry);
        }
        Ok(entries)
    }
}

#[derive(Copy, Clone)]
struct EntrySeed(RecordSeed);

impl<'de> DeserializeSeed<'de> for EntrySeed {
    type Value = (String, Record);

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_tuple(2, self)
    }
}

impl<'de> Visitor<'de> for EntrySeed {
    type Value = (String, Record);

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a name and a record")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let name = seq
            .next_element::<String>()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let record = seq
            .next_element_seed(self.0)?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        Ok((name, record))
    }
}

#[derive(Copy, Clone)]
struct SlotsSeed(RecordSeed);

impl<'de> DeserializeSeed<'de> for SlotsSeed {
    type Value = Vec<Option<Record>>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for SlotsSeed {
    type Value = Vec<Option<Record>>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of optional records")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut slots = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(MAX_PREALLOC));
        while let Some(slot) = seq.next_element_seed(SlotSeed(self.0))? {
            slots.push(slot);
        }
        Ok(slots)
    }
}

#[derive(Copy, Clone)]
struct SlotSeed(RecordSeed);

impl<'de> DeserializeSeed<'de> for SlotSeed {
    type Value = Option<Record>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_option(self)
    }
}

impl<'de> Visitor<'de> for SlotSeed {
    type Value = Option<Record>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an optional record")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        self.0.deserialize(deserializer).map(Some)
    }
}

impl From<bool> for Record {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Record {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Record {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Record {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Record::Bool(true).kind(), RecordKind::Bool);
        assert_eq!(Record::Int(3).kind(), RecordKind::Int);
        assert_eq!(Record::Flags(0b10).kind(), RecordKind::Flags);
        assert_eq!(Record::Tombstone.kind(), RecordKind::Tombstone);
        assert_eq!(Record::Slots(vec![None]).kind(), RecordKind::Slots);
    }

    #[test]
    fn kind_display() {
        assert_eq!(format!("{}", RecordKind::Entries), "entries");
        assert_eq!(format!("{}", RecordKind::Str), "string");
    }

    #[test]
    fn depth_of_nested_slots() {
        assert_eq!(Record::Int(1).depth(), 1);
        assert_eq!(Record::Slots(vec![]).depth(), 1);

        let nested = Record::Slots(vec![
            None,
            Some(Record::Slots(vec![Some(Record::Entries(vec![(
                "A".into(),
                Record::List(vec![Record::Int(1)]),
            )]))])),
        ]);
        assert_eq!(nested.depth(), 5);
    }

    #[test]
    fn tombstone_predicate() {
        assert!(Record::Tombstone.is_tombstone());
        assert!(!Record::Str("x".into()).is_tombstone());
    }

    #[test]
    fn conversions() {
        assert_eq!(Record::from(true), Record::Bool(true));
        assert_eq!(Record::from(7_i64), Record::Int(7));
        assert_eq!(Record::from("a"), Record::Str("a".into()));
    }
}
