// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact per-property "explicitly set" flags.
//!
//! Components with many rarely-set properties avoid a lookup for each read by
//! keeping one bit per property: if the bit is clear, the property was never
//! assigned and its default applies without touching the attribute store.
//!
//! The flag type is any [`bitflags`] type whose bits fit in a `u64`:
//!
//! ```rust
//! use bitflags::bitflags;
//! use holdover_store::{BitFlagSet, StateManager};
//!
//! bitflags! {
//!     #[derive(Copy, Clone, Debug, PartialEq, Eq)]
//!     struct StyleProps: u32 {
//!         const BACK_COLOR = 1 << 0;
//!         const FORE_COLOR = 1 << 1;
//!         const FONT_BOLD = 1 << 2;
//!     }
//! }
//!
//! let mut flags = BitFlagSet::<StyleProps>::new();
//! flags.mark_set(StyleProps::BACK_COLOR);
//! flags.track();
//! flags.mark_set(StyleProps::FONT_BOLD);
//!
//! assert!(flags.is_set(StyleProps::BACK_COLOR));
//! assert_eq!(flags.changed(), Some(StyleProps::FONT_BOLD));
//! ```

use bitflags::Flags;
use core::fmt;

use holdover_record::{Record, RecordKind, StateShapeMismatch};

use crate::manager::StateManager;

/// Tracks which properties of an owning type were ever set, and which were
/// set since tracking began.
///
/// # Restore
///
/// Restored bits are added to the set and never cleared. When tracking is
/// already active at restore time they are also added to the changed bits, so
/// that a state restored mid-session is emitted again by the next capture.
/// Restoring before [`track`](StateManager::track), the usual order, leaves a
/// fresh tree with nothing to capture.
///
/// # Clear
///
/// [`clear`](Self::clear) only affects the set bits; a bit cleared after being
/// marked while tracking stays in the changed bits.
pub struct BitFlagSet<F> {
    set: F,
    changed: F,
    tracking: bool,
}

impl<F: Flags> Default for BitFlagSet<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Flags> BitFlagSet<F> {
    /// Creates an empty, untracked flag set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            set: F::empty(),
            changed: F::empty(),
            tracking: false,
        }
    }

    /// Returns `true` if every bit in `bits` has been set.
    #[must_use]
    pub fn is_set(&self, bits: F) -> bool {
        !bits.is_empty() && self.set.contains(bits)
    }

    /// Marks `bits` as set, and as changed when tracking.
    pub fn mark_set(&mut self, bits: F) {
        if self.tracking {
            self.changed.insert(F::from_bits_retain(bits.bits()));
        }
        self.set.insert(bits);
    }

    /// Clears `bits` from the set bits. The changed bits are left alone.
    pub fn clear(&mut self, bits: F) {
        self.set.remove(bits);
    }

    /// Returns every bit that has been set.
    #[must_use]
    pub fn set_bits(&self) -> F {
        F::from_bits_retain(self.set.bits())
    }

    /// Returns the bits changed since tracking began.
    #[must_use]
    pub fn changed_bits(&self) -> F {
        F::from_bits_retain(self.changed.bits())
    }

    /// Returns the changed bits, or `None` if nothing changed.
    #[must_use]
    pub fn changed(&self) -> Option<F> {
        (!self.changed.is_empty()).then(|| self.changed_bits())
    }

    /// Applies a restored mask.
    pub fn restore_bits(&mut self, mask: F) {
        if self.tracking {
            self.changed.insert(F::from_bits_retain(mask.bits()));
        }
        self.set.insert(mask);
    }
}

impl<F: Flags> fmt::Debug for BitFlagSet<F>
where
    F::Bits: fmt::Binary,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitFlagSet")
            .field("set", &format_args!("{:#b}", self.set.bits()))
            .field("changed", &format_args!("{:#b}", self.changed.bits()))
            .field("tracking", &self.tracking)
            .finish()
    }
}

impl<F: Flags> Clone for BitFlagSet<F> {
    fn clone(&self) -> Self {
        Self {
            set: self.set_bits(),
            changed: self.changed_bits(),
            tracking: self.tracking,
        }
    }
}

impl<F> StateManager for BitFlagSet<F>
where
    F: Flags + 'static,
    F::Bits: fmt::Binary + Into<u64> + TryFrom<u64>,
{
    fn track(&mut self) {
        self.tracking = true;
    }

    fn is_tracking(&self) -> bool {
        self.tracking
    }

    fn capture(&self) -> Option<Record> {
        self.changed()
            .map(|changed| Record::Flags(changed.bits().into()))
    }

    fn restore(&mut self, record: Option<Record>) -> Result<(), StateShapeMismatch> {
        match record {
            None => Ok(()),
            Some(Record::Flags(raw)) => {
                let bits = F::Bits::try_from(raw).map_err(|_| StateShapeMismatch::out_of_range())?;
                self.restore_bits(F::from_bits_retain(bits));
                Ok(())
            }
            Some(other) => Err(StateShapeMismatch::kind(RecordKind::Flags, other.kind())),
        }
    }

    fn mark_all_dirty(&mut self) {
        self.changed.insert(F::from_bits_retain(self.set.bits()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitflags::bitflags;
    use holdover_record::MismatchKind;

    bitflags! {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        struct Props: u8 {
            const A = 1 << 0;
            const B = 1 << 1;
            const C = 1 << 2;
        }
    }

    #[test]
    fn mark_before_tracking_is_baseline() {
        let mut flags = BitFlagSet::<Props>::new();
        flags.mark_set(Props::A);
        flags.track();
        assert!(flags.is_set(Props::A));
        assert_eq!(flags.capture(), None);
    }

    #[test]
    fn mark_after_tracking_is_captured() {
        let mut flags = BitFlagSet::<Props>::new();
        flags.track();
        flags.mark_set(Props::B);
        flags.mark_set(Props::C);
        assert_eq!(flags.capture(), Some(Record::Flags(0b110)));
    }

    #[test]
    fn empty_query_is_never_set() {
        let flags = BitFlagSet::<Props>::new();
        assert!(!flags.is_set(Props::empty()));
    }

    #[test]
    fn clear_keeps_changed_bits() {
        let mut flags = BitFlagSet::<Props>::new();
        flags.track();
        flags.mark_set(Props::A);
        flags.clear(Props::A);
        assert!(!flags.is_set(Props::A));
        assert_eq!(flags.changed_bits(), Props::A);
    }

    #[test]
    fn restore_before_tracking_is_not_captured() {
        let mut flags = BitFlagSet::<Props>::new();
        flags.restore(Some(Record::Flags(0b011))).unwrap();
        flags.track();
        assert!(flags.is_set(Props::A | Props::B));
        assert_eq!(flags.capture(), None);
    }

    #[test]
    fn restore_while_tracking_is_sticky() {
        let mut flags = BitFlagSet::<Props>::new();
        flags.track();
        flags.restore(Some(Record::Flags(0b100))).unwrap();
        assert_eq!(flags.capture(), Some(Record::Flags(0b100)));
    }

    #[test]
    fn restore_never_clears() {
        let mut flags = BitFlagSet::<Props>::new();
        flags.mark_set(Props::A);
        flags.restore(Some(Record::Flags(0b010))).unwrap();
        assert_eq!(flags.set_bits(), Props::A | Props::B);
    }

    #[test]
    fn restore_rejects_wide_masks() {
        let mut flags = BitFlagSet::<Props>::new();
        let err = flags.restore(Some(Record::Flags(0x1_00))).unwrap_err();
        assert_eq!(err.mismatch(), &MismatchKind::OutOfRange);
    }

    #[test]
    fn restore_rejects_other_kinds() {
        let mut flags = BitFlagSet::<Props>::new();
        let err = flags.restore(Some(Record::Int(1))).unwrap_err();
        assert_eq!(
            err.mismatch(),
            &MismatchKind::Kind {
                expected: RecordKind::Flags,
                found: RecordKind::Int,
            }
        );
    }

    #[test]
    fn mark_all_dirty_emits_set_bits() {
        let mut flags = BitFlagSet::<Props>::new();
        flags.mark_set(Props::A | Props::C);
        flags.track();
        flags.mark_all_dirty();
        assert_eq!(flags.capture(), Some(Record::Flags(0b101)));
    }
}
