// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An attribute store gated by per-property flags.

use bitflags::Flags;
use core::fmt;

use holdover_record::{
    Record, RecordKind, StateShapeMismatch, StateValue, pack_slots, unpack_slots,
};

use crate::flags::BitFlagSet;
use crate::key::StateKey;
use crate::manager::StateManager;
use crate::policy::PolicySet;
use crate::store::AttributeStore;

/// An [`AttributeStore`] paired with a [`BitFlagSet`].
///
/// Each property owns one flag bit and one store key. The flag gates the
/// lookup: a property whose bit is clear reads as its default without
/// consulting the store. Writes set the value and the bit together, and
/// resets clear both.
///
/// The captured record is `Slots([store delta, flags delta, reset mask])`,
/// trimmed of trailing empty slots. The reset mask holds the bits of
/// properties reset while tracking, so a restored reset clears the flag
/// along with the stored value.
///
/// # Example
///
/// ```rust
/// use bitflags::bitflags;
/// use holdover_store::{FlaggedStore, StateKey, StateManager};
///
/// bitflags! {
///     #[derive(Copy, Clone, Debug, PartialEq, Eq)]
///     struct Props: u32 {
///         const CSS_CLASS = 1 << 0;
///     }
/// }
///
/// const CSS_CLASS: StateKey<String> = StateKey::new("CssClass", String::new);
///
/// let mut style = FlaggedStore::<Props>::new();
/// assert_eq!(style.get(Props::CSS_CLASS, CSS_CLASS), "");
///
/// style.track();
/// style.set(Props::CSS_CLASS, CSS_CLASS, "header".into());
/// assert_eq!(style.get(Props::CSS_CLASS, CSS_CLASS), "header");
///
/// let mut fresh = FlaggedStore::<Props>::new();
/// fresh.restore(style.capture()).unwrap();
/// assert_eq!(fresh.get(Props::CSS_CLASS, CSS_CLASS), "header");
/// ```
pub struct FlaggedStore<F> {
    store: AttributeStore,
    flags: BitFlagSet<F>,
    reset: F,
}

impl<F: Flags> Default for FlaggedStore<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Flags> FlaggedStore<F> {
    /// Creates an empty, untracked store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: AttributeStore::new(),
            flags: BitFlagSet::new(),
            reset: F::empty(),
        }
    }

    /// Returns the underlying attribute store.
    #[must_use]
    pub fn store(&self) -> &AttributeStore {
        &self.store
    }

    /// Returns the underlying flag set.
    #[must_use]
    pub fn flags(&self) -> &BitFlagSet<F> {
        &self.flags
    }

    /// Returns `true` if the property owning `flag` has been set.
    #[must_use]
    pub fn is_set(&self, flag: F) -> bool {
        self.flags.is_set(flag)
    }

    /// Reads a property, consulting the store only if its flag is set.
    #[must_use]
    pub fn get<T: StateValue>(&self, flag: F, key: StateKey<T>) -> T {
        if self.flags.is_set(flag) {
            self.store.get(key)
        } else {
            key.default_value()
        }
    }

    /// Writes a property and marks its flag.
    pub fn set<T: StateValue>(&mut self, flag: F, key: StateKey<T>, value: T) {
        self.store.set(key, value);
        self.flags.mark_set(F::from_bits_retain(flag.bits()));
        self.reset.remove(flag);
    }

    /// Resets a property to its default.
    ///
    /// Clears the flag and removes the stored value; while tracking, the
    /// removal is captured as a tombstone and the bit joins the reset mask.
    pub fn reset<T>(&mut self, flag: F, key: StateKey<T>) {
        if self.store.is_tracking() {
            self.reset.insert(F::from_bits_retain(flag.bits()));
        }
        self.flags.clear(flag);
        self.store.reset(key);
    }

    /// Returns the bits of properties reset since tracking began.
    #[must_use]
    pub fn reset_bits(&self) -> F {
        F::from_bits_retain(self.reset.bits())
    }

    /// Captures like [`capture`](StateManager::capture), applying `policies`
    /// to the store entries.
    #[must_use]
    pub fn capture_with<C: ?Sized>(&self, policies: &PolicySet<C>, cx: &C) -> Option<Record>
    where
        F::Bits: Into<u64>,
    {
        pack_slots([
            self.store.capture_with(policies, cx),
            self.flags_record(),
            self.reset_record(),
        ])
    }

    fn flags_record(&self) -> Option<Record>
    where
        F::Bits: Into<u64>,
    {
        self.flags
            .changed()
            .map(|changed| Record::Flags(changed.bits().into()))
    }

    fn reset_record(&self) -> Option<Record>
    where
        F::Bits: Into<u64>,
    {
        (!self.reset.is_empty()).then(|| Record::Flags(self.reset.bits().into()))
    }

    fn restore_reset(&mut self, record: Option<Record>) -> Result<(), StateShapeMismatch>
    where
        F::Bits: TryFrom<u64>,
    {
        match record {
            None => Ok(()),
            Some(Record::Flags(raw)) => {
                let bits = F::Bits::try_from(raw).map_err(|_| StateShapeMismatch::out_of_range())?;
                let mask = F::from_bits_retain(bits);
                self.flags.clear(F::from_bits_retain(mask.bits()));
                if self.store.is_tracking() {
                    self.reset.insert(mask);
                }
                Ok(())
            }
            Some(other) => Err(StateShapeMismatch::kind(RecordKind::Flags, other.kind())),
        }
    }
}

impl<F: Flags> fmt::Debug for FlaggedStore<F>
where
    F::Bits: fmt::Binary,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlaggedStore")
            .field("store", &self.store)
            .field("flags", &self.flags)
            .field("reset", &format_args!("{:#b}", self.reset.bits()))
            .finish()
    }
}

impl<F> StateManager for FlaggedStore<F>
where
    F: Flags + 'static,
    F::Bits: fmt::Binary + Into<u64> + TryFrom<u64>,
{
    fn track(&mut self) {
        self.store.track();
        self.flags.track();
    }

    fn is_tracking(&self) -> bool {
        self.store.is_tracking()
    }

    fn capture(&self) -> Option<Record> {
        pack_slots([
            self.store.capture(),
            self.flags.capture(),
            self.reset_record(),
        ])
    }

    fn restore(&mut self, record: Option<Record>) -> Result<(), StateShapeMismatch> {
        let [store, flags, reset] = unpack_slots::<3>(record)?;
        self.store.restore(store).map_err(|e| e.in_slot(0))?;
        self.flags.restore(flags).map_err(|e| e.in_slot(1))?;
        self.restore_reset(reset).map_err(|e| e.in_slot(2))
    }

    fn mark_all_dirty(&mut self) {
        self.store.mark_all_dirty();
        self.flags.mark_all_dirty();
    }
}
