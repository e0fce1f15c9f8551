// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Statically typed, lazily created child holders.

use core::fmt;

use holdover_record::{Record, StateShapeMismatch};
use holdover_store::{PersistScope, StateManager};

/// A child holder that is only created when first needed.
///
/// Components that lay out their record as a fixed-arity tuple keep each
/// sub-object in a `LazyChild` and put its capture in a known slot. The child
/// is created either by [`get_or_create`](Self::get_or_create) or by a restore
/// that carries state for it; restoring `None` never creates it.
///
/// A `LazyChild` remembers whether tracking has started, so a child created
/// afterwards starts tracking immediately.
///
/// # Example
///
/// ```rust
/// use holdover_node::LazyChild;
/// use holdover_record::{pack_slots, unpack_slots};
/// use holdover_store::{AttributeStore, StateKey, StateManager};
///
/// const FORE_COLOR: StateKey<String> = StateKey::new("ForeColor", String::new);
///
/// struct Grid {
///     header_style: LazyChild<AttributeStore>,
///     footer_style: LazyChild<AttributeStore>,
/// }
///
/// let new_grid = || Grid {
///     header_style: LazyChild::new(AttributeStore::new),
///     footer_style: LazyChild::new(AttributeStore::new),
/// };
///
/// let mut first = new_grid();
/// first.header_style.track();
/// first.footer_style.track();
/// first.footer_style.get_or_create().set(FORE_COLOR, "Red".into());
/// let record = pack_slots([first.header_style.capture(), first.footer_style.capture()]);
///
/// let mut second = new_grid();
/// let [header, footer] = unpack_slots::<2>(record).unwrap();
/// second.header_style.restore(header).unwrap();
/// second.footer_style.restore(footer).unwrap();
/// assert!(!second.header_style.is_created());
/// assert_eq!(second.footer_style.get().unwrap().get(FORE_COLOR), "Red");
/// ```
pub struct LazyChild<T> {
    factory: fn() -> T,
    value: Option<T>,
    tracking: bool,
}

impl<T> LazyChild<T> {
    /// Creates an empty slot that builds its child with `factory`.
    #[must_use]
    pub const fn new(factory: fn() -> T) -> Self {
        Self {
            factory,
            value: None,
            tracking: false,
        }
    }

    /// Returns `true` once the child exists.
    #[must_use]
    pub fn is_created(&self) -> bool {
        self.value.is_some()
    }

    /// Returns the child, if created.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Returns the child mutably, if created.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }
}

impl<T: StateManager> LazyChild<T> {
    /// Returns the child, creating it if needed.
    pub fn get_or_create(&mut self) -> &mut T {
        let (factory, tracking) = (self.factory, self.tracking);
        self.value.get_or_insert_with(|| {
            let mut value = factory();
            if tracking {
                value.track();
            }
            value
        })
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyChild<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyChild")
            .field("value", &self.value)
            .field("tracking", &self.tracking)
            .finish_non_exhaustive()
    }
}

impl<T: StateManager> StateManager for LazyChild<T> {
    fn track(&mut self) {
        self.tracking = true;
        if let Some(value) = &mut self.value {
            value.track();
        }
    }

    fn is_tracking(&self) -> bool {
        self.tracking
    }

    fn capture(&self) -> Option<Record> {
        self.value.as_ref().and_then(T::capture)
    }

    fn capture_in(&self, scope: PersistScope) -> Option<Record> {
        self.value.as_ref().and_then(|value| value.capture_in(scope))
    }

    fn restore(&mut self, record: Option<Record>) -> Result<(), StateShapeMismatch> {
        match record {
            None => Ok(()),
            state => self.get_or_create().restore(state),
        }
    }

    fn mark_all_dirty(&mut self) {
        if let Some(value) = &mut self.value {
            value.mark_all_dirty();
        }
    }
}
