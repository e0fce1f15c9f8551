// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed store keys.
//!
//! A [`StateKey<T>`] names an attribute-store entry and declares the value
//! returned when the entry is absent. The phantom type keeps reads and writes
//! of the same key consistent at compile time.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// A type-safe attribute-store key with a declared default.
///
/// Keys are usually declared as constants next to the component that owns
/// them:
///
/// ```rust
/// use holdover_store::StateKey;
///
/// const DATA_FIELD: StateKey<String> = StateKey::new("DataField", String::new);
/// const PAGE_SIZE: StateKey<i32> = StateKey::new("PageSize", || 10);
///
/// assert_eq!(DATA_FIELD.name(), "DataField");
/// assert_eq!(DATA_FIELD.default_value(), "");
/// assert_eq!(PAGE_SIZE.default_value(), 10);
/// ```
///
/// # Memory Layout
///
/// A key is a string slice plus a function pointer; `PhantomData` is
/// zero-sized.
pub struct StateKey<T> {
    name: &'static str,
    default: fn() -> T,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StateKey<T> {
    /// Creates a key with the given name and default constructor.
    #[must_use]
    #[inline]
    pub const fn new(name: &'static str, default: fn() -> T) -> Self {
        Self {
            name,
            default,
            _marker: PhantomData,
        }
    }

    /// Returns the entry name.
    #[must_use]
    #[inline]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// Builds the declared default value.
    #[must_use]
    #[inline]
    pub fn default_value(self) -> T {
        (self.default)()
    }
}

// Manual trait implementations to avoid requiring T: Clone, etc.

impl<T> Copy for StateKey<T> {}

impl<T> Clone for StateKey<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for StateKey<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for StateKey<T> {}

impl<T> Hash for StateKey<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<T> fmt::Debug for StateKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateKey")
            .field("name", &self.name)
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}
