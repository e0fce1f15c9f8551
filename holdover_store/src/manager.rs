// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The state-manager protocol shared by every state holder.

use core::any::Any;
use core::fmt;

use holdover_record::{Record, StateShapeMismatch};

/// Whether the enclosing scope persists state.
///
/// Composite holders resolve their own persistence mode against the scope
/// they are captured in and pass the result down to their children.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PersistScope {
    /// State in this scope is captured.
    #[default]
    Enabled,
    /// State in this scope is not captured unless a nested holder opts back in.
    Disabled,
}

impl PersistScope {
    /// Returns `true` for [`PersistScope::Enabled`].
    #[must_use]
    #[inline]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// The capture/restore protocol.
///
/// A host drives each holder through one cycle per request:
///
/// 1. [`restore`](Self::restore) with whatever the previous request captured
///    (possibly `None`);
/// 2. [`track`](Self::track), marking the boundary between baseline state and
///    changes that must be persisted;
/// 3. property writes by business logic;
/// 4. [`capture`](Self::capture), whose result is handed to the transport.
///
/// Every method is synchronous and infallible except `restore`, which fails
/// only when the record has a shape this holder does not produce.
///
/// The `Any` supertrait lets composite holders hand out typed references to
/// children they store as trait objects.
pub trait StateManager: Any + fmt::Debug {
    /// Starts tracking changes. Idempotent.
    fn track(&mut self);

    /// Returns `true` once [`track`](Self::track) has been called.
    fn is_tracking(&self) -> bool;

    /// Returns the state that changed since tracking began, or `None`.
    fn capture(&self) -> Option<Record>;

    /// Captures within an enclosing persistence scope.
    ///
    /// The default captures only when the scope is enabled. Holders that can
    /// re-enable persistence for their own subtree override this.
    fn capture_in(&self, scope: PersistScope) -> Option<Record> {
        if scope.is_enabled() {
            self.capture()
        } else {
            None
        }
    }

    /// Applies previously captured state. `None` leaves the holder untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StateShapeMismatch`] if the record's shape does not match
    /// what this holder captures.
    fn restore(&mut self, record: Option<Record>) -> Result<(), StateShapeMismatch>;

    /// Marks all current state as changed, so the next capture emits it in
    /// full.
    fn mark_all_dirty(&mut self);
}
