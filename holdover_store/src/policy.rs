// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conditional persistence policies.
//!
//! Dirty tracking is the only signal consulted when a property is written.
//! Whether a value is actually *persisted* can additionally depend on context
//! that is only known at capture time: a registered change subscriber, a
//! disabled or hidden component whose next request will not post its value
//! back, a mode flag that turns persistence off. Components express these as
//! a [`PolicySet`] attached at construction and passed to `capture_with`.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

/// What a policy decided for one key.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Inclusion {
    /// No opinion: include the key only if it is dirty.
    #[default]
    Tracked,
    /// Include the current value even if it is not dirty.
    Force,
    /// Omit the key even if it is dirty.
    Suppress,
}

/// A capture-time persistence predicate over a component context `C`.
///
/// Policies are pure: they read the key and the context and never mutate
/// either. They are never consulted on restore.
pub trait PersistPolicy<C: ?Sized> {
    /// Decides how `key` is treated by the capture in progress.
    fn decide(&self, key: &str, cx: &C) -> Inclusion;
}

/// Which keys a built-in policy applies to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyFilter {
    /// Every key.
    All,
    /// Only the listed keys.
    Only(&'static [&'static str]),
}

impl KeyFilter {
    /// Returns `true` if `key` passes the filter.
    #[must_use]
    pub fn matches(self, key: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(keys) => keys.contains(&key),
        }
    }
}

/// Forces inclusion of the filtered keys while a predicate holds.
///
/// # Example
///
/// ```rust
/// use holdover_store::{ForceIf, Inclusion, KeyFilter, PersistPolicy};
///
/// struct Cx { has_subscriber: bool }
///
/// let policy = ForceIf::new(KeyFilter::Only(&["SelectedIndices"]), |cx: &Cx| cx.has_subscriber);
/// assert_eq!(policy.decide("SelectedIndices", &Cx { has_subscriber: true }), Inclusion::Force);
/// assert_eq!(policy.decide("SelectedIndices", &Cx { has_subscriber: false }), Inclusion::Tracked);
/// assert_eq!(policy.decide("Text", &Cx { has_subscriber: true }), Inclusion::Tracked);
/// ```
pub struct ForceIf<P> {
    keys: KeyFilter,
    predicate: P,
}

impl<P> ForceIf<P> {
    /// Creates the policy.
    #[must_use]
    pub const fn new(keys: KeyFilter, predicate: P) -> Self {
        Self { keys, predicate }
    }
}

impl<C: ?Sized, P: Fn(&C) -> bool> PersistPolicy<C> for ForceIf<P> {
    fn decide(&self, key: &str, cx: &C) -> Inclusion {
        if self.keys.matches(key) && (self.predicate)(cx) {
            Inclusion::Force
        } else {
            Inclusion::Tracked
        }
    }
}

impl<P> fmt::Debug for ForceIf<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForceIf")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

/// Suppresses the filtered keys while a predicate holds.
pub struct SuppressIf<P> {
    keys: KeyFilter,
    predicate: P,
}

impl<P> SuppressIf<P> {
    /// Creates the policy.
    #[must_use]
    pub const fn new(keys: KeyFilter, predicate: P) -> Self {
        Self { keys, predicate }
    }
}

impl<C: ?Sized, P: Fn(&C) -> bool> PersistPolicy<C> for SuppressIf<P> {
    fn decide(&self, key: &str, cx: &C) -> Inclusion {
        if self.keys.matches(key) && (self.predicate)(cx) {
            Inclusion::Suppress
        } else {
            Inclusion::Tracked
        }
    }
}

impl<P> fmt::Debug for SuppressIf<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuppressIf")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

/// An ordered list of policies.
///
/// The first policy that returns something other than
/// [`Inclusion::Tracked`] decides; an empty set always defers to dirty
/// tracking.
///
/// # Example
///
/// ```rust
/// use holdover_store::{Inclusion, KeyFilter, PolicySet};
///
/// struct Cx { read_only: bool, disabled: bool }
///
/// let policies = PolicySet::new()
///     .suppress_if(KeyFilter::All, |cx: &Cx| cx.read_only)
///     .force_if(KeyFilter::Only(&["Checked"]), |cx: &Cx| cx.disabled);
///
/// let cx = Cx { read_only: false, disabled: true };
/// assert!(policies.should_force_include("Checked", &cx));
///
/// // Earlier policies win.
/// let cx = Cx { read_only: true, disabled: true };
/// assert_eq!(policies.decide("Checked", &cx), Inclusion::Suppress);
/// ```
pub struct PolicySet<C: ?Sized> {
    policies: Vec<Box<dyn PersistPolicy<C>>>,
}

impl<C: ?Sized> Default for PolicySet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized> PolicySet<C> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    /// Appends a policy.
    pub fn push(&mut self, policy: impl PersistPolicy<C> + 'static) {
        self.policies.push(Box::new(policy));
    }

    /// Appends a policy, builder style.
    #[must_use]
    pub fn with(mut self, policy: impl PersistPolicy<C> + 'static) -> Self {
        self.push(policy);
        self
    }

    /// Appends a [`ForceIf`] policy.
    #[must_use]
    pub fn force_if(self, keys: KeyFilter, predicate: impl Fn(&C) -> bool + 'static) -> Self {
        self.with(ForceIf::new(keys, predicate))
    }

    /// Appends a [`SuppressIf`] policy.
    #[must_use]
    pub fn suppress_if(self, keys: KeyFilter, predicate: impl Fn(&C) -> bool + 'static) -> Self {
        self.with(SuppressIf::new(keys, predicate))
    }

    /// Returns the number of policies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns `true` if there are no policies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Returns the first non-[`Tracked`](Inclusion::Tracked) decision.
    #[must_use]
    pub fn decide(&self, key: &str, cx: &C) -> Inclusion {
        self.policies
            .iter()
            .map(|policy| policy.decide(key, cx))
            .find(|inclusion| *inclusion != Inclusion::Tracked)
            .unwrap_or_default()
    }

    /// Returns `true` if the set forces `key` into the capture.
    #[must_use]
    pub fn should_force_include(&self, key: &str, cx: &C) -> bool {
        self.decide(key, cx) == Inclusion::Force
    }
}

impl<C: ?Sized> fmt::Debug for PolicySet<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicySet")
            .field("len", &self.policies.len())
            .finish()
    }
}
