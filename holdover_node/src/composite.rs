// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composite state nodes: a component's own state plus named child holders.

use alloc::boxed::Box;
use core::any::Any;
use core::fmt;
use core::iter;

use bitflags::Flags;
use smallvec::SmallVec;

use holdover_record::{Record, StateShapeMismatch, pack_slots, unpack_slots_dyn};
use holdover_store::{AttributeStore, FlaggedStore, PersistScope, PolicySet, StateManager};

use crate::mode::PersistMode;

/// Creates a child holder on demand.
type ChildFactory = Box<dyn Fn() -> Box<dyn StateManager>>;

/// Most components own a handful of sub-objects (styles, templates).
const INLINE_CHILDREN: usize = 4;

struct ChildSlot {
    name: &'static str,
    factory: ChildFactory,
    node: Option<Box<dyn StateManager>>,
}

impl ChildSlot {
    fn instantiate(&mut self, tracking: bool) -> &mut Box<dyn StateManager> {
        let factory = &self.factory;
        self.node.get_or_insert_with(|| {
            let mut node = factory();
            if tracking {
                node.track();
            }
            node
        })
    }
}

impl fmt::Debug for ChildSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildSlot")
            .field("name", &self.name)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

/// A component's state holder together with an ordered, fixed set of lazily
/// created child holders.
///
/// # Record shape
///
/// The node captures `Slots([own, child0, child1, ..., required])`, trimmed
/// of trailing empty slots. A child that was never created, or that has
/// nothing to persist, contributes an empty slot. Child order is fixed when
/// the node is built, so the layout is stable across requests for the same
/// component type.
///
/// # Required state
///
/// The [`required`](Self::required) store holds state the component cannot
/// work without, such as the current page of a pager. It is captured in
/// full on every request, whether or not it changed, and neither
/// [`set_enabled`](Self::set_enabled) nor the [`PersistMode`] gates it. A
/// disabled node still captures and restores its required slot; only the
/// rest of its subtree is switched off.
///
/// # Child creation
///
/// Children are created either by the component, through
/// [`ensure_child`](Self::ensure_child), or by [`restore`](StateManager::restore)
/// when the record carries state for them. In both cases the factory given to
/// [`with_child`](Self::with_child) is used, and the new child starts tracking
/// if the node already is.
///
/// # Example
///
/// ```rust
/// use holdover_node::CompositeNode;
/// use holdover_store::{AttributeStore, StateKey, StateManager};
///
/// const BOLD: StateKey<bool> = StateKey::new("Bold", || false);
///
/// let build = || {
///     CompositeNode::new(AttributeStore::new())
///         .with_child("HeaderStyle", AttributeStore::new)
///         .with_child("RowStyle", AttributeStore::new)
/// };
///
/// let mut first = build();
/// first.track();
/// first.ensure_child::<AttributeStore>("RowStyle").unwrap().set(BOLD, true);
///
/// let mut second = build();
/// second.restore(first.capture()).unwrap();
/// assert!(!second.has_child("HeaderStyle"));
/// assert!(second.child::<AttributeStore>("RowStyle").unwrap().get(BOLD));
/// ```
pub struct CompositeNode<S = AttributeStore> {
    own: S,
    required: AttributeStore,
    children: SmallVec<[ChildSlot; INLINE_CHILDREN]>,
    tracking: bool,
    enabled: bool,
    mode: PersistMode,
}

impl<S: Default> Default for CompositeNode<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> CompositeNode<S> {
    /// Creates a node around `own` with no children.
    #[must_use]
    pub fn new(own: S) -> Self {
        Self {
            own,
            required: AttributeStore::new(),
            children: SmallVec::new(),
            tracking: false,
            enabled: true,
            mode: PersistMode::Inherit,
        }
    }

    /// Appends a child slot, builder style.
    ///
    /// `name` must be unique within the node.
    #[must_use]
    pub fn with_child<T, F>(mut self, name: &'static str, factory: F) -> Self
    where
        T: StateManager,
        F: Fn() -> T + 'static,
    {
        debug_assert!(
            self.slot_index(name).is_none(),
            "duplicate child name {name:?}"
        );
        self.children.push(ChildSlot {
            name,
            factory: Box::new(move || Box::new(factory()) as Box<dyn StateManager>),
            node: None,
        });
        self
    }

    /// Sets the persistence mode, builder style.
    #[must_use]
    pub fn with_mode(mut self, mode: PersistMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the persistence mode.
    #[must_use]
    pub fn mode(&self) -> PersistMode {
        self.mode
    }

    /// Sets the persistence mode.
    pub fn set_mode(&mut self, mode: PersistMode) {
        self.mode = mode;
    }

    /// Returns `true` unless persistence is switched off for this subtree.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switches persistence for this node and all its descendants.
    ///
    /// A disabled node captures nothing and ignores restored state,
    /// regardless of its mode or its children's modes. Its
    /// [`required`](Self::required) state is the exception.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns the node's own state holder.
    #[must_use]
    pub fn own(&self) -> &S {
        &self.own
    }

    /// Returns the node's own state holder mutably.
    pub fn own_mut(&mut self) -> &mut S {
        &mut self.own
    }

    /// Returns the store that persists whether or not the node is enabled.
    #[must_use]
    pub fn required(&self) -> &AttributeStore {
        &self.required
    }

    /// Returns the always-persisted store mutably.
    pub fn required_mut(&mut self) -> &mut AttributeStore {
        &mut self.required
    }

    /// Returns the child names in slot order.
    pub fn child_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.children.iter().map(|slot| slot.name)
    }

    /// Returns `true` if the named child has been created.
    #[must_use]
    pub fn has_child(&self, name: &str) -> bool {
        self.slot_index(name)
            .is_some_and(|idx| self.children[idx].node.is_some())
    }

    /// Returns the named child if it has been created and is a `T`.
    #[must_use]
    pub fn child<T: StateManager>(&self, name: &str) -> Option<&T> {
        let node = self.children[self.slot_index(name)?].node.as_deref()?;
        (node as &dyn Any).downcast_ref()
    }

    /// Returns the named child mutably if it has been created and is a `T`.
    pub fn child_mut<T: StateManager>(&mut self, name: &str) -> Option<&mut T> {
        let idx = self.slot_index(name)?;
        let node = self.children[idx].node.as_deref_mut()?;
        (node as &mut dyn Any).downcast_mut()
    }

    /// Returns the named child, creating it through its factory if needed.
    ///
    /// Returns `None` if there is no child called `name` or its factory does
    /// not produce a `T`.
    pub fn ensure_child<T: StateManager>(&mut self, name: &str) -> Option<&mut T> {
        let idx = self.slot_index(name)?;
        let tracking = self.tracking;
        let node = self.children[idx].instantiate(tracking);
        (&mut **node as &mut dyn Any).downcast_mut()
    }

    fn slot_index(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|slot| slot.name == name)
    }

    /// Index of the required slot: after the own slot and every child.
    fn required_index(&self) -> usize {
        self.children.len() + 1
    }
}

impl<S: StateManager> CompositeNode<S> {
    fn capture_parts(
        &self,
        scope: PersistScope,
        own: impl FnOnce(&S) -> Option<Record>,
    ) -> Option<Record> {
        let required = self.required.capture_all();
        if !self.enabled {
            let skipped = iter::repeat_n(None, self.required_index());
            return pack_slots(skipped.chain(iter::once(required)));
        }
        let resolved = self.mode.resolve(scope);
        let own = if resolved.is_enabled() {
            own(&self.own)
        } else {
            None
        };
        let children = self.children.iter().map(|slot| {
            slot.node
                .as_ref()
                .and_then(|node| node.capture_in(resolved))
        });
        let record = pack_slots(
            iter::once(own)
                .chain(children)
                .chain(iter::once(required)),
        );
        if record.is_some() {
            log::trace!("captured composite node with {} child slots", self.children.len());
        }
        record
    }
}

impl CompositeNode<AttributeStore> {
    /// Captures the tree, applying `policies` to the node's own store.
    ///
    /// Children capture as usual.
    #[must_use]
    pub fn capture_with<C: ?Sized>(&self, policies: &PolicySet<C>, cx: &C) -> Option<Record> {
        self.capture_parts(PersistScope::Enabled, |own| own.capture_with(policies, cx))
    }
}

impl<F> CompositeNode<FlaggedStore<F>>
where
    F: Flags + 'static,
    F::Bits: fmt::Binary + Into<u64> + TryFrom<u64>,
{
    /// Captures the tree, applying `policies` to the node's own store.
    ///
    /// Children capture as usual.
    #[must_use]
    pub fn capture_with<C: ?Sized>(&self, policies: &PolicySet<C>, cx: &C) -> Option<Record> {
        self.capture_parts(PersistScope::Enabled, |own| own.capture_with(policies, cx))
    }
}

impl<S: fmt::Debug> fmt::Debug for CompositeNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeNode")
            .field("own", &self.own)
            .field("required", &self.required)
            .field("children", &self.children)
            .field("tracking", &self.tracking)
            .field("enabled", &self.enabled)
            .field("mode", &self.mode)
            .finish()
    }
}

impl<S: StateManager> StateManager for CompositeNode<S> {
    fn track(&mut self) {
        self.tracking = true;
        self.own.track();
        self.required.track();
        for node in self.children.iter_mut().filter_map(|slot| slot.node.as_mut()) {
            node.track();
        }
    }

    fn is_tracking(&self) -> bool {
        self.tracking
    }

    fn capture(&self) -> Option<Record> {
        self.capture_in(PersistScope::Enabled)
    }

    fn capture_in(&self, scope: PersistScope) -> Option<Record> {
        self.capture_parts(scope, S::capture)
    }

    fn restore(&mut self, record: Option<Record>) -> Result<(), StateShapeMismatch> {
        if record.is_none() {
            return Ok(());
        }
        let required_index = self.required_index();
        let mut slots = unpack_slots_dyn(record, required_index + 1)?;
        self.required
            .restore(slots.pop().flatten())
            .map_err(|e| e.in_slot(required_index))?;
        if !self.enabled {
            return Ok(());
        }
        let mut slots = slots.into_iter();
        log::debug!("restoring composite node with {} child slots", self.children.len());

        self.own
            .restore(slots.next().flatten())
            .map_err(|e| e.in_slot(0))?;

        let tracking = self.tracking;
        for (slot, state) in self.children.iter_mut().zip(slots) {
            // Empty slots never invoke a factory.
            let Some(state) = state else {
                continue;
            };
            let name = slot.name;
            slot.instantiate(tracking)
                .restore(Some(state))
                .map_err(|e| e.in_child(name))?;
        }
        Ok(())
    }

    fn mark_all_dirty(&mut self) {
        self.own.mark_all_dirty();
        self.required.mark_all_dirty();
        for node in self.children.iter_mut().filter_map(|slot| slot.node.as_mut()) {
            node.mark_all_dirty();
        }
    }
}
