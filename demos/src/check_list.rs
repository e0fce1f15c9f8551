// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A list of check boxes whose selection is usually re-posted by the client.
//!
//! The selection normally arrives with the next request's form data, so it is
//! not persisted. It is persisted only when the form data will not carry it
//! (the list is disabled or hidden) or when a change subscriber needs the old
//! selection to detect a change.

use core::fmt;

use holdover_node::ItemList;
use holdover_record::{Record, StateShapeMismatch, pack_slots, unpack_slots};
use holdover_store::{AttributeStore, KeyFilter, PolicySet, StateKey, StateManager};

const TEXT: StateKey<String> = StateKey::new("Text", String::new);
const VALUE: StateKey<String> = StateKey::new("Value", String::new);
const ITEM_ENABLED: StateKey<bool> = StateKey::new("Enabled", || true);

const SELECTED_INDICES: StateKey<Vec<u32>> = StateKey::new("SelectedIndices", Vec::new);
const ENABLED: StateKey<bool> = StateKey::new("Enabled", || true);
const VISIBLE: StateKey<bool> = StateKey::new("Visible", || true);

/// One check box.
#[derive(Clone, Debug, Default)]
pub struct ListItem {
    state: AttributeStore,
}

impl ListItem {
    /// Creates an item with the given label and value.
    #[must_use]
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        let mut item = Self::default();
        item.state.set(TEXT, text.into());
        item.state.set(VALUE, value.into());
        item
    }

    /// The label.
    #[must_use]
    pub fn text(&self) -> String {
        self.state.get(TEXT)
    }

    /// The submitted value, falling back to the label.
    #[must_use]
    pub fn value(&self) -> String {
        if self.state.contains(VALUE) {
            self.state.get(VALUE)
        } else {
            self.text()
        }
    }

    /// Whether the item accepts input.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state.get(ITEM_ENABLED)
    }

    /// Sets whether the item accepts input.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.state.set(ITEM_ENABLED, enabled);
    }
}

impl StateManager for ListItem {
    fn track(&mut self) {
        self.state.track();
    }

    fn is_tracking(&self) -> bool {
        self.state.is_tracking()
    }

    fn capture(&self) -> Option<Record> {
        self.state.capture()
    }

    fn restore(&mut self, record: Option<Record>) -> Result<(), StateShapeMismatch> {
        self.state.restore(record)
    }

    fn mark_all_dirty(&mut self) {
        self.state.mark_all_dirty();
    }
}

/// What the selection policies look at when the list is captured.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CheckListContext {
    /// A selection-changed callback is registered.
    pub has_change_subscriber: bool,
    /// The list accepts input.
    pub enabled: bool,
    /// The list is rendered.
    pub visible: bool,
}

type SelectionCallback = Box<dyn FnMut(&[usize])>;

/// A check box list with persisted items and a conditionally persisted
/// selection.
pub struct CheckList {
    state: AttributeStore,
    items: ItemList<ListItem>,
    policies: PolicySet<CheckListContext>,
    on_selection_changed: Option<SelectionCallback>,
}

impl Default for CheckList {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        let selection = KeyFilter::Only(&["SelectedIndices"]);
        Self {
            state: AttributeStore::new(),
            items: ItemList::new(ListItem::default),
            policies: PolicySet::new()
                .force_if(selection, |cx: &CheckListContext| {
                    cx.has_change_subscriber || !cx.enabled || !cx.visible
                })
                .suppress_if(selection, |_| true),
            on_selection_changed: None,
        }
    }

    /// Appends an item and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`StateShapeMismatch`] if state restored for this index does
    /// not fit a list item.
    pub fn add_item(&mut self, item: ListItem) -> Result<usize, StateShapeMismatch> {
        self.items.push(item)
    }

    /// The items.
    #[must_use]
    pub fn items(&self) -> &ItemList<ListItem> {
        &self.items
    }

    /// The item at `index`, mutably.
    pub fn item_mut(&mut self, index: usize) -> Option<&mut ListItem> {
        self.items.get_mut(index)
    }

    /// Removes every item and the selection.
    pub fn clear_items(&mut self) {
        self.items.clear();
        self.state.reset(SELECTED_INDICES);
    }

    /// Selected indices in ascending order.
    #[must_use]
    pub fn selected_indices(&self) -> Vec<usize> {
        self.state
            .get(SELECTED_INDICES)
            .into_iter()
            .filter_map(|index| usize::try_from(index).ok())
            .collect()
    }

    /// Returns `true` if the item at `index` is checked.
    #[must_use]
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected_indices().contains(&index)
    }

    /// Checks or unchecks the item at `index`. Out-of-range indices are
    /// ignored.
    pub fn set_selected(&mut self, index: usize, selected: bool) {
        if index >= self.items.len() {
            return;
        }
        let mut indices = self.selected_indices();
        indices.retain(|&i| i != index);
        if selected {
            indices.push(index);
        }
        self.store_selection(indices);
    }

    fn store_selection(&mut self, mut indices: Vec<usize>) {
        indices.sort_unstable();
        indices.dedup();
        let stored = indices
            .into_iter()
            .filter_map(|index| u32::try_from(index).ok())
            .collect();
        self.state.set(SELECTED_INDICES, stored);
    }

    /// Whether the list accepts input.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state.get(ENABLED)
    }

    /// Sets whether the list accepts input.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.state.set(ENABLED, enabled);
    }

    /// Whether the list is rendered.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.state.get(VISIBLE)
    }

    /// Sets whether the list is rendered.
    pub fn set_visible(&mut self, visible: bool) {
        self.state.set(VISIBLE, visible);
    }

    /// Registers a callback for selection changes detected on post-back.
    pub fn on_selection_changed(&mut self, callback: impl FnMut(&[usize]) + 'static) {
        self.on_selection_changed = Some(Box::new(callback));
    }

    /// The context the selection policies are evaluated against.
    #[must_use]
    pub fn context(&self) -> CheckListContext {
        CheckListContext {
            has_change_subscriber: self.on_selection_changed.is_some(),
            enabled: self.is_enabled(),
            visible: self.is_visible(),
        }
    }

    /// Applies the indices the client posted back as checked.
    ///
    /// Disabled or hidden lists post nothing, so they keep their persisted
    /// selection. Returns `true` and notifies the subscriber if the selection
    /// changed.
    pub fn load_posted(&mut self, checked: &[usize]) -> bool {
        if !self.is_enabled() || !self.is_visible() {
            return false;
        }
        let previous = self.selected_indices();
        let mut posted: Vec<usize> = checked
            .iter()
            .copied()
            .filter(|&index| self.items.get(index).is_some_and(ListItem::is_enabled))
            .collect();
        posted.sort_unstable();
        posted.dedup();
        if posted == previous {
            return false;
        }
        log::debug!("check list selection changed: {previous:?} -> {posted:?}");
        self.store_selection(posted.clone());
        if let Some(callback) = &mut self.on_selection_changed {
            callback(posted.as_slice());
        }
        true
    }
}

impl fmt::Debug for CheckList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckList")
            .field("state", &self.state)
            .field("items", &self.items)
            .field("policies", &self.policies)
            .field("has_change_subscriber", &self.on_selection_changed.is_some())
            .finish()
    }
}

impl StateManager for CheckList {
    fn track(&mut self) {
        self.state.track();
        self.items.track();
    }

    fn is_tracking(&self) -> bool {
        self.state.is_tracking()
    }

    fn capture(&self) -> Option<Record> {
        let own = self.state.capture_with(&self.policies, &self.context());
        pack_slots([own, self.items.capture()])
    }

    fn restore(&mut self, record: Option<Record>) -> Result<(), StateShapeMismatch> {
        let [own, items] = unpack_slots::<2>(record)?;
        self.state.restore(own).map_err(|e| e.in_slot(0))?;
        self.items.restore(items).map_err(|e| e.in_slot(1))
    }

    fn mark_all_dirty(&mut self) {
        self.state.mark_all_dirty();
        self.items.mark_all_dirty();
    }
}
