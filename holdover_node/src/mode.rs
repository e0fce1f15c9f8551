// Copyright 2025 the Holdover Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node persistence modes.

use holdover_store::PersistScope;

/// Whether a node persists its own state.
///
/// Modes resolve top-down: a node in [`Inherit`](Self::Inherit) mode uses the
/// scope of its parent, while an explicit mode overrides it for the node and
/// every inheriting descendant.
///
/// ```rust
/// use holdover_node::PersistMode;
/// use holdover_store::PersistScope;
///
/// assert_eq!(PersistMode::Inherit.resolve(PersistScope::Disabled), PersistScope::Disabled);
/// assert_eq!(PersistMode::Enabled.resolve(PersistScope::Disabled), PersistScope::Enabled);
/// assert_eq!(PersistMode::Disabled.resolve(PersistScope::Enabled), PersistScope::Disabled);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PersistMode {
    /// Use the enclosing scope.
    #[default]
    Inherit,
    /// Persist, even inside a disabled scope.
    Enabled,
    /// Do not persist own state; children inherit the disabled scope.
    Disabled,
}

impl PersistMode {
    /// Resolves this mode against the enclosing scope.
    #[must_use]
    pub const fn resolve(self, scope: PersistScope) -> PersistScope {
        match self {
            Self::Inherit => scope,
            Self::Enabled => PersistScope::Enabled,
            Self::Disabled => PersistScope::Disabled,
        }
    }
}
