//! Item identity and tree traversal.
//!
//! Traits, skills, spells, and equipment are authored as trees whose inner
//! nodes are containers. Every node carries a stable [`ItemId`] so that owners
//! and exclusions survive cloning of the whole character.

use core::fmt;

use uuid::Uuid;

/// Stable identity of an item in a character's trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(Uuid);

impl ItemId {
    /// Creates a fresh random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in one of the character's item trees.
pub trait Node: Sized {
    fn id(&self) -> ItemId;

    fn children(&self) -> &[Self];

    fn children_mut(&mut self) -> &mut [Self];

    fn is_container(&self) -> bool;

    /// Disabled nodes hide their whole subtree from enabled-only walks.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Depth-first, pre-order iterator over a forest of nodes.
pub struct Walk<'a, T> {
    stack: Vec<core::slice::Iter<'a, T>>,
    only_enabled: bool,
}

impl<'a, T: Node> Iterator for Walk<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            let top = self.stack.last_mut()?;
            let Some(node) = top.next() else {
                self.stack.pop();
                continue;
            };
            if self.only_enabled && !node.is_enabled() {
                continue;
            }
            if !node.children().is_empty() {
                self.stack.push(node.children().iter());
            }
            return Some(node);
        }
    }
}

/// Visits every node, containers included.
pub fn walk<T: Node>(roots: &[T]) -> Walk<'_, T> {
    Walk {
        stack: vec![roots.iter()],
        only_enabled: false,
    }
}

/// Visits every node whose ancestors and self are enabled.
pub fn walk_enabled<T: Node>(roots: &[T]) -> Walk<'_, T> {
    Walk {
        stack: vec![roots.iter()],
        only_enabled: true,
    }
}

/// Visits only the non-container nodes.
pub fn leaves<T: Node>(roots: &[T]) -> impl Iterator<Item = &T> {
    walk(roots).filter(|node| !node.is_container())
}

/// Finds a node anywhere in the forest.
pub fn find<T: Node>(roots: &[T], id: ItemId) -> Option<&T> {
    walk(roots).find(|node| node.id() == id)
}

/// Visits every node mutably, parents before children.
pub fn walk_mut<T: Node>(roots: &mut [T], visit: &mut impl FnMut(&mut T)) {
    for node in roots.iter_mut() {
        visit(node);
        walk_mut(node.children_mut(), visit);
    }
}

/// Finds a node anywhere in the forest for mutation.
pub fn find_mut<T: Node>(roots: &mut [T], id: ItemId) -> Option<&mut T> {
    for node in roots.iter_mut() {
        if node.id() == id {
            return Some(node);
        }
        if let Some(found) = find_mut(node.children_mut(), id) {
            return Some(found);
        }
    }
    None
}
