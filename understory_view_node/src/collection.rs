// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered child storage for a view node.
//!
//! ## Overview
//!
//! A [`ViewNodeCollection`] is the children list of exactly one view node.
//! Entries keep insertion order, which is also the traversal order unless a
//! backend reorders children for a pass.
//! Each entry records the child's renderable so membership queries
//! ("is there already a node for this object?") need no access to the tree.
//!
//! ## Cursors
//!
//! Iteration state lives in a caller-owned [`Cursor`], never in the collection.
//! Two lookups can walk the same collection at the same time, for example a
//! [`ViewTree::view_node_for`](crate::ViewTree::view_node_for) issued from inside
//! a hook that is itself being visited by a traversal.
//! A cursor is a position, so removing entries while it is live can skip an
//! item; pruning code restarts its scan after every removal instead.

use alloc::vec::Vec;

use crate::types::{NodeId, Renderable};

/// Position of a forward iteration over a [`ViewNodeCollection`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Cursor(usize);

impl Cursor {
    /// A cursor positioned before the first item.
    pub const fn new() -> Self {
        Self(0)
    }
}

#[derive(Clone, Debug)]
struct Entry<R> {
    node: NodeId,
    renderable: R,
}

/// Ordered children of a view node with identity-based lookup.
///
/// Entries are the ownership edges of the tree: removing a node from its
/// parent's collection through [`ViewTree::remove`](crate::ViewTree::remove)
/// destroys it together with its subtree.
#[derive(Clone, Debug)]
pub struct ViewNodeCollection<R> {
    entries: Vec<Entry<R>>,
}

impl<R> Default for ViewNodeCollection<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ViewNodeCollection<R> {
    /// Create an empty collection.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `node`, which wraps `renderable`.
    pub fn add_item(&mut self, node: NodeId, renderable: R) {
        self.entries.push(Entry { node, renderable });
    }

    /// Remove `node`, returning the renderable it wrapped.
    pub fn remove_item(&mut self, node: NodeId) -> Option<R> {
        let pos = self.entries.iter().position(|e| e.node == node)?;
        Some(self.entries.remove(pos).renderable)
    }

    /// True if `node` is in this collection.
    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.iter().any(|e| e.node == node)
    }

    /// Advance `cursor` and return the node under it, or `None` past the end.
    pub fn next_item(&self, cursor: &mut Cursor) -> Option<NodeId> {
        let entry = self.entries.get(cursor.0)?;
        cursor.0 += 1;
        Some(entry.node)
    }

    /// Iterate children in order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().map(|e| e.node)
    }

    /// Iterate `(node, renderable)` pairs in order.
    pub fn entries(&self) -> impl Iterator<Item = (NodeId, &R)> + '_ {
        self.entries.iter().map(|e| (e.node, &e.renderable))
    }
}

impl<R: Renderable> ViewNodeCollection<R> {
    /// True if some child wraps `renderable` (identity comparison).
    pub fn is_renderable_present(&self, renderable: &R) -> bool {
        self.node_for(renderable).is_some()
    }

    /// The child wrapping `renderable`, if any.
    pub fn node_for(&self, renderable: &R) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|e| e.renderable.is_same(renderable))
            .map(|e| e.node)
    }

    /// First child whose renderable is not in `seen`.
    pub(crate) fn first_unseen(&self, seen: &[R]) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|e| !seen.iter().any(|s| s.is_same(&e.renderable)))
            .map(|e| e.node)
    }

    pub(crate) fn set_renderable(&mut self, node: NodeId, renderable: R) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.node == node) {
            entry.renderable = renderable;
        }
    }
}
