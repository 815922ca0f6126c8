// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The view node trait implemented by backends, and the context passed to its hooks.
//!
//! ## Protocol
//!
//! For every operation, [`ViewTree::traverse`](crate::ViewTree::traverse) calls
//! [`ViewNode::apply`] with `prepass == true`, visits the children, then calls
//! [`ViewNode::apply`] with `prepass == false`. The default `apply` dispatches to
//! [`ViewNode::build`], [`ViewNode::synchronize`], [`ViewNode::render`], or
//! [`ViewNode::invalidate`]. All hooks default to no-ops, so a backend node
//! overrides only what it needs; most do their work on the prepass only.
//!
//! ## Building children
//!
//! A node whose renderable owns sub-renderables reconciles them in its build prepass:
//!
//! ```
//! use understory_view_node::{NodeCx, Renderable, TypeInfo, TypeTag, ViewNode};
//!
//! #[derive(Clone, Debug)]
//! struct Obj(u32);
//!
//! impl Renderable for Obj {
//!     fn type_info(&self) -> TypeInfo {
//!         TypeInfo::new(TypeTag::new("Group"))
//!     }
//!     fn is_same(&self, other: &Self) -> bool {
//!         self.0 == other.0
//!     }
//! }
//!
//! struct GroupNode;
//!
//! impl ViewNode<Obj, ()> for GroupNode {
//!     fn type_info(&self) -> TypeInfo {
//!         TypeInfo::new(TypeTag::new("GroupNode"))
//!     }
//!
//!     fn build(&mut self, cx: &mut NodeCx<'_, Obj, ()>, prepass: bool) {
//!         if prepass {
//!             let members = [Obj(cx.renderable().0 * 10), Obj(cx.renderable().0 * 10 + 1)];
//!             cx.prepare_nodes();
//!             cx.add_missing_nodes(&members);
//!             cx.remove_unused_nodes();
//!         }
//!     }
//! }
//! ```

use alloc::vec::Vec;
use core::any::Any;

use crate::collection::ViewNodeCollection;
use crate::tree::ViewTree;
use crate::types::{NodeId, Operation, Renderable, TypeInfo, TypeTag};

/// A backend node mirroring one renderable.
///
/// `R` is the renderable handle type and `C` the backend context threaded
/// through every hook (a serializer, a draw list, a device, ...).
///
/// Implementors are `'static` so that other nodes can downcast them, for
/// example with [`NodeCx::first_ancestor`].
pub trait ViewNode<R, C>: Any {
    /// Runtime type of this node, used by type-based lookups such as
    /// [`ViewTree::first_ancestor_of_type`].
    fn type_info(&self) -> TypeInfo;

    /// Build hook: reconcile children against current sub-renderables.
    fn build(&mut self, _cx: &mut NodeCx<'_, R, C>, _prepass: bool) {}

    /// Synchronize hook: copy or cache renderable state.
    fn synchronize(&mut self, _cx: &mut NodeCx<'_, R, C>, _prepass: bool) {}

    /// Render hook: perform the backend side effect.
    fn render(&mut self, _cx: &mut NodeCx<'_, R, C>, _prepass: bool) {}

    /// Invalidate hook: drop cached backend state.
    fn invalidate(&mut self, _cx: &mut NodeCx<'_, R, C>, _prepass: bool) {}

    /// Dispatch `op` to the matching hook.
    fn apply(&mut self, cx: &mut NodeCx<'_, R, C>, op: Operation, prepass: bool) {
        match op {
            Operation::Noop => {}
            Operation::Build => self.build(cx, prepass),
            Operation::Synchronize => self.synchronize(cx, prepass),
            Operation::Render => self.render(cx, prepass),
            Operation::Invalidate => self.invalidate(cx, prepass),
        }
    }

    /// Choose which children are visited for `op`, and in which order.
    ///
    /// Called between the prepass and the children. `children` starts in
    /// collection order; reorder it, or drop entries to skip their subtrees
    /// for this operation.
    fn order_children(
        &mut self,
        _cx: &NodeCx<'_, R, C>,
        _op: Operation,
        _children: &mut Vec<NodeId>,
    ) {
    }
}

/// Access handed to a [`ViewNode`] hook.
///
/// It names the node being visited and gives it the backend context, read
/// access to the rest of the tree, and the reconciliation primitives for its
/// own children.
pub struct NodeCx<'a, R, C> {
    pub(crate) tree: &'a mut ViewTree<R, C>,
    pub(crate) id: NodeId,
    pub(crate) backend: &'a mut C,
}

impl<R, C> core::fmt::Debug for NodeCx<'_, R, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeCx")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl<R: Renderable + 'static, C: 'static> NodeCx<'_, R, C> {
    /// The node being visited.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The renderable wrapped by the visited node.
    pub fn renderable(&self) -> &R {
        &self.tree.slot(self.id).renderable
    }

    /// Parent of the visited node, `None` at a root.
    pub fn parent(&self) -> Option<NodeId> {
        self.tree.slot(self.id).parent
    }

    /// Children of the visited node.
    pub fn children(&self) -> &ViewNodeCollection<R> {
        &self.tree.slot(self.id).children
    }

    /// Read access to the whole tree.
    ///
    /// The visited node's own backend object is detached while its hook runs,
    /// so [`ViewTree::node`] returns `None` for [`NodeCx::id`].
    pub fn tree(&self) -> &ViewTree<R, C> {
        self.tree
    }

    /// The backend context.
    pub fn backend(&mut self) -> &mut C {
        self.backend
    }

    /// Timestamp of the last render recorded by this node.
    pub fn render_time(&self) -> u64 {
        self.tree.slot(self.id).render_time
    }

    /// Record the timestamp of the state this node last rendered.
    pub fn set_render_time(&mut self, time: u64) {
        self.tree.slot_mut(self.id).render_time = time;
    }

    /// Start a reconciliation: forget which renderables were seen.
    pub fn prepare_nodes(&mut self) {
        self.tree.prepare_nodes(self.id);
    }

    /// Mark `renderable` as seen and create a child for it if none exists.
    pub fn add_missing_node(&mut self, renderable: &R) {
        self.tree.add_missing_node(self.id, renderable);
    }

    /// [`add_missing_node`](Self::add_missing_node) for each item, in order.
    pub fn add_missing_nodes<'r, I>(&mut self, renderables: I)
    where
        I: IntoIterator<Item = &'r R>,
        R: 'r,
    {
        self.tree.add_missing_nodes(self.id, renderables);
    }

    /// Remove children whose renderables were not seen since [`prepare_nodes`](Self::prepare_nodes).
    pub fn remove_unused_nodes(&mut self) {
        self.tree.remove_unused_nodes(self.id);
    }

    /// Prepare, add missing, and remove unused in one call.
    pub fn reconcile<'r, I>(&mut self, renderables: I)
    where
        I: IntoIterator<Item = &'r R>,
        R: 'r,
    {
        self.prepare_nodes();
        self.add_missing_nodes(renderables);
        self.remove_unused_nodes();
    }

    /// Nearest ancestor whose type IS-A `tag`.
    pub fn first_ancestor_of_type(&self, tag: TypeTag) -> Option<NodeId> {
        self.tree.first_ancestor_of_type(self.id, tag)
    }

    /// Nearest ancestor whose backend node is a `T`.
    pub fn first_ancestor<T: ViewNode<R, C>>(&self) -> Option<(NodeId, &T)> {
        self.tree.first_ancestor::<T>(self.id)
    }
}
