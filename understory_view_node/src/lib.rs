// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_view_node --heading-base-level=0

//! Understory View Node: a backend-agnostic tree of view nodes mirroring a renderable graph.
//!
//! A scene description (windows, renderers, actors, lights, cameras, mappers) says *what* to draw.
//! A rendering backend needs its own per-object state to say *how*.
//! This crate keeps the two apart:
//!
//! - Each scene object (a *renderable*) is mirrored by one backend *view node*.
//! - Nodes are made by a [`ViewNodeFactory`] that maps renderable types to node makers,
//!   falling back to the nearest registered base type.
//! - Nodes reconcile their children against the current scene during a build pass,
//!   creating nodes for new objects and pruning nodes whose objects disappeared.
//! - Work is split into build, synchronize, and render passes, each a depth-first
//!   traversal with a prepass and a postpass per node.
//!
//! Several backends (an exporter, a paint list builder, a GPU renderer) can each keep
//! their own tree over the same scene without the scene knowing about them.
//!
//! ## API overview
//!
//! - [`ViewTree`]: node storage, reconciliation, lookups, and traversal.
//! - [`ViewNode`]: the trait backend nodes implement; hooks receive a [`NodeCx`].
//! - [`ViewNodeFactory`]: registry of makers keyed by [`TypeTag`].
//! - [`ViewNodeCollection`]: ordered children of one node, iterated with a [`Cursor`].
//! - [`Renderable`]: the handle trait scene objects implement (type plus identity).
//! - [`NodeId`]: generational handle of a node.
//! - [`Operation`] and [`Passes`]: what a traversal does.
//!
//! Key operations:
//! - [`ViewTree::create_root`] → [`NodeId`]
//! - [`ViewTree::traverse_all_passes`]: build, synchronize, render.
//! - [`NodeCx::reconcile`] from a build prepass:
//!   [`prepare_nodes`](NodeCx::prepare_nodes), [`add_missing_nodes`](NodeCx::add_missing_nodes),
//!   [`remove_unused_nodes`](NodeCx::remove_unused_nodes).
//! - [`ViewTree::view_node_for`], [`ViewTree::first_ancestor_of_type`],
//!   [`ViewTree::first_child_of_type`].
//!
//! ## Identity and lifetime
//!
//! - Renderables are compared by identity ([`Renderable::is_same`]), never by value.
//! - A node lives until its parent's build no longer sees its renderable, or until
//!   [`ViewTree::remove`] is called. Removal drops the whole subtree.
//! - Nodes never keep the renderable alive beyond the handle the backend chose to store.
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: a `warn` when a renderable cannot be mapped
//! to a node, `debug` for node creation and pruning, and `trace` for every hook call.
//!
//! ### Minimal usage
//!
//! ```
//! use std::rc::Rc;
//! use understory_view_node::{
//!     NodeCx, Renderable, TypeInfo, TypeTag, ViewNode, ViewNodeFactory, ViewTree,
//! };
//!
//! const GROUP: TypeTag = TypeTag::new("Group");
//! const LEAF: TypeTag = TypeTag::new("Leaf");
//!
//! #[derive(Clone, Debug)]
//! struct Obj(Rc<(TypeTag, Vec<Obj>)>);
//!
//! impl Renderable for Obj {
//!     fn type_info(&self) -> TypeInfo {
//!         TypeInfo::new(self.0.0)
//!     }
//!     fn is_same(&self, other: &Self) -> bool {
//!         Rc::ptr_eq(&self.0, &other.0)
//!     }
//! }
//!
//! // The backend context: names drawn so far.
//! type Drawn = Vec<&'static str>;
//!
//! struct Node(TypeTag);
//!
//! impl ViewNode<Obj, Drawn> for Node {
//!     fn type_info(&self) -> TypeInfo {
//!         TypeInfo::new(self.0)
//!     }
//!     fn build(&mut self, cx: &mut NodeCx<'_, Obj, Drawn>, prepass: bool) {
//!         if prepass {
//!             let members = cx.renderable().0.1.clone();
//!             cx.reconcile(&members);
//!         }
//!     }
//!     fn render(&mut self, cx: &mut NodeCx<'_, Obj, Drawn>, prepass: bool) {
//!         if prepass {
//!             cx.backend().push(self.0.name());
//!         }
//!     }
//! }
//!
//! let mut factory = ViewNodeFactory::<Obj, Drawn>::new();
//! for tag in [GROUP, LEAF] {
//!     factory.register_override(tag, move || -> Box<dyn ViewNode<Obj, Drawn>> {
//!         Box::new(Node(tag))
//!     });
//! }
//!
//! let leaf = Obj(Rc::new((LEAF, vec![])));
//! let scene = Obj(Rc::new((GROUP, vec![leaf.clone()])));
//!
//! let mut tree = ViewTree::with_factory(Rc::new(factory));
//! let root = tree.create_root(&scene).unwrap();
//! let mut drawn = Drawn::new();
//! tree.traverse_all_passes(root, &mut drawn);
//!
//! assert_eq!(drawn, ["Group", "Leaf"]);
//! assert!(tree.view_node_for(root, &leaf).is_some());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod collection;
mod factory;
mod node;
mod tree;
mod types;

#[cfg(test)]
mod fixtures;

pub use collection::{Cursor, ViewNodeCollection};
pub use factory::{DetachedNode, Maker, ResolveError, ViewNodeFactory};
pub use node::{NodeCx, ViewNode};
pub use tree::ViewTree;
pub use types::{NodeId, Operation, Passes, Renderable, TypeInfo, TypeTag};
