// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_view_scene --heading-base-level=0

//! Understory View Scene: a small renderable scene model with two view node backends.
//!
//! The [`model`] module describes a scene the way a visualization toolkit does:
//! a [`Window`](model::Window) holds [`Renderer`](model::Renderer)s; a renderer holds
//! [`Light`](model::Light)s, [`Actor`](model::Actor)s, and an active
//! [`Camera`](model::Camera); an actor may have a [`Mapper`](model::Mapper).
//! Every object is a shared handle with a modification time.
//!
//! Two backends mirror that scene with [`understory_view_node`] trees:
//!
//! - [`export`]: a [`SceneSerializer`](export::SceneSerializer) producing a JSON
//!   scene description with stable object ids.
//! - [`paint`]: a [`DrawList`](paint::DrawList) of 2D draw commands, with per-renderer
//!   caching keyed on modification times.
//!
//! Both register their nodes into a [`ViewNodeFactory`](understory_view_node::ViewNodeFactory)
//! with one call, and both register only the base mapper type: every mapper kind
//! resolves to it through the type lineage.
//!
//! ```
//! use std::rc::Rc;
//! use kurbo::Rect;
//! use understory_view_node::{ViewNodeFactory, ViewTree};
//! use understory_view_scene::model::{Actor, Mapper, MapperKind, Renderer, Window};
//! use understory_view_scene::paint::{DrawCommand, DrawList, register_paint_nodes};
//!
//! let window = Window::new();
//! let renderer = Renderer::new();
//! let actor = Actor::new(Rect::new(0.0, 0.0, 10.0, 10.0));
//! actor.set_mapper(Some(&Mapper::new(MapperKind::PolyData)));
//! renderer.add_actor(&actor);
//! window.add_renderer(&renderer);
//!
//! let mut factory = ViewNodeFactory::new();
//! register_paint_nodes(&mut factory);
//! let mut tree = ViewTree::with_factory(Rc::new(factory));
//! let root = tree.create_root(&window.into()).unwrap();
//!
//! let mut list = DrawList::new();
//! tree.traverse_all_passes(root, &mut list);
//! assert!(matches!(list.commands().last(), Some(DrawCommand::FillRect { .. })));
//! ```

pub mod export;
pub mod model;
pub mod paint;

pub use model::SceneObject;
