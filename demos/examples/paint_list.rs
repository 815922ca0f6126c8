// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint list.
//!
//! Render a scene to draw commands over several frames and show when the
//! renderer replays its cache.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p understory_view_demos --example paint_list`

use std::rc::Rc;

use kurbo::{Affine, Rect, Vec2};
use understory_view_node::{ViewNodeFactory, ViewTree};
use understory_view_scene::model::{Actor, Light, Mapper, MapperKind, Renderer, Window};
use understory_view_scene::paint::{DrawList, PaintRendererNode, register_paint_nodes};

fn main() {
    env_logger::init();

    let window = Window::new();
    let renderer = Renderer::new();
    let actor = Actor::new(Rect::new(0.0, 0.0, 30.0, 30.0));
    actor.set_mapper(Some(&Mapper::new(MapperKind::PolyData)));
    let hidden = Actor::new(Rect::new(100.0, 100.0, 120.0, 120.0));
    hidden.set_mapper(Some(&Mapper::new(MapperKind::Glyph)));
    hidden.set_visible(false);
    renderer.add_actor(&actor);
    renderer.add_actor(&hidden);
    renderer.add_light(&Light::new());
    window.add_renderer(&renderer);

    let mut factory = ViewNodeFactory::new();
    register_paint_nodes(&mut factory);
    let mut tree = ViewTree::with_factory(Rc::new(factory));
    let root = tree.create_root(&(&window).into()).unwrap();

    let mut list = DrawList::new();
    for frame in 0..4 {
        if frame == 2 {
            actor.set_transform(Affine::translate(Vec2::new(10.0, 10.0)));
        }
        tree.traverse_all_passes(root, &mut list);
        let hits = tree
            .view_node_for(root, &(&renderer).into())
            .and_then(|id| tree.node::<PaintRendererNode>(id))
            .map_or(0, PaintRendererNode::cache_hits);
        println!("frame {frame}: {} commands, cache hits so far: {hits}", list.len());
        for command in list.commands() {
            println!("  {command:?}");
        }
    }
}
