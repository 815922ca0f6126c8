// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene export.
//!
//! Build a scene with every mapper kind and print its JSON description.
//!
//! Run:
//! - `cargo run -p understory_view_demos --example scene_export`

use std::rc::Rc;

use kurbo::{Affine, Point, Rect, Vec2};
use understory_view_node::{ViewNodeFactory, ViewTree};
use understory_view_scene::export::{SceneSerializer, register_export_nodes};
use understory_view_scene::model::{Actor, Light, Mapper, MapperKind, Renderer, Window};

fn main() {
    env_logger::init();

    let window = Window::new();
    let renderer = Renderer::new();
    renderer.set_background([0.1, 0.1, 0.15]);
    let light = Light::new();
    light.set_position(Point::new(0.0, 100.0));
    renderer.add_light(&light);

    for (i, kind) in [
        MapperKind::PolyData,
        MapperKind::CompositePolyData,
        MapperKind::Glyph,
    ]
    .into_iter()
    .enumerate()
    {
        let actor = Actor::new(Rect::new(0.0, 0.0, 40.0, 20.0));
        actor.set_transform(Affine::translate(Vec2::new(50.0 * i as f64, 0.0)));
        let mapper = Mapper::new(kind);
        mapper.set_blocks(2);
        actor.set_mapper(Some(&mapper));
        renderer.add_actor(&actor);
    }
    renderer.active_camera().set_zoom(1.5);
    window.add_renderer(&renderer);

    let mut factory = ViewNodeFactory::new();
    register_export_nodes(&mut factory);
    let mut tree = ViewTree::with_factory(Rc::new(factory));
    let root = tree.create_root(&window.into()).unwrap();

    let mut out = SceneSerializer::new();
    tree.traverse_all_passes(root, &mut out);
    match out.to_json_string() {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("cannot print scene: {err}"),
    }
}
