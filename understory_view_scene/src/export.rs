// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene export backend: serializes the scene graph to a JSON tree.
//!
//! ## Format
//!
//! Every exported object is an entry:
//!
//! - `id`: unique id (a decimal string), stable per object across frames until
//!   [`SceneSerializer::reset`].
//! - `parent`: id of the enclosing entry; `"0x0"` for the window.
//! - `type`: declared type name, for example `"PolyDataMapper"`.
//! - `properties`: the object's state.
//! - `dependencies`: child entries.
//! - `calls`: `[method, [args]]` pairs a loader replays on this entry, with
//!   `"instance:${id}"` arguments referring to dependencies (`addRenderer`,
//!   `addLight`, `addViewProp`, `setMapper`, `setActiveCamera`).
//!
//! Actors using a composite mapper are not exported themselves: the mapper
//! exports one actor entry per block instead.

use std::collections::HashMap;

use serde_json::{Value, json};
use understory_view_node::{NodeCx, TypeInfo, TypeTag, ViewNode, ViewNodeFactory};

use crate::model::{
    self, Actor, Camera, Light, Mapper, MapperKind, ObjectKey, Renderer, SceneObject, WeakObject, Window,
    build_parts, tags,
};

/// Declared types of the export view nodes.
pub mod node_tags {
    use understory_view_node::TypeTag;

    /// Base of every export node.
    pub const EXPORT_NODE: TypeTag = TypeTag::new("ExportNode");
    /// Node for a window.
    pub const WINDOW: TypeTag = TypeTag::new("ExportWindowNode");
    /// Node for a renderer.
    pub const RENDERER: TypeTag = TypeTag::new("ExportRendererNode");
    /// Node for a light.
    pub const LIGHT: TypeTag = TypeTag::new("ExportLightNode");
    /// Node for a camera.
    pub const CAMERA: TypeTag = TypeTag::new("ExportCameraNode");
    /// Node for an actor.
    pub const ACTOR: TypeTag = TypeTag::new("ExportActorNode");
    /// Node for any mapper.
    pub const MAPPER: TypeTag = TypeTag::new("ExportMapperNode");
}

const EXPORT_BASES: &[&[TypeTag]] = &[&[node_tags::EXPORT_NODE]];

/// Builds the JSON tree during a render traversal.
#[derive(Debug)]
pub struct SceneSerializer {
    root: Value,
    ids: HashMap<ObjectKey, (WeakObject, u64)>,
    next_id: u64,
}

impl Default for SceneSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneSerializer {
    /// Create an empty serializer.
    pub fn new() -> Self {
        Self {
            root: Value::Null,
            ids: HashMap::new(),
            next_id: 0,
        }
    }

    /// Forget the exported tree and every assigned id.
    pub fn reset(&mut self) {
        self.root = Value::Null;
        self.ids.clear();
        self.next_id = 0;
    }

    /// The window entry, `Null` before anything was exported.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Pretty-printed JSON of [`SceneSerializer::root`].
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.root)
    }

    /// Id of `object`, assigning the next free one on first sight.
    ///
    /// Ids follow object identity: a dropped object's id is never given to
    /// another object.
    pub fn unique_id(&mut self, object: &SceneObject) -> u64 {
        if let Some((weak, id)) = self.ids.get(&object.key())
            && weak.is_alive()
        {
            return *id;
        }
        let id = self.fresh_id();
        self.ids.insert(object.key(), (object.downgrade(), id));
        id
    }

    /// Number of objects currently holding an id.
    pub fn tracked_objects(&self) -> usize {
        self.ids.len()
    }

    fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Start a new tree rooted at `window`.
    ///
    /// Ids of objects dropped since the last frame are forgotten.
    pub fn add_window(&mut self, window: &Window) {
        self.ids.retain(|_, (weak, _)| weak.is_alive());
        let id = self.unique_id(&window.into());
        self.root = json!({
            "parent": "0x0",
            "id": id.to_string(),
            "type": tags::RENDER_WINDOW.name(),
            "mtime": window.modified(),
            "properties": { "numberOfLayers": window.renderers().len() },
            "dependencies": [],
            "calls": [],
        });
    }

    /// Export `object` under the entry of `parent`.
    ///
    /// Composite mappers need their renderer too; see
    /// [`SceneSerializer::add_composite_mapper`].
    pub fn add(&mut self, parent: &SceneObject, object: &SceneObject) {
        match object {
            SceneObject::Window(w) => self.add_window(w),
            SceneObject::Renderer(r) => self.add_renderer(parent, r),
            SceneObject::Light(l) => self.add_light(parent, l),
            SceneObject::Camera(c) => self.add_camera(parent, c),
            SceneObject::Actor(a) => self.add_actor(parent, a),
            SceneObject::Mapper(m) => self.add_mapper(parent, m),
        }
    }

    fn add_renderer(&mut self, parent: &SceneObject, renderer: &Renderer) {
        let [r, g, b] = renderer.background();
        let properties = json!({ "background": [r, g, b, 1.0] });
        self.attach(parent, renderer.into(), properties, "addRenderer");
    }

    fn add_light(&mut self, parent: &SceneObject, light: &Light) {
        let p = light.position();
        let properties = json!({
            "intensity": light.intensity(),
            "switch": light.switch(),
            "color": light.color(),
            "position": [p.x, p.y],
        });
        self.attach(parent, light.into(), properties, "addLight");
    }

    fn add_camera(&mut self, parent: &SceneObject, camera: &Camera) {
        let p = camera.focal_point();
        let properties = json!({
            "focalPoint": [p.x, p.y],
            "zoom": camera.zoom(),
        });
        self.attach(parent, camera.into(), properties, "setActiveCamera");
    }

    fn add_actor(&mut self, parent: &SceneObject, actor: &Actor) {
        if actor
            .mapper()
            .is_some_and(|m| m.kind() == MapperKind::CompositePolyData)
        {
            // Exported per block by the mapper.
            return;
        }
        self.attach(parent, actor.into(), actor_properties(actor), "addViewProp");
    }

    fn add_mapper(&mut self, parent: &SceneObject, mapper: &Mapper) {
        self.attach(parent, mapper.into(), mapper_properties(mapper), "setMapper");
    }

    /// Export one actor entry per block of `mapper`, each with its own mapper entry.
    ///
    /// Block entries get fresh ids on every call; they do not correspond to objects.
    pub fn add_composite_mapper(&mut self, renderer: &SceneObject, actor: &Actor, mapper: &Mapper) {
        let renderer_id = self.unique_id(renderer).to_string();
        let block_ids: Vec<(u64, u64)> = (0..mapper.blocks())
            .map(|_| (self.fresh_id(), self.fresh_id()))
            .collect();
        let Some(renderer_entry) = entry_mut(&mut self.root, &renderer_id) else {
            log::warn!("composite mapper exported before its renderer");
            return;
        };
        let mapper_type = model::type_name(&mapper.into());
        for (block, (actor_id, mapper_id)) in block_ids.into_iter().enumerate() {
            let mut properties = actor_properties(actor);
            properties["block"] = json!(block);
            push(
                renderer_entry,
                "dependencies",
                json!({
                    "parent": renderer_id,
                    "id": actor_id.to_string(),
                    "type": tags::ACTOR.name(),
                    "properties": properties,
                    "dependencies": [{
                        "parent": actor_id.to_string(),
                        "id": mapper_id.to_string(),
                        "type": mapper_type,
                        "properties": mapper_properties(mapper),
                    }],
                    "calls": [["setMapper", [instance(mapper_id)]]],
                }),
            );
            push(
                renderer_entry,
                "calls",
                json!(["addViewProp", [instance(actor_id)]]),
            );
        }
    }

    /// Append an entry for `object` to `parent`'s dependencies and record `call` on `parent`.
    fn attach(&mut self, parent: &SceneObject, object: SceneObject, properties: Value, call: &str) {
        let parent_id = self.unique_id(parent).to_string();
        let id = self.unique_id(&object);
        let Some(parent_entry) = entry_mut(&mut self.root, &parent_id) else {
            log::warn!(
                "cannot export `{}`: parent `{}` has no entry",
                model::type_name(&object),
                model::type_name(parent)
            );
            return;
        };
        push(
            parent_entry,
            "dependencies",
            json!({
                "parent": parent_id,
                "id": id.to_string(),
                "type": model::type_name(&object),
                "properties": properties,
            }),
        );
        push(parent_entry, "calls", json!([call, [instance(id)]]));
    }
}

fn instance(id: u64) -> String {
    format!("instance:${{{id}}}")
}

fn actor_properties(actor: &Actor) -> Value {
    let b = actor.bounds();
    json!({
        "visibility": actor.visible(),
        "bounds": [b.x0, b.y0, b.x1, b.y1],
        "transform": actor.transform().as_coeffs(),
    })
}

fn mapper_properties(mapper: &Mapper) -> Value {
    let mut properties = json!({ "opacity": mapper.opacity() });
    match mapper.kind() {
        MapperKind::CompositePolyData => properties["blocks"] = json!(mapper.blocks()),
        MapperKind::Glyph => properties["scaleFactor"] = json!(mapper.glyph_scale()),
        MapperKind::PolyData => {}
    }
    properties
}

/// Append `value` to the array `key` of `entry`, creating the array if needed.
fn push(entry: &mut Value, key: &str, value: Value) {
    if !entry[key].is_array() {
        entry[key] = Value::Array(Vec::new());
    }
    if let Some(items) = entry[key].as_array_mut() {
        items.push(value);
    }
}

/// Depth-first search for the entry with `id`.
fn entry_mut<'v>(node: &'v mut Value, id: &str) -> Option<&'v mut Value> {
    if node.get("id").and_then(Value::as_str) == Some(id) {
        return Some(node);
    }
    node.get_mut("dependencies")?
        .as_array_mut()?
        .iter_mut()
        .find_map(|dep| entry_mut(dep, id))
}

/// View node exporting its renderable on the render prepass.
#[derive(Debug)]
pub struct ExportNode {
    tag: TypeTag,
}

impl ExportNode {
    /// A node declared as `tag` (one of [`node_tags`]).
    pub fn new(tag: TypeTag) -> Self {
        Self { tag }
    }
}

impl ViewNode<SceneObject, SceneSerializer> for ExportNode {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::with_bases(self.tag, EXPORT_BASES)
    }

    fn build(&mut self, cx: &mut NodeCx<'_, SceneObject, SceneSerializer>, prepass: bool) {
        build_parts(cx, prepass);
    }

    fn render(&mut self, cx: &mut NodeCx<'_, SceneObject, SceneSerializer>, prepass: bool) {
        if !prepass {
            return;
        }
        let object = cx.renderable().clone();
        let parent = cx.parent().and_then(|p| cx.tree().renderable(p)).cloned();
        match (&object, parent) {
            (SceneObject::Window(w), _) => cx.backend().add_window(w),
            (SceneObject::Mapper(m), Some(SceneObject::Actor(actor)))
                if m.kind() == MapperKind::CompositePolyData =>
            {
                let renderer = cx
                    .first_ancestor_of_type(node_tags::RENDERER)
                    .and_then(|id| cx.tree().renderable(id))
                    .cloned();
                match renderer {
                    Some(renderer) => cx.backend().add_composite_mapper(&renderer, &actor, m),
                    None => log::warn!("composite mapper outside a renderer; not exported"),
                }
            }
            (_, Some(parent)) => cx.backend().add(&parent, &object),
            (_, None) => log::warn!(
                "`{}` is not under a window; not exported",
                model::type_name(&object)
            ),
        }
    }
}

/// Register export nodes for every scene object type.
///
/// Only the [`tags::MAPPER`] base is registered for mappers; every mapper kind
/// resolves to it.
pub fn register_export_nodes(factory: &mut ViewNodeFactory<SceneObject, SceneSerializer>) {
    for (renderable, node) in [
        (tags::RENDER_WINDOW, node_tags::WINDOW),
        (tags::RENDERER, node_tags::RENDERER),
        (tags::LIGHT, node_tags::LIGHT),
        (tags::CAMERA, node_tags::CAMERA),
        (tags::ACTOR, node_tags::ACTOR),
        (tags::MAPPER, node_tags::MAPPER),
    ] {
        factory.register_override(
            renderable,
            move || -> Box<dyn ViewNode<SceneObject, SceneSerializer>> {
                Box::new(ExportNode::new(node))
            },
        );
    }
}
