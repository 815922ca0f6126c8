// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 2D paint backend: turns the scene into a flat list of draw commands.
//!
//! - Synchronize caches each actor's world bounds and visibility on its node.
//! - Render emits commands in traversal order. Within a renderer the camera
//!   comes first, then lights, then actors, whatever order the scene lists them in.
//! - Invisible actors are skipped together with their mappers.
//! - A renderer whose lights, actors, and camera have not changed since its last
//!   render replays its cached commands instead of visiting its children.
//!   An invalidate traversal drops that cache.

use kurbo::{Affine, Point, Rect};
use understory_view_node::{NodeCx, NodeId, Operation, TypeInfo, TypeTag, ViewNode, ViewNodeFactory};

use crate::model::{self, MapperKind, SceneObject, build_parts, tags};

/// Declared types of the paint view nodes.
pub mod node_tags {
    use understory_view_node::TypeTag;

    /// Base of every paint node.
    pub const PAINT_NODE: TypeTag = TypeTag::new("PaintNode");
    /// Node for a window.
    pub const WINDOW: TypeTag = TypeTag::new("PaintWindowNode");
    /// Node for a renderer.
    pub const RENDERER: TypeTag = TypeTag::new("PaintRendererNode");
    /// Node for a light.
    pub const LIGHT: TypeTag = TypeTag::new("PaintLightNode");
    /// Node for a camera.
    pub const CAMERA: TypeTag = TypeTag::new("PaintCameraNode");
    /// Node for an actor.
    pub const ACTOR: TypeTag = TypeTag::new("PaintActorNode");
    /// Node for any mapper.
    pub const MAPPER: TypeTag = TypeTag::new("PaintMapperNode");
}

const PAINT_BASES: &[&[TypeTag]] = &[&[node_tags::PAINT_NODE]];

/// One paint operation.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Fill the viewport with a color.
    Clear {
        /// Linear RGB.
        background: [f64; 3],
    },
    /// World-to-view transform for the commands that follow.
    SetView(Affine),
    /// A light contributing to the shapes that follow.
    Light {
        /// World position.
        position: Point,
        /// Linear RGB.
        color: [f64; 3],
        /// Intensity.
        intensity: f64,
    },
    /// A filled world-space rectangle.
    FillRect {
        /// World-space rectangle.
        rect: Rect,
        /// Opacity in `0.0..=1.0`.
        opacity: f64,
    },
    /// Glyphs stamped over a world-space rectangle.
    Glyphs {
        /// World-space rectangle covered by the glyphs.
        rect: Rect,
        /// Glyph scale factor.
        scale: f64,
        /// Opacity in `0.0..=1.0`.
        opacity: f64,
    },
}

/// Draw commands of one frame, in paint order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command.
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Commands in paint order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Remove every command.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Extend<DrawCommand> for DrawList {
    fn extend<I: IntoIterator<Item = DrawCommand>>(&mut self, iter: I) {
        self.commands.extend(iter);
    }
}

type Cx<'a> = NodeCx<'a, SceneObject, DrawList>;

/// Window node: starts a new frame on every render.
#[derive(Debug, Default)]
pub struct PaintWindowNode;

impl ViewNode<SceneObject, DrawList> for PaintWindowNode {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::with_bases(node_tags::WINDOW, PAINT_BASES)
    }

    fn build(&mut self, cx: &mut Cx<'_>, prepass: bool) {
        build_parts(cx, prepass);
    }

    fn render(&mut self, cx: &mut Cx<'_>, prepass: bool) {
        if prepass {
            cx.backend().clear();
        }
    }
}

/// Renderer node: orders its children and caches the commands they emit.
#[derive(Debug, Default)]
pub struct PaintRendererNode {
    cached: Option<Vec<DrawCommand>>,
    // Index of this renderer's first command in the frame being recorded.
    start: usize,
    replaying: bool,
    cache_hits: u64,
}

impl PaintRendererNode {
    /// Number of renders served from the cache.
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits
    }

    /// True if a cached frame is available.
    pub fn has_cache(&self) -> bool {
        self.cached.is_some()
    }
}

fn paint_rank(object: Option<&SceneObject>) -> u8 {
    match object {
        Some(SceneObject::Camera(_)) => 0,
        Some(SceneObject::Light(_)) => 1,
        _ => 2,
    }
}

impl ViewNode<SceneObject, DrawList> for PaintRendererNode {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::with_bases(node_tags::RENDERER, PAINT_BASES)
    }

    fn build(&mut self, cx: &mut Cx<'_>, prepass: bool) {
        build_parts(cx, prepass);
    }

    fn render(&mut self, cx: &mut Cx<'_>, prepass: bool) {
        let Some(renderer) = cx.renderable().as_renderer().cloned() else {
            return;
        };
        if !prepass {
            if !self.replaying {
                let recorded = cx.backend().commands()[self.start..].to_vec();
                self.cached = Some(recorded);
                cx.set_render_time(model::now());
            }
            return;
        }
        if let Some(cached) = &self.cached
            && cx.render_time() >= renderer.newest_modified()
        {
            log::trace!("renderer unchanged; replaying {} commands", cached.len());
            self.replaying = true;
            self.cache_hits += 1;
            cx.backend().extend(cached.iter().cloned());
            return;
        }
        self.replaying = false;
        self.start = cx.backend().len();
        cx.backend().push(DrawCommand::Clear {
            background: renderer.background(),
        });
    }

    fn invalidate(&mut self, cx: &mut Cx<'_>, prepass: bool) {
        if prepass {
            cx.set_render_time(0);
            self.cached = None;
        }
    }

    fn order_children(&mut self, cx: &Cx<'_>, op: Operation, children: &mut Vec<NodeId>) {
        if op != Operation::Render {
            return;
        }
        if self.replaying {
            children.clear();
            return;
        }
        children.sort_by_key(|child| paint_rank(cx.tree().renderable(*child)));
    }
}

/// Camera node: sets the view transform.
#[derive(Debug, Default)]
pub struct PaintCameraNode;

impl ViewNode<SceneObject, DrawList> for PaintCameraNode {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::with_bases(node_tags::CAMERA, PAINT_BASES)
    }

    fn render(&mut self, cx: &mut Cx<'_>, prepass: bool) {
        if prepass && let Some(camera) = cx.renderable().as_camera().cloned() {
            cx.backend().push(DrawCommand::SetView(camera.view_transform()));
        }
    }
}

/// Light node: emits switched-on lights.
#[derive(Debug, Default)]
pub struct PaintLightNode;

impl ViewNode<SceneObject, DrawList> for PaintLightNode {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::with_bases(node_tags::LIGHT, PAINT_BASES)
    }

    fn render(&mut self, cx: &mut Cx<'_>, prepass: bool) {
        let Some(light) = cx.renderable().as_light().cloned() else {
            return;
        };
        if prepass && light.switch() {
            cx.backend().push(DrawCommand::Light {
                position: light.position(),
                color: light.color(),
                intensity: light.intensity(),
            });
        }
    }
}

/// Actor node: holds the synchronized world bounds its mapper draws into.
#[derive(Debug, Default)]
pub struct PaintActorNode {
    world_bounds: Rect,
    visible: bool,
}

impl PaintActorNode {
    /// World bounds cached by the last synchronize pass.
    pub fn world_bounds(&self) -> Rect {
        self.world_bounds
    }

    /// Visibility cached by the last synchronize pass.
    pub fn visible(&self) -> bool {
        self.visible
    }
}

impl ViewNode<SceneObject, DrawList> for PaintActorNode {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::with_bases(node_tags::ACTOR, PAINT_BASES)
    }

    fn build(&mut self, cx: &mut Cx<'_>, prepass: bool) {
        build_parts(cx, prepass);
    }

    fn synchronize(&mut self, cx: &mut Cx<'_>, prepass: bool) {
        if prepass && let Some(actor) = cx.renderable().as_actor() {
            self.world_bounds = actor.world_bounds();
            self.visible = actor.visible();
        }
    }

    fn order_children(&mut self, _cx: &Cx<'_>, op: Operation, children: &mut Vec<NodeId>) {
        if op == Operation::Render && !self.visible {
            children.clear();
        }
    }
}

/// Mapper node: fills the enclosing actor's world bounds.
#[derive(Debug, Default)]
pub struct PaintMapperNode;

impl ViewNode<SceneObject, DrawList> for PaintMapperNode {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::with_bases(node_tags::MAPPER, PAINT_BASES)
    }

    fn render(&mut self, cx: &mut Cx<'_>, prepass: bool) {
        if !prepass {
            return;
        }
        let Some(mapper) = cx.renderable().as_mapper().cloned() else {
            return;
        };
        let Some((_, actor)) = cx.first_ancestor::<PaintActorNode>() else {
            log::warn!("mapper outside an actor; nothing to paint");
            return;
        };
        let rect = actor.world_bounds();
        let opacity = mapper.opacity();
        match mapper.kind() {
            MapperKind::PolyData => cx.backend().push(DrawCommand::FillRect { rect, opacity }),
            MapperKind::CompositePolyData => {
                // One vertical strip per block.
                let blocks = mapper.blocks();
                let width = rect.width() / f64::from(blocks);
                for i in 0..blocks {
                    let x0 = rect.x0 + width * f64::from(i);
                    cx.backend().push(DrawCommand::FillRect {
                        rect: Rect::new(x0, rect.y0, x0 + width, rect.y1),
                        opacity,
                    });
                }
            }
            MapperKind::Glyph => cx.backend().push(DrawCommand::Glyphs {
                rect,
                scale: mapper.glyph_scale(),
                opacity,
            }),
        }
    }
}

/// Register paint nodes for every scene object type.
///
/// Mappers of every kind resolve to the [`tags::MAPPER`] registration.
pub fn register_paint_nodes(factory: &mut ViewNodeFactory<SceneObject, DrawList>) {
    factory.register_override(tags::RENDER_WINDOW, || {
        Box::new(PaintWindowNode) as Box<dyn ViewNode<SceneObject, DrawList>>
    });
    factory.register_override(tags::RENDERER, || {
        Box::new(PaintRendererNode::default()) as Box<dyn ViewNode<SceneObject, DrawList>>
    });
    factory.register_override(tags::LIGHT, || {
        Box::new(PaintLightNode) as Box<dyn ViewNode<SceneObject, DrawList>>
    });
    factory.register_override(tags::CAMERA, || {
        Box::new(PaintCameraNode) as Box<dyn ViewNode<SceneObject, DrawList>>
    });
    factory.register_override(tags::ACTOR, || {
        Box::new(PaintActorNode::default()) as Box<dyn ViewNode<SceneObject, DrawList>>
    });
    factory.register_override(tags::MAPPER, || {
        Box::new(PaintMapperNode) as Box<dyn ViewNode<SceneObject, DrawList>>
    });
}
