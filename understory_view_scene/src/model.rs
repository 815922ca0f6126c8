// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderable scene objects.
//!
//! Objects are shared handles (`Rc` inside): cloning a [`Window`] or an [`Actor`]
//! clones the reference, never the object. Identity is pointer identity.
//!
//! Every setter bumps the object's modification time from a process-wide
//! monotonic clock, see [`now`]. Backends compare those times against the
//! render time they recorded to decide whether cached output is still valid.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use kurbo::{Affine, Point, Rect};
use understory_view_node::{NodeCx, Renderable, TypeInfo, TypeTag};

/// Declared type tags of the scene objects.
pub mod tags {
    use understory_view_node::TypeTag;

    /// A render window.
    pub const RENDER_WINDOW: TypeTag = TypeTag::new("RenderWindow");
    /// A renderer (viewport) inside a window.
    pub const RENDERER: TypeTag = TypeTag::new("Renderer");
    /// A light.
    pub const LIGHT: TypeTag = TypeTag::new("Light");
    /// A camera.
    pub const CAMERA: TypeTag = TypeTag::new("Camera");
    /// An actor.
    pub const ACTOR: TypeTag = TypeTag::new("Actor");
    /// Base of every mapper.
    pub const MAPPER: TypeTag = TypeTag::new("Mapper");
    /// Mapper for polygonal data.
    pub const POLY_DATA_MAPPER: TypeTag = TypeTag::new("PolyDataMapper");
    /// Mapper for multi-block polygonal data.
    pub const COMPOSITE_POLY_DATA_MAPPER: TypeTag = TypeTag::new("CompositePolyDataMapper");
    /// Mapper placing copies of a glyph.
    pub const GLYPH_MAPPER: TypeTag = TypeTag::new("Glyph3DMapper");
}

static CLOCK: AtomicU64 = AtomicU64::new(1);

/// Current value of the modification clock.
///
/// Every later modification gets a strictly larger time.
pub fn now() -> u64 {
    CLOCK.load(Ordering::Relaxed)
}

fn tick() -> u64 {
    CLOCK.fetch_add(1, Ordering::Relaxed) + 1
}

#[derive(Debug)]
struct Stamp(Cell<u64>);

impl Stamp {
    fn new() -> Self {
        Self(Cell::new(tick()))
    }

    fn touch(&self) {
        self.0.set(tick());
    }

    fn get(&self) -> u64 {
        self.0.get()
    }
}

fn remove_same<T>(items: &RefCell<Vec<T>>, same: impl Fn(&T) -> bool) -> bool {
    let mut items = items.borrow_mut();
    let before = items.len();
    items.retain(|i| !same(i));
    items.len() != before
}

// --- Window ---

#[derive(Debug)]
struct WindowData {
    mtime: Stamp,
    renderers: RefCell<Vec<Renderer>>,
}

/// Top-level render window; owns an ordered list of renderers.
#[derive(Clone, Debug)]
pub struct Window(Rc<WindowData>);

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

impl Window {
    /// Create an empty window.
    pub fn new() -> Self {
        Self(Rc::new(WindowData {
            mtime: Stamp::new(),
            renderers: RefCell::new(Vec::new()),
        }))
    }

    /// Append `renderer`.
    pub fn add_renderer(&self, renderer: &Renderer) {
        self.0.renderers.borrow_mut().push(renderer.clone());
        self.0.mtime.touch();
    }

    /// Remove `renderer`; returns true if it was present.
    pub fn remove_renderer(&self, renderer: &Renderer) -> bool {
        let removed = remove_same(&self.0.renderers, |r| r.is_same(renderer));
        if removed {
            self.0.mtime.touch();
        }
        removed
    }

    /// Renderers in order.
    pub fn renderers(&self) -> Vec<Renderer> {
        self.0.renderers.borrow().clone()
    }

    /// Last modification time.
    pub fn modified(&self) -> u64 {
        self.0.mtime.get()
    }

    /// True if both handles refer to the same window.
    pub fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// --- Renderer ---

#[derive(Debug)]
struct RendererData {
    mtime: Stamp,
    background: Cell<[f64; 3]>,
    lights: RefCell<Vec<Light>>,
    actors: RefCell<Vec<Actor>>,
    camera: RefCell<Option<Camera>>,
}

/// A viewport: lights, actors, and one active camera.
#[derive(Clone, Debug)]
pub struct Renderer(Rc<RendererData>);

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Create an empty renderer with a black background and no camera yet.
    pub fn new() -> Self {
        Self(Rc::new(RendererData {
            mtime: Stamp::new(),
            background: Cell::new([0.0; 3]),
            lights: RefCell::new(Vec::new()),
            actors: RefCell::new(Vec::new()),
            camera: RefCell::new(None),
        }))
    }

    /// Background color as linear RGB.
    pub fn background(&self) -> [f64; 3] {
        self.0.background.get()
    }

    /// Set the background color.
    pub fn set_background(&self, rgb: [f64; 3]) {
        self.0.background.set(rgb);
        self.0.mtime.touch();
    }

    /// Append `light`.
    pub fn add_light(&self, light: &Light) {
        self.0.lights.borrow_mut().push(light.clone());
        self.0.mtime.touch();
    }

    /// Remove `light`; returns true if it was present.
    pub fn remove_light(&self, light: &Light) -> bool {
        let removed = remove_same(&self.0.lights, |l| l.is_same(light));
        if removed {
            self.0.mtime.touch();
        }
        removed
    }

    /// Lights in order.
    pub fn lights(&self) -> Vec<Light> {
        self.0.lights.borrow().clone()
    }

    /// Append `actor`.
    pub fn add_actor(&self, actor: &Actor) {
        self.0.actors.borrow_mut().push(actor.clone());
        self.0.mtime.touch();
    }

    /// Remove `actor`; returns true if it was present.
    pub fn remove_actor(&self, actor: &Actor) -> bool {
        let removed = remove_same(&self.0.actors, |a| a.is_same(actor));
        if removed {
            self.0.mtime.touch();
        }
        removed
    }

    /// Actors in order.
    pub fn actors(&self) -> Vec<Actor> {
        self.0.actors.borrow().clone()
    }

    /// The active camera, created on first request.
    pub fn active_camera(&self) -> Camera {
        let mut camera = self.0.camera.borrow_mut();
        if let Some(camera) = camera.as_ref() {
            return camera.clone();
        }
        let made = Camera::new();
        *camera = Some(made.clone());
        self.0.mtime.touch();
        made
    }

    /// Replace the active camera.
    pub fn set_active_camera(&self, camera: &Camera) {
        *self.0.camera.borrow_mut() = Some(camera.clone());
        self.0.mtime.touch();
    }

    /// True once a camera exists, without creating one.
    pub fn has_active_camera(&self) -> bool {
        self.0.camera.borrow().is_some()
    }

    /// Last modification time of this renderer or anything it draws.
    pub fn newest_modified(&self) -> u64 {
        let lights = self.0.lights.borrow();
        let actors = self.0.actors.borrow();
        let camera = self.0.camera.borrow();
        lights
            .iter()
            .map(Light::modified)
            .chain(actors.iter().map(Actor::newest_modified))
            .chain(camera.iter().map(Camera::modified))
            .fold(self.modified(), u64::max)
    }

    /// Last modification time.
    pub fn modified(&self) -> u64 {
        self.0.mtime.get()
    }

    /// True if both handles refer to the same renderer.
    pub fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// --- Light ---

#[derive(Debug)]
struct LightData {
    mtime: Stamp,
    position: Cell<Point>,
    color: Cell<[f64; 3]>,
    intensity: Cell<f64>,
    switch: Cell<bool>,
}

/// A point light.
#[derive(Clone, Debug)]
pub struct Light(Rc<LightData>);

impl Default for Light {
    fn default() -> Self {
        Self::new()
    }
}

impl Light {
    /// A white, switched-on light of intensity 1 at the origin.
    pub fn new() -> Self {
        Self(Rc::new(LightData {
            mtime: Stamp::new(),
            position: Cell::new(Point::ORIGIN),
            color: Cell::new([1.0; 3]),
            intensity: Cell::new(1.0),
            switch: Cell::new(true),
        }))
    }

    /// Position in world space.
    pub fn position(&self) -> Point {
        self.0.position.get()
    }

    /// Move the light.
    pub fn set_position(&self, position: Point) {
        self.0.position.set(position);
        self.0.mtime.touch();
    }

    /// Color as linear RGB.
    pub fn color(&self) -> [f64; 3] {
        self.0.color.get()
    }

    /// Set the color.
    pub fn set_color(&self, rgb: [f64; 3]) {
        self.0.color.set(rgb);
        self.0.mtime.touch();
    }

    /// Intensity.
    pub fn intensity(&self) -> f64 {
        self.0.intensity.get()
    }

    /// Set the intensity.
    pub fn set_intensity(&self, intensity: f64) {
        self.0.intensity.set(intensity);
        self.0.mtime.touch();
    }

    /// True if the light is on.
    pub fn switch(&self) -> bool {
        self.0.switch.get()
    }

    /// Turn the light on or off.
    pub fn set_switch(&self, on: bool) {
        self.0.switch.set(on);
        self.0.mtime.touch();
    }

    /// Last modification time.
    pub fn modified(&self) -> u64 {
        self.0.mtime.get()
    }

    /// True if both handles refer to the same light.
    pub fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// --- Camera ---

#[derive(Debug)]
struct CameraData {
    mtime: Stamp,
    focal_point: Cell<Point>,
    zoom: Cell<f64>,
}

/// A 2D camera: a focal point shown at the viewport origin, and a zoom.
#[derive(Clone, Debug)]
pub struct Camera(Rc<CameraData>);

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Camera looking at the origin with zoom 1.
    pub fn new() -> Self {
        Self(Rc::new(CameraData {
            mtime: Stamp::new(),
            focal_point: Cell::new(Point::ORIGIN),
            zoom: Cell::new(1.0),
        }))
    }

    /// World point shown at the viewport origin.
    pub fn focal_point(&self) -> Point {
        self.0.focal_point.get()
    }

    /// Move the camera.
    pub fn set_focal_point(&self, point: Point) {
        self.0.focal_point.set(point);
        self.0.mtime.touch();
    }

    /// Zoom factor.
    pub fn zoom(&self) -> f64 {
        self.0.zoom.get()
    }

    /// Set the zoom factor.
    pub fn set_zoom(&self, zoom: f64) {
        self.0.zoom.set(zoom);
        self.0.mtime.touch();
    }

    /// World-to-view transform.
    pub fn view_transform(&self) -> Affine {
        Affine::scale(self.zoom()) * Affine::translate(-self.focal_point().to_vec2())
    }

    /// Last modification time.
    pub fn modified(&self) -> u64 {
        self.0.mtime.get()
    }

    /// True if both handles refer to the same camera.
    pub fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// --- Actor ---

#[derive(Debug)]
struct ActorData {
    mtime: Stamp,
    mapper: RefCell<Option<Mapper>>,
    visible: Cell<bool>,
    bounds: Cell<Rect>,
    transform: Cell<Affine>,
}

/// A placed, drawable object: local bounds, a transform, visibility, and a mapper.
#[derive(Clone, Debug)]
pub struct Actor(Rc<ActorData>);

impl Actor {
    /// A visible actor with `bounds` in local space, identity transform, and no mapper.
    pub fn new(bounds: Rect) -> Self {
        Self(Rc::new(ActorData {
            mtime: Stamp::new(),
            mapper: RefCell::new(None),
            visible: Cell::new(true),
            bounds: Cell::new(bounds),
            transform: Cell::new(Affine::IDENTITY),
        }))
    }

    /// The mapper, if any.
    pub fn mapper(&self) -> Option<Mapper> {
        self.0.mapper.borrow().clone()
    }

    /// Replace the mapper.
    pub fn set_mapper(&self, mapper: Option<&Mapper>) {
        *self.0.mapper.borrow_mut() = mapper.cloned();
        self.0.mtime.touch();
    }

    /// Visibility flag.
    pub fn visible(&self) -> bool {
        self.0.visible.get()
    }

    /// Show or hide the actor.
    pub fn set_visible(&self, visible: bool) {
        self.0.visible.set(visible);
        self.0.mtime.touch();
    }

    /// Bounds in local space.
    pub fn bounds(&self) -> Rect {
        self.0.bounds.get()
    }

    /// Set local bounds.
    pub fn set_bounds(&self, bounds: Rect) {
        self.0.bounds.set(bounds);
        self.0.mtime.touch();
    }

    /// Local-to-world transform.
    pub fn transform(&self) -> Affine {
        self.0.transform.get()
    }

    /// Set the local-to-world transform.
    pub fn set_transform(&self, transform: Affine) {
        self.0.transform.set(transform);
        self.0.mtime.touch();
    }

    /// Axis-aligned world bounds (conservative under rotation).
    pub fn world_bounds(&self) -> Rect {
        self.transform().transform_rect_bbox(self.bounds())
    }

    /// Last modification time of the actor itself.
    pub fn modified(&self) -> u64 {
        self.0.mtime.get()
    }

    /// Last modification time of the actor or its mapper.
    pub fn newest_modified(&self) -> u64 {
        let own = self.modified();
        self.0
            .mapper
            .borrow()
            .as_ref()
            .map_or(own, |m| own.max(m.modified()))
    }

    /// True if both handles refer to the same actor.
    pub fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// --- Mapper ---

/// Concrete mapper kind.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MapperKind {
    /// Polygonal data.
    PolyData,
    /// Multi-block polygonal data; IS-A [`MapperKind::PolyData`].
    CompositePolyData,
    /// Glyphs placed over the actor's bounds.
    Glyph,
}

const MAPPER_BASES: &[&[TypeTag]] = &[&[tags::MAPPER]];
const POLY_DATA_BASES: &[&[TypeTag]] = &[&[tags::POLY_DATA_MAPPER], &[tags::MAPPER]];

impl MapperKind {
    /// Runtime type of mappers of this kind.
    pub const fn type_info(self) -> TypeInfo {
        match self {
            Self::PolyData => TypeInfo::with_bases(tags::POLY_DATA_MAPPER, MAPPER_BASES),
            Self::CompositePolyData => {
                TypeInfo::with_bases(tags::COMPOSITE_POLY_DATA_MAPPER, POLY_DATA_BASES)
            }
            Self::Glyph => TypeInfo::with_bases(tags::GLYPH_MAPPER, MAPPER_BASES),
        }
    }
}

#[derive(Debug)]
struct MapperData {
    mtime: Stamp,
    kind: MapperKind,
    opacity: Cell<f64>,
    blocks: Cell<u32>,
    glyph_scale: Cell<f64>,
}

/// Turns an actor's geometry into drawable primitives.
#[derive(Clone, Debug)]
pub struct Mapper(Rc<MapperData>);

impl Mapper {
    /// An opaque mapper of `kind` with one block and glyph scale 1.
    pub fn new(kind: MapperKind) -> Self {
        Self(Rc::new(MapperData {
            mtime: Stamp::new(),
            kind,
            opacity: Cell::new(1.0),
            blocks: Cell::new(1),
            glyph_scale: Cell::new(1.0),
        }))
    }

    /// Kind, fixed at creation.
    pub fn kind(&self) -> MapperKind {
        self.0.kind
    }

    /// Opacity in `0.0..=1.0`.
    pub fn opacity(&self) -> f64 {
        self.0.opacity.get()
    }

    /// Set opacity; clamped to `0.0..=1.0`.
    pub fn set_opacity(&self, opacity: f64) {
        self.0.opacity.set(opacity.clamp(0.0, 1.0));
        self.0.mtime.touch();
    }

    /// Number of blocks drawn by a composite mapper (1 for other kinds).
    pub fn blocks(&self) -> u32 {
        match self.kind() {
            MapperKind::CompositePolyData => self.0.blocks.get(),
            _ => 1,
        }
    }

    /// Set the block count of a composite mapper.
    pub fn set_blocks(&self, blocks: u32) {
        self.0.blocks.set(blocks.max(1));
        self.0.mtime.touch();
    }

    /// Glyph scale factor.
    pub fn glyph_scale(&self) -> f64 {
        self.0.glyph_scale.get()
    }

    /// Set the glyph scale factor.
    pub fn set_glyph_scale(&self, scale: f64) {
        self.0.glyph_scale.set(scale);
        self.0.mtime.touch();
    }

    /// Last modification time.
    pub fn modified(&self) -> u64 {
        self.0.mtime.get()
    }

    /// True if both handles refer to the same mapper.
    pub fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// --- SceneObject ---

/// Identity of a scene object, stable while the object lives.
///
/// A key may be reused by an object allocated after this one is dropped;
/// hold a [`WeakObject`] beside it to tell the two apart.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ObjectKey(usize);

/// Non-owning reference to a scene object.
///
/// While any `WeakObject` exists the object's allocation is kept, so its
/// [`ObjectKey`] cannot be handed to another object.
#[derive(Clone, Debug)]
pub struct WeakObject(Weak<dyn Any>);

impl WeakObject {
    /// True while the object has at least one strong handle.
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

/// Any scene object; the renderable handle used by the view node backends.
#[derive(Clone, Debug)]
pub enum SceneObject {
    /// A render window.
    Window(Window),
    /// A renderer.
    Renderer(Renderer),
    /// A light.
    Light(Light),
    /// A camera.
    Camera(Camera),
    /// An actor.
    Actor(Actor),
    /// A mapper.
    Mapper(Mapper),
}

impl SceneObject {
    /// Identity key of the referenced object.
    pub fn key(&self) -> ObjectKey {
        let ptr = match self {
            Self::Window(o) => Rc::as_ptr(&o.0).cast::<()>(),
            Self::Renderer(o) => Rc::as_ptr(&o.0).cast::<()>(),
            Self::Light(o) => Rc::as_ptr(&o.0).cast::<()>(),
            Self::Camera(o) => Rc::as_ptr(&o.0).cast::<()>(),
            Self::Actor(o) => Rc::as_ptr(&o.0).cast::<()>(),
            Self::Mapper(o) => Rc::as_ptr(&o.0).cast::<()>(),
        };
        ObjectKey(ptr.addr())
    }

    /// A non-owning reference to the referenced object.
    pub fn downgrade(&self) -> WeakObject {
        let weak: Weak<dyn Any> = match self {
            Self::Window(o) => Rc::downgrade(&o.0) as Weak<dyn Any>,
            Self::Renderer(o) => Rc::downgrade(&o.0) as Weak<dyn Any>,
            Self::Light(o) => Rc::downgrade(&o.0) as Weak<dyn Any>,
            Self::Camera(o) => Rc::downgrade(&o.0) as Weak<dyn Any>,
            Self::Actor(o) => Rc::downgrade(&o.0) as Weak<dyn Any>,
            Self::Mapper(o) => Rc::downgrade(&o.0) as Weak<dyn Any>,
        };
        WeakObject(weak)
    }

    /// Last modification time of the referenced object.
    pub fn modified(&self) -> u64 {
        match self {
            Self::Window(o) => o.modified(),
            Self::Renderer(o) => o.modified(),
            Self::Light(o) => o.modified(),
            Self::Camera(o) => o.modified(),
            Self::Actor(o) => o.modified(),
            Self::Mapper(o) => o.modified(),
        }
    }

    /// Sub-renderables a view node for this object should mirror, in order.
    ///
    /// A renderer yields its lights, its actors, then its active camera
    /// (created on demand).
    pub fn parts(&self) -> Vec<Self> {
        match self {
            Self::Window(w) => w.renderers().into_iter().map(Self::Renderer).collect(),
            Self::Renderer(r) => r
                .lights()
                .into_iter()
                .map(Self::Light)
                .chain(r.actors().into_iter().map(Self::Actor))
                .chain(std::iter::once(Self::Camera(r.active_camera())))
                .collect(),
            Self::Actor(a) => a.mapper().into_iter().map(Self::Mapper).collect(),
            Self::Light(_) | Self::Camera(_) | Self::Mapper(_) => Vec::new(),
        }
    }

    /// The window, if this is one.
    pub fn as_window(&self) -> Option<&Window> {
        match self {
            Self::Window(o) => Some(o),
            _ => None,
        }
    }

    /// The renderer, if this is one.
    pub fn as_renderer(&self) -> Option<&Renderer> {
        match self {
            Self::Renderer(o) => Some(o),
            _ => None,
        }
    }

    /// The light, if this is one.
    pub fn as_light(&self) -> Option<&Light> {
        match self {
            Self::Light(o) => Some(o),
            _ => None,
        }
    }

    /// The camera, if this is one.
    pub fn as_camera(&self) -> Option<&Camera> {
        match self {
            Self::Camera(o) => Some(o),
            _ => None,
        }
    }

    /// The actor, if this is one.
    pub fn as_actor(&self) -> Option<&Actor> {
        match self {
            Self::Actor(o) => Some(o),
            _ => None,
        }
    }

    /// The mapper, if this is one.
    pub fn as_mapper(&self) -> Option<&Mapper> {
        match self {
            Self::Mapper(o) => Some(o),
            _ => None,
        }
    }
}

impl Renderable for SceneObject {
    fn type_info(&self) -> TypeInfo {
        match self {
            Self::Window(_) => TypeInfo::new(tags::RENDER_WINDOW),
            Self::Renderer(_) => TypeInfo::new(tags::RENDERER),
            Self::Light(_) => TypeInfo::new(tags::LIGHT),
            Self::Camera(_) => TypeInfo::new(tags::CAMERA),
            Self::Actor(_) => TypeInfo::new(tags::ACTOR),
            Self::Mapper(m) => m.kind().type_info(),
        }
    }

    fn is_same(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

macro_rules! impl_from {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for SceneObject {
                fn from(o: $ty) -> Self {
                    Self::$ty(o)
                }
            }

            impl From<&$ty> for SceneObject {
                fn from(o: &$ty) -> Self {
                    Self::$ty(o.clone())
                }
            }
        )*
    };
}

impl_from!(Window, Renderer, Light, Camera, Actor, Mapper);

/// Reconcile the visited node's children against [`SceneObject::parts`].
///
/// Every backend node calls this from its build prepass.
pub fn build_parts<C: 'static>(cx: &mut NodeCx<'_, SceneObject, C>, prepass: bool) {
    if !prepass {
        return;
    }
    let parts = cx.renderable().parts();
    cx.reconcile(&parts);
}

/// Declared type name of `object`, as used in logs and exports.
pub fn type_name(object: &SceneObject) -> &'static str {
    object.type_info().tag().name()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_advance_the_clock() {
        let light = Light::new();
        let before = light.modified();
        light.set_intensity(0.5);
        assert!(light.modified() > before, "setter must bump mtime");
        assert!(now() >= light.modified());
    }

    #[test]
    fn camera_is_created_once_on_demand() {
        let r = Renderer::new();
        assert!(!r.has_active_camera());
        let c1 = r.active_camera();
        let c2 = r.active_camera();
        assert!(c1.is_same(&c2));
        assert!(r.has_active_camera());
    }

    #[test]
    fn renderer_parts_are_lights_actors_camera() {
        let r = Renderer::new();
        let l = Light::new();
        let a = Actor::new(Rect::new(0.0, 0.0, 1.0, 1.0));
        r.add_actor(&a);
        r.add_light(&l);
        let parts = SceneObject::from(&r).parts();
        let names: Vec<_> = parts.iter().map(type_name).collect();
        assert_eq!(names, ["Light", "Actor", "Camera"]);
        assert!(parts[1].is_same(&SceneObject::from(&a)));
    }

    #[test]
    fn identity_is_by_reference() {
        let a = Actor::new(Rect::ZERO);
        let b = Actor::new(Rect::ZERO);
        assert!(SceneObject::from(&a).is_same(&SceneObject::Actor(a.clone())));
        assert!(!SceneObject::from(&a).is_same(&SceneObject::from(&b)));
    }

    #[test]
    fn composite_mapper_is_a_poly_data_mapper() {
        let info = MapperKind::CompositePolyData.type_info();
        assert!(info.is_a(tags::POLY_DATA_MAPPER));
        assert!(info.is_a(tags::MAPPER));
        assert!(!MapperKind::Glyph.type_info().is_a(tags::POLY_DATA_MAPPER));
    }

    #[test]
    fn newest_modified_sees_mapper_changes() {
        let r = Renderer::new();
        let a = Actor::new(Rect::ZERO);
        let m = Mapper::new(MapperKind::PolyData);
        a.set_mapper(Some(&m));
        r.add_actor(&a);
        let before = r.newest_modified();
        m.set_opacity(0.25);
        assert!(r.newest_modified() > before);
        assert_eq!(m.opacity(), 0.25);
    }

    #[test]
    fn world_bounds_follow_the_transform() {
        let a = Actor::new(Rect::new(0.0, 0.0, 10.0, 5.0));
        a.set_transform(Affine::translate((100.0, 50.0)));
        assert_eq!(a.world_bounds(), Rect::new(100.0, 50.0, 110.0, 55.0));
    }
}
