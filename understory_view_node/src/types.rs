// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the view node tree: type identity, node identifiers, operations, and passes.

/// Explicitly declared identifier for a renderable type or a view node type.
///
/// Tags are declared by the object model (or the backend), usually as constants.
/// They are never derived from Rust type names, so renaming a struct does not
/// change factory resolution.
///
/// ```
/// use understory_view_node::TypeTag;
///
/// const ACTOR: TypeTag = TypeTag::new("Actor");
/// assert_eq!(ACTOR.name(), "Actor");
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TypeTag(&'static str);

impl TypeTag {
    /// Declare a tag.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the declared name.
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl core::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.0)
    }
}

/// Runtime type description: the most-derived tag plus its base types.
///
/// Bases are grouped by generation. Index `0` holds the direct bases, index `1`
/// the bases of those, and so on. Single inheritance has exactly one tag per
/// generation; a diamond shows up as several tags in one generation.
///
/// ## Semantics
///
/// - [`TypeInfo::is_a`] is true for the tag itself and for every base in any generation.
/// - [`ViewNodeFactory`](crate::ViewNodeFactory) resolution tries the exact tag,
///   then walks the generations nearest-first.
///
/// ```
/// use understory_view_node::{TypeInfo, TypeTag};
///
/// const MAPPER: TypeTag = TypeTag::new("Mapper");
/// const POLY: TypeTag = TypeTag::new("PolyDataMapper");
/// const COMPOSITE: TypeInfo =
///     TypeInfo::with_bases(TypeTag::new("CompositePolyDataMapper"), &[&[POLY], &[MAPPER]]);
///
/// assert!(COMPOSITE.is_a(MAPPER));
/// assert!(!COMPOSITE.is_a(TypeTag::new("Actor")));
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TypeInfo {
    tag: TypeTag,
    bases: &'static [&'static [TypeTag]],
}

impl TypeInfo {
    /// A type without bases.
    pub const fn new(tag: TypeTag) -> Self {
        Self { tag, bases: &[] }
    }

    /// A type with bases grouped by generation, nearest first.
    pub const fn with_bases(tag: TypeTag, bases: &'static [&'static [TypeTag]]) -> Self {
        Self { tag, bases }
    }

    /// The most-derived tag.
    pub const fn tag(self) -> TypeTag {
        self.tag
    }

    /// Base generations, nearest first.
    pub const fn bases(self) -> &'static [&'static [TypeTag]] {
        self.bases
    }

    /// Returns true if this type is `tag` or derives from it.
    pub fn is_a(self, tag: TypeTag) -> bool {
        self.tag == tag || self.bases.iter().any(|generation| generation.contains(&tag))
    }
}

/// A scene object wrapped by a view node.
///
/// The tree treats a renderable as an opaque handle: it only asks for its
/// runtime type and compares handles by identity. Enumerating sub-renderables
/// is left to the backend nodes that know the concrete object model.
pub trait Renderable: Clone {
    /// Runtime type of the referenced object.
    fn type_info(&self) -> TypeInfo;

    /// Returns true if both handles refer to the same object (identity, not deep equality).
    fn is_same(&self, other: &Self) -> bool;
}

/// Identifier for a view node in a [`ViewTree`](crate::ViewTree).
///
/// This is a small, copyable handle that stays stable while the node lives
/// and becomes stale once the node is pruned.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On creation, a fresh slot is allocated with generation `1`.
/// - On removal, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Use [`ViewTree::is_alive`](crate::ViewTree::is_alive) to check liveness.
/// Stale `NodeId`s never alias a different live node because the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Operation applied to each node during a traversal.
///
/// See [`ViewNode::apply`](crate::ViewNode::apply) for the dispatch to hooks.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Operation {
    /// Visit without calling any hook.
    Noop,
    /// Reconcile children against the current sub-renderables.
    Build,
    /// Copy or cache renderable state into the node.
    Synchronize,
    /// Perform the backend side effect.
    Render,
    /// Drop cached backend state so the next render recomputes it.
    Invalidate,
}

bitflags::bitflags! {
    /// A set of traversal passes.
    ///
    /// Passes always run in the fixed order build, synchronize, render,
    /// whatever order the flags were combined in.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Passes: u8 {
        /// Build pass.
        const BUILD       = 0b0000_0001;
        /// Synchronize pass.
        const SYNCHRONIZE = 0b0000_0010;
        /// Render pass.
        const RENDER      = 0b0000_0100;
        /// Build, synchronize, and render.
        const ALL = Self::BUILD.bits() | Self::SYNCHRONIZE.bits() | Self::RENDER.bits();
    }
}

impl Default for Passes {
    fn default() -> Self {
        Self::ALL
    }
}

impl Passes {
    /// Operations selected by this set, in protocol order.
    pub fn operations(self) -> impl Iterator<Item = Operation> {
        [
            (Self::BUILD, Operation::Build),
            (Self::SYNCHRONIZE, Operation::Synchronize),
            (Self::RENDER, Operation::Render),
        ]
        .into_iter()
        .filter(move |(pass, _)| self.contains(*pass))
        .map(|(_, op)| op)
    }
}
