// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Factory mapping renderable types to backend view node makers.
//!
//! ## Resolution order
//!
//! 1. A maker registered for the renderable's exact tag.
//! 2. Otherwise, the base generations from [`TypeInfo::bases`], nearest first.
//!    Within one generation:
//!    - no registered tag: continue with the next generation;
//!    - exactly one: use it;
//!    - more than one: [`ResolveError::Ambiguous`], nothing is created.
//! 3. Otherwise, [`ResolveError::Unregistered`].
//!
//! A mapper subtype without its own registration therefore gets the node of
//! its nearest registered base, while a diamond with two registered bases at
//! the same distance is reported as a configuration error instead of
//! silently picking one.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::node::ViewNode;
use crate::types::{Renderable, TypeInfo, TypeTag};

/// A zero-argument constructor for a backend view node.
pub type Maker<R, C> = Box<dyn Fn() -> Box<dyn ViewNode<R, C>>>;

/// Why a renderable type could not be resolved to a maker.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ResolveError {
    /// Neither the type nor any of its bases has a registered maker.
    #[error("no view node maker registered for `{0}` or any of its bases")]
    Unregistered(TypeTag),
    /// Several equally near bases have registered makers.
    #[error("ambiguous view node maker for `{tag}`: {} equally near bases are registered", .candidates.len())]
    Ambiguous {
        /// The renderable's own tag.
        tag: TypeTag,
        /// Registered bases found in the nearest matching generation.
        candidates: Vec<TypeTag>,
    },
}

/// A freshly made node that is not linked into any tree yet.
///
/// Returned by [`ViewNodeFactory::create_node`]; the caller links it under a
/// parent (see [`ViewTree::create_view_node`](crate::ViewTree::create_view_node)).
pub struct DetachedNode<R, C> {
    /// The renderable the node wraps.
    pub renderable: R,
    /// The tag whose maker produced the node.
    pub resolved: TypeTag,
    /// The backend node.
    pub node: Box<dyn ViewNode<R, C>>,
}

impl<R: core::fmt::Debug + 'static, C: 'static> core::fmt::Debug for DetachedNode<R, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DetachedNode")
            .field("renderable", &self.renderable)
            .field("resolved", &self.resolved)
            .field("node", &self.node.type_info().tag())
            .finish()
    }
}

/// Registry of view node makers keyed by renderable type.
///
/// Populate it once during setup, then share it (usually through an
/// [`Rc`](alloc::rc::Rc)) with every tree that should use these backend nodes.
/// Traversal only reads it.
pub struct ViewNodeFactory<R, C> {
    makers: BTreeMap<TypeTag, Maker<R, C>>,
}

impl<R, C> core::fmt::Debug for ViewNodeFactory<R, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewNodeFactory")
            .field("registered", &self.makers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<R, C> Default for ViewNodeFactory<R, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, C> ViewNodeFactory<R, C> {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self {
            makers: BTreeMap::new(),
        }
    }

    /// Register `maker` for renderables of type `tag`.
    ///
    /// Re-registering a tag replaces the previous maker; returns true in that case.
    pub fn register_override<F>(&mut self, tag: TypeTag, maker: F) -> bool
    where
        F: Fn() -> Box<dyn ViewNode<R, C>> + 'static,
    {
        self.makers.insert(tag, Box::new(maker)).is_some()
    }

    /// Remove the maker for `tag`; returns true if one was registered.
    pub fn unregister(&mut self, tag: TypeTag) -> bool {
        self.makers.remove(&tag).is_some()
    }

    /// True if a maker is registered for exactly `tag`.
    pub fn is_registered(&self, tag: TypeTag) -> bool {
        self.makers.contains_key(&tag)
    }

    /// Number of registered makers.
    pub fn len(&self) -> usize {
        self.makers.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.makers.is_empty()
    }

    /// Find the registered tag used for objects of type `info`.
    pub fn resolve(&self, info: TypeInfo) -> Result<TypeTag, ResolveError> {
        if self.is_registered(info.tag()) {
            return Ok(info.tag());
        }
        for generation in info.bases() {
            let found: Vec<TypeTag> = generation
                .iter()
                .copied()
                .filter(|t| self.is_registered(*t))
                .collect();
            match found.len() {
                0 => continue,
                1 => return Ok(found[0]),
                _ => {
                    return Err(ResolveError::Ambiguous {
                        tag: info.tag(),
                        candidates: found,
                    });
                }
            }
        }
        Err(ResolveError::Unregistered(info.tag()))
    }
}

impl<R: Renderable, C> ViewNodeFactory<R, C> {
    /// Make a node for `renderable`, reporting why none could be made.
    pub fn try_create_node(&self, renderable: &R) -> Result<DetachedNode<R, C>, ResolveError> {
        let resolved = self.resolve(renderable.type_info())?;
        let Some(maker) = self.makers.get(&resolved) else {
            return Err(ResolveError::Unregistered(renderable.type_info().tag()));
        };
        Ok(DetachedNode {
            renderable: renderable.clone(),
            resolved,
            node: maker(),
        })
    }

    /// Make a node for `renderable`, or `None` (with a warning) if its type does not resolve.
    pub fn create_node(&self, renderable: &R) -> Option<DetachedNode<R, C>> {
        match self.try_create_node(renderable) {
            Ok(made) => Some(made),
            Err(err) => {
                log::warn!("skipping renderable: {err}");
                None
            }
        }
    }
}
