// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View node tree: node storage, reconciliation, lookups, and traversal.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;

use crate::collection::{Cursor, ViewNodeCollection};
use crate::factory::{DetachedNode, ViewNodeFactory};
use crate::node::{NodeCx, ViewNode};
use crate::types::{NodeId, Operation, Passes, Renderable, TypeInfo, TypeTag};

/// A forest of view nodes mirroring renderable graphs.
///
/// Every node wraps exactly one renderable, keeps a non-owning link to its
/// parent, and owns its children. Nodes are created by the tree's
/// [`ViewNodeFactory`] during build passes (or explicitly, for roots) and
/// destroyed when their parent's build no longer sees their renderable.
pub struct ViewTree<R, C> {
    slots: Vec<Option<Slot<R, C>>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    factory: Option<Rc<ViewNodeFactory<R, C>>>,
}

pub(crate) struct Slot<R, C> {
    generation: u32,
    pub(crate) renderable: R,
    info: TypeInfo,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: ViewNodeCollection<R>,
    // Renderables seen since the last `prepare_nodes`.
    prepared: Vec<R>,
    pub(crate) render_time: u64,
    // `None` only while one of this node's own hooks runs.
    node: Option<Box<dyn ViewNode<R, C>>>,
}

impl<R, C> core::fmt::Debug for ViewTree<R, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.slots.len();
        let alive = self.slots.iter().filter(|s| s.is_some()).count();
        f.debug_struct("ViewTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("factory", &self.factory)
            .finish_non_exhaustive()
    }
}

impl<R: 'static, C: 'static> Default for ViewTree<R, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: 'static, C: 'static> ViewTree<R, C> {
    /// Create an empty tree without a factory.
    ///
    /// Without a factory no node can be created during build passes;
    /// roots can still be inserted with [`ViewTree::insert_root`].
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            factory: None,
        }
    }

    /// Create an empty tree that builds nodes with `factory`.
    pub fn with_factory(factory: Rc<ViewNodeFactory<R, C>>) -> Self {
        Self {
            factory: Some(factory),
            ..Self::new()
        }
    }

    /// Replace the factory used for every node of this tree.
    pub fn set_factory(&mut self, factory: Option<Rc<ViewNodeFactory<R, C>>>) {
        self.factory = factory;
    }

    /// The factory used for every node of this tree.
    pub fn factory(&self) -> Option<&Rc<ViewNodeFactory<R, C>>> {
        self.factory.as_ref()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True if there are no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// See [`NodeId`] docs for the generational semantics.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.slot_opt(id).is_some()
    }

    /// Runtime type of the backend node at `id`.
    pub fn type_info(&self, id: NodeId) -> Option<TypeInfo> {
        self.slot_opt(id).map(|s| s.info)
    }

    /// Parent of `id`, `None` for roots and stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.slot_opt(id)?.parent
    }

    /// Render timestamp last recorded by `id`.
    pub fn render_time(&self, id: NodeId) -> Option<u64> {
        self.slot_opt(id).map(|s| s.render_time)
    }

    /// Backend node at `id`, if it is a `T`.
    ///
    /// Returns `None` for a node whose own hook is currently running.
    pub fn node<T: ViewNode<R, C>>(&self, id: NodeId) -> Option<&T> {
        let node: &dyn Any = self.slot_opt(id)?.node.as_deref()?;
        node.downcast_ref::<T>()
    }

    /// Mutable backend node at `id`, if it is a `T`.
    pub fn node_mut<T: ViewNode<R, C>>(&mut self, id: NodeId) -> Option<&mut T> {
        let node: &mut dyn Any = self.slot_opt_mut(id)?.node.as_deref_mut()?;
        node.downcast_mut::<T>()
    }

    /// Nearest ancestor of `id` whose type IS-A `tag`. The node itself is not considered.
    pub fn first_ancestor_of_type(&self, id: NodeId, tag: TypeTag) -> Option<NodeId> {
        let mut cur = self.parent_of(id);
        while let Some(p) = cur {
            let slot = self.slot_opt(p)?;
            if slot.info.is_a(tag) {
                return Some(p);
            }
            cur = slot.parent;
        }
        None
    }

    /// Nearest ancestor of `id` whose backend node is a `T`.
    pub fn first_ancestor<T: ViewNode<R, C>>(&self, id: NodeId) -> Option<(NodeId, &T)> {
        let mut cur = self.parent_of(id);
        while let Some(p) = cur {
            if let Some(found) = self.node::<T>(p) {
                return Some((p, found));
            }
            cur = self.parent_of(p);
        }
        None
    }

    /// First node, depth-first from `id` (inclusive), whose type IS-A `tag`.
    pub fn first_child_of_type(&self, id: NodeId, tag: TypeTag) -> Option<NodeId> {
        let slot = self.slot_opt(id)?;
        if slot.info.is_a(tag) {
            return Some(id);
        }
        let mut cursor = Cursor::new();
        while let Some(child) = slot.children.next_item(&mut cursor) {
            if let Some(found) = self.first_child_of_type(child, tag) {
                return Some(found);
            }
        }
        None
    }

    /// Remove `id` and its whole subtree.
    ///
    /// The node is unlinked from its parent's children and every backend node
    /// in the subtree is dropped.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.slot(id).parent
            && let Some(p) = self.slot_opt_mut(parent)
        {
            p.children.remove_item(id);
        }
        let children: Vec<NodeId> = self.slot(id).children.iter().collect();
        for child in children {
            self.remove(child);
        }
        self.slots[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Run `op` over the subtree at `id`.
    ///
    /// Each node gets a prepass apply, then its children are traversed in order,
    /// then it gets a postpass apply. The walk is depth-first and synchronous.
    pub fn traverse(&mut self, id: NodeId, op: Operation, backend: &mut C) {
        if !self.is_alive(id) {
            return;
        }
        self.apply(id, op, true, backend);
        for child in self.child_order(id, op, backend) {
            self.traverse(child, op, backend);
        }
        self.apply(id, op, false, backend);
    }

    /// Run each pass in `passes` over the whole subtree, in protocol order.
    ///
    /// A pass completes for every node before the next pass starts.
    pub fn traverse_passes(&mut self, id: NodeId, passes: Passes, backend: &mut C) {
        for op in passes.operations() {
            self.traverse(id, op, backend);
        }
    }

    /// Build, synchronize, then render the subtree at `id`.
    pub fn traverse_all_passes(&mut self, id: NodeId, backend: &mut C) {
        self.traverse_passes(id, Passes::ALL, backend);
    }

    /// Run the invalidate operation over the subtree at `id`.
    pub fn invalidate(&mut self, id: NodeId, backend: &mut C) {
        self.traverse(id, Operation::Invalidate, backend);
    }

    // --- internals ---

    pub(crate) fn slot(&self, id: NodeId) -> &Slot<R, C> {
        self.slot_opt(id).expect("dangling NodeId")
    }

    pub(crate) fn slot_mut(&mut self, id: NodeId) -> &mut Slot<R, C> {
        self.slot_opt_mut(id).expect("dangling NodeId")
    }

    fn slot_opt(&self, id: NodeId) -> Option<&Slot<R, C>> {
        let s = self.slots.get(id.idx())?.as_ref()?;
        (s.generation == id.1).then_some(s)
    }

    fn slot_opt_mut(&mut self, id: NodeId) -> Option<&mut Slot<R, C>> {
        let s = self.slots.get_mut(id.idx())?.as_mut()?;
        if s.generation != id.1 {
            return None;
        }
        Some(s)
    }

    /// Detach the backend node at `id`, hand it to `f`, then put it back.
    fn with_detached<T>(
        &mut self,
        id: NodeId,
        backend: &mut C,
        f: impl FnOnce(&mut dyn ViewNode<R, C>, &mut NodeCx<'_, R, C>) -> T,
    ) -> Option<T> {
        let mut node = self.slot_opt_mut(id)?.node.take()?;
        let out = {
            let mut cx = NodeCx {
                tree: self,
                id,
                backend,
            };
            f(node.as_mut(), &mut cx)
        };
        if let Some(slot) = self.slot_opt_mut(id) {
            slot.node = Some(node);
        }
        Some(out)
    }

    fn apply(&mut self, id: NodeId, op: Operation, prepass: bool, backend: &mut C) {
        self.with_detached(id, backend, |node, cx| {
            log::trace!(
                "apply {op:?} (prepass: {prepass}) to {}",
                node.type_info().tag()
            );
            node.apply(cx, op, prepass);
        });
    }

    fn child_order(&mut self, id: NodeId, op: Operation, backend: &mut C) -> Vec<NodeId> {
        let Some(slot) = self.slot_opt(id) else {
            return Vec::new();
        };
        let mut order: Vec<NodeId> = slot.children.iter().collect();
        self.with_detached(id, backend, |node, cx| {
            node.order_children(cx, op, &mut order);
        });
        order
    }

    fn alloc(&mut self, slot: impl FnOnce(u32) -> Slot<R, C>) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(slot(generation));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(slot(generation)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.slots.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }
}

impl<R: Renderable + 'static, C: 'static> ViewTree<R, C> {
    /// Add a root wrapping `renderable`, backed by an explicitly constructed node.
    pub fn insert_root(&mut self, renderable: R, node: Box<dyn ViewNode<R, C>>) -> NodeId {
        let resolved = node.type_info().tag();
        self.link(
            None,
            DetachedNode {
                renderable,
                resolved,
                node,
            },
        )
    }

    /// Add a root wrapping `renderable`, made by the tree's factory.
    pub fn create_root(&mut self, renderable: &R) -> Option<NodeId> {
        self.create_view_node(None, renderable)
    }

    /// Make a node for `renderable` with the tree's factory and link it under `parent`.
    ///
    /// Returns `None`, with a warning, if the tree has no factory or the
    /// renderable's type does not resolve to a maker.
    pub fn create_view_node(&mut self, parent: Option<NodeId>, renderable: &R) -> Option<NodeId> {
        if let Some(p) = parent
            && !self.is_alive(p)
        {
            return None;
        }
        let Some(factory) = self.factory.clone() else {
            log::warn!(
                "no view node factory; cannot create a node for `{}`",
                renderable.type_info().tag()
            );
            return None;
        };
        let made = factory.create_node(renderable)?;
        Some(self.link(parent, made))
    }

    /// The renderable wrapped by `id`.
    pub fn renderable(&self, id: NodeId) -> Option<&R> {
        self.slot_opt(id).map(|s| &s.renderable)
    }

    /// Replace the renderable wrapped by `id`.
    ///
    /// The backend node is kept; only the identity it mirrors changes.
    pub fn set_renderable(&mut self, id: NodeId, renderable: R) {
        let Some(slot) = self.slot_opt_mut(id) else {
            return;
        };
        slot.renderable = renderable.clone();
        if let Some(parent) = slot.parent
            && let Some(p) = self.slot_opt_mut(parent)
        {
            p.children.set_renderable(id, renderable);
        }
    }

    /// Children of `id`.
    pub fn children_of(&self, id: NodeId) -> Option<&ViewNodeCollection<R>> {
        self.slot_opt(id).map(|s| &s.children)
    }

    /// The node wrapping `renderable`: `id` itself or the first match depth-first below it.
    pub fn view_node_for(&self, id: NodeId, renderable: &R) -> Option<NodeId> {
        let slot = self.slot_opt(id)?;
        if slot.renderable.is_same(renderable) {
            return Some(id);
        }
        let mut cursor = Cursor::new();
        while let Some(child) = slot.children.next_item(&mut cursor) {
            if let Some(found) = self.view_node_for(child, renderable) {
                return Some(found);
            }
        }
        None
    }

    /// Forget which renderables `id` has seen; starts a reconciliation.
    pub fn prepare_nodes(&mut self, id: NodeId) {
        if let Some(slot) = self.slot_opt_mut(id) {
            slot.prepared.clear();
        }
    }

    /// Mark `renderable` as seen by `id` and create a child for it if none exists.
    pub fn add_missing_node(&mut self, id: NodeId, renderable: &R) {
        let Some(slot) = self.slot_opt_mut(id) else {
            return;
        };
        if !slot.prepared.iter().any(|r| r.is_same(renderable)) {
            slot.prepared.push(renderable.clone());
        }
        if slot.children.is_renderable_present(renderable) {
            return;
        }
        if let Some(child) = self.create_view_node(Some(id), renderable) {
            log::debug!(
                "created {} for {}",
                self.slot(child).info.tag(),
                renderable.type_info().tag()
            );
        }
    }

    /// [`add_missing_node`](Self::add_missing_node) for each item, in order.
    pub fn add_missing_nodes<'r, I>(&mut self, id: NodeId, renderables: I)
    where
        I: IntoIterator<Item = &'r R>,
        R: 'r,
    {
        for renderable in renderables {
            self.add_missing_node(id, renderable);
        }
    }

    /// Remove every child of `id` whose renderable was not seen since
    /// [`prepare_nodes`](Self::prepare_nodes), then forget the seen set.
    pub fn remove_unused_nodes(&mut self, id: NodeId) {
        // Rescan from the start after each removal; the collection shifts.
        loop {
            let Some(slot) = self.slot_opt(id) else {
                return;
            };
            let Some(stale) = slot.children.first_unseen(&slot.prepared) else {
                break;
            };
            log::debug!("removing stale {}", self.slot(stale).info.tag());
            self.remove(stale);
        }
        self.slot_mut(id).prepared.clear();
    }

    fn link(&mut self, parent: Option<NodeId>, made: DetachedNode<R, C>) -> NodeId {
        let DetachedNode {
            renderable, node, ..
        } = made;
        let info = node.type_info();
        let entry = renderable.clone();
        let id = self.alloc(move |generation| Slot {
            generation,
            renderable,
            info,
            parent,
            children: ViewNodeCollection::new(),
            prepared: Vec::new(),
            render_time: 0,
            node: Some(node),
        });
        if let Some(p) = parent {
            self.slot_mut(p).children.add_item(id, entry);
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Event, Events, Obj, Recorder, kinds, recording_factory};
    use alloc::vec;

    fn tree_for(events: &Events) -> ViewTree<Obj, Events> {
        ViewTree::with_factory(Rc::new(recording_factory(events)))
    }

    #[test]
    fn build_creates_one_node_per_sub_renderable() {
        let events = Events::default();
        let mut tree = tree_for(&events);
        let group = Obj::new(kinds::GROUP, "g");
        for name in ["a", "b", "c"] {
            group.add(Obj::new(kinds::ITEM, name));
        }
        let root = tree.create_root(&group).unwrap();
        tree.traverse(root, Operation::Build, &mut events.clone());
        assert_eq!(tree.len(), 4);
        let names: Vec<_> = tree
            .children_of(root)
            .unwrap()
            .entries()
            .map(|(_, r)| r.name())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
        for child in tree.children_of(root).unwrap().iter() {
            assert_eq!(tree.parent_of(child), Some(root));
        }
    }

    #[test]
    fn rebuild_is_idempotent() {
        let events = Events::default();
        let mut tree = tree_for(&events);
        let group = Obj::new(kinds::GROUP, "g");
        group.add(Obj::new(kinds::ITEM, "a"));
        group.add(Obj::new(kinds::ITEM, "b"));
        let root = tree.create_root(&group).unwrap();
        tree.traverse(root, Operation::Build, &mut events.clone());
        let first: Vec<NodeId> = tree.children_of(root).unwrap().iter().collect();
        tree.traverse(root, Operation::Build, &mut events.clone());
        let second: Vec<NodeId> = tree.children_of(root).unwrap().iter().collect();
        assert_eq!(first, second);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn rebuild_keeps_surviving_nodes_and_prunes_stale_ones() {
        let events = Events::default();
        let mut tree = tree_for(&events);
        let group = Obj::new(kinds::GROUP, "g");
        let a = Obj::new(kinds::ITEM, "a");
        let b = Obj::new(kinds::ITEM, "b");
        let c = Obj::new(kinds::ITEM, "c");
        let d = Obj::new(kinds::ITEM, "d");
        for o in [&a, &b, &c] {
            group.add(o.clone());
        }
        let root = tree.create_root(&group).unwrap();
        tree.traverse(root, Operation::Build, &mut events.clone());
        let node_a = tree.view_node_for(root, &a).unwrap();
        let node_b = tree.view_node_for(root, &b).unwrap();
        let node_c = tree.view_node_for(root, &c).unwrap();

        group.remove(&a);
        group.add(d.clone());
        tree.traverse(root, Operation::Build, &mut events.clone());

        assert!(!tree.is_alive(node_a), "node for A must be pruned");
        assert_eq!(tree.view_node_for(root, &a), None);
        assert_eq!(tree.view_node_for(root, &b), Some(node_b));
        assert_eq!(tree.view_node_for(root, &c), Some(node_c));
        let node_d = tree.view_node_for(root, &d).unwrap();
        let children: Vec<NodeId> = tree.children_of(root).unwrap().iter().collect();
        assert_eq!(children, [node_b, node_c, node_d]);
    }

    #[test]
    fn one_build_prunes_adjacent_and_trailing_stale_children() {
        let events = Events::default();
        let mut tree = tree_for(&events);
        let group = Obj::new(kinds::GROUP, "g");
        let items = ["a", "b", "c", "d", "e"].map(|name| Obj::new(kinds::ITEM, name));
        for o in &items {
            group.add(o.clone());
        }
        let root = tree.create_root(&group).unwrap();
        tree.traverse(root, Operation::Build, &mut events.clone());
        let nodes = items
            .clone()
            .map(|o| tree.view_node_for(root, &o).unwrap());

        for stale in [&items[0], &items[2], &items[4]] {
            group.remove(stale);
        }
        tree.traverse(root, Operation::Build, &mut events.clone());

        for (i, name) in [(0, "a"), (2, "c"), (4, "e")] {
            assert!(!tree.is_alive(nodes[i]), "node for {name} must be pruned");
        }
        let children: Vec<NodeId> = tree.children_of(root).unwrap().iter().collect();
        assert_eq!(
            children,
            [nodes[1], nodes[3]],
            "survivors keep their ids and order"
        );
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn pruning_drops_the_whole_subtree() {
        let events = Events::default();
        let mut tree = tree_for(&events);
        let group = Obj::new(kinds::GROUP, "g");
        let inner = Obj::new(kinds::GROUP, "inner");
        inner.add(Obj::new(kinds::ITEM, "x"));
        inner.add(Obj::new(kinds::ITEM, "y"));
        group.add(inner.clone());
        let root = tree.create_root(&group).unwrap();
        tree.traverse(root, Operation::Build, &mut events.clone());
        assert_eq!(tree.len(), 4);

        group.remove(&inner);
        tree.traverse(root, Operation::Build, &mut events.clone());
        assert_eq!(tree.len(), 1);
        assert!(tree.children_of(root).unwrap().is_empty());
    }

    #[test]
    fn unresolvable_sub_renderables_are_skipped() {
        let events = Events::default();
        let mut tree = tree_for(&events);
        let group = Obj::new(kinds::GROUP, "g");
        group.add(Obj::new(kinds::ITEM, "a"));
        group.add(Obj::new(kinds::UNKNOWN, "?"));
        group.add(Obj::new(kinds::ITEM, "b"));
        let root = tree.create_root(&group).unwrap();
        tree.traverse_all_passes(root, &mut events.clone());
        assert_eq!(tree.children_of(root).unwrap().len(), 2);
        assert!(
            events
                .take()
                .iter()
                .any(|e| *e == Event::Apply(Operation::Render, true, "b"))
        );
    }

    #[test]
    fn missing_factory_makes_creation_a_no_op() {
        let events = Events::default();
        let mut tree: ViewTree<Obj, Events> = ViewTree::new();
        let group = Obj::new(kinds::GROUP, "g");
        group.add(Obj::new(kinds::ITEM, "a"));
        assert_eq!(tree.create_root(&group), None);

        let root = tree.insert_root(group.clone(), Box::new(Recorder::new(kinds::GROUP_NODE)));
        tree.traverse_all_passes(root, &mut events.clone());
        assert_eq!(tree.len(), 1);
        // The root itself still traversed.
        assert!(
            events
                .take()
                .contains(&Event::Apply(Operation::Render, true, "g"))
        );
    }

    #[test]
    fn traverse_visits_prepass_children_postpass() {
        let events = Events::default();
        let mut tree = tree_for(&events);
        let n = Obj::new(kinds::GROUP, "n");
        let c1 = Obj::new(kinds::GROUP, "c1");
        c1.add(Obj::new(kinds::ITEM, "c1a"));
        n.add(c1);
        n.add(Obj::new(kinds::ITEM, "c2"));
        n.add(Obj::new(kinds::ITEM, "c3"));
        let root = tree.create_root(&n).unwrap();
        tree.traverse(root, Operation::Build, &mut events.clone());
        events.take();

        tree.traverse(root, Operation::Synchronize, &mut events.clone());
        let s = |prepass, name| Event::Apply(Operation::Synchronize, prepass, name);
        assert_eq!(
            events.take(),
            vec![
                s(true, "n"),
                s(true, "c1"),
                s(true, "c1a"),
                s(false, "c1a"),
                s(false, "c1"),
                s(true, "c2"),
                s(false, "c2"),
                s(true, "c3"),
                s(false, "c3"),
                s(false, "n"),
            ]
        );
    }

    #[test]
    fn all_passes_finish_before_the_next_starts() {
        let events = Events::default();
        let mut tree = tree_for(&events);
        let n = Obj::new(kinds::GROUP, "n");
        let inner = Obj::new(kinds::GROUP, "inner");
        inner.add(Obj::new(kinds::ITEM, "leaf"));
        n.add(inner);
        n.add(Obj::new(kinds::ITEM, "other"));
        let root = tree.create_root(&n).unwrap();
        tree.traverse_all_passes(root, &mut events.clone());

        let log = events.take();
        let phase_of = |e: &Event| match e {
            Event::Apply(op, ..) => Some(*op),
            Event::Make(_) => None,
        };
        let ops: Vec<Operation> = log.iter().filter_map(phase_of).collect();
        let last_build = ops.iter().rposition(|o| *o == Operation::Build).unwrap();
        let first_sync = ops.iter().position(|o| *o == Operation::Synchronize).unwrap();
        let last_sync = ops.iter().rposition(|o| *o == Operation::Synchronize).unwrap();
        let first_render = ops.iter().position(|o| *o == Operation::Render).unwrap();
        assert!(last_build < first_sync);
        assert!(last_sync < first_render);
        // 4 nodes, 2 calls per node per pass.
        assert_eq!(ops.len(), 4 * 2 * 3);
    }

    #[test]
    fn ancestor_lookup_returns_nearest_match() {
        let events = Events::default();
        let mut tree = tree_for(&events);
        let top = Obj::new(kinds::GROUP, "top");
        let mid = Obj::new(kinds::GROUP, "mid");
        let leaf = Obj::new(kinds::ITEM, "leaf");
        mid.add(leaf.clone());
        top.add(mid.clone());
        let root = tree.create_root(&top).unwrap();
        tree.traverse(root, Operation::Build, &mut events.clone());

        let leaf_node = tree.view_node_for(root, &leaf).unwrap();
        let mid_node = tree.view_node_for(root, &mid).unwrap();
        assert_eq!(
            tree.first_ancestor_of_type(leaf_node, kinds::GROUP_NODE),
            Some(mid_node)
        );
        assert_eq!(
            tree.first_ancestor_of_type(mid_node, kinds::GROUP_NODE),
            Some(root)
        );
        assert_eq!(tree.first_ancestor_of_type(root, kinds::GROUP_NODE), None);
        assert_eq!(tree.first_ancestor_of_type(leaf_node, kinds::ITEM_NODE), None);
        // Base tag matches through IS-A.
        assert_eq!(
            tree.first_ancestor_of_type(leaf_node, kinds::BASE_NODE),
            Some(mid_node)
        );
        let (found, _) = tree.first_ancestor::<Recorder>(leaf_node).unwrap();
        assert_eq!(found, mid_node);
    }

    #[test]
    fn first_child_of_type_searches_depth_first_including_self() {
        let events = Events::default();
        let mut tree = tree_for(&events);
        let top = Obj::new(kinds::GROUP, "top");
        let mid = Obj::new(kinds::GROUP, "mid");
        let leaf = Obj::new(kinds::ITEM, "leaf");
        mid.add(leaf.clone());
        top.add(mid);
        top.add(Obj::new(kinds::ITEM, "late"));
        let root = tree.create_root(&top).unwrap();
        tree.traverse(root, Operation::Build, &mut events.clone());

        assert_eq!(tree.first_child_of_type(root, kinds::GROUP_NODE), Some(root));
        assert_eq!(
            tree.first_child_of_type(root, kinds::ITEM_NODE),
            tree.view_node_for(root, &leaf),
            "depth-first must reach the nested leaf before the later sibling"
        );
        assert_eq!(tree.first_child_of_type(root, TypeTag::new("Nope")), None);
    }

    #[test]
    fn set_renderable_updates_parent_membership() {
        let events = Events::default();
        let mut tree = tree_for(&events);
        let group = Obj::new(kinds::GROUP, "g");
        let a = Obj::new(kinds::ITEM, "a");
        group.add(a.clone());
        let root = tree.create_root(&group).unwrap();
        tree.traverse(root, Operation::Build, &mut events.clone());
        let node = tree.view_node_for(root, &a).unwrap();

        let replacement = Obj::new(kinds::ITEM, "a2");
        tree.set_renderable(node, replacement.clone());
        assert!(tree.renderable(node).unwrap().is_same(&replacement));
        assert!(
            tree.children_of(root)
                .unwrap()
                .is_renderable_present(&replacement)
        );
        assert!(!tree.children_of(root).unwrap().is_renderable_present(&a));
    }

    #[test]
    fn stale_ids_are_not_reused_as_live() {
        let events = Events::default();
        let mut tree = tree_for(&events);
        let group = Obj::new(kinds::GROUP, "g");
        let a = Obj::new(kinds::ITEM, "a");
        group.add(a.clone());
        let root = tree.create_root(&group).unwrap();
        tree.traverse(root, Operation::Build, &mut events.clone());
        let old = tree.view_node_for(root, &a).unwrap();

        group.remove(&a);
        tree.traverse(root, Operation::Build, &mut events.clone());
        group.add(Obj::new(kinds::ITEM, "b"));
        tree.traverse(root, Operation::Build, &mut events.clone());

        let new = tree.children_of(root).unwrap().iter().next().unwrap();
        assert!(!tree.is_alive(old));
        assert!(tree.is_alive(new));
        assert_ne!(old, new);
        assert!(tree.renderable(old).is_none(), "stale id has no renderable");
    }

    #[test]
    fn downcast_access_to_backend_nodes() {
        let events = Events::default();
        let mut tree = tree_for(&events);
        let root = tree.create_root(&Obj::new(kinds::GROUP, "g")).unwrap();
        assert!(tree.node::<Recorder>(root).is_some());
        tree.node_mut::<Recorder>(root).unwrap().quiet = true;
        tree.traverse(root, Operation::Render, &mut events.clone());
        assert!(
            events
                .take()
                .iter()
                .all(|e| !matches!(e, Event::Apply(..))),
            "quiet recorder must not log"
        );
    }
}
