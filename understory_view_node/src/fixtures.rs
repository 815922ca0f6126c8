// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test object model: shared groups and items, plus a node that records every hook call.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::{NodeCx, Operation, Renderable, TypeInfo, TypeTag, ViewNode, ViewNodeFactory};

pub(crate) mod kinds {
    use crate::{TypeInfo, TypeTag};

    pub(crate) const GROUP: TypeInfo = TypeInfo::new(TypeTag::new("Group"));
    pub(crate) const ITEM: TypeInfo = TypeInfo::new(TypeTag::new("Item"));
    pub(crate) const UNKNOWN: TypeInfo = TypeInfo::new(TypeTag::new("Unknown"));

    pub(crate) const BASE_NODE: TypeTag = TypeTag::new("RecorderNode");
    pub(crate) const GROUP_NODE: TypeTag = TypeTag::new("GroupNode");
    pub(crate) const ITEM_NODE: TypeTag = TypeTag::new("ItemNode");

    pub(crate) const NODE_BASES: &[&[TypeTag]] = &[&[BASE_NODE]];
}

#[derive(Debug)]
struct ObjInner {
    info: TypeInfo,
    name: &'static str,
    members: RefCell<Vec<Obj>>,
}

/// Shared handle to a test scene object.
#[derive(Clone, Debug)]
pub(crate) struct Obj(Rc<ObjInner>);

impl Obj {
    pub(crate) fn new(info: TypeInfo, name: &'static str) -> Self {
        Self(Rc::new(ObjInner {
            info,
            name,
            members: RefCell::new(Vec::new()),
        }))
    }

    pub(crate) fn name(&self) -> &'static str {
        self.0.name
    }

    pub(crate) fn add(&self, member: Self) {
        self.0.members.borrow_mut().push(member);
    }

    pub(crate) fn remove(&self, member: &Self) {
        self.0.members.borrow_mut().retain(|m| !m.is_same(member));
    }

    pub(crate) fn members(&self) -> Vec<Self> {
        self.0.members.borrow().clone()
    }
}

impl Renderable for Obj {
    fn type_info(&self) -> TypeInfo {
        self.0.info
    }

    fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Event {
    /// A maker ran for this node tag.
    Make(&'static str),
    /// A hook ran on the node wrapping the named object.
    Apply(Operation, bool, &'static str),
}

/// Shared event log, used as the backend context.
#[derive(Clone, Debug, Default)]
pub(crate) struct Events(Rc<RefCell<Vec<Event>>>);

impl Events {
    pub(crate) fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub(crate) fn take(&self) -> Vec<Event> {
        core::mem::take(&mut *self.0.borrow_mut())
    }
}

/// Records every hook call and reconciles its object's members on build.
#[derive(Debug)]
pub(crate) struct Recorder {
    tag: TypeTag,
    pub(crate) quiet: bool,
}

impl Recorder {
    pub(crate) fn new(tag: TypeTag) -> Self {
        Self { tag, quiet: false }
    }
}

impl ViewNode<Obj, Events> for Recorder {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::with_bases(self.tag, kinds::NODE_BASES)
    }

    fn apply(&mut self, cx: &mut NodeCx<'_, Obj, Events>, op: Operation, prepass: bool) {
        if !self.quiet {
            let name = cx.renderable().name();
            cx.backend().push(Event::Apply(op, prepass, name));
        }
        if op == Operation::Build && prepass {
            let members = cx.renderable().members();
            cx.reconcile(&members);
        }
    }
}

/// Groups get group nodes, items get item nodes; `UNKNOWN` is left unregistered.
pub(crate) fn recording_factory(events: &Events) -> ViewNodeFactory<Obj, Events> {
    let mut factory = ViewNodeFactory::new();
    for (kind, node) in [
        (kinds::GROUP, kinds::GROUP_NODE),
        (kinds::ITEM, kinds::ITEM_NODE),
    ] {
        let events = events.clone();
        factory.register_override(kind.tag(), move || -> Box<dyn ViewNode<Obj, Events>> {
            events.push(Event::Make(node.name()));
            Box::new(Recorder::new(node))
        });
    }
    factory
}
