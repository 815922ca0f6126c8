// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View node basics.
//!
//! Mirror a tiny object graph with a custom backend, then change the graph and
//! watch the build pass create and prune nodes.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_view_demos --example view_node_basics`

use std::cell::RefCell;
use std::rc::Rc;

use understory_view_node::{
    NodeCx, Operation, Renderable, TypeInfo, TypeTag, ViewNode, ViewNodeFactory, ViewTree,
};

const FOLDER: TypeTag = TypeTag::new("Folder");
const NOTE: TypeTag = TypeTag::new("Note");
const PINNED_NOTE: TypeInfo = TypeInfo::with_bases(TypeTag::new("PinnedNote"), &[&[NOTE]]);

struct Item {
    info: TypeInfo,
    name: String,
    items: RefCell<Vec<Obj>>,
}

#[derive(Clone)]
struct Obj(Rc<Item>);

impl Obj {
    fn new(info: TypeInfo, name: &str) -> Self {
        Self(Rc::new(Item {
            info,
            name: name.to_owned(),
            items: RefCell::new(Vec::new()),
        }))
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

/// Prints an outline; indentation comes from the depth of the enclosing folder node.
struct Outline {
    info: TypeInfo,
    depth: usize,
}

impl ViewNode<Obj, Vec<String>> for Outline {
    fn type_info(&self) -> TypeInfo {
        self.info
    }

    fn build(&mut self, cx: &mut NodeCx<'_, Obj, Vec<String>>, prepass: bool) {
        if prepass {
            let items = cx.renderable().0.items.borrow().clone();
            cx.reconcile(&items);
        }
    }

    fn synchronize(&mut self, cx: &mut NodeCx<'_, Obj, Vec<String>>, prepass: bool) {
        if prepass {
            self.depth = cx
                .first_ancestor::<Self>()
                .map_or(0, |(_, parent)| parent.depth + 1);
        }
    }

    fn render(&mut self, cx: &mut NodeCx<'_, Obj, Vec<String>>, prepass: bool) {
        if prepass {
            let indent = "  ".repeat(self.depth);
            let line = format!("{indent}{} ({})", cx.renderable().0.name, self.info.tag());
            cx.backend().push(line);
        }
    }
}

fn main() {
    env_logger::init();

    let mut factory = ViewNodeFactory::<Obj, Vec<String>>::new();
    for tag in [FOLDER, NOTE] {
        factory.register_override(tag, move || -> Box<dyn ViewNode<Obj, Vec<String>>> {
            Box::new(Outline {
                info: TypeInfo::new(tag),
                depth: 0,
            })
        });
    }
    let mut tree = ViewTree::with_factory(Rc::new(factory));

    let root_folder = Obj::new(TypeInfo::new(FOLDER), "inbox");
    let todo = Obj::new(TypeInfo::new(NOTE), "todo");
    let archive = Obj::new(TypeInfo::new(FOLDER), "archive");
    archive.0.items.borrow_mut().push(Obj::new(TypeInfo::new(NOTE), "old"));
    root_folder.0.items.borrow_mut().extend([todo.clone(), archive.clone()]);
    // No maker for PinnedNote: it falls back to Note.
    root_folder
        .0
        .items
        .borrow_mut()
        .push(Obj::new(PINNED_NOTE, "pinned"));

    let root = tree.create_root(&root_folder).unwrap();
    let mut lines = Vec::new();
    tree.traverse_all_passes(root, &mut lines);
    println!("frame 1 ({} nodes):", tree.len());
    for l in &lines {
        println!("{l}");
    }

    // Drop the archive folder; its node and its note's node are pruned.
    root_folder
        .0
        .items
        .borrow_mut()
        .retain(|o| !o.is_same(&archive));
    lines.clear();
    tree.traverse_all_passes(root, &mut lines);
    println!("frame 2 ({} nodes):", tree.len());
    for l in &lines {
        println!("{l}");
    }
    assert!(tree.view_node_for(root, &archive).is_none());
    assert!(tree.view_node_for(root, &todo).is_some());

    // Skip the render pass entirely for a cheap re-sync.
    tree.traverse(root, Operation::Synchronize, &mut lines);
}
