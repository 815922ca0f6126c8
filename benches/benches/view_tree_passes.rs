// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Rect;
use understory_view_node::{NodeId, Operation, ViewNodeFactory, ViewTree};
use understory_view_scene::SceneObject;
use understory_view_scene::export::{SceneSerializer, register_export_nodes};
use understory_view_scene::model::{Actor, Light, Mapper, MapperKind, Renderer, Window};
use understory_view_scene::paint::{DrawList, register_paint_nodes};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

const KINDS: [MapperKind; 3] = [
    MapperKind::PolyData,
    MapperKind::CompositePolyData,
    MapperKind::Glyph,
];

fn gen_actor(i: usize) -> Actor {
    let x0 = (i % 64) as f64 * 12.0;
    let y0 = (i / 64) as f64 * 12.0;
    let actor = Actor::new(Rect::new(x0, y0, x0 + 10.0, y0 + 10.0));
    actor.set_mapper(Some(&Mapper::new(KINDS[i % KINDS.len()])));
    actor
}

/// One window, `renderers` renderers, `actors` actors each and two lights each.
fn gen_scene(renderers: usize, actors: usize) -> (Window, Vec<Renderer>) {
    let window = Window::new();
    let mut all = Vec::with_capacity(renderers);
    for _ in 0..renderers {
        let renderer = Renderer::new();
        renderer.add_light(&Light::new());
        renderer.add_light(&Light::new());
        for i in 0..actors {
            renderer.add_actor(&gen_actor(i));
        }
        window.add_renderer(&renderer);
        all.push(renderer);
    }
    (window, all)
}

fn paint_tree(window: &Window) -> (ViewTree<SceneObject, DrawList>, NodeId) {
    let mut factory = ViewNodeFactory::new();
    register_paint_nodes(&mut factory);
    let mut tree = ViewTree::with_factory(Rc::new(factory));
    let root = tree.create_root(&window.into()).unwrap();
    (tree, root)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[64usize, 256, 1024] {
        let (window, _) = gen_scene(4, n);
        group.throughput(Throughput::Elements((4 * n) as u64));
        group.bench_function(format!("first_build_n{}", n), |b| {
            b.iter_batched(
                || paint_tree(&window),
                |(mut tree, root)| {
                    tree.traverse(root, Operation::Build, &mut DrawList::new());
                    black_box(tree.len());
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("rebuild_unchanged_n{}", n), |b| {
            let (mut tree, root) = paint_tree(&window);
            let mut list = DrawList::new();
            tree.traverse(root, Operation::Build, &mut list);
            b.iter(|| {
                tree.traverse(root, Operation::Build, &mut list);
                black_box(tree.len());
            })
        });
    }
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    for &n in &[256usize, 1024] {
        let (window, renderers) = gen_scene(1, n);
        let renderer = renderers[0].clone();
        // Replace a tenth of the actors per frame.
        let churn = n / 10;
        group.throughput(Throughput::Elements(churn as u64));
        group.bench_function(format!("replace_actors_n{}", n), |b| {
            let (mut tree, root) = paint_tree(&window);
            let mut list = DrawList::new();
            let mut rng = Rng::new(0xBADC_F00D_1234_5678);
            tree.traverse(root, Operation::Build, &mut list);
            b.iter(|| {
                let actors = renderer.actors();
                for _ in 0..churn {
                    let old = &actors[rng.below(actors.len())];
                    if renderer.remove_actor(old) {
                        renderer.add_actor(&gen_actor(rng.below(n)));
                    }
                }
                tree.traverse(root, Operation::Build, &mut list);
                black_box(tree.len());
            })
        });
    }
    group.finish();
}

fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("frames");
    let n = 512;
    let (window, renderers) = gen_scene(2, n);
    group.throughput(Throughput::Elements((2 * n) as u64));

    group.bench_function("paint_cached", |b| {
        let (mut tree, root) = paint_tree(&window);
        let mut list = DrawList::new();
        tree.traverse_all_passes(root, &mut list);
        b.iter(|| {
            tree.traverse_all_passes(root, &mut list);
            black_box(list.len());
        })
    });

    group.bench_function("paint_invalidated", |b| {
        let (mut tree, root) = paint_tree(&window);
        let mut list = DrawList::new();
        b.iter(|| {
            tree.invalidate(root, &mut list);
            tree.traverse_all_passes(root, &mut list);
            black_box(list.len());
        })
    });

    group.bench_function("paint_one_actor_moved", |b| {
        let (mut tree, root) = paint_tree(&window);
        let mut list = DrawList::new();
        let actor = renderers[0].actors()[0].clone();
        let mut x = 0.0;
        b.iter(|| {
            x += 1.0;
            actor.set_bounds(Rect::new(x, 0.0, x + 10.0, 10.0));
            tree.traverse_all_passes(root, &mut list);
            black_box(list.len());
        })
    });

    group.bench_function("export", |b| {
        let mut factory = ViewNodeFactory::new();
        register_export_nodes(&mut factory);
        let mut tree = ViewTree::with_factory(Rc::new(factory));
        let root = tree.create_root(&(&window).into()).unwrap();
        let mut out = SceneSerializer::new();
        b.iter(|| {
            tree.traverse_all_passes(root, &mut out);
            black_box(out.root().is_null());
        })
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_churn, bench_frames);
criterion_main!(benches);
