use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ftree_core::FileTree;

/// Builds a tree with `breadth` files under each of `breadth` directories
/// nested `depth` levels deep, returning the tree and the total node count.
fn build_tree(depth: usize, breadth: usize) -> (FileTree, usize) {
    let mut tree = FileTree::new();
    tree.initialize().unwrap();

    fn recurse(tree: &mut FileTree, prefix: &str, depth: usize, breadth: usize) {
        if depth == 0 {
            return;
        }
        for i in 0..breadth {
            let dir = format!("{prefix}/dir_{i:03}");
            tree.insert_directory(&dir).unwrap();
            for j in 0..breadth {
                let file = format!("{dir}/file_{j:03}");
                tree.insert_file(&file, vec![0u8; 16]).unwrap();
            }
            recurse(tree, &dir, depth - 1, breadth);
        }
    }

    tree.insert_directory("root").unwrap();
    recurse(&mut tree, "root", depth, breadth);
    let count = tree.node_count();
    (tree, count)
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    for (depth, breadth) in &[(2, 4), (3, 4), (3, 6)] {
        let (_, count) = build_tree(*depth, *breadth);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{count} nodes")),
            &(*depth, *breadth),
            |b, &(depth, breadth)| {
                b.iter(|| black_box(build_tree(depth, breadth)))
            },
        );
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for (depth, breadth) in &[(2, 4), (3, 4), (3, 6)] {
        let (tree, count) = build_tree(*depth, *breadth);
        let target = "root/dir_000/dir_000/file_000";

        group.bench_with_input(BenchmarkId::from_parameter(format!("{count} nodes")), &tree, |b, tree| {
            b.iter(|| black_box(tree.contains_file(target) || tree.contains_dir(target)))
        });
    }
    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    group.sample_size(20);

    for (depth, breadth) in &[(2, 4), (3, 4), (3, 6)] {
        let (tree, count) = build_tree(*depth, *breadth);

        group.bench_with_input(BenchmarkId::from_parameter(format!("{count} nodes")), &tree, |b, tree| {
            b.iter(|| black_box(tree.serialize().unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup, bench_serialize);
criterion_main!(benches);
