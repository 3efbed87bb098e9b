//! Analysis throughput over generated CFGs.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lumen_ir::{
    DomTreeBuilder, Function, IrBuilder, LinearOrderBuilder, LivenessBuilder, LoopTreeBuilder,
    Opcode, Type,
};

/// A ladder of `k` sequential loops: entry -> (header -> body -> header) x k -> exit.
fn loop_ladder(k: usize) -> Function {
    let mut func = Function::new("ladder", Type::None);
    let entry = func.create_block();
    let mut prev = entry;
    for _ in 0..k {
        let header = func.create_block();
        let body = func.create_block();
        func.link_blocks(prev, header);
        func.link_blocks(header, body);
        func.link_blocks(body, header);
        prev = header;
    }
    let exit = func.create_block();
    func.link_blocks(prev, exit);
    func
}

/// A straight-line accumulation of `n` adds ending in a return.
fn add_chain(n: usize) -> Function {
    let mut func = Function::new("chain", Type::I64);
    let bb = func.create_block();
    let mut b = IrBuilder::new(&mut func);
    b.set_insert_point_block(bb);
    let mut acc = b.iconst_i64(0);
    let one = b.iconst_i64(1);
    for _ in 0..n {
        acc = b.binop(Opcode::Add, acc, one);
    }
    b.ret(acc);
    func
}

fn bench_graph_analyses(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph");
    for k in [16usize, 128] {
        let func = loop_ladder(k);
        group.bench_with_input(BenchmarkId::new("domtree", k), &func, |b, f| {
            b.iter(|| DomTreeBuilder::build(f))
        });
        group.bench_with_input(BenchmarkId::new("loops", k), &func, |b, f| {
            b.iter(|| LoopTreeBuilder::build(f))
        });
        group.bench_with_input(BenchmarkId::new("linear_order", k), &func, |b, f| {
            let loop_tree = LoopTreeBuilder::build(f);
            b.iter(|| LinearOrderBuilder::build(f, &loop_tree))
        });
    }
    group.finish();
}

fn bench_liveness(c: &mut Criterion) {
    let mut group = c.benchmark_group("liveness");
    for n in [64usize, 1024] {
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter_batched(
                || add_chain(n),
                |mut f| LivenessBuilder::build(&mut f),
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_graph_analyses, bench_liveness);
criterion_main!(benches);
