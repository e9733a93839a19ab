use criterion::{black_box, criterion_group, criterion_main, Criterion};
use p4_midend::ir::builder::*;
use p4_midend::ir::{Direction, Program, Statement};
use p4_midend::midend::{LocalCopyPropagation, MidendPass};
use std::rc::Rc;

/// A control with `actions` actions, each a chain of dependent temporaries
fn synthetic_program(actions: usize, chain: usize) -> Rc<Program> {
    let locals = (0..actions)
        .map(|a| {
            let mut body: Vec<Statement> = Vec::new();
            for i in 0..chain {
                let name = format!("t{}", i);
                let source = if i == 0 {
                    member(path("hdr"), "ttl")
                } else {
                    add(path(&format!("t{}", i - 1)), constant(1))
                };
                body.push(declare(&name, "bit<8>", None));
                body.push(if_else(
                    path("c"),
                    assign(path(&name), source.clone()),
                    Some(assign(path(&name), source)),
                ));
            }
            body.push(assign(
                member(path("hdr"), "ttl"),
                path(&format!("t{}", chain - 1)),
            ));
            action(&format!("a{}", a), vec![], block(body))
        })
        .collect();
    program(vec![control(
        "ingress",
        vec![param("hdr", Direction::InOut, "headers_t")],
        locals,
        block(vec![]),
    )])
}

fn copy_propagation_benchmark(c: &mut Criterion) {
    let program = synthetic_program(32, 16);
    c.bench_function("local_copy_propagation", |b| {
        b.iter(|| {
            let mut pass = LocalCopyPropagation::new();
            black_box(pass.run(black_box(&program)).unwrap());
        });
    });
}

criterion_group!(benches, copy_propagation_benchmark);
criterion_main!(benches);
