use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mcfg_chart::Grammar;

fn grammar() -> Grammar {
  include_str!("../grammars/calibration.mcfg")
    .parse()
    .expect("calibration grammar must load")
}

fn bench_simple_declarative(c: &mut Criterion) {
  let grammar = grammar();
  let tokens = ["the", "human", "saw", "the", "greyhound"];
  c.bench_function("parse simple declarative", |b| {
    b.iter(|| grammar.parse(black_box(&tokens)))
  });
}

fn bench_nested_relative_clauses(c: &mut Criterion) {
  let grammar = grammar();
  let tokens = [
    "the", "human", "that", "believes", "the", "salmon", "that", "believes", "a", "human", "saw", "the", "greyhound",
  ];
  c.bench_function("parse nested relative clauses", |b| {
    b.iter(|| grammar.parse(black_box(&tokens)))
  });
}

criterion_group!(benches, bench_simple_declarative, bench_nested_relative_clauses);
criterion_main!(benches);
