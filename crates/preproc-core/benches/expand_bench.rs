//! Macro table and expansion benchmarks.
//!
//! Run with: `cargo bench --package preproc-core`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use preproc_core::{DefineEntry, DefineTable};
use preproc_lex::{Token, TokenKind, TokenStream};
use preproc_util::Handler;
use rustc_hash::FxHashMap;

fn tok(kind: TokenKind, text: &str) -> Token {
    Token::new(kind, text)
}

fn populated_table(n: usize) -> DefineTable {
    let mut table = DefineTable::new();
    for i in 0..n {
        table.define(
            format!("SYM_{i}"),
            DefineEntry::object_like(vec![tok(TokenKind::Number, &i.to_string())]),
        );
    }
    table
}

fn bench_define_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("define_lookup");
    group.throughput(Throughput::Elements(1));

    let table = populated_table(1000);

    group.bench_function("hit", |b| {
        b.iter(|| black_box(table.is_defined(black_box("SYM_500"))))
    });

    group.bench_function("miss", |b| {
        b.iter(|| black_box(table.is_defined(black_box("NOT_A_MACRO"))))
    });

    group.finish();
}

fn bench_define_table_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("define_table_populate");

    for &size in &[10usize, 100, 1000, 10_000] {
        group.bench_with_input(BenchmarkId::new("define_n", size), &size, |b, &n| {
            b.iter(|| black_box(populated_table(n)))
        });
    }

    group.finish();
}

fn bench_object_like_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand_object_like");

    let mut table = DefineTable::new();
    table.define("WIDTH", DefineEntry::object_like(vec![tok(TokenKind::Number, "80")]));

    group.bench_function("single_macro_reference", |b| {
        b.iter(|| {
            let mut stream = TokenStream::from_vec(vec![tok(TokenKind::Identifier, "WIDTH")]);
            let mut buf = Vec::new();
            let mut diags = Handler::new(&mut buf);
            preproc_core::expand::expand_all(&mut stream, &table, &mut diags, "bench.c", 1);
            black_box(stream)
        })
    });

    group.finish();
}

fn bench_function_like_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand_function_like");

    let mut table = DefineTable::new();
    let mut params = FxHashMap::default();
    params.insert("a".to_string(), 0);
    params.insert("b".to_string(), 1);
    table.define(
        "MAX",
        DefineEntry::function_like(
            params,
            vec![
                tok(TokenKind::Open, "("),
                tok(TokenKind::Identifier, "a"),
                tok(TokenKind::Identifier, "a"),
                tok(TokenKind::Identifier, "b"),
                tok(TokenKind::Close, ")"),
            ],
        ),
    );

    group.bench_function("two_argument_call", |b| {
        b.iter(|| {
            let mut stream = TokenStream::from_vec(vec![
                tok(TokenKind::Identifier, "MAX"),
                tok(TokenKind::Open, "("),
                tok(TokenKind::Number, "1"),
                tok(TokenKind::Comma, ","),
                tok(TokenKind::Number, "2"),
                tok(TokenKind::Close, ")"),
            ]);
            let mut buf = Vec::new();
            let mut diags = Handler::new(&mut buf);
            preproc_core::expand::expand_all(&mut stream, &table, &mut diags, "bench.c", 1);
            black_box(stream)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_define_lookup,
    bench_define_table_sizes,
    bench_object_like_expansion,
    bench_function_like_expansion
);
criterion_main!(benches);
