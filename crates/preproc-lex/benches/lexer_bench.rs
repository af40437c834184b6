//! Lexer benchmarks.
//!
//! Run with: `cargo bench --package preproc-lex`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use preproc_lex::lex;

fn token_count(source: &str) -> usize {
    lex(source).len()
}

fn bench_lexer_directives(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_directives");

    let source = "#define MAX(a, b) ((a) > (b) ? (a) : (b))\n#ifdef DEBUG\n#undef MAX\n#endif\n";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("define_and_conditional", |b| {
        b.iter(|| token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_macro_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_macro_heavy");

    let source = r#"
        #define WIDTH 80
        #define HEIGHT 24
        #define AREA(w, h) ((w) * (h))
        #define CLAMP(x, lo, hi) ((x) < (lo) ? (lo) : ((x) > (hi) ? (hi) : (x)))

        int screen = AREA(WIDTH, HEIGHT);
        int safe = CLAMP(screen, 0, 65535);
    "#;
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("nested_macro_calls", |b| {
        b.iter(|| token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_strings");

    group.bench_function("short_string", |b| {
        b.iter(|| token_count(black_box("char *s = \"hello\";")))
    });

    group.bench_function("long_string", |b| {
        let source = "char *s = \"This is a longer string literal used for benchmarking the lexer's string-scanning path.\";";
        b.iter(|| token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_numbers(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_numbers");

    group.bench_function("decimal", |b| {
        b.iter(|| token_count(black_box("int x = 123456;")))
    });

    group.bench_function("hex", |b| {
        b.iter(|| token_count(black_box("int x = 0xDEADBEEF;")))
    });

    group.finish();
}

fn bench_lexer_comments(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_comments");

    let source = r#"
        /* this is a block comment
           spanning several lines
           before the code resumes */
        int x = 1; // trailing line comment
        int y = 2; /* inline */ int z = 3;
    "#;
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("mixed_comments", |b| {
        b.iter(|| token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_identifiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_identifiers");

    group.bench_function("short_ident", |b| {
        b.iter(|| token_count(black_box("int x = 1;")))
    });

    group.bench_function("long_ident", |b| {
        b.iter(|| token_count(black_box("int very_long_preprocessor_symbol_name = 1;")))
    });

    group.bench_function("many_ident", |b| {
        b.iter(|| {
            token_count(black_box(
                "int a = 1; int b = 2; int c = 3; int d = 4; int e = 5;",
            ))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lexer_directives,
    bench_lexer_macro_heavy,
    bench_lexer_strings,
    bench_lexer_numbers,
    bench_lexer_comments,
    bench_lexer_identifiers
);
criterion_main!(benches);
