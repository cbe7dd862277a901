//! Benchmarks for highlight extraction
//!
//! Run with: cargo bench --bench syntax

use parsehl::span::{SpanSet, TextSpan};
use parsehl::syntax::{delimiter, resolver, ParseOperation, Syntax};
use parsehl::text::TextSnapshot;

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

// ============================================================================
// Sample sources
// ============================================================================

const RUST_SAMPLE: &str = r#"
use std::collections::HashMap;

/// A simple key-value store
pub struct Store<K, V> {
    data: HashMap<K, V>,
    count: usize,
}

impl<K: std::hash::Hash + Eq, V> Store<K, V> {
    pub fn new() -> Self {
        Self { data: HashMap::new(), count: 0 }
    }

    /* bump the counter, then insert */
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.count += 1;
        self.data.insert(key, value)
    }
}

fn main() {
    let mut store = Store::new();
    store.insert("hello \"quoted\"", 42);
    println!("Found: {}", 'x'); // done
}
"#;

const PYTHON_SAMPLE: &str = r#"
import os

class Greeter:
    """Says hello."""

    def __init__(self, name):
        self.name = name  # who to greet

    def greet(self, times=3):
        for _ in range(times):
            print(f"Hello, {self.name}!")
        return None
"#;

fn generate_large_rust(lines: usize) -> String {
    let mut out = String::with_capacity(lines * 40);
    for i in 0..lines {
        match i % 4 {
            0 => out.push_str(&format!("fn func_{}(x: i32) -> i32 {{\n", i)),
            1 => out.push_str(&format!("    let s = \"value {}\"; // note\n", i)),
            2 => out.push_str(&format!("    x + {} /* inline */\n", i)),
            _ => out.push_str("}\n"),
        }
    }
    out
}

fn run(syntax: &Syntax, text: &str, workers: usize) {
    let snapshot = TextSnapshot::from(text);
    let span = snapshot.full_span();
    let outcome = ParseOperation::new(syntax.definition.clone(), snapshot, span)
        .unwrap()
        .with_worker_count(workers)
        .run()
        .unwrap();
    divan::black_box(outcome);
}

// ============================================================================
// Full runs
// ============================================================================

#[divan::bench(args = ["rust", "python"])]
fn parse_sample(lang: &str) {
    let syntax = Syntax::builtin(lang).unwrap();
    let text = match lang {
        "python" => PYTHON_SAMPLE,
        _ => RUST_SAMPLE,
    };
    run(&syntax, text, 4);
}

#[divan::bench(args = [100, 1000, 5000])]
fn parse_large_rust(bencher: divan::Bencher, lines: usize) {
    let syntax = Syntax::builtin("rust").unwrap();
    let text = generate_large_rust(lines);
    bencher.bench_local(|| run(&syntax, &text, 4));
}

#[divan::bench(args = [1, 2, 4, 8])]
fn parse_large_rust_workers(bencher: divan::Bencher, workers: usize) {
    let syntax = Syntax::builtin("rust").unwrap();
    let text = generate_large_rust(2000);
    bencher.bench_local(|| run(&syntax, &text, workers));
}

// ============================================================================
// Stages
// ============================================================================

#[divan::bench(args = [100, 1000, 5000])]
fn scan_and_resolve(bencher: divan::Bencher, lines: usize) {
    let syntax = Syntax::builtin("rust").unwrap();
    let snapshot = TextSnapshot::from(generate_large_rust(lines));
    let span = snapshot.full_span();
    bencher.bench_local(|| {
        let occurrences = delimiter::scan(&syntax.definition, &snapshot, span);
        divan::black_box(resolver::resolve(&occurrences, span).unwrap())
    });
}

#[divan::bench(args = [100, 1000])]
fn span_set_subtract(bencher: divan::Bencher, count: usize) {
    let a = SpanSet::from_spans((0..count).map(|i| TextSpan::new(i * 10, i * 10 + 6).unwrap()));
    let b = SpanSet::from_spans((0..count).map(|i| TextSpan::new(i * 10 + 3, i * 10 + 8).unwrap()));
    bencher.bench_local(|| divan::black_box(a.subtract(&b)));
}
