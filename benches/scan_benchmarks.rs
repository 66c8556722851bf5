//! Benchmarks for comment location and document scanning.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tagscan_core::{Document, DocumentId, Scanner, TagConfig};
use tagscan_syntax::{CommentLocator, CommentSyntaxTable};

/// Generates JavaScript with a comment every few lines and a tag every tenth.
fn generate_source(lines: usize) -> String {
    (0..lines)
        .map(|i| match i % 10 {
            0 => format!("    // TODO: item number {}\n", i),
            3 => "    /* block comment\n".to_string(),
            4 => "       still inside */ let y = 2;\n".to_string(),
            7 => format!("    let z = {}; // plain comment\n", i),
            _ => format!("    let value_{} = compute({}, \"text\");\n", i, i),
        })
        .collect()
}

fn bench_locator(c: &mut Criterion) {
    let table = CommentSyntaxTable::new();
    let syntax = table.get("javascript").expect("javascript is built in");
    let source = generate_source(10_000);
    let lines: Vec<&str> = source.lines().collect();

    c.bench_function("locate_10000_lines", |b| {
        b.iter(|| {
            let mut locator = CommentLocator::new(syntax);
            let mut count = 0;
            for line in &lines {
                if locator.next_line(black_box(line)).is_some() {
                    count += 1;
                }
            }
            black_box(count)
        })
    });
}

fn bench_scan_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_document");

    for size in [100, 1000, 10000].iter() {
        let doc = Document::from_text(
            DocumentId::new(format!("bench_{size}.js")),
            "javascript",
            &generate_source(*size),
        );

        group.bench_with_input(BenchmarkId::new("default_tags", size), &doc, |b, doc| {
            let mut scanner = Scanner::new();
            b.iter(|| black_box(scanner.scan_document(black_box(doc))))
        });
    }

    group.finish();
}

fn bench_many_tags(c: &mut Criterion) {
    let doc = Document::from_text(DocumentId::new("many.js"), "javascript", &generate_source(1000));
    let tags: Vec<TagConfig> = (0..20)
        .map(|i| TagConfig::new(format!("TAG{i}")))
        .chain(TagConfig::defaults())
        .collect();

    c.bench_function("scan_with_23_tags", |b| {
        let mut scanner = Scanner::new();
        scanner.configure(&tags).expect("tags are valid");
        b.iter(|| black_box(scanner.scan_document(&doc)))
    });
}

criterion_group!(benches, bench_locator, bench_scan_document, bench_many_tags);
criterion_main!(benches);
