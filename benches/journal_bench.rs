//! Performance benchmarks for body reflow and journal scans.
//!
//! Run with: cargo bench
//!
//! These benchmarks establish baseline performance metrics for:
//! - Reflowing entry bodies of various sizes
//! - Collecting entries from journals of various sizes, with and without text search

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use j::journal_core::reflow::format_body;
use j::journal_core::FilterSettings;
use j::journal_io::Journal;
use std::fs;
use tempfile::TempDir;

const PARAGRAPH: &str = "The quick brown fox jumps over the lazy dog while the journal \
keeps on growing line after line without any particular structure at all.\n";

fn sample_body(paragraphs: usize) -> String {
    let mut body = String::new();
    for i in 0..paragraphs {
        body.push_str(PARAGRAPH);
        if i % 4 == 1 {
            body.push_str("- a list item\n- another one\n");
        }
        if i % 8 == 3 {
            body.push_str("```\nlet x = 1;\n```\n");
        }
        body.push('\n');
    }
    body
}

/// Benchmark reflow throughput with various body sizes.
fn bench_format_body(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_body");

    for (name, paragraphs) in [("small", 4), ("medium", 64), ("large", 1024)] {
        let body = sample_body(paragraphs);

        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &body, |b, body| {
            b.iter(|| black_box(format_body(black_box(body), 78)));
        });
    }

    group.finish();
}

fn populated_journal(entries: usize) -> (TempDir, Journal) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let body = sample_body(8);
    for i in 0..entries {
        let name = format!("2024{:02}{:02}_120000-{:08x}.txt", i % 12 + 1, i % 28 + 1, i);
        let tag = if i % 3 == 0 { "@work" } else { "@home" };
        fs::write(
            temp_dir.path().join(name),
            format!("Entry {}\n{}\n\n{}", i, tag, body),
        )
        .expect("failed to write entry");
    }
    let journal = Journal::open(temp_dir.path()).expect("failed to open journal");
    (temp_dir, journal)
}

/// Benchmark full scans at various journal sizes.
fn bench_collect(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect");
    group.sample_size(20);

    for size in [100, 1000] {
        let (_dir, journal) = populated_journal(size);
        let by_tag = FilterSettings::new().with_tags(["work"]);
        let by_text = FilterSettings::new().with_text(["lazy dog"]);

        group.bench_with_input(BenchmarkId::new("tags", size), &by_tag, |b, settings| {
            b.iter(|| black_box(journal.collect(settings, true).expect("collect failed")));
        });
        group.bench_with_input(BenchmarkId::new("text", size), &by_text, |b, settings| {
            b.iter(|| black_box(journal.collect(settings, false).expect("collect failed")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_format_body, bench_collect);
criterion_main!(benches);
