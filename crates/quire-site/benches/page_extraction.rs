//! Benchmarks for page-data extraction.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use std::fs;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use quire_markdown::{Processor, extract_description, parse, parse_toc};
use quire_route::{RouteConfig, RouteService};
use quire_site::{ExtractPageDataOptions, IdentityFlattener, extract_page_data, resolve_char_indices};

/// Generate markdown content with specified structure.
fn generate_markdown(headings: usize, paragraphs_per_section: usize) -> String {
    let mut md = String::with_capacity(headings * 50 + headings * paragraphs_per_section * 200);
    md.push_str("# Document Title\n\nIntro with a [link](/guide) and ![logo](logo.png).\n\n");

    for i in 0..headings {
        // Every fifth section repeats a heading to exercise id suffixes.
        if i % 5 == 0 {
            md.push_str("## Usage\n\n");
        } else {
            md.push_str(&format!("## Section {i}\n\n"));
        }
        for j in 0..paragraphs_per_section {
            md.push_str(&format!(
                "This is paragraph {j} in section {i}. It contains **bold** and *italic* text.\n\n"
            ));
        }
        md.push_str("```rust\nfn main() {}\n```\n\n");
    }
    md
}

fn bench_single_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_page");

    for (headings, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let markdown = generate_markdown(headings, paragraphs);
        group.throughput(Throughput::Bytes(markdown.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("parse_toc_describe_process", format!("{headings}h_{paragraphs}p")),
            &markdown,
            |b, md| {
                b.iter(|| {
                    let tree = parse(md);
                    let toc = parse_toc(&tree, 4);
                    let description = extract_description(&tree);
                    let content = Processor::shared(false).process(tree);
                    (resolve_char_indices(&toc.headers, &content), description)
                });
            },
        );
    }

    group.finish();
}

fn bench_extract_site(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    for i in 0..50 {
        let dir = temp_dir.path().join(format!("section{}", i % 5));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("page{i}.md")), generate_markdown(10, 2)).unwrap();
    }
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let options = ExtractPageDataOptions::new(temp_dir.path());

    c.bench_function("extract_page_data_50_pages", |b| {
        b.iter(|| {
            // Route slots are write-once, so each run needs a fresh table.
            let routes = RouteService::scan(RouteConfig::new(temp_dir.path())).unwrap();
            runtime
                .block_on(extract_page_data(&routes, &options, &IdentityFlattener))
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_single_page, bench_extract_site);
criterion_main!(benches);
