// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Performance baseline for template partitioning and coloring.
//!
//! Runs the highlighter over generated templates of increasing size and
//! reports partitioning, coloring and incremental update timings. Set
//! `RUST_LOG=ftl_highlight=debug` to see the scanner's spans.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::time::Instant;

use ftl_highlight::syntax::{
    TemplateHighlighter, default_worker_count, generate_template, run_baseline_test,
    tokenize_parallel,
};
use ftl_highlight::is_document_supported;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    println!("=== FreeMarker Template Highlighting Performance Baseline ===\n");

    let sizes = [5_000, 50_000, 500_000, 2_000_000];
    println!("Running baseline tests with {} generated templates...\n", sizes.len());

    let start_time = Instant::now();
    let measurement = run_baseline_test(&sizes);
    let total_time = start_time.elapsed();

    println!("Baseline test completed in {:.2}s\n", total_time.as_secs_f64());
    println!("{}", measurement.generate_report());

    let (meets_requirements, issues) = measurement.meets_requirements();
    if meets_requirements {
        println!("✅ All performance requirements met!");
    } else {
        println!("⚠️  Performance issues detected:");
        for issue in &issues {
            println!("  - {issue}");
        }
    }

    println!("\n=== Applicability ===");
    test_applicability();

    println!("\n=== Parallel Coloring ===");
    test_parallel_coloring();

    println!("\n=== Performance Baseline Complete ===");
}

fn test_applicability() {
    let cases = [
        (Some("page.html.ftl"), "Dear ${name},"),
        (Some("mail.ftl"), "Dear ${name},"),
        (Some("mail.ftl"), "<#-- ContentType: text/html -->\n<p>${name}</p>"),
        (None, "<#--\n  ContentType = application/xml\n-->\n<a/>"),
        (None, "<#-- ContentType: text/plain -->"),
    ];

    for (file_name, content) in cases {
        let supported = is_document_supported(file_name, Cursor::new(content));
        let first_line = content.lines().next().unwrap_or_default();
        println!("  {:<16} {:<40} -> {supported}", file_name.unwrap_or("<unnamed>"), first_line);
    }
}

fn test_parallel_coloring() {
    let highlighter = TemplateHighlighter::default();
    let registry = highlighter.registry();
    let doc = generate_template(1_000_000);
    let partitions = highlighter.partition(&doc);

    let mut by_kind: BTreeMap<&'static str, usize> = BTreeMap::new();
    for partition in &partitions {
        *by_kind.entry(partition.kind.content_type()).or_default() += 1;
    }
    println!("  {} bytes -> {} partitions", doc.len(), partitions.len());
    for (content_type, count) in &by_kind {
        println!("    {content_type:<28} {count}");
    }

    let start = Instant::now();
    let sequential = tokenize_parallel(registry, &doc, &partitions, 1);
    let sequential_time = start.elapsed();

    let workers = default_worker_count();
    let start = Instant::now();
    let parallel = tokenize_parallel(registry, &doc, &partitions, workers);
    let parallel_time = start.elapsed();

    let tokens: usize = parallel.iter().map(Vec::len).sum();
    println!("  1 worker:   {:.2}ms", sequential_time.as_secs_f64() * 1000.0);
    println!(
        "  {workers} workers: {:.2}ms ({tokens} tokens, identical: {})",
        parallel_time.as_secs_f64() * 1000.0,
        sequential == parallel
    );

    let template = partitions.iter().filter(|p| p.kind.is_template()).count();
    println!("  template partitions: {template} of {}", partitions.len());
}
