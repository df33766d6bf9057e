// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Performance monitoring and baseline measurement for template highlighting.
//!
//! Measures partitioning, coloring and incremental re-partitioning time per
//! document size category, and checks the measurements against the response
//! time requirements of an interactive editor.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::{Duration, Instant};

use crate::buffer::{DocumentPartitioning, TextChangeNotification};
use crate::syntax::highlighter::{HighlightingState, TemplateHighlighter};

/// Performance baseline measurements.
#[derive(Debug, Clone, Default)]
pub struct PerformanceBaseline {
    pub partitioning: PassMetrics,
    pub coloring: PassMetrics,
    pub incremental: IncrementalMetrics,
    /// Cache hit ratio of repeated coloring passes
    pub cache_hit_ratio: Option<f64>,
}

/// Timings of one full pass over documents.
#[derive(Debug, Clone, Default)]
pub struct PassMetrics {
    /// Pass durations by document size category
    pub times_by_size: HashMap<DocumentSizeCategory, Vec<Duration>>,
    /// Average pass duration per document size category
    pub avg_times: HashMap<DocumentSizeCategory, Duration>,
    /// Partitions or tokens produced
    pub items_produced: usize,
    /// Bytes processed
    pub bytes_processed: usize,
    pub total_time: Duration,
}

impl PassMetrics {
    fn record(&mut self, doc_bytes: usize, duration: Duration, items: usize) {
        let category = DocumentSizeCategory::from_bytes(doc_bytes as u64);
        let times = self.times_by_size.entry(category).or_default();
        times.push(duration);
        self.avg_times.insert(category, average(times));

        self.items_produced += items;
        self.bytes_processed += doc_bytes;
        self.total_time += duration;
    }

    /// Throughput in megabytes per second.
    pub fn throughput_mb_per_sec(&self) -> f64 {
        let secs = self.total_time.as_secs_f64();
        if secs > 0.0 {
            self.bytes_processed as f64 / secs / 1_000_000.0
        } else {
            0.0
        }
    }
}

/// Timings of incremental re-partitioning.
#[derive(Debug, Clone, Default)]
pub struct IncrementalMetrics {
    pub edits: usize,
    pub total_time: Duration,
    pub max_time: Duration,
    /// Bytes re-scanned across all edits
    pub damaged_bytes: usize,
}

impl IncrementalMetrics {
    pub fn avg_time(&self) -> Duration {
        match u32::try_from(self.edits) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.total_time / n,
        }
    }
}

/// Document size categories for performance measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentSizeCategory {
    /// Documents under 10KB
    Small,
    /// Documents 10KB - 100KB
    Medium,
    /// Documents 100KB - 1MB
    Large,
    /// Documents over 1MB
    ExtraLarge,
}

impl DocumentSizeCategory {
    /// Determines the size category for a given document size in bytes.
    pub fn from_bytes(bytes: u64) -> Self {
        match bytes {
            0..=10_240 => DocumentSizeCategory::Small,
            10_241..=102_400 => DocumentSizeCategory::Medium,
            102_401..=1_048_576 => DocumentSizeCategory::Large,
            _ => DocumentSizeCategory::ExtraLarge,
        }
    }

    /// Returns the human-readable name of the size category.
    pub fn name(&self) -> &'static str {
        match self {
            DocumentSizeCategory::Small => "Small (< 10KB)",
            DocumentSizeCategory::Medium => "Medium (10KB - 100KB)",
            DocumentSizeCategory::Large => "Large (100KB - 1MB)",
            DocumentSizeCategory::ExtraLarge => "Extra Large (> 1MB)",
        }
    }

    /// Maximum acceptable average time for one full pass.
    pub fn time_limit(&self) -> Option<Duration> {
        match self {
            DocumentSizeCategory::Small | DocumentSizeCategory::Medium => Some(Duration::from_millis(100)),
            DocumentSizeCategory::Large => Some(Duration::from_millis(1_000)),
            DocumentSizeCategory::ExtraLarge => None,
        }
    }
}

fn average(times: &[Duration]) -> Duration {
    match u32::try_from(times.len()) {
        Ok(0) | Err(_) => Duration::ZERO,
        Ok(n) => times.iter().sum::<Duration>() / n,
    }
}

/// Maximum acceptable average time for one incremental update.
const INCREMENTAL_TIME_LIMIT: Duration = Duration::from_millis(50);

/// Minimum cache hit ratio for repeated coloring passes.
const MIN_CACHE_HIT_RATIO: f64 = 0.7;

/// Performance measurement utilities.
#[derive(Debug, Default)]
pub struct PerformanceMeasurement {
    baseline: PerformanceBaseline,
    measurement_start: Option<Instant>,
}

impl PerformanceMeasurement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a performance measurement session.
    pub fn start_measurement(&mut self) {
        self.measurement_start = Some(Instant::now());
    }

    /// Time since [`PerformanceMeasurement::start_measurement`].
    pub fn elapsed(&self) -> Option<Duration> {
        self.measurement_start.map(|start| start.elapsed())
    }

    /// Records a full partitioning pass.
    pub fn record_partitioning(&mut self, doc_bytes: usize, duration: Duration, partitions: usize) {
        self.baseline.partitioning.record(doc_bytes, duration, partitions);
    }

    /// Records a full coloring pass.
    pub fn record_coloring(&mut self, doc_bytes: usize, duration: Duration, tokens: usize) {
        self.baseline.coloring.record(doc_bytes, duration, tokens);
    }

    /// Records one incremental re-partitioning.
    pub fn record_incremental(&mut self, duration: Duration, damaged_bytes: usize) {
        let incremental = &mut self.baseline.incremental;
        incremental.edits += 1;
        incremental.total_time += duration;
        incremental.damaged_bytes += damaged_bytes;
        if duration > incremental.max_time {
            incremental.max_time = duration;
        }
    }

    /// Records cache performance statistics.
    pub fn record_cache_performance(&mut self, hits: usize, misses: usize) {
        let total = hits + misses;
        if total > 0 {
            self.baseline.cache_hit_ratio = Some(hits as f64 / total as f64);
        }
    }

    pub fn get_baseline(&self) -> &PerformanceBaseline {
        &self.baseline
    }

    /// Generates a performance report.
    pub fn generate_report(&self) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "=== Performance Baseline Report ===\n");

        for (title, pass, unit) in [
            ("Partitioning Performance", &self.baseline.partitioning, "partitions"),
            ("Coloring Performance", &self.baseline.coloring, "tokens"),
        ] {
            let _ = writeln!(report, "{title}:");
            let mut categories: Vec<_> = pass.times_by_size.iter().collect();
            categories.sort_by_key(|(category, _)| **category);
            for (category, times) in categories {
                let _ = writeln!(
                    report,
                    "  {}: {} documents, avg {}µs, max {}µs",
                    category.name(),
                    times.len(),
                    average(times).as_micros(),
                    times.iter().max().unwrap_or(&Duration::ZERO).as_micros()
                );
            }
            let _ = writeln!(report, "  {} {unit} produced", pass.items_produced);
            let _ = writeln!(report, "  Throughput: {:.1} MB/s\n", pass.throughput_mb_per_sec());
        }

        let incremental = &self.baseline.incremental;
        let _ = writeln!(report, "Incremental Re-partitioning:");
        let _ = writeln!(
            report,
            "  {} edits, avg {}µs, max {}µs, {} bytes re-scanned",
            incremental.edits,
            incremental.avg_time().as_micros(),
            incremental.max_time.as_micros(),
            incremental.damaged_bytes
        );

        if let Some(ratio) = self.baseline.cache_hit_ratio {
            let _ = writeln!(report, "  Cache Hit Ratio: {:.1}%", ratio * 100.0);
        }

        let _ = writeln!(report, "\n=== End Report ===");
        report
    }

    /// Checks the measurements against the response time requirements.
    pub fn meets_requirements(&self) -> (bool, Vec<String>) {
        let mut issues = Vec::new();

        for (name, pass) in [
            ("Partitioning", &self.baseline.partitioning),
            ("Coloring", &self.baseline.coloring),
        ] {
            for (category, avg_time) in &pass.avg_times {
                if let Some(limit) = category.time_limit() {
                    if *avg_time > limit {
                        issues.push(format!(
                            "{name} of {} documents exceeds {}ms requirement: {}ms",
                            category.name(),
                            limit.as_millis(),
                            avg_time.as_millis()
                        ));
                    }
                }
            }
        }

        let incremental = &self.baseline.incremental;
        if incremental.edits > 0 && incremental.avg_time() > INCREMENTAL_TIME_LIMIT {
            issues.push(format!(
                "Incremental re-partitioning exceeds {}ms requirement: {}ms",
                INCREMENTAL_TIME_LIMIT.as_millis(),
                incremental.avg_time().as_millis()
            ));
        }

        if let Some(ratio) = self.baseline.cache_hit_ratio {
            if ratio < MIN_CACHE_HIT_RATIO {
                issues.push(format!(
                    "Cache hit ratio below {:.0}% requirement: {:.1}%",
                    MIN_CACHE_HIT_RATIO * 100.0,
                    ratio * 100.0
                ));
            }
        }

        (issues.is_empty(), issues)
    }
}

/// Creates a performance measurement session for testing.
pub fn create_test_session() -> PerformanceMeasurement {
    let mut measurement = PerformanceMeasurement::new();
    measurement.start_measurement();
    measurement
}

const TEMPLATE_BLOCK: &str = r#"<#-- Product listing -->
<div class="products" data-count="${products?size}">
  <#list products as product>
    [#if product.price > 100 && product.name != "]"]
      <@ui.card title=product.name price=(product.price * 1.2)/>
    [#else]
      <span class='plain'>${product.name!"unnamed"} &mdash; #{product.price}</span>
    [/#if]
  </#list>
  <!-- static footer -->
</div>
"#;

/// Generates a template of at least `target_bytes` bytes mixing both tag
/// notations, interpolations and host markup.
pub fn generate_template(target_bytes: usize) -> String {
    let blocks = target_bytes.div_ceil(TEMPLATE_BLOCK.len()).max(1);
    TEMPLATE_BLOCK.repeat(blocks)
}

/// Runs the highlighter over generated templates of the given sizes.
///
/// Each document is partitioned and colored once with a fresh cache, colored
/// a second time to exercise the cache, and then edited at its middle to
/// measure incremental re-partitioning.
pub fn run_baseline_test(sizes: &[usize]) -> PerformanceMeasurement {
    let mut measurement = create_test_session();
    let highlighter = TemplateHighlighter::default();
    let registry = highlighter.registry();
    let mut hits = 0;
    let mut misses = 0;

    for &size in sizes {
        let doc = generate_template(size);

        let start = Instant::now();
        let partitions = highlighter.partition(&doc);
        measurement.record_partitioning(doc.len(), start.elapsed(), partitions.len());

        let mut state = HighlightingState::new();
        for _ in 0..2 {
            let start = Instant::now();
            let highlighted = highlighter.highlight_with_state(&doc, &mut state);
            let tokens = highlighted.iter().map(|hp| hp.tokens.len()).sum();
            measurement.record_coloring(doc.len(), start.elapsed(), tokens);
        }
        hits += state.metrics.cache_hits;
        misses += state.metrics.cache_misses;

        let mut partitioning = DocumentPartitioning::new(registry, &doc);
        let mut edited = doc.clone();
        let mut offset = edited.len() / 2;
        while !edited.is_char_boundary(offset) {
            offset -= 1;
        }
        edited.insert_str(offset, "${x}");
        let start = Instant::now();
        let damaged = partitioning.notify(registry, &edited, &TextChangeNotification::insert(offset, 4));
        measurement.record_incremental(start.elapsed(), damaged.len());
    }

    measurement.record_cache_performance(hits, misses);
    tracing::debug!(documents = sizes.len(), "baseline finished");
    measurement
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_size_categories() {
        assert_eq!(DocumentSizeCategory::from_bytes(5_000), DocumentSizeCategory::Small);
        assert_eq!(DocumentSizeCategory::from_bytes(50_000), DocumentSizeCategory::Medium);
        assert_eq!(DocumentSizeCategory::from_bytes(500_000), DocumentSizeCategory::Large);
        assert_eq!(DocumentSizeCategory::from_bytes(5_000_000), DocumentSizeCategory::ExtraLarge);
    }

    #[test]
    fn test_performance_measurement() {
        let mut measurement = create_test_session();

        measurement.record_partitioning(10_000, Duration::from_millis(5), 40);
        measurement.record_partitioning(100_000, Duration::from_millis(20), 400);
        measurement.record_coloring(10_000, Duration::from_millis(10), 300);
        measurement.record_incremental(Duration::from_millis(2), 120);
        measurement.record_cache_performance(80, 20);

        let baseline = measurement.get_baseline();
        assert_eq!(baseline.partitioning.items_produced, 440);
        assert_eq!(baseline.partitioning.bytes_processed, 110_000);
        assert_eq!(baseline.coloring.items_produced, 300);
        assert_eq!(baseline.incremental.edits, 1);
        assert_eq!(baseline.cache_hit_ratio, Some(0.8));
        assert!(measurement.elapsed().is_some());
    }

    #[test]
    fn test_baseline_requirements() {
        let mut measurement = create_test_session();
        measurement.record_partitioning(10_000, Duration::from_millis(30), 10);
        measurement.record_cache_performance(80, 20);

        let (passes, issues) = measurement.meets_requirements();
        assert!(passes, "Should meet requirements with good performance");
        assert!(issues.is_empty(), "Should have no issues: {:?}", issues);

        measurement.record_coloring(50_000, Duration::from_millis(500), 10);
        measurement.record_incremental(Duration::from_millis(80), 10);
        let (passes, issues) = measurement.meets_requirements();
        assert!(!passes);
        assert_eq!(issues.len(), 2, "{issues:?}");
    }

    #[test]
    fn test_generate_template() {
        let doc = generate_template(4_000);
        assert!(doc.len() >= 4_000);
        assert!(generate_template(0).len() == TEMPLATE_BLOCK.len());
    }

    #[test]
    fn test_performance_report_generation() {
        let measurement = run_baseline_test(&[1_000, 20_000]);

        let report = measurement.generate_report();
        assert!(report.contains("Performance Baseline Report"));
        assert!(report.contains("Partitioning Performance"));
        assert!(report.contains("Coloring Performance"));
        assert!(report.contains("Incremental Re-partitioning"));
        assert_eq!(measurement.get_baseline().incremental.edits, 2);
        // The second pass is served from the cache, and repeated blocks hit
        // it already during the first.
        let ratio = measurement.get_baseline().cache_hit_ratio.unwrap_or(0.0);
        assert!(ratio > 0.5, "{ratio}");
    }
}
