// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Highlighting facade and token caching.
//!
//! [`TemplateHighlighter`] runs both passes over a document. Callers that
//! highlight the same document repeatedly keep a [`HighlightingState`], which
//! caches tokens per partition content and records performance metrics.

use std::collections::{HashMap, HashSet};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::syntax::config::ScannerConfig;
use crate::syntax::document::Document;
use crate::syntax::partition::{Partition, PartitionKind};
use crate::syntax::registry::PartitionRegistry;
use crate::syntax::token::Token;

/// A partition together with its coloring tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedPartition {
    pub partition: Partition,
    pub tokens: Vec<Token>,
}

/// Performance metrics for highlighting operations.
#[derive(Debug, Clone, Default)]
pub struct HighlightingMetrics {
    /// Total time spent partitioning
    pub partition_time: Duration,
    /// Total time spent tokenizing
    pub tokenize_time: Duration,
    /// Number of partitions tokenized (cache misses only)
    pub partitions_tokenized: usize,
    /// Number of tokens generated
    pub tokens_generated: usize,
    /// Maximum time for a single partition
    pub max_partition_time: Duration,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

impl HighlightingMetrics {
    /// Records one partitioning pass.
    pub fn record_partitioning(&mut self, duration: Duration) {
        self.partition_time += duration;
    }

    /// Records the tokenization of one partition.
    pub fn record_tokenize(&mut self, duration: Duration, token_count: usize) {
        self.tokenize_time += duration;
        self.partitions_tokenized += 1;
        self.tokens_generated += token_count;
        if duration > self.max_partition_time {
            self.max_partition_time = duration;
        }
    }

    /// Average tokenization time per partition.
    pub fn avg_time_per_partition(&self) -> Duration {
        match u32::try_from(self.partitions_tokenized) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.tokenize_time / n,
        }
    }

    pub fn record_cache_hit(&mut self) {
        self.cache_hits += 1;
    }

    pub fn record_cache_miss(&mut self) {
        self.cache_misses += 1;
    }

    /// Returns the cache hit ratio (0.0 to 1.0).
    pub fn cache_hit_ratio(&self) -> f64 {
        let total_requests = self.cache_hits + self.cache_misses;
        if total_requests == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total_requests as f64
        }
    }

    pub fn reset(&mut self) {
        *self = Default::default();
    }
}

/// Caller-owned cache of tokens and metrics for one document.
///
/// Identifies the content of one partition in the token cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: PartitionKind,
    /// Length of the partition text in bytes
    pub len: usize,
    pub content_hash: u64,
}

impl CacheKey {
    pub fn new(kind: PartitionKind, text: &str) -> Self {
        Self {
            kind,
            len: text.len(),
            content_hash: calculate_content_hash(text),
        }
    }
}

/// Tokens are cached relative to the partition start, keyed by partition kind
/// and content, so a partition that merely moved is not re-tokenized.
///
/// Each [`TemplateHighlighter::highlight_with_state`] pass evicts entries
/// that no partition of the highlighted document used, so the cache never
/// holds more entries than the document has partitions.
#[derive(Debug, Clone, Default)]
pub struct HighlightingState {
    pub metrics: HighlightingMetrics,
    token_cache: HashMap<CacheKey, Vec<Token>>,
}

impl HighlightingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached tokens for a partition, rebased to `start`.
    ///
    /// Entries whose tokens do not span exactly `key.len` bytes are ignored.
    pub fn cached_tokens(&self, key: &CacheKey, start: usize) -> Option<Vec<Token>> {
        let tokens = self.token_cache.get(key)?;
        if tokens.last().map_or(0, Token::end) != key.len {
            return None;
        }
        Some(
            tokens
                .iter()
                .map(|t| Token::new(t.kind, t.start + start, t.len))
                .collect(),
        )
    }

    /// Caches tokens of a partition that starts at `start`.
    pub fn cache_tokens(&mut self, key: CacheKey, start: usize, tokens: &[Token]) {
        let relative = tokens
            .iter()
            .map(|t| Token::new(t.kind, t.start - start, t.len))
            .collect();
        self.token_cache.insert(key, relative);
    }

    /// Drops every entry not in `keep`.
    pub fn retain_keys(&mut self, keep: &HashSet<CacheKey>) {
        self.token_cache.retain(|key, _| keep.contains(key));
    }

    pub fn clear_cache(&mut self) {
        self.token_cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.token_cache.len()
    }
}

/// Partitions and colors FreeMarker templates.
///
/// The highlighter is immutable and cheap to clone; clones share one registry.
#[derive(Debug, Clone)]
pub struct TemplateHighlighter {
    registry: Arc<PartitionRegistry>,
}

impl Default for TemplateHighlighter {
    fn default() -> Self {
        Self::new(ScannerConfig::default())
    }
}

impl TemplateHighlighter {
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            registry: Arc::new(PartitionRegistry::new(config)),
        }
    }

    pub fn registry(&self) -> &PartitionRegistry {
        &self.registry
    }

    /// Splits `doc` into partitions.
    pub fn partition(&self, doc: &dyn Document) -> Vec<Partition> {
        self.registry.partition(doc)
    }

    /// Colors one partition.
    pub fn tokenize(&self, doc: &dyn Document, partition: &Partition) -> Vec<Token> {
        self.registry.tokenize(doc, partition)
    }

    /// Runs both passes over `doc`.
    #[tracing::instrument(level = "debug", skip_all, fields(len = doc.len()))]
    pub fn highlight(&self, doc: &dyn Document) -> Vec<HighlightedPartition> {
        self.partition(doc)
            .into_iter()
            .map(|partition| HighlightedPartition {
                tokens: self.tokenize(doc, &partition),
                partition,
            })
            .collect()
    }

    /// Like [`TemplateHighlighter::highlight`], but reuses tokens cached in
    /// `state` and records metrics there.
    pub fn highlight_with_state(&self, doc: &dyn Document, state: &mut HighlightingState) -> Vec<HighlightedPartition> {
        let start_time = Instant::now();
        let partitions = self.partition(doc);
        state.metrics.record_partitioning(start_time.elapsed());

        let mut used = HashSet::with_capacity(partitions.len());
        let highlighted = partitions
            .into_iter()
            .map(|partition| HighlightedPartition {
                tokens: self.tokenize_cached(doc, &partition, state, &mut used),
                partition,
            })
            .collect();
        state.retain_keys(&used);
        highlighted
    }

    fn tokenize_cached(
        &self,
        doc: &dyn Document,
        partition: &Partition,
        state: &mut HighlightingState,
        used: &mut HashSet<CacheKey>,
    ) -> Vec<Token> {
        let Some(text) = doc.slice(partition.range()) else {
            return self.tokenize(doc, partition);
        };
        let key = CacheKey::new(partition.kind, &text);
        used.insert(key);

        if let Some(tokens) = state.cached_tokens(&key, partition.start) {
            state.metrics.record_cache_hit();
            return tokens;
        }
        state.metrics.record_cache_miss();

        let start_time = Instant::now();
        let tokens = self
            .registry
            .tokenizer_for(partition.kind)
            .tokenize(&text, partition.start);
        state.metrics.record_tokenize(start_time.elapsed(), tokens.len());

        state.cache_tokens(key, partition.start, &tokens);
        tokens
    }
}

fn calculate_content_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}
