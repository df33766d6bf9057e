// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Partitioning and coloring of FreeMarker templates.
//!
//! The [`registry`] binds each [`PartitionKind`] to a rule from [`rules`] and
//! a tokenizer from [`coloring`]. A [`PartitionScanner`] applies the rules to
//! split a document into partitions; the tokenizers then color each
//! partition independently.

pub mod coloring;
pub mod config;
pub mod cursor;
pub mod document;
mod expression;
pub mod highlighter;
pub mod partition;
pub mod performance;
pub mod registry;
pub mod rules;
pub mod scanner;
pub mod token;
pub mod worker;


pub use coloring::{ColoringTokenizer, KEYWORDS};
pub use config::{InterpolationSyntax, Notation, ScannerConfig, TagSyntax};
pub use cursor::Cursor;
pub use document::Document;
pub use highlighter::{
    CacheKey, HighlightedPartition, HighlightingMetrics, HighlightingState, TemplateHighlighter,
};
pub use partition::{Partition, PartitionKind};
pub use performance::{
    DocumentSizeCategory, PerformanceBaseline, PerformanceMeasurement, create_test_session,
    generate_template, run_baseline_test,
};
pub use registry::{PartitionRegistry, default_registry};
pub use rules::{Closing, Opener, PartitionRule};
pub use scanner::{OpenPartition, PartitionScanner, ScanCursor};
pub use token::{Token, TokenKind};
pub use worker::{default_worker_count, tokenize_parallel};
