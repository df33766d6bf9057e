// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Partitioning and coloring scanner for FreeMarker templates embedded in
//! XML/HTML documents.
//!
//! A document is first split into [`Partition`]s (FTL comments, directives,
//! macro calls, interpolations, XML comments and tags, plain text), then each
//! partition is handed to its coloring tokenizer which produces [`Token`]s.
//! Both passes produce gap-free covers of their input.
//!
//! ```
//! use ftl_highlight::{PartitionKind, TemplateHighlighter};
//!
//! let highlighter = TemplateHighlighter::default();
//! let doc = "<p>${user.name}</p>";
//! let kinds: Vec<_> = highlighter.partition(&doc).iter().map(|p| p.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [PartitionKind::XmlTag, PartitionKind::Interpolation, PartitionKind::XmlTag]
//! );
//! ```

pub mod applicability;
pub mod buffer;
pub mod error;
pub mod syntax;

pub use applicability::{is_document_supported, is_file_name_supported, is_path_supported};
pub use buffer::{DocumentPartitioning, TextChangeNotification, TextChangeType};
pub use error::{Error, Result};
pub use syntax::{
    Document, HighlightedPartition, InterpolationSyntax, Partition, PartitionKind,
    PartitionRegistry, PartitionScanner, ScanCursor, ScannerConfig, TagSyntax,
    TemplateHighlighter, Token, TokenKind, default_registry,
};
