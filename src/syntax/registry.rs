// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The partition type registry.
//!
//! Binds every [`PartitionKind`] to its rule and its coloring tokenizer. The
//! bindings are built once per configuration and never change afterwards.

use once_cell::sync::Lazy;

use crate::syntax::coloring::{ColoringTokenizer, tokenizer_for};
use crate::syntax::config::ScannerConfig;
use crate::syntax::cursor::Cursor;
use crate::syntax::document::Document;
use crate::syntax::partition::{Partition, PartitionKind};
use crate::syntax::rules::{
    FtlCommentRule, InterpolationRule, Opener, PartitionRule, TagRule, XmlCommentRule, XmlTagRule,
};
use crate::syntax::scanner::PartitionScanner;
use crate::syntax::token::{Token, TokenKind};

/// Ordered set of partition rules plus the kind → tokenizer table.
#[derive(Debug)]
pub struct PartitionRegistry {
    config: ScannerConfig,
    /// Rules in priority order
    rules: Vec<Box<dyn PartitionRule>>,
    /// Indexed by [`PartitionKind::index`]
    tokenizers: Vec<Box<dyn ColoringTokenizer>>,
}

impl Default for PartitionRegistry {
    fn default() -> Self {
        Self::new(ScannerConfig::default())
    }
}

impl PartitionRegistry {
    /// Builds the rule list and tokenizer table for `config`.
    pub fn new(config: ScannerConfig) -> Self {
        let tags = config.tag_syntax;
        let mut rules: Vec<Box<dyn PartitionRule>> = vec![
            Box::new(FtlCommentRule::new(tags)),
            Box::new(TagRule::directive_start(tags)),
            Box::new(TagRule::directive_end(tags)),
            Box::new(TagRule::macro_call_start(tags)),
            Box::new(TagRule::macro_call_end(tags)),
            Box::new(InterpolationRule::new(config.interpolation_syntax)),
        ];
        if config.host_markup {
            rules.push(Box::new(XmlCommentRule));
            rules.push(Box::new(XmlTagRule::new(tags, config.interpolation_syntax)));
        }

        let tokenizers = PartitionKind::ALL
            .into_iter()
            .map(|kind| tokenizer_for(kind, &config))
            .collect();

        Self {
            config,
            rules,
            tokenizers,
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// The kind that absorbs text no rule claims.
    pub fn default_kind(&self) -> PartitionKind {
        PartitionKind::Other
    }

    /// Kinds this registry can produce, in priority order, default last.
    pub fn kinds(&self) -> impl Iterator<Item = PartitionKind> + '_ {
        self.rules
            .iter()
            .map(|rule| rule.kind())
            .chain(std::iter::once(self.default_kind()))
    }

    /// Rules in priority order.
    pub fn rules(&self) -> &[Box<dyn PartitionRule>] {
        &self.rules
    }

    /// The rule producing `kind`. The default kind has none.
    pub fn rule_for(&self, kind: PartitionKind) -> Option<&dyn PartitionRule> {
        self.rules
            .iter()
            .find(|rule| rule.kind() == kind)
            .map(|rule| rule.as_ref())
    }

    pub fn tokenizer_for(&self, kind: PartitionKind) -> &dyn ColoringTokenizer {
        self.tokenizers[kind.index()].as_ref()
    }

    /// Looks up a tokenizer by content-type identifier.
    pub fn tokenizer_for_content_type(&self, content_type: &str) -> Option<&dyn ColoringTokenizer> {
        PartitionKind::from_content_type(content_type).map(|kind| self.tokenizer_for(kind))
    }

    /// Tries the rules at the cursor in priority order.
    pub(crate) fn match_opener(&self, cursor: &Cursor<'_>) -> Option<Opener> {
        // Every opener starts with one of these bytes.
        if !matches!(cursor.current(), Some(b'<' | b'[' | b'$' | b'#')) {
            return None;
        }
        self.rules.iter().find_map(|rule| rule.match_opener(cursor))
    }

    /// Starts a scan of `doc` at offset 0.
    pub fn scanner<'r, 'd>(&'r self, doc: &'d dyn Document) -> PartitionScanner<'r, 'd> {
        PartitionScanner::new(self, doc)
    }

    /// Partitions the whole document.
    #[tracing::instrument(level = "debug", skip_all, fields(len = doc.len()))]
    pub fn partition(&self, doc: &dyn Document) -> Vec<Partition> {
        let partitions: Vec<_> = self.scanner(doc).collect();
        tracing::debug!(count = partitions.len(), "partitioned");
        partitions
    }

    /// Colors one partition of `doc`.
    pub fn tokenize(&self, doc: &dyn Document, partition: &Partition) -> Vec<Token> {
        match doc.slice(partition.range()) {
            Some(text) => self
                .tokenizer_for(partition.kind)
                .tokenize(&text, partition.start),
            None => {
                tracing::debug!(start = partition.start, len = partition.len, "partition out of bounds");
                vec![Token::new(TokenKind::Text, partition.start, partition.len)]
            }
        }
    }
}

static DEFAULT_REGISTRY: Lazy<PartitionRegistry> = Lazy::new(PartitionRegistry::default);

/// Process-wide registry built from [`ScannerConfig::default`].
pub fn default_registry() -> &'static PartitionRegistry {
    &DEFAULT_REGISTRY
}
