// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The partition scanner.
//!
//! A scanner walks a document once, left to right, and yields a gap-free
//! sequence of [`Partition`]s. It is a plain value: each scan owns its own
//! state, so any number of scans can share one [`PartitionRegistry`].

use crate::syntax::cursor::Cursor;
use crate::syntax::document::Document;
use crate::syntax::partition::{Partition, PartitionKind};
use crate::syntax::registry::PartitionRegistry;
use crate::syntax::rules::Opener;

/// A partition that was open at the point where a scan (re)starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpenPartition {
    pub kind: PartitionKind,
    /// Offset where the open partition started
    pub start: usize,
}

/// Where a scan starts, and which partition was open there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScanCursor {
    pub offset: usize,
    pub open: Option<OpenPartition>,
}

impl ScanCursor {
    /// The start of the document.
    pub fn start() -> Self {
        Self::default()
    }

    /// Outside of any partition at `offset`.
    pub fn at(offset: usize) -> Self {
        Self { offset, open: None }
    }

    /// Inside a partition of `kind` that started at `start`.
    pub fn inside(kind: PartitionKind, start: usize, offset: usize) -> Self {
        Self {
            offset,
            open: Some(OpenPartition { kind, start }),
        }
    }

    /// Re-derives the cursor for `offset` from an earlier partitioning.
    ///
    /// Offsets inside a default run restart at the beginning of that run;
    /// offsets past the last partition restart at the document end.
    pub fn derive(partitions: &[Partition], offset: usize) -> Self {
        let index = partitions.partition_point(|p| p.end() <= offset);
        match partitions.get(index) {
            Some(p) if p.kind.is_default() => Self::at(p.start),
            Some(p) => Self::inside(p.kind, p.start, offset),
            None => Self::at(partitions.last().map_or(0, Partition::end)),
        }
    }

    /// The offset scanning actually restarts from.
    pub fn restart_offset(&self) -> usize {
        self.open.map_or(self.offset, |open| open.start)
    }
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    Searching,
    Inside(Opener),
}

/// Iterator over the partitions of one document.
///
/// Created by [`PartitionRegistry::scanner`] or [`PartitionScanner::resume`].
#[derive(Debug)]
pub struct PartitionScanner<'r, 'd> {
    registry: &'r PartitionRegistry,
    cursor: Cursor<'d>,
    state: ScanState,
    /// Start of the default run not yet emitted
    pending: Option<usize>,
    /// Offset where rule matching is skipped once after a bad closer
    suppress_at: Option<usize>,
}

impl<'r, 'd> PartitionScanner<'r, 'd> {
    pub(crate) fn new(registry: &'r PartitionRegistry, doc: &'d dyn Document) -> Self {
        Self {
            registry,
            cursor: Cursor::new(doc),
            state: ScanState::Searching,
            pending: None,
            suppress_at: None,
        }
    }

    /// Restarts a scan at `scan`.
    ///
    /// The scan restarts at the start of the open partition, re-matching its
    /// opener there. If the opener no longer matches, scanning falls back to
    /// searching from that offset.
    pub fn resume(registry: &'r PartitionRegistry, doc: &'d dyn Document, scan: ScanCursor) -> Self {
        let cursor = Cursor::at(doc, scan.restart_offset());
        let state = match scan.open {
            Some(open) => match registry.match_opener(&cursor) {
                Some(opener) if opener.kind == open.kind => ScanState::Inside(opener),
                _ => {
                    tracing::debug!(kind = ?open.kind, start = open.start, "opener no longer matches, searching");
                    ScanState::Searching
                }
            },
            None => ScanState::Searching,
        };
        Self {
            registry,
            cursor,
            state,
            pending: None,
            suppress_at: None,
        }
    }

    /// Current scan offset.
    pub fn offset(&self) -> usize {
        self.cursor.pos()
    }

    fn take_pending(&mut self, end: usize) -> Option<Partition> {
        let start = self.pending.take()?;
        let partition = Partition::new(self.registry.default_kind(), start, end - start);
        tracing::trace!(kind = ?partition.kind, start, len = partition.len, "partition");
        Some(partition)
    }

    fn close(&mut self, opener: Opener) -> Option<Partition> {
        let rule = self.registry.rule_for(opener.kind)?;
        let mut cursor = self.cursor;
        cursor.set_pos(opener.end());
        let closing = rule.find_closer(&mut cursor, &opener);
        let end = closing.end();
        if end <= opener.start || end < opener.end() {
            tracing::debug!(kind = ?opener.kind, start = opener.start, end, "closer before opener, skipping");
            return None;
        }
        if !closing.is_terminated() {
            tracing::debug!(kind = ?opener.kind, start = opener.start, end, "partition has no closer");
        }
        self.cursor.set_pos(end);
        let partition = Partition::new(opener.kind, opener.start, end - opener.start);
        tracing::trace!(kind = ?partition.kind, start = partition.start, len = partition.len, "partition");
        Some(partition)
    }
}

impl Iterator for PartitionScanner<'_, '_> {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        loop {
            match self.state {
                ScanState::Inside(opener) => {
                    self.state = ScanState::Searching;
                    match self.close(opener) {
                        Some(partition) => return Some(partition),
                        None => {
                            self.cursor.set_pos(opener.start);
                            self.suppress_at = Some(opener.start);
                        }
                    }
                }
                ScanState::Searching => {
                    let pos = self.cursor.pos();
                    if self.cursor.is_eof() {
                        return self.take_pending(pos);
                    }
                    if self.suppress_at.take() != Some(pos) {
                        if let Some(opener) = self.registry.match_opener(&self.cursor) {
                            self.state = ScanState::Inside(opener);
                            match self.take_pending(pos) {
                                Some(partition) => return Some(partition),
                                None => continue,
                            }
                        }
                    }
                    self.pending.get_or_insert(pos);
                    self.cursor.advance_char();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::config::{InterpolationSyntax, ScannerConfig, TagSyntax};
    use pretty_assertions::assert_eq;

    fn scan(registry: &PartitionRegistry, source: &str) -> Vec<(PartitionKind, String)> {
        let doc = source;
        registry
            .partition(&doc)
            .into_iter()
            .map(|p| (p.kind, source[p.range()].to_string()))
            .collect()
    }

    #[test]
    fn test_reference_partitions() {
        use PartitionKind::*;
        let registry = PartitionRegistry::default();
        let source = "[#assign x = 1 > 2, y = ']', z = \"]\", q=s[1] [#-- ] --]]\n[#assign x = 1/2/]";
        assert_eq!(
            scan(&registry, source),
            vec![
                (
                    DirectiveStart,
                    "[#assign x = 1 > 2, y = ']', z = \"]\", q=s[1] [#-- ] --]]".into()
                ),
                (Other, "\n".into()),
                (DirectiveStart, "[#assign x = 1/2/]".into()),
            ]
        );
    }

    #[test]
    fn test_directive_inside_attribute_value() {
        use PartitionKind::*;
        let registry = PartitionRegistry::default();
        assert_eq!(
            scan(&registry, r#"<a class="<#if on>x</#if>">t</a>"#),
            vec![
                (XmlTag, "<a class=\"".into()),
                (DirectiveStart, "<#if on>".into()),
                (Other, "x".into()),
                (DirectiveEnd, "</#if>".into()),
                (Other, "\">t".into()),
                (XmlTag, "</a>".into()),
            ]
        );
    }

    #[test]
    fn test_unbalanced_bracket_ends_at_next_tag() {
        use PartitionKind::*;
        let registry = PartitionRegistry::default();
        assert_eq!(
            scan(&registry, "<#if x[0>a</#if>${b}"),
            vec![
                (DirectiveStart, "<#if x[0>a".into()),
                (DirectiveEnd, "</#if>".into()),
                (Interpolation, "${b}".into()),
            ]
        );
    }

    #[test]
    fn test_mixed_notations_and_markup() {
        use PartitionKind::*;
        let registry = PartitionRegistry::default();
        let source = "<ul><#list xs as x>[@item v=x/]</#list></ul>";
        assert_eq!(
            scan(&registry, source),
            vec![
                (XmlTag, "<ul>".into()),
                (DirectiveStart, "<#list xs as x>".into()),
                (MacroCallStart, "[@item v=x/]".into()),
                (DirectiveEnd, "</#list>".into()),
                (XmlTag, "</ul>".into()),
            ]
        );
    }

    #[test]
    fn test_plain_brackets_stay_text() {
        use PartitionKind::*;
        let registry = PartitionRegistry::default();
        assert_eq!(
            scan(&registry, "a[0] < b # c $ d"),
            vec![(Other, "a[0] < b # c $ d".into())]
        );
    }

    #[test]
    fn test_unterminated_comment_runs_to_end() {
        use PartitionKind::*;
        let registry = PartitionRegistry::default();
        assert_eq!(
            scan(&registry, "text <#-- open ${x} <#if>"),
            vec![
                (Other, "text ".into()),
                (FtlComment, "<#-- open ${x} <#if>".into()),
            ]
        );
    }

    #[test]
    fn test_comments_and_interpolations() {
        use PartitionKind::*;
        let registry = PartitionRegistry::default();
        assert_eq!(
            scan(&registry, "<!-- c --><b>#{n}</b>[#-- x --]"),
            vec![
                (XmlComment, "<!-- c -->".into()),
                (XmlTag, "<b>".into()),
                (Interpolation, "#{n}".into()),
                (XmlTag, "</b>".into()),
                (FtlComment, "[#-- x --]".into()),
            ]
        );
    }

    #[test]
    fn test_config_restricts_notations() {
        use PartitionKind::*;
        let config = ScannerConfig::new()
            .with_tag_syntax(TagSyntax::SquareBracket)
            .with_interpolation_syntax(InterpolationSyntax::SquareBracket)
            .without_host_markup();
        let registry = PartitionRegistry::new(config);
        assert_eq!(
            scan(&registry, "<#if a>[#if a][=b]${c}<p>"),
            vec![
                (Other, "<#if a>".into()),
                (DirectiveStart, "[#if a]".into()),
                (Interpolation, "[=b]".into()),
                (Other, "${c}<p>".into()),
            ]
        );
    }

    #[test]
    fn test_empty_document() {
        let registry = PartitionRegistry::default();
        assert_eq!(scan(&registry, ""), vec![]);
    }

    #[test]
    fn test_scan_cursor_derive() {
        let partitions = vec![
            Partition::new(PartitionKind::Other, 0, 5),
            Partition::new(PartitionKind::FtlComment, 5, 10),
        ];
        assert_eq!(ScanCursor::derive(&partitions, 3), ScanCursor::at(0));
        assert_eq!(
            ScanCursor::derive(&partitions, 7),
            ScanCursor::inside(PartitionKind::FtlComment, 5, 7)
        );
        assert_eq!(ScanCursor::derive(&partitions, 15), ScanCursor::at(15));
        assert_eq!(ScanCursor::derive(&[], 4), ScanCursor::at(0));
        assert_eq!(ScanCursor::derive(&partitions, 7).restart_offset(), 5);
    }

    #[test]
    fn test_resume_matches_full_scan() {
        let registry = PartitionRegistry::default();
        let doc = "ab<#-- c --><#if x>${y}</#if>";
        let full = registry.partition(&doc);
        for offset in 0..doc.len() {
            let scan = ScanCursor::derive(&full, offset);
            let resumed: Vec<_> = PartitionScanner::resume(&registry, &doc, scan).collect();
            let restart = full.iter().position(|p| p.start == scan.restart_offset());
            assert_eq!(Some(resumed.as_slice()), restart.map(|i| &full[i..]));
        }
    }

    #[test]
    fn test_resume_falls_back_to_searching() {
        let registry = PartitionRegistry::default();
        let doc = "xx<p>";
        let scan = ScanCursor::inside(PartitionKind::FtlComment, 0, 1);
        let resumed: Vec<_> = PartitionScanner::resume(&registry, &doc, scan).collect();
        assert_eq!(
            resumed,
            vec![
                Partition::new(PartitionKind::Other, 0, 2),
                Partition::new(PartitionKind::XmlTag, 2, 3),
            ]
        );
    }
}
