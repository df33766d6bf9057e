// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Incremental re-partitioning of an edited document.

use std::ops::Range;

use crate::buffer::text_change_notifier::TextChangeNotification;
use crate::syntax::{Document, Partition, PartitionRegistry, PartitionScanner, ScanCursor};

/// The longest distance an opener test or a closer test reads ahead of the
/// offset it decides about (`[/#` plus the first name byte).
const MAX_LOOKAHEAD: usize = 4;

/// The partitioning of a document, kept current across edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPartitioning {
    partitions: Vec<Partition>,
    len: usize,
}

impl DocumentPartitioning {
    /// Partitions `doc` from scratch.
    pub fn new(registry: &PartitionRegistry, doc: &dyn Document) -> Self {
        Self {
            partitions: registry.partition(doc),
            len: doc.len(),
        }
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Length of the document the partitions describe.
    pub fn document_len(&self) -> usize {
        self.len
    }

    /// The partition containing `offset`.
    pub fn partition_at(&self, offset: usize) -> Option<&Partition> {
        let index = self.partitions.partition_point(|p| p.end() <= offset);
        self.partitions.get(index)
    }

    /// Updates the partitioning after an edit.
    ///
    /// `doc` is the document after the edit. Scanning restarts one partition
    /// upstream of the edit and stops as soon as a new partition ends where a
    /// partition of the old document, shifted past the edit, began; the old
    /// partitions from there on are reused. Returns the byte range of `doc`
    /// whose partitions were rebuilt.
    #[tracing::instrument(level = "debug", skip_all, fields(offset = change.offset, removed = change.removed, inserted = change.inserted))]
    pub fn notify(
        &mut self,
        registry: &PartitionRegistry,
        doc: &dyn Document,
        change: &TextChangeNotification,
    ) -> Range<usize> {
        let consistent = change.old_end() <= self.len
            && self.len - change.removed + change.inserted == doc.len();
        if !consistent || self.partitions.is_empty() {
            if !consistent {
                tracing::debug!(old_len = self.len, new_len = doc.len(), "edit does not match document, full rescan");
            }
            *self = Self::new(registry, doc);
            return 0..self.len;
        }

        let first = self
            .partitions
            .partition_point(|p| p.end() <= change.offset.saturating_sub(MAX_LOOKAHEAD))
            .saturating_sub(1)
            .min(self.partitions.len() - 1);
        let restart = self.partitions[first].start;

        // Old partitions that may be reused, found by their start offset.
        let mut reusable = self
            .partitions
            .partition_point(|p| p.start < change.old_end());

        let scan = PartitionScanner::resume(registry, doc, ScanCursor::at(restart));
        let mut rebuilt = Vec::new();
        let mut tail = Vec::new();
        for partition in scan {
            rebuilt.push(partition);
            if partition.end() < change.new_end() {
                continue;
            }
            let old_end = partition.end() - change.inserted + change.removed;
            while reusable < self.partitions.len() && self.partitions[reusable].start < old_end {
                reusable += 1;
            }
            if let Some(old) = self.partitions.get(reusable) {
                if old.start == old_end {
                    tail = self.partitions[reusable..]
                        .iter()
                        .filter_map(|p| p.shifted(change.delta()))
                        .collect();
                    break;
                }
            }
        }

        let damaged = restart..rebuilt.last().map_or(restart, Partition::end);
        tracing::debug!(
            rebuilt = rebuilt.len(),
            reused = tail.len(),
            start = damaged.start,
            end = damaged.end,
            "re-partitioned"
        );

        let mut partitions = self.partitions[..first].to_vec();
        let mut rebuilt = rebuilt.into_iter();
        if let (Some(last), Some(next)) = (partitions.last_mut(), rebuilt.as_slice().first().copied()) {
            // A default run that no longer ends at an opener continues the
            // one before the restart point.
            if last.kind.is_default() && next.kind.is_default() {
                last.len += next.len;
                rebuilt.next();
            }
        }
        partitions.extend(rebuilt);
        partitions.extend(tail);

        self.partitions = partitions;
        self.len = doc.len();
        damaged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::text_change_notifier::calculate_change;
    use crate::syntax::{PartitionKind, default_registry};
    use pretty_assertions::assert_eq;

    fn edit(before: &str, after: &str) -> (DocumentPartitioning, Range<usize>) {
        let registry = default_registry();
        let mut partitioning = DocumentPartitioning::new(registry, &before);
        let change = calculate_change(before, after).unwrap();
        let damaged = partitioning.notify(registry, &after, &change);
        assert_eq!(partitioning, DocumentPartitioning::new(registry, &after));
        (partitioning, damaged)
    }

    #[test]
    fn test_typing_inside_interpolation() {
        let before = "<p>${a}</p><#list xs as x>${x}</#list>";
        let after = "<p>${abc}</p><#list xs as x>${x}</#list>";
        let (_, damaged) = edit(before, after);
        assert!(damaged.end <= "<p>${abc}</p>".len());
    }

    #[test]
    fn test_deleting_shifts_reused_tail() {
        let before = "<p>${abc}</p><#list xs as x>${x}</#list>";
        let after = "<p>${a}</p><#list xs as x>${x}</#list>";
        let (partitioning, damaged) = edit(before, after);
        assert!(damaged.end <= "<p>${a}</p>".len());
        assert_eq!(partitioning.partitions().last().map(|p| p.range()), Some(after.len() - 8..after.len()));
    }

    #[test]
    fn test_opening_comment_swallows_rest() {
        let (partitioning, _) = edit("a <#if x>b</#if>", "a <#-- <#if x>b</#if>");
        assert_eq!(partitioning.partitions().last().map(|p| p.kind), Some(PartitionKind::FtlComment));
    }

    #[test]
    fn test_closing_comment_restores_partitions() {
        let (partitioning, _) = edit("<#-- x ${a}<br/>", "<#-- x --> ${a}<br/>");
        let kinds: Vec<_> = partitioning.partitions().iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PartitionKind::FtlComment,
                PartitionKind::Other,
                PartitionKind::Interpolation,
                PartitionKind::XmlTag,
            ]
        );
    }

    #[test]
    fn test_breaking_an_opener_merges_text() {
        edit("ab<#if x>cd", "ab<if x>cd");
        edit("ab[#if x]cd", "ab[ #if x]cd");
        edit("text", "te<#if a>xt");
    }

    #[test]
    fn test_delete_everything() {
        let (partitioning, damaged) = edit("<#if a>b", "");
        assert!(partitioning.partitions().is_empty());
        assert_eq!(damaged, 0..0);
    }

    #[test]
    fn test_inconsistent_notification_rescans() {
        let registry = default_registry();
        let mut partitioning = DocumentPartitioning::new(registry, &"abc");
        let damaged = partitioning.notify(registry, &"<#if x>", &TextChangeNotification::insert(0, 1));
        assert_eq!(damaged, 0..7);
        assert_eq!(partitioning, DocumentPartitioning::new(registry, &"<#if x>"));
    }

    #[test]
    fn test_partition_at() {
        let partitioning = DocumentPartitioning::new(default_registry(), &"ab${c}");
        assert_eq!(partitioning.partition_at(1).map(|p| p.kind), Some(PartitionKind::Other));
        assert_eq!(partitioning.partition_at(2).map(|p| p.kind), Some(PartitionKind::Interpolation));
        assert_eq!(partitioning.partition_at(6), None);
        assert_eq!(partitioning.document_len(), 6);
    }
}
