// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Partition kinds and partition records.

use std::ops::Range;

/// Coarse lexical kind of a document region.
///
/// The declaration order is the priority order in which the partitioning
/// rules are tried. [`PartitionKind::Other`] is the default kind that covers
/// any text no rule claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartitionKind {
    /// `<#-- ... -->` or `[#-- ... --]`
    FtlComment,
    /// `<#name ...>` or `[#name ...]`
    DirectiveStart,
    /// `</#name>` or `[/#name]`
    DirectiveEnd,
    /// `<@name ...>` or `[@name ...]`
    MacroCallStart,
    /// `</@name>` or `[/@name]`
    MacroCallEnd,
    /// `${...}`, `#{...}` or `[=...]`
    Interpolation,
    /// `<!-- ... -->`
    XmlComment,
    /// `<name ...>`, `</name>`, `<?...?>`, `<!DOCTYPE ...>`
    XmlTag,
    /// Everything else
    Other,
}

impl PartitionKind {
    /// Number of partition kinds.
    pub const COUNT: usize = 9;

    /// All kinds in priority order.
    pub const ALL: [PartitionKind; Self::COUNT] = [
        PartitionKind::FtlComment,
        PartitionKind::DirectiveStart,
        PartitionKind::DirectiveEnd,
        PartitionKind::MacroCallStart,
        PartitionKind::MacroCallEnd,
        PartitionKind::Interpolation,
        PartitionKind::XmlComment,
        PartitionKind::XmlTag,
        PartitionKind::Other,
    ];

    /// Position of this kind in [`PartitionKind::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Unique content-type identifier, used to look up coloring tokenizers.
    pub fn content_type(self) -> &'static str {
        match self {
            PartitionKind::FtlComment => "__ftl_comment",
            PartitionKind::DirectiveStart => "__ftl_directive_start",
            PartitionKind::DirectiveEnd => "__ftl_directive_end",
            PartitionKind::MacroCallStart => "__ftl_macro_call_start",
            PartitionKind::MacroCallEnd => "__ftl_macro_call_end",
            PartitionKind::Interpolation => "__ftl_interpolation",
            PartitionKind::XmlComment => "__xml_comment",
            PartitionKind::XmlTag => "__xml_tag",
            PartitionKind::Other => "__dftl_partition_content_type",
        }
    }

    /// Looks up a kind by its content-type identifier.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.content_type() == content_type)
    }

    /// Returns true for the kind that fills text no rule matched.
    pub fn is_default(self) -> bool {
        self == PartitionKind::Other
    }

    /// Returns true for kinds that belong to the template language rather
    /// than to the host markup.
    pub fn is_template(self) -> bool {
        matches!(
            self,
            PartitionKind::FtlComment
                | PartitionKind::DirectiveStart
                | PartitionKind::DirectiveEnd
                | PartitionKind::MacroCallStart
                | PartitionKind::MacroCallEnd
                | PartitionKind::Interpolation
        )
    }
}

/// A typed, contiguous region of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    /// The kind of this region
    pub kind: PartitionKind,
    /// Byte offset where the region starts
    pub start: usize,
    /// Length of the region in bytes; never zero
    pub len: usize,
}

impl Partition {
    pub fn new(kind: PartitionKind, start: usize, len: usize) -> Self {
        Self { kind, start, len }
    }

    /// Exclusive end offset.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Returns true if `offset` lies inside this partition.
    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end()
    }

    /// Returns this partition moved by `delta` bytes, or `None` if the move
    /// would put it before offset 0.
    pub fn shifted(&self, delta: isize) -> Option<Self> {
        let start = self.start.checked_add_signed(delta)?;
        Some(Self { start, ..*self })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types_are_unique() {
        for (i, a) in PartitionKind::ALL.iter().enumerate() {
            assert_eq!(a.index(), i);
            for b in &PartitionKind::ALL[i + 1..] {
                assert_ne!(a.content_type(), b.content_type());
            }
        }
    }

    #[test]
    fn test_content_type_round_trip() {
        assert_eq!(
            PartitionKind::from_content_type("__ftl_directive_start"),
            Some(PartitionKind::DirectiveStart)
        );
        assert_eq!(PartitionKind::from_content_type("__java"), None);
    }

    #[test]
    fn test_exactly_one_default_kind() {
        let defaults: Vec<_> = PartitionKind::ALL
            .into_iter()
            .filter(|kind| kind.is_default())
            .collect();
        assert_eq!(defaults, vec![PartitionKind::Other]);
    }

    #[test]
    fn test_template_kinds() {
        let template: Vec<_> = PartitionKind::ALL
            .into_iter()
            .filter(|kind| kind.is_template())
            .collect();
        assert_eq!(template.len(), 6);
        assert!(!PartitionKind::XmlTag.is_template());
        assert!(!PartitionKind::XmlComment.is_template());
        assert!(!PartitionKind::Other.is_template());
    }

    #[test]
    fn test_partition_geometry() {
        let p = Partition::new(PartitionKind::XmlTag, 4, 3);
        assert_eq!(p.end(), 7);
        assert!(p.contains(4));
        assert!(p.contains(6));
        assert!(!p.contains(7));
        assert_eq!(p.shifted(-4).map(|p| p.start), Some(0));
        assert_eq!(p.shifted(-5), None);
        assert_eq!(p.shifted(10).map(|p| p.range()), Some(14..17));
    }
}
