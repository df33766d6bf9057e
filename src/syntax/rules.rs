// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Predicate rules recognizing the partitions of a template.
//!
//! A rule answers two questions: does a partition of its kind open at the
//! cursor, and, once it has opened, where does it end. The second question is
//! only ever asked of the rule whose opener matched, so a closing sequence
//! that belongs to another kind is never mistaken for this kind's closer.

use std::fmt;

use crate::syntax::config::{InterpolationSyntax, Notation, TagSyntax};
use crate::syntax::cursor::Cursor;
use crate::syntax::expression::{
    Terminator, is_name_start, is_tag_name_continue, skip_expression,
};
use crate::syntax::partition::PartitionKind;

/// A matched opening delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opener {
    /// Kind of the partition being opened
    pub kind: PartitionKind,
    /// Offset of the first byte of the opener
    pub start: usize,
    /// Length of the opener, including a directive or macro name
    pub len: usize,
    /// Notation of the opener; `${` and `#{` count as angle, `[=` as square
    pub notation: Notation,
}

impl Opener {
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// What ends the expression that follows this opener.
    pub(crate) fn terminator(&self) -> Terminator {
        match (self.kind, self.notation) {
            (PartitionKind::Interpolation, Notation::Angle) => Terminator::Brace,
            (PartitionKind::Interpolation, Notation::Square) => Terminator::Bracket,
            (_, notation) => Terminator::Tag(notation),
        }
    }
}

/// Outcome of a closer search. Both variants carry the exclusive end offset
/// of the partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closing {
    /// The closer was found, or the partition legitimately ended early.
    Closed(usize),
    /// The document ended before a closer was found.
    Unterminated(usize),
}

impl Closing {
    pub fn end(self) -> usize {
        match self {
            Closing::Closed(end) | Closing::Unterminated(end) => end,
        }
    }

    pub fn is_terminated(self) -> bool {
        matches!(self, Closing::Closed(_))
    }
}

/// A partitioning rule.
///
/// Rules are stateless; everything a scan needs lives in the cursor passed
/// in, so one rule set can serve any number of concurrent scans.
pub trait PartitionRule: Send + Sync + fmt::Debug {
    /// The kind of partition this rule produces.
    fn kind(&self) -> PartitionKind;

    /// Returns the opener starting at the cursor, if any.
    fn match_opener(&self, cursor: &Cursor<'_>) -> Option<Opener>;

    /// Scans for the closer of `opener`. The cursor starts at
    /// [`Opener::end`] and is left at the returned end offset.
    fn find_closer(&self, cursor: &mut Cursor<'_>, opener: &Opener) -> Closing;
}

fn eat_through_or_end(cursor: &mut Cursor<'_>, needle: &[u8]) -> Closing {
    if cursor.eat_through(needle) {
        Closing::Closed(cursor.pos())
    } else {
        Closing::Unterminated(cursor.pos())
    }
}

/// `<#-- ... -->` and `[#-- ... --]`.
#[derive(Debug, Clone, Copy)]
pub struct FtlCommentRule {
    tag_syntax: TagSyntax,
}

impl FtlCommentRule {
    pub fn new(tag_syntax: TagSyntax) -> Self {
        Self { tag_syntax }
    }
}

impl PartitionRule for FtlCommentRule {
    fn kind(&self) -> PartitionKind {
        PartitionKind::FtlComment
    }

    fn match_opener(&self, cursor: &Cursor<'_>) -> Option<Opener> {
        self.tag_syntax
            .notations()
            .find(|n| cursor.current() == Some(n.open_byte()) && cursor.starts_with_at(1, b"#--"))
            .map(|notation| Opener {
                kind: PartitionKind::FtlComment,
                start: cursor.pos(),
                len: 4,
                notation,
            })
    }

    fn find_closer(&self, cursor: &mut Cursor<'_>, opener: &Opener) -> Closing {
        eat_through_or_end(cursor, opener.notation.comment_close())
    }
}

/// Whether a tag rule needs a name after its sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagName {
    Required,
    /// `</@>` closes the innermost macro call without naming it.
    Optional,
}

/// Directive and macro-call tags in either notation.
#[derive(Debug, Clone, Copy)]
pub struct TagRule {
    kind: PartitionKind,
    sigil: &'static [u8],
    name: TagName,
    tag_syntax: TagSyntax,
}

impl TagRule {
    /// `<#name ...>`, `[#name ...]`
    pub fn directive_start(tag_syntax: TagSyntax) -> Self {
        Self {
            kind: PartitionKind::DirectiveStart,
            sigil: b"#",
            name: TagName::Required,
            tag_syntax,
        }
    }

    /// `</#name>`, `[/#name]`
    pub fn directive_end(tag_syntax: TagSyntax) -> Self {
        Self {
            kind: PartitionKind::DirectiveEnd,
            sigil: b"/#",
            name: TagName::Required,
            tag_syntax,
        }
    }

    /// `<@name ...>`, `[@name ...]`
    pub fn macro_call_start(tag_syntax: TagSyntax) -> Self {
        Self {
            kind: PartitionKind::MacroCallStart,
            sigil: b"@",
            name: TagName::Required,
            tag_syntax,
        }
    }

    /// `</@name>`, `[/@]`
    pub fn macro_call_end(tag_syntax: TagSyntax) -> Self {
        Self {
            kind: PartitionKind::MacroCallEnd,
            sigil: b"/@",
            name: TagName::Optional,
            tag_syntax,
        }
    }

    fn match_notation(&self, cursor: &Cursor<'_>, notation: Notation) -> Option<usize> {
        if cursor.current() != Some(notation.open_byte()) || !cursor.starts_with_at(1, self.sigil) {
            return None;
        }
        let mut probe = *cursor;
        probe.advance_by(1 + self.sigil.len());
        match probe.current() {
            Some(b) if is_name_start(b) => probe.eat_while(is_tag_name_continue),
            _ if self.name == TagName::Optional => {}
            _ => return None,
        }
        Some(probe.pos() - cursor.pos())
    }
}

impl PartitionRule for TagRule {
    fn kind(&self) -> PartitionKind {
        self.kind
    }

    fn match_opener(&self, cursor: &Cursor<'_>) -> Option<Opener> {
        self.tag_syntax.notations().find_map(|notation| {
            self.match_notation(cursor, notation).map(|len| Opener {
                kind: self.kind,
                start: cursor.pos(),
                len,
                notation,
            })
        })
    }

    fn find_closer(&self, cursor: &mut Cursor<'_>, opener: &Opener) -> Closing {
        if skip_expression(cursor, opener.terminator()) {
            Closing::Closed(cursor.pos())
        } else {
            Closing::Unterminated(cursor.pos())
        }
    }
}

/// Returns the interpolation opener at the cursor under `syntax`.
pub(crate) fn interpolation_opener_at(
    cursor: &Cursor<'_>,
    syntax: InterpolationSyntax,
) -> Option<Notation> {
    syntax
        .openers()
        .iter()
        .find(|opener| cursor.starts_with(opener))
        .map(|opener| Notation::from_open_byte(opener[0]).unwrap_or(Notation::Angle))
}

/// `${...}`, `#{...}` and `[=...]`.
#[derive(Debug, Clone, Copy)]
pub struct InterpolationRule {
    syntax: InterpolationSyntax,
}

impl InterpolationRule {
    pub fn new(syntax: InterpolationSyntax) -> Self {
        Self { syntax }
    }
}

impl PartitionRule for InterpolationRule {
    fn kind(&self) -> PartitionKind {
        PartitionKind::Interpolation
    }

    fn match_opener(&self, cursor: &Cursor<'_>) -> Option<Opener> {
        interpolation_opener_at(cursor, self.syntax).map(|notation| Opener {
            kind: PartitionKind::Interpolation,
            start: cursor.pos(),
            len: 2,
            notation,
        })
    }

    fn find_closer(&self, cursor: &mut Cursor<'_>, opener: &Opener) -> Closing {
        if skip_expression(cursor, opener.terminator()) {
            Closing::Closed(cursor.pos())
        } else {
            Closing::Unterminated(cursor.pos())
        }
    }
}

/// `<!-- ... -->`
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCommentRule;

impl PartitionRule for XmlCommentRule {
    fn kind(&self) -> PartitionKind {
        PartitionKind::XmlComment
    }

    fn match_opener(&self, cursor: &Cursor<'_>) -> Option<Opener> {
        cursor.starts_with(b"<!--").then(|| Opener {
            kind: PartitionKind::XmlComment,
            start: cursor.pos(),
            len: 4,
            notation: Notation::Angle,
        })
    }

    fn find_closer(&self, cursor: &mut Cursor<'_>, _opener: &Opener) -> Closing {
        eat_through_or_end(cursor, b"-->")
    }
}

#[inline]
pub(crate) fn is_xml_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80
}

#[inline]
pub(crate) fn is_xml_name_continue(b: u8) -> bool {
    is_xml_name_start(b) || b.is_ascii_digit() || b == b'-' || b == b'.'
}

/// Returns true if an FTL directive or macro tag opens at the cursor.
pub(crate) fn ftl_tag_opens_at(cursor: &Cursor<'_>, tag_syntax: TagSyntax) -> bool {
    tag_syntax.notations().any(|notation| {
        cursor.current() == Some(notation.open_byte())
            && match cursor.peek(1) {
                Some(b'#' | b'@') => true,
                Some(b'/') => matches!(cursor.peek(2), Some(b'#' | b'@')),
                _ => false,
            }
    })
}

/// Host markup tags: `<name ...>`, `</name>`, `<?target ...?>`, `<!DOCTYPE ...>`.
///
/// A tag ends at the first `>` outside quoted attribute values. Interpolations
/// are skipped as a whole, and the tag is cut short in front of an FTL
/// directive or macro tag so the latter gets a partition of its own.
#[derive(Debug, Clone, Copy)]
pub struct XmlTagRule {
    tag_syntax: TagSyntax,
    interpolation_syntax: InterpolationSyntax,
}

impl XmlTagRule {
    pub fn new(tag_syntax: TagSyntax, interpolation_syntax: InterpolationSyntax) -> Self {
        Self {
            tag_syntax,
            interpolation_syntax,
        }
    }

    fn skip_interpolation(&self, cursor: &mut Cursor<'_>) -> bool {
        match interpolation_opener_at(cursor, self.interpolation_syntax) {
            Some(notation) => {
                cursor.advance_by(2);
                let terminator = match notation {
                    Notation::Angle => Terminator::Brace,
                    Notation::Square => Terminator::Bracket,
                };
                skip_expression(cursor, terminator);
                true
            }
            None => false,
        }
    }

    /// Skips a quoted attribute value. Stops in front of an FTL tag inside
    /// the value, leaving the cursor on its opener.
    fn skip_quoted(&self, cursor: &mut Cursor<'_>, quote: u8) {
        cursor.advance();
        while let Some(b) = cursor.current() {
            if b == quote {
                cursor.advance();
                return;
            }
            if ftl_tag_opens_at(cursor, self.tag_syntax) {
                return;
            }
            if !self.skip_interpolation(cursor) {
                cursor.advance_char();
            }
        }
    }
}

impl PartitionRule for XmlTagRule {
    fn kind(&self) -> PartitionKind {
        PartitionKind::XmlTag
    }

    fn match_opener(&self, cursor: &Cursor<'_>) -> Option<Opener> {
        if cursor.current() != Some(b'<') {
            return None;
        }
        let name_at = match cursor.peek(1)? {
            b'/' | b'?' => 2,
            b'!' if cursor.peek(2).is_some_and(|b| b.is_ascii_alphabetic()) => 2,
            b if is_xml_name_start(b) => 1,
            _ => return None,
        };
        if name_at == 2 && !cursor.peek(2).is_some_and(is_xml_name_start) {
            return None;
        }
        let mut probe = *cursor;
        probe.advance_by(name_at);
        probe.eat_while(is_xml_name_continue);
        Some(Opener {
            kind: PartitionKind::XmlTag,
            start: cursor.pos(),
            len: probe.pos() - cursor.pos(),
            notation: Notation::Angle,
        })
    }

    fn find_closer(&self, cursor: &mut Cursor<'_>, _opener: &Opener) -> Closing {
        while let Some(b) = cursor.current() {
            match b {
                b'>' => {
                    cursor.advance();
                    return Closing::Closed(cursor.pos());
                }
                b'"' | b'\'' => self.skip_quoted(cursor, b),
                _ if ftl_tag_opens_at(cursor, self.tag_syntax) => {
                    return Closing::Closed(cursor.pos());
                }
                _ => {
                    if !self.skip_interpolation(cursor) {
                        cursor.advance_char();
                    }
                }
            }
        }
        Closing::Unterminated(cursor.pos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(rule: &dyn PartitionRule, source: &str) -> Option<(Opener, Closing)> {
        let doc = source;
        let cursor = Cursor::new(&doc);
        let opener = rule.match_opener(&cursor)?;
        let mut closer_cursor = cursor;
        closer_cursor.set_pos(opener.end());
        let closing = rule.find_closer(&mut closer_cursor, &opener);
        Some((opener, closing))
    }

    #[test]
    fn test_ftl_comment_both_notations() {
        let rule = FtlCommentRule::new(TagSyntax::Both);
        let (opener, closing) = run(&rule, "<#-- a --> b").unwrap();
        assert_eq!(opener.notation, Notation::Angle);
        assert_eq!(closing, Closing::Closed(10));

        let (opener, closing) = run(&rule, "[#-- --> --] b").unwrap();
        assert_eq!(opener.notation, Notation::Square);
        assert_eq!(closing, Closing::Closed(12));
    }

    #[test]
    fn test_ftl_comment_unterminated() {
        let rule = FtlCommentRule::new(TagSyntax::Both);
        let (_, closing) = run(&rule, "<#-- never closed").unwrap();
        assert_eq!(closing, Closing::Unterminated(17));
        assert!(!closing.is_terminated());
    }

    #[test]
    fn test_comment_notation_respects_tag_syntax() {
        let rule = FtlCommentRule::new(TagSyntax::AngleBracket);
        assert!(run(&rule, "[#-- x --]").is_none());
        assert!(run(&rule, "<#-- x -->").is_some());
    }

    #[test]
    fn test_directive_opener_includes_name() {
        let rule = TagRule::directive_start(TagSyntax::Both);
        let (opener, closing) = run(&rule, "<#list xs as x>tail").unwrap();
        assert_eq!(opener.len, "<#list".len());
        assert_eq!(closing, Closing::Closed(15));

        let (opener, closing) = run(&rule, "[#if (a > b)]x").unwrap();
        assert_eq!(opener.len, 4);
        assert_eq!(closing.end(), 13);
    }

    #[test]
    fn test_directive_requires_name() {
        let rule = TagRule::directive_start(TagSyntax::Both);
        assert!(run(&rule, "<# x>").is_none());
        assert!(run(&rule, "<#-- x -->").is_none());
        assert!(run(&rule, "< #if>").is_none());
    }

    #[test]
    fn test_directive_end_and_macro_end() {
        let rule = TagRule::directive_end(TagSyntax::Both);
        let (_, closing) = run(&rule, "[/#list]").unwrap();
        assert_eq!(closing, Closing::Closed(8));

        let rule = TagRule::macro_call_end(TagSyntax::Both);
        let (opener, closing) = run(&rule, "</@>").unwrap();
        assert_eq!(opener.len, 3);
        assert_eq!(closing, Closing::Closed(4));
    }

    #[test]
    fn test_macro_call_with_namespace() {
        let rule = TagRule::macro_call_start(TagSyntax::Both);
        let (opener, closing) = run(&rule, r#"<@layout.page title="a > b"/>"#).unwrap();
        assert_eq!(opener.len, "<@layout.page".len());
        assert_eq!(closing, Closing::Closed(29));
    }

    #[test]
    fn test_interpolation_rule() {
        let rule = InterpolationRule::new(InterpolationSyntax::Legacy);
        let (opener, closing) = run(&rule, "${ {'a': '}'}['a'] }!").unwrap();
        assert_eq!(opener.notation, Notation::Angle);
        assert_eq!(closing, Closing::Closed(20));
        assert!(run(&rule, "#{n}").is_some());
        assert!(run(&rule, "[=n]").is_none());

        let rule = InterpolationRule::new(InterpolationSyntax::SquareBracket);
        let (opener, closing) = run(&rule, "[=a[0]]").unwrap();
        assert_eq!(opener.notation, Notation::Square);
        assert_eq!(closing, Closing::Closed(7));
        assert!(run(&rule, "${x}").is_none());
    }

    #[test]
    fn test_xml_tag_rule() {
        let rule = XmlTagRule::new(TagSyntax::Both, InterpolationSyntax::Legacy);
        let (opener, closing) = run(&rule, r#"<a href="x>y" title='${a > b}'>z"#).unwrap();
        assert_eq!(opener.len, 2);
        assert_eq!(closing, Closing::Closed(31));

        let (_, closing) = run(&rule, "<input <#if c>checked</#if>>").unwrap();
        assert_eq!(closing, Closing::Closed(7));

        assert!(run(&rule, "<#if x>").is_none());
        assert!(run(&rule, "< p").is_none());
        assert!(run(&rule, "<!-- c -->").is_none());
        assert!(run(&rule, "<!DOCTYPE html>").is_some());
        assert!(run(&rule, "<?xml version=\"1.0\"?>").is_some());
    }

    #[test]
    fn test_xml_tag_cut_before_ftl_tag_in_attribute_value() {
        let rule = XmlTagRule::new(TagSyntax::Both, InterpolationSyntax::Legacy);
        let (_, closing) = run(&rule, r#"<a class="<#if on>x</#if>">t</a>"#).unwrap();
        assert_eq!(closing, Closing::Closed(10));

        let (_, closing) = run(&rule, "<a title='[@tip/]'>").unwrap();
        assert_eq!(closing, Closing::Closed(10));

        let rule = XmlTagRule::new(TagSyntax::SquareBracket, InterpolationSyntax::Legacy);
        let (_, closing) = run(&rule, r#"<a class="<#if on>">"#).unwrap();
        assert_eq!(closing, Closing::Closed(20));
    }
}
