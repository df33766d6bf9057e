// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Lexer for the expression part of FTL tags and interpolations.
//!
//! The same lexer decides where a directive or interpolation partition ends
//! and how its interior is colored, so a closing character hidden in a
//! string literal, a nested comment or a bracket pair is skipped the same
//! way by both passes.

use crate::syntax::config::Notation;
use crate::syntax::cursor::Cursor;

/// Returns true for bytes that may start an FTL identifier.
///
/// Non-ASCII bytes are accepted wholesale so identifiers in any script are
/// consumed as one unit.
#[inline]
pub(crate) fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

#[inline]
pub(crate) fn is_name_continue(b: u8) -> bool {
    is_name_start(b) || b.is_ascii_digit()
}

/// Returns true for bytes that may continue a tag name such as `list` in
/// `<#list` or `ns.layout` in `<@ns.layout`.
#[inline]
pub(crate) fn is_tag_name_continue(b: u8) -> bool {
    is_name_continue(b) || b == b'.'
}

#[inline]
pub(crate) fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// What ends the expression being lexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Terminator {
    /// `>` or `/>` for angle tags, `]` or `/]` for square tags.
    Tag(Notation),
    /// `}` of `${...}` and `#{...}`.
    Brace,
    /// `]` of `[=...]`.
    Bracket,
}

impl Terminator {
    /// Notation of the comments nested in the expression and of the tags
    /// that may interrupt it.
    fn notation(self) -> Notation {
        match self {
            Terminator::Tag(notation) => notation,
            Terminator::Brace => Notation::Angle,
            Terminator::Bracket => Notation::Square,
        }
    }

    /// Whether an unbalanced closing bracket `b` terminates the expression.
    fn closes_with(self, b: u8) -> bool {
        match self {
            Terminator::Tag(Notation::Square) | Terminator::Bracket => b == b']',
            Terminator::Brace => b == b'}',
            Terminator::Tag(Notation::Angle) => false,
        }
    }
}

/// Lexical class of an expression item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExprItem {
    Blank,
    Identifier,
    /// `?name`
    BuiltIn,
    Number,
    Operator,
    String,
    Comment,
    /// The terminating sequence; always the last item.
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExprToken {
    pub item: ExprItem,
    pub start: usize,
    pub len: usize,
}

/// Iterator over the items of one expression, ending after the terminator or
/// at the end of the cursor's range.
#[derive(Debug)]
pub(crate) struct ExpressionLexer<'d> {
    cursor: Cursor<'d>,
    terminator: Terminator,
    depth: u32,
    closed: bool,
}

impl<'d> ExpressionLexer<'d> {
    pub(crate) fn new(cursor: Cursor<'d>, terminator: Terminator) -> Self {
        Self {
            cursor,
            terminator,
            depth: 0,
            closed: false,
        }
    }

    pub(crate) fn pos(&self) -> usize {
        self.cursor.pos()
    }

    /// Returns true once the terminator has been consumed.
    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    fn at_comment(&self) -> bool {
        let notation = self.terminator.notation();
        self.cursor.current() == Some(notation.open_byte()) && self.cursor.starts_with_at(1, b"#--")
    }

    /// Returns true at an FTL directive or macro tag opener such as `<#`,
    /// `</#`, `<@` or `</@`.
    fn at_tag_opener(&self) -> bool {
        let notation = self.terminator.notation();
        self.cursor.current() == Some(notation.open_byte())
            && match self.cursor.peek(1) {
                Some(b'#' | b'@') => true,
                Some(b'/') => matches!(self.cursor.peek(2), Some(b'#' | b'@')),
                _ => false,
            }
    }

    fn comment(&mut self) -> ExprItem {
        self.cursor.advance_by(4);
        self.cursor
            .eat_through(self.terminator.notation().comment_close());
        ExprItem::Comment
    }

    fn string(&mut self, raw: bool) -> ExprItem {
        let Some(quote) = self.cursor.current() else {
            return ExprItem::String;
        };
        self.cursor.advance();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                self.cursor.advance();
                break;
            }
            if b == b'\\' && !raw {
                self.cursor.advance();
            }
            self.cursor.advance_char();
        }
        ExprItem::String
    }

    fn number(&mut self) -> ExprItem {
        self.cursor.eat_while(|b| b.is_ascii_digit());
        if self.cursor.current() == Some(b'.')
            && self.cursor.peek(1).is_some_and(|b| b.is_ascii_digit())
        {
            self.cursor.advance();
            self.cursor.eat_while(|b| b.is_ascii_digit());
        }
        ExprItem::Number
    }

    fn punctuation(&mut self, b: u8) -> ExprItem {
        match b {
            b'(' | b'[' | b'{' => {
                self.depth += 1;
                self.cursor.advance();
                ExprItem::Operator
            }
            b')' | b']' | b'}' if self.depth > 0 => {
                self.depth -= 1;
                self.cursor.advance();
                ExprItem::Operator
            }
            b if self.depth == 0 && self.terminator.closes_with(b) => self.close(1),
            b'>' if self.depth == 0 && self.terminator == Terminator::Tag(Notation::Angle) => {
                self.close(1)
            }
            b'/' if self.depth == 0 => match self.terminator {
                Terminator::Tag(notation) if self.cursor.peek(1) == Some(notation.close_byte()) => {
                    self.close(2)
                }
                _ => {
                    self.cursor.advance();
                    ExprItem::Operator
                }
            },
            _ => {
                self.cursor.advance_char();
                ExprItem::Operator
            }
        }
    }

    fn close(&mut self, len: usize) -> ExprItem {
        self.cursor.advance_by(len);
        self.closed = true;
        ExprItem::Close
    }
}

impl Iterator for ExpressionLexer<'_> {
    type Item = ExprToken;

    fn next(&mut self) -> Option<ExprToken> {
        if self.closed {
            return None;
        }
        let start = self.cursor.pos();
        let b = self.cursor.current()?;
        // An unbalanced bracket ends at the next FTL tag instead of
        // swallowing the rest of the document.
        if self.depth > 0 && !self.at_comment() && self.at_tag_opener() {
            return None;
        }

        let item = match b {
            b if is_blank(b) => {
                self.cursor.eat_while(is_blank);
                ExprItem::Blank
            }
            b'"' | b'\'' => self.string(false),
            b'r' if matches!(self.cursor.peek(1), Some(b'"' | b'\'')) => {
                self.cursor.advance();
                self.string(true)
            }
            _ if self.at_comment() => self.comment(),
            b if is_name_start(b) => {
                self.cursor.eat_while(is_name_continue);
                ExprItem::Identifier
            }
            b'0'..=b'9' => self.number(),
            b'?' if self.cursor.peek(1).is_some_and(is_name_start) => {
                self.cursor.advance();
                self.cursor.eat_while(is_name_continue);
                ExprItem::BuiltIn
            }
            b => self.punctuation(b),
        };

        Some(ExprToken {
            item,
            start,
            len: self.cursor.pos() - start,
        })
    }
}

/// Consumes an expression starting at the cursor, leaving the cursor right
/// after its terminator or at the end of the range.
///
/// Returns whether the terminator was found.
pub(crate) fn skip_expression(cursor: &mut Cursor<'_>, terminator: Terminator) -> bool {
    let mut lexer = ExpressionLexer::new(*cursor, terminator);
    lexer.by_ref().for_each(drop);
    cursor.set_pos(lexer.pos());
    lexer.is_closed()
}
