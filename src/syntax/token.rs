// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Coloring tokens produced inside a partition.

use std::ops::Range;

/// Display classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Directive delimiters and names: `[#assign`, `</#if`, `]`, `/>`
    Directive,
    /// Macro call delimiters and names: `<@layout`, `/>`
    MacroCall,
    /// Interpolation delimiters: `${`, `#{`, `[=`, `}`, `]`
    Interpolation,
    /// Literal keywords inside expressions: `true`, `as`, `gt`
    Keyword,
    /// Identifiers inside expressions
    Variable,
    /// String literals
    String,
    /// FTL comments, standalone or nested in a tag
    Comment,
    /// Operators, numbers, brackets, whitespace and built-ins inside expressions
    OtherExpressionPart,
    /// Host text
    Text,
    /// XML tag delimiters and names
    XmlTag,
    /// XML attribute names
    XmlAttribute,
    /// XML comments
    XmlComment,
}

impl TokenKind {
    /// Stable name of this kind, used as a style key by presentation layers.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Directive => "directive",
            TokenKind::MacroCall => "macro-call",
            TokenKind::Interpolation => "interpolation",
            TokenKind::Keyword => "keyword",
            TokenKind::Variable => "variable",
            TokenKind::String => "string",
            TokenKind::Comment => "comment",
            TokenKind::OtherExpressionPart => "other-expression-part",
            TokenKind::Text => "text",
            TokenKind::XmlTag => "xml-tag",
            TokenKind::XmlAttribute => "xml-attribute",
            TokenKind::XmlComment => "xml-comment",
        }
    }

    /// Adjacent tokens of a mergeable kind are coalesced into one.
    pub(crate) fn is_mergeable(self) -> bool {
        matches!(self, TokenKind::OtherExpressionPart | TokenKind::Text)
    }
}

/// A colored span of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    /// Absolute byte offset in the document
    pub start: usize,
    /// Length in bytes; never zero
    pub len: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, len: usize) -> Self {
        Self { kind, start, len }
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Accumulates tokens left to right, merging adjacent mergeable runs and
/// dropping empty spans.
#[derive(Debug, Default)]
pub(crate) struct TokenSink {
    tokens: Vec<Token>,
}

impl TokenSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, kind: TokenKind, start: usize, len: usize) {
        if len == 0 {
            return;
        }
        if let Some(last) = self.tokens.last_mut() {
            if last.kind == kind && kind.is_mergeable() && last.end() == start {
                last.len += len;
                return;
            }
        }
        self.tokens.push(Token::new(kind, start, len));
    }

    pub(crate) fn finish(self) -> Vec<Token> {
        self.tokens
    }
}
