// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Coloring tokenizers: one per partition kind, each splitting the text of a
//! single partition into [`Token`]s that tile it.

use std::fmt;

use crate::syntax::config::{InterpolationSyntax, Notation, ScannerConfig};
use crate::syntax::cursor::Cursor;
use crate::syntax::expression::{
    ExprItem, ExpressionLexer, Terminator, is_blank, is_tag_name_continue,
};
use crate::syntax::partition::PartitionKind;
use crate::syntax::rules::{interpolation_opener_at, is_xml_name_continue, is_xml_name_start};
use crate::syntax::token::{Token, TokenKind, TokenSink};

/// Literal keywords recognized inside expressions.
pub const KEYWORDS: &[&str] = &["true", "false", "as", "in", "using", "gt", "gte", "lt", "lte"];

/// Splits the text of one partition into tokens.
pub trait ColoringTokenizer: Send + Sync + fmt::Debug {
    /// Tokenizes `text`, which starts at document offset `base`.
    ///
    /// The returned tokens are in order, non-empty, and cover `text` exactly.
    fn tokenize(&self, text: &str, base: usize) -> Vec<Token>;
}

/// Colors the whole partition with one kind.
#[derive(Debug, Clone, Copy)]
pub struct UniformTokenizer {
    kind: TokenKind,
}

impl UniformTokenizer {
    pub fn new(kind: TokenKind) -> Self {
        Self { kind }
    }
}

impl ColoringTokenizer for UniformTokenizer {
    fn tokenize(&self, text: &str, base: usize) -> Vec<Token> {
        let mut sink = TokenSink::new();
        sink.push(self.kind, base, text.len());
        sink.finish()
    }
}

/// Colors directives, macro calls and interpolations.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionTokenizer {
    /// Kind of the opener, the tag name and the terminator
    delimiter: TokenKind,
    interpolation: bool,
}

impl ExpressionTokenizer {
    pub fn directive() -> Self {
        Self {
            delimiter: TokenKind::Directive,
            interpolation: false,
        }
    }

    pub fn macro_call() -> Self {
        Self {
            delimiter: TokenKind::MacroCall,
            interpolation: false,
        }
    }

    pub fn interpolation() -> Self {
        Self {
            delimiter: TokenKind::Interpolation,
            interpolation: true,
        }
    }

    /// Returns the length of the opener and what terminates the expression.
    fn opener(&self, cursor: &Cursor<'_>) -> (usize, Terminator) {
        let notation = cursor
            .current()
            .and_then(Notation::from_open_byte)
            .unwrap_or(Notation::Angle);
        if self.interpolation {
            let terminator = match notation {
                Notation::Angle => Terminator::Brace,
                Notation::Square => Terminator::Bracket,
            };
            return (2, terminator);
        }
        let mut probe = *cursor;
        probe.advance();
        for _ in 0..2 {
            if matches!(probe.current(), Some(b'/' | b'#' | b'@')) {
                probe.advance();
            }
        }
        probe.eat_while(is_tag_name_continue);
        (probe.pos(), Terminator::Tag(notation))
    }
}

fn expression_item_kind(item: ExprItem, text: &str, delimiter: TokenKind) -> TokenKind {
    match item {
        ExprItem::Identifier if KEYWORDS.contains(&text) => TokenKind::Keyword,
        ExprItem::Identifier => TokenKind::Variable,
        ExprItem::String => TokenKind::String,
        ExprItem::Comment => TokenKind::Comment,
        ExprItem::Close => delimiter,
        ExprItem::Blank | ExprItem::BuiltIn | ExprItem::Number | ExprItem::Operator => {
            TokenKind::OtherExpressionPart
        }
    }
}

impl ColoringTokenizer for ExpressionTokenizer {
    fn tokenize(&self, text: &str, base: usize) -> Vec<Token> {
        let doc = text;
        let mut cursor = Cursor::new(&doc);
        let mut sink = TokenSink::new();

        let (opener_len, terminator) = self.opener(&cursor);
        let opener_len = opener_len.min(text.len());
        sink.push(self.delimiter, base, opener_len);
        cursor.set_pos(opener_len);

        let mut lexer = ExpressionLexer::new(cursor, terminator);
        for token in lexer.by_ref() {
            let lexeme = text.get(token.start..token.start + token.len).unwrap_or("");
            let kind = expression_item_kind(token.item, lexeme, self.delimiter);
            sink.push(kind, base + token.start, token.len);
        }

        // Text after an early terminator; only reachable when the partition
        // was cut differently from the lexer's view.
        let tail = lexer.pos();
        sink.push(TokenKind::OtherExpressionPart, base + tail, text.len() - tail);
        sink.finish()
    }
}

/// Colors host markup tags.
#[derive(Debug, Clone, Copy)]
pub struct XmlTagTokenizer {
    interpolation_syntax: InterpolationSyntax,
}

impl XmlTagTokenizer {
    pub fn new(interpolation_syntax: InterpolationSyntax) -> Self {
        Self {
            interpolation_syntax,
        }
    }

    /// Consumes an interpolation at the cursor and returns its length.
    fn interpolation(&self, cursor: &mut Cursor<'_>) -> Option<usize> {
        let notation = interpolation_opener_at(cursor, self.interpolation_syntax)?;
        let start = cursor.pos();
        cursor.advance_by(2);
        let terminator = match notation {
            Notation::Angle => Terminator::Brace,
            Notation::Square => Terminator::Bracket,
        };
        let mut lexer = ExpressionLexer::new(*cursor, terminator);
        lexer.by_ref().for_each(drop);
        cursor.set_pos(lexer.pos());
        Some(cursor.pos() - start)
    }

    fn quoted(&self, cursor: &mut Cursor<'_>, sink: &mut TokenSink, base: usize) {
        let Some(quote) = cursor.current() else {
            return;
        };
        let mut run_start = cursor.pos();
        cursor.advance();
        while let Some(b) = cursor.current() {
            if b == quote {
                cursor.advance();
                break;
            }
            let at = cursor.pos();
            if let Some(len) = self.interpolation(cursor) {
                sink.push(TokenKind::String, base + run_start, at - run_start);
                sink.push(TokenKind::Interpolation, base + at, len);
                run_start = cursor.pos();
            } else {
                cursor.advance_char();
            }
        }
        sink.push(TokenKind::String, base + run_start, cursor.pos() - run_start);
    }
}

impl ColoringTokenizer for XmlTagTokenizer {
    fn tokenize(&self, text: &str, base: usize) -> Vec<Token> {
        let doc = text;
        let mut cursor = Cursor::new(&doc);
        let mut sink = TokenSink::new();

        if cursor.current() == Some(b'<') {
            cursor.advance();
            if matches!(cursor.current(), Some(b'/' | b'?' | b'!')) {
                cursor.advance();
            }
            cursor.eat_while(is_xml_name_continue);
            sink.push(TokenKind::XmlTag, base, cursor.pos());
        }

        while let Some(b) = cursor.current() {
            let start = cursor.pos();
            match b {
                b if is_blank(b) => {
                    cursor.eat_while(is_blank);
                    sink.push(TokenKind::Text, base + start, cursor.pos() - start);
                }
                b'"' | b'\'' => self.quoted(&mut cursor, &mut sink, base),
                b'>' => {
                    cursor.advance();
                    sink.push(TokenKind::XmlTag, base + start, 1);
                }
                b'/' | b'?' if cursor.peek(1) == Some(b'>') => {
                    cursor.advance_by(2);
                    sink.push(TokenKind::XmlTag, base + start, 2);
                }
                _ => {
                    if let Some(len) = self.interpolation(&mut cursor) {
                        sink.push(TokenKind::Interpolation, base + start, len);
                    } else if is_xml_name_start(b) {
                        cursor.eat_while(is_xml_name_continue);
                        sink.push(TokenKind::XmlAttribute, base + start, cursor.pos() - start);
                    } else {
                        cursor.advance_char();
                        sink.push(TokenKind::Text, base + start, cursor.pos() - start);
                    }
                }
            }
        }
        sink.finish()
    }
}

/// Builds the tokenizer bound to `kind` under `config`.
pub(crate) fn tokenizer_for(kind: PartitionKind, config: &ScannerConfig) -> Box<dyn ColoringTokenizer> {
    match kind {
        PartitionKind::FtlComment => Box::new(UniformTokenizer::new(TokenKind::Comment)),
        PartitionKind::DirectiveStart | PartitionKind::DirectiveEnd => {
            Box::new(ExpressionTokenizer::directive())
        }
        PartitionKind::MacroCallStart | PartitionKind::MacroCallEnd => {
            Box::new(ExpressionTokenizer::macro_call())
        }
        PartitionKind::Interpolation => Box::new(ExpressionTokenizer::interpolation()),
        PartitionKind::XmlComment => Box::new(UniformTokenizer::new(TokenKind::XmlComment)),
        PartitionKind::XmlTag => Box::new(XmlTagTokenizer::new(config.interpolation_syntax)),
        PartitionKind::Other => Box::new(UniformTokenizer::new(TokenKind::Text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(tokens: &[Token], text: &str, base: usize) -> Vec<(TokenKind, String)> {
        tokens
            .iter()
            .map(|t| (t.kind, text[t.start - base..t.end() - base].to_string()))
            .collect()
    }

    fn assert_tiles(tokens: &[Token], text: &str, base: usize) {
        let mut at = base;
        for token in tokens {
            assert_eq!(token.start, at);
            assert!(token.len > 0);
            at = token.end();
        }
        assert_eq!(at, base + text.len());
    }

    #[test]
    fn test_directive_tokens() {
        use TokenKind::*;
        let text = "<#list users as user>";
        let tokens = ExpressionTokenizer::directive().tokenize(text, 10);
        assert_tiles(&tokens, text, 10);
        assert_eq!(
            kinds(&tokens, text, 10),
            vec![
                (Directive, "<#list".into()),
                (OtherExpressionPart, " ".into()),
                (Variable, "users".into()),
                (OtherExpressionPart, " ".into()),
                (Keyword, "as".into()),
                (OtherExpressionPart, " ".into()),
                (Variable, "user".into()),
                (Directive, ">".into()),
            ]
        );
    }

    #[test]
    fn test_end_tag_and_macro_tokens() {
        use TokenKind::*;
        let text = "[/#if]";
        assert_eq!(
            kinds(&ExpressionTokenizer::directive().tokenize(text, 0), text, 0),
            vec![(Directive, "[/#if".into()), (Directive, "]".into())]
        );

        let text = "<@ui.button label='Go' disabled=true/>";
        assert_eq!(
            kinds(&ExpressionTokenizer::macro_call().tokenize(text, 0), text, 0),
            vec![
                (MacroCall, "<@ui.button".into()),
                (OtherExpressionPart, " ".into()),
                (Variable, "label".into()),
                (OtherExpressionPart, "=".into()),
                (String, "'Go'".into()),
                (OtherExpressionPart, " ".into()),
                (Variable, "disabled".into()),
                (OtherExpressionPart, "=".into()),
                (Keyword, "true".into()),
                (MacroCall, "/>".into()),
            ]
        );
    }

    #[test]
    fn test_interpolation_tokens() {
        use TokenKind::*;
        let text = "${price?string(\"0.00\")}";
        let tokens = ExpressionTokenizer::interpolation().tokenize(text, 3);
        assert_tiles(&tokens, text, 3);
        assert_eq!(
            kinds(&tokens, text, 3),
            vec![
                (Interpolation, "${".into()),
                (Variable, "price".into()),
                (OtherExpressionPart, "?string(".into()),
                (String, "\"0.00\"".into()),
                (OtherExpressionPart, ")".into()),
                (Interpolation, "}".into()),
            ]
        );

        let text = "[=a[0]]";
        assert_eq!(
            kinds(&ExpressionTokenizer::interpolation().tokenize(text, 0), text, 0),
            vec![
                (Interpolation, "[=".into()),
                (Variable, "a".into()),
                (OtherExpressionPart, "[0]".into()),
                (Interpolation, "]".into()),
            ]
        );
    }

    #[test]
    fn test_unterminated_directive_tiles() {
        let text = "<#if x == 'open";
        let tokens = ExpressionTokenizer::directive().tokenize(text, 0);
        assert_tiles(&tokens, text, 0);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::String));
    }

    #[test]
    fn test_xml_tag_tokens() {
        use TokenKind::*;
        let text = r#"<a href="/u/${id}" data-x=1>"#;
        let tokens = XmlTagTokenizer::new(InterpolationSyntax::Legacy).tokenize(text, 0);
        assert_tiles(&tokens, text, 0);
        assert_eq!(
            kinds(&tokens, text, 0),
            vec![
                (XmlTag, "<a".into()),
                (Text, " ".into()),
                (XmlAttribute, "href".into()),
                (Text, "=".into()),
                (String, "\"/u/".into()),
                (Interpolation, "${id}".into()),
                (String, "\"".into()),
                (Text, " ".into()),
                (XmlAttribute, "data-x".into()),
                (Text, "=1".into()),
                (XmlTag, ">".into()),
            ]
        );
    }

    #[test]
    fn test_xml_tag_self_closing_and_processing_instruction() {
        use TokenKind::*;
        let text = "<br/>";
        assert_eq!(
            kinds(&XmlTagTokenizer::new(InterpolationSyntax::Legacy).tokenize(text, 0), text, 0),
            vec![(XmlTag, "<br".into()), (XmlTag, "/>".into())]
        );
        let text = "<?xml version='1.0'?>";
        let tokens = XmlTagTokenizer::new(InterpolationSyntax::Legacy).tokenize(text, 0);
        assert_tiles(&tokens, text, 0);
        assert_eq!(tokens.first().map(|t| t.len), Some(5));
        assert_eq!(tokens.last().map(|t| (t.kind, t.len)), Some((XmlTag, 2)));
    }

    #[test]
    fn test_uniform_tokenizer() {
        let tokens = UniformTokenizer::new(TokenKind::Comment).tokenize("<#-- x -->", 5);
        assert_eq!(tokens, vec![Token::new(TokenKind::Comment, 5, 10)]);
        assert!(UniformTokenizer::new(TokenKind::Text).tokenize("", 0).is_empty());
    }
}
