// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Byte cursor over a [`Document`], shared by the partition scanner, the
//! partitioning rules and the coloring tokenizers.

use std::fmt;

use crate::syntax::document::Document;

/// Returns the width in bytes of the UTF-8 sequence introduced by `lead`.
///
/// Continuation bytes report a width of 1 so a cursor that somehow lands in
/// the middle of a character still makes progress.
#[inline]
pub(crate) fn utf8_width(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

/// A position within a document, bounded by an exclusive end offset.
///
/// The cursor is [`Copy`], so rules can probe ahead on a copy and throw it
/// away when the probe fails.
#[derive(Clone, Copy)]
pub struct Cursor<'d> {
    doc: &'d dyn Document,
    pos: usize,
    end: usize,
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("pos", &self.pos)
            .field("end", &self.end)
            .finish()
    }
}

impl<'d> Cursor<'d> {
    /// Creates a cursor at offset 0 covering the whole document.
    pub fn new(doc: &'d dyn Document) -> Self {
        Self {
            doc,
            pos: 0,
            end: doc.len(),
        }
    }

    /// Creates a cursor at `pos`, clamped to the document length.
    pub fn at(doc: &'d dyn Document, pos: usize) -> Self {
        let end = doc.len();
        Self {
            doc,
            pos: pos.min(end),
            end,
        }
    }

    /// The document this cursor reads from.
    pub fn document(&self) -> &'d dyn Document {
        self.doc
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to `pos`, clamped to the end offset.
    #[inline]
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.end);
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.end
    }

    /// Returns the byte under the cursor, or `None` at the end.
    #[inline]
    pub fn current(&self) -> Option<u8> {
        self.peek(0)
    }

    /// Returns the byte `n` positions ahead of the cursor.
    #[inline]
    pub fn peek(&self, n: usize) -> Option<u8> {
        let offset = self.pos.checked_add(n)?;
        if offset < self.end {
            self.doc.byte_at(offset)
        } else {
            None
        }
    }

    /// Returns true if the bytes at the cursor equal `needle`.
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.starts_with_at(0, needle)
    }

    /// Returns true if the bytes `n` positions ahead of the cursor equal `needle`.
    pub fn starts_with_at(&self, n: usize, needle: &[u8]) -> bool {
        needle
            .iter()
            .enumerate()
            .all(|(i, &b)| self.peek(n + i) == Some(b))
    }

    /// Advances by one byte.
    #[inline]
    pub fn advance(&mut self) {
        self.advance_by(1);
    }

    /// Advances by `n` bytes, stopping at the end offset.
    #[inline]
    pub fn advance_by(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n).min(self.end);
    }

    /// Advances past the whole character under the cursor.
    #[inline]
    pub fn advance_char(&mut self) {
        if let Some(b) = self.current() {
            self.advance_by(utf8_width(b));
        }
    }

    /// Advances while `pred` holds for the current byte.
    pub fn eat_while(&mut self, mut pred: impl FnMut(u8) -> bool) {
        while let Some(b) = self.current() {
            if !pred(b) {
                break;
            }
            self.advance();
        }
    }

    /// Advances until just past the next occurrence of `needle`.
    ///
    /// Returns `false` and leaves the cursor at the end offset if `needle`
    /// never occurs.
    pub fn eat_through(&mut self, needle: &[u8]) -> bool {
        while !self.is_eof() {
            if self.starts_with(needle) {
                self.advance_by(needle.len());
                return true;
            }
            self.advance_char();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_and_starts_with() {
        let doc = "<#-- x -->";
        let cursor = Cursor::new(&doc);
        assert_eq!(cursor.current(), Some(b'<'));
        assert_eq!(cursor.peek(3), Some(b'-'));
        assert!(cursor.starts_with(b"<#--"));
        assert!(!cursor.starts_with(b"<#if"));
        assert_eq!(cursor.peek(100), None);
    }

    #[test]
    fn test_advance_char_steps_over_multibyte() {
        let doc = "é€x";
        let mut cursor = Cursor::new(&doc);
        cursor.advance_char();
        assert_eq!(cursor.pos(), 2);
        cursor.advance_char();
        assert_eq!(cursor.pos(), 5);
        cursor.advance_char();
        assert!(cursor.is_eof());
        cursor.advance_char();
        assert_eq!(cursor.pos(), 6);
    }

    #[test]
    fn test_eat_through() {
        let doc = "abc --> def";
        let mut cursor = Cursor::new(&doc);
        assert!(cursor.eat_through(b"-->"));
        assert_eq!(cursor.pos(), 7);
        assert!(!cursor.eat_through(b"-->"));
        assert_eq!(cursor.pos(), doc.len());
    }

    #[test]
    fn test_starts_with_does_not_read_past_end() {
        let doc = "<#-";
        let cursor = Cursor::new(&doc);
        assert!(!cursor.starts_with(b"<#--"));
    }
}
