// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Read-only document abstraction consumed by the scanners.

use std::borrow::Cow;
use std::ops::Range;

/// Random-access view over the UTF-8 text being scanned.
///
/// Offsets are byte offsets. Scanners only ever split the text on ASCII
/// delimiters or whole-character steps, so every range they ask for lies on
/// character boundaries.
pub trait Document {
    /// Length of the document in bytes.
    fn len(&self) -> usize;

    /// Returns true if the document has no content.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the byte at `offset`, or `None` past the end.
    fn byte_at(&self, offset: usize) -> Option<u8>;

    /// Returns the text in `range`, or `None` if the range is out of bounds or
    /// does not fall on character boundaries.
    fn slice(&self, range: Range<usize>) -> Option<Cow<'_, str>>;
}

impl Document for &str {
    fn len(&self) -> usize {
        str::len(self)
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.as_bytes().get(offset).copied()
    }

    fn slice(&self, range: Range<usize>) -> Option<Cow<'_, str>> {
        self.get(range).map(Cow::Borrowed)
    }
}

impl Document for String {
    fn len(&self) -> usize {
        String::len(self)
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.as_bytes().get(offset).copied()
    }

    fn slice(&self, range: Range<usize>) -> Option<Cow<'_, str>> {
        self.get(range).map(Cow::Borrowed)
    }
}
