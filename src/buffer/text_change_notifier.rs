// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Text change notifications.
//!
//! A notification describes one edit in byte offsets: `removed` bytes at
//! `offset` were replaced by `inserted` bytes.

/// Type of text change that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextChangeType {
    Insert,
    Delete,
    Replace,
}

/// Notification of a text change in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChangeNotification {
    /// Byte offset where the change starts
    pub offset: usize,
    /// Number of bytes removed at `offset`
    pub removed: usize,
    /// Number of bytes inserted at `offset`
    pub inserted: usize,
    pub change_type: TextChangeType,
}

impl TextChangeNotification {
    pub fn new(offset: usize, removed: usize, inserted: usize, change_type: TextChangeType) -> Self {
        Self {
            offset,
            removed,
            inserted,
            change_type,
        }
    }

    /// `len` bytes inserted at `offset`.
    pub fn insert(offset: usize, len: usize) -> Self {
        Self::new(offset, 0, len, TextChangeType::Insert)
    }

    /// `len` bytes deleted at `offset`.
    pub fn delete(offset: usize, len: usize) -> Self {
        Self::new(offset, len, 0, TextChangeType::Delete)
    }

    /// `removed` bytes at `offset` replaced by `inserted` bytes.
    pub fn replace(offset: usize, removed: usize, inserted: usize) -> Self {
        Self::new(offset, removed, inserted, TextChangeType::Replace)
    }

    /// End of the changed range in the document before the edit.
    pub fn old_end(&self) -> usize {
        self.offset + self.removed
    }

    /// End of the changed range in the document after the edit.
    pub fn new_end(&self) -> usize {
        self.offset + self.inserted
    }

    /// Change in document length.
    pub fn delta(&self) -> isize {
        self.inserted as isize - self.removed as isize
    }

    /// Maps an offset at or past [`TextChangeNotification::old_end`] in the
    /// old document to the new document.
    pub fn map_old_offset(&self, offset: usize) -> usize {
        offset - self.removed + self.inserted
    }
}

/// Derives the notification that turns `before` into `after`.
///
/// The changed range is found by trimming the common prefix and suffix, so
/// the result is the smallest single replacement. Both ends are kept on
/// character boundaries. Returns `None` if the texts are equal.
pub fn calculate_change(before: &str, after: &str) -> Option<TextChangeNotification> {
    if before == after {
        return None;
    }

    let mut prefix = before
        .bytes()
        .zip(after.bytes())
        .take_while(|(a, b)| a == b)
        .count();
    while !before.is_char_boundary(prefix) || !after.is_char_boundary(prefix) {
        prefix -= 1;
    }

    let max_suffix = before.len().min(after.len()) - prefix;
    let mut suffix = before
        .bytes()
        .rev()
        .zip(after.bytes().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();
    while !before.is_char_boundary(before.len() - suffix) || !after.is_char_boundary(after.len() - suffix) {
        suffix -= 1;
    }

    let removed = before.len() - prefix - suffix;
    let inserted = after.len() - prefix - suffix;
    Some(match (removed, inserted) {
        (0, _) => TextChangeNotification::insert(prefix, inserted),
        (_, 0) => TextChangeNotification::delete(prefix, removed),
        _ => TextChangeNotification::replace(prefix, removed, inserted),
    })
}
