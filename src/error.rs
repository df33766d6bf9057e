// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error type for the fallible edges of the crate.
//!
//! Scanning itself never fails; only reading template content from the
//! outside world does.

use std::io;

/// Errors raised while reading or sniffing template content.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying reader failed.
    #[error("failed to read template content: {0}")]
    Io(#[from] io::Error),

    /// A `\uXXXX` escape in a properties block was not followed by four hex digits.
    #[error("malformed \\uXXXX escape in properties line {line}")]
    MalformedEscape { line: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
