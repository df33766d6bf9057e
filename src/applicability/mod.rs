// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Decides whether a document is an XML/HTML template this crate should
//! highlight.
//!
//! A document qualifies by its file name suffix, or by a header comment
//! declaring an XML or HTML content type:
//!
//! ```text
//! <#--
//!   ContentType: text/html
//! -->
//! ```

pub mod properties;

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use properties::Properties;

/// File name suffixes of XML/HTML templates, matched case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".xml",
    ".html",
    ".xhtml",
    ".htm",
    ".xml.ftl",
    ".html.ftl",
    ".xhtml.ftl",
    ".htm.ftl",
    ".ftlh",
    ".ftlx",
];

const COMMENT_PREFIX: &str = "<#--";

/// Property key naming the content type in a header comment.
const CONTENT_TYPE_KEY: &str = "ContentType";

/// The body of a leading FTL comment, up to the first `-->`.
static HEADER_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A<#--(.*?)-->").expect("header comment pattern is valid"));

/// Returns true if the file name ends with a supported suffix.
pub fn is_file_name_supported(file_name: &str) -> bool {
    let file_name = file_name.to_lowercase();
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|suffix| file_name.ends_with(suffix))
}

/// Returns true if the document is an XML/HTML template.
///
/// The file name is checked first; if it does not decide, the content is
/// sniffed for a header comment. Read failures and malformed headers are
/// logged and count as unsupported.
pub fn is_document_supported(file_name: Option<&str>, content: impl Read) -> bool {
    if file_name.is_some_and(is_file_name_supported) {
        return true;
    }
    match sniff_content_type(content) {
        Ok(Some(content_type)) => {
            let content_type = content_type.trim();
            !content_type.is_empty()
                && (content_type.contains("xml") || content_type.contains("html"))
        }
        Ok(None) => false,
        Err(err) => {
            tracing::warn!(file_name, error = %err, "failed to sniff template content type");
            false
        }
    }
}

/// [`is_document_supported`] for a file on disk.
pub fn is_path_supported(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    let file_name = path.file_name().map(|name| name.to_string_lossy());
    if file_name.as_deref().is_some_and(is_file_name_supported) {
        return true;
    }
    match File::open(path) {
        Ok(file) => is_document_supported(file_name.as_deref(), file),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to open template");
            false
        }
    }
}

/// Reads the declared content type from the header comment of `content`.
///
/// Leading blank lines are skipped. Returns `None` if the first non-blank
/// text is not an FTL comment, the comment never closes, or it does not
/// declare a content type.
#[tracing::instrument(level = "debug", skip_all)]
fn sniff_content_type(content: impl Read) -> Result<Option<String>> {
    let mut reader = BufReader::new(content);
    let mut header = String::new();
    let mut raw = Vec::new();

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&raw);
        header.push_str(strip_line_ending(&line));

        let trimmed = header.trim();
        if trimmed.is_empty() {
            header.clear();
            continue;
        }
        if !trimmed.starts_with(COMMENT_PREFIX) {
            tracing::debug!("first line is not a header comment");
            return Ok(None);
        }
        header = format!("{trimmed}\n");

        if let Some(captures) = HEADER_COMMENT.captures(&header) {
            let descriptor = captures.get(1).map_or("", |m| m.as_str()).trim();
            let properties = Properties::parse(descriptor)?;
            let content_type = properties.get(CONTENT_TYPE_KEY).map(str::to_owned);
            tracing::debug!(content_type = ?content_type, "header comment parsed");
            return Ok(content_type);
        }
    }
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
