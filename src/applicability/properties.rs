// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A reader for the `key = value` properties format used in template header
//! comments, such as `<#-- ContentType: text/html -->`.
//!
//! Follows the `.properties` conventions: `#` and `!` start comment lines,
//! a trailing backslash continues a line, keys end at the first unescaped
//! `=`, `:` or whitespace, and `\t`, `\n`, `\r`, `\f` and `\uXXXX` escapes are
//! decoded.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Parsed properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    /// Parses `text`. Later keys overwrite earlier ones.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = HashMap::new();
        for (line_number, line) in logical_lines(text) {
            let (key, value) = split_entry(&line);
            let key = unescape(key, line_number)?;
            let value = unescape(value, line_number)?;
            entries.insert(key, value);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Returns true if `line` ends with an odd number of backslashes.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Joins continued lines and drops blank and comment lines. Each logical line
/// is paired with the 1-based number of its first physical line.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (index, raw) in text.lines().enumerate() {
        let trimmed = raw.trim_start_matches(is_whitespace);
        let (number, mut logical) = match current.take() {
            Some(pending) => pending,
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (index + 1, String::new())
            }
        };

        if continues(trimmed) {
            logical.push_str(&trimmed[..trimmed.len() - 1]);
            current = Some((number, logical));
        } else {
            logical.push_str(trimmed);
            lines.push((number, logical));
        }
    }
    if let Some(pending) = current {
        lines.push(pending);
    }
    lines
}

/// Splits a logical line into its raw key and raw value.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_whitespace(c) {
            key_end = i;
            break;
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches(is_whitespace);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches(is_whitespace);
    }
    (key, rest)
}

fn unescape(raw: &str, line: usize) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or(Error::MalformedEscape { line })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators() {
        let props = Properties::parse("a=1\nb : 2\nc 3\nd\n  e =  spaced value ").unwrap();
        assert_eq!(props.get("a"), Some("1"));
        assert_eq!(props.get("b"), Some("2"));
        assert_eq!(props.get("c"), Some("3"));
        assert_eq!(props.get("d"), Some(""));
        assert_eq!(props.get("e"), Some("spaced value "));
        assert_eq!(props.len(), 5);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let props = Properties::parse("# comment\n! other\n\n   \nContentType=text/xml").unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("ContentType"), Some("text/xml"));
    }

    #[test]
    fn test_continuation_lines() {
        let props = Properties::parse("list = a, \\\n     b, \\\n c\nnext=1").unwrap();
        assert_eq!(props.get("list"), Some("a, b, c"));
        assert_eq!(props.get("next"), Some("1"));

        let props = Properties::parse("path=c:\\\\dir").unwrap();
        assert_eq!(props.get("path"), Some("c:\\dir"));
    }

    #[test]
    fn test_escapes() {
        let props = Properties::parse(r"key\ with\=seps=tab\there \u00e9").unwrap();
        assert_eq!(props.get("key with=seps"), Some("tab\there é"));
    }

    #[test]
    fn test_malformed_unicode_escape() {
        let err = Properties::parse("ok=1\nbad=\\u12g4").unwrap_err();
        assert!(matches!(err, Error::MalformedEscape { line: 2 }));
        assert!(Properties::parse("bad=\\u12").is_err());
    }
}
