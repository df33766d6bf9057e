// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Scanner configuration.
//!
//! FreeMarker accepts two tag notations and three interpolation notations.
//! The configuration selects which of them the partitioning rules recognize.

/// Surface notation of an FTL tag or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notation {
    /// `<#if x>`, `<@macro/>`, `<#-- -->`
    Angle,
    /// `[#if x]`, `[@macro/]`, `[#-- --]`
    Square,
}

impl Notation {
    /// The byte that opens a tag in this notation.
    pub fn open_byte(self) -> u8 {
        match self {
            Notation::Angle => b'<',
            Notation::Square => b'[',
        }
    }

    /// The byte that closes a tag in this notation.
    pub fn close_byte(self) -> u8 {
        match self {
            Notation::Angle => b'>',
            Notation::Square => b']',
        }
    }

    /// Closing sequence of an FTL comment in this notation.
    pub fn comment_close(self) -> &'static [u8] {
        match self {
            Notation::Angle => b"-->",
            Notation::Square => b"--]",
        }
    }

    /// Returns the notation whose tags open with `byte`.
    pub fn from_open_byte(byte: u8) -> Option<Self> {
        match byte {
            b'<' => Some(Notation::Angle),
            b'[' => Some(Notation::Square),
            _ => None,
        }
    }
}

/// Which tag notations are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TagSyntax {
    /// Only `<#...>` tags.
    AngleBracket,
    /// Only `[#...]` tags.
    SquareBracket,
    /// Both notations side by side (legacy compatibility).
    #[default]
    Both,
}

impl TagSyntax {
    /// Returns whether tags written in `notation` are recognized.
    pub fn allows(self, notation: Notation) -> bool {
        match self {
            TagSyntax::AngleBracket => notation == Notation::Angle,
            TagSyntax::SquareBracket => notation == Notation::Square,
            TagSyntax::Both => true,
        }
    }

    /// Allowed notations, angle first.
    pub fn notations(self) -> impl Iterator<Item = Notation> {
        [Notation::Angle, Notation::Square]
            .into_iter()
            .filter(move |&n| self.allows(n))
    }
}

/// Which interpolation notations are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterpolationSyntax {
    /// `${expr}` and the deprecated numerical `#{expr}`.
    #[default]
    Legacy,
    /// Only `${expr}`.
    Dollar,
    /// Only `[=expr]`.
    SquareBracket,
}

impl InterpolationSyntax {
    /// Opening sequences recognized under this syntax.
    pub fn openers(self) -> &'static [&'static [u8]] {
        match self {
            InterpolationSyntax::Legacy => &[b"${", b"#{"],
            InterpolationSyntax::Dollar => &[b"${"],
            InterpolationSyntax::SquareBracket => &[b"[="],
        }
    }
}

/// Configuration for the partitioning rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScannerConfig {
    /// Recognized tag notations
    pub tag_syntax: TagSyntax,
    /// Recognized interpolation notations
    pub interpolation_syntax: InterpolationSyntax,
    /// Whether XML comments and tags get partitions of their own
    pub host_markup: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ScannerConfig {
    /// Both tag notations, legacy interpolations, host markup enabled.
    pub const fn new() -> Self {
        Self {
            tag_syntax: TagSyntax::Both,
            interpolation_syntax: InterpolationSyntax::Legacy,
            host_markup: true,
        }
    }

    pub fn with_tag_syntax(mut self, tag_syntax: TagSyntax) -> Self {
        self.tag_syntax = tag_syntax;
        self
    }

    pub fn with_interpolation_syntax(mut self, interpolation_syntax: InterpolationSyntax) -> Self {
        self.interpolation_syntax = interpolation_syntax;
        self
    }

    /// Treats XML comments and tags as plain text.
    pub fn without_host_markup(mut self) -> Self {
        self.host_markup = false;
        self
    }
}
