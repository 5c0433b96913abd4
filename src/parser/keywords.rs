//! Reserved words and built-in type names.

use super::token::TokenKind;

/// Keyword spellings. Matching is exact and case-sensitive.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("system", TokenKind::System),
    ("component", TokenKind::Component),
    ("interface", TokenKind::Interface),
    ("type", TokenKind::Type),
    ("enum", TokenKind::Enum),
    ("field", TokenKind::Field),
    ("filetype", TokenKind::Filetype),
    ("schema", TokenKind::Schema),
    ("requires", TokenKind::Requires),
    ("provides", TokenKind::Provides),
    ("connect", TokenKind::Connect),
    ("by", TokenKind::By),
    ("from", TokenKind::From),
    ("import", TokenKind::Import),
    ("use", TokenKind::Use),
    ("external", TokenKind::External),
    ("tags", TokenKind::Tags),
    ("title", TokenKind::Title),
    ("description", TokenKind::Description),
    ("true", TokenKind::True),
    ("false", TokenKind::False),
];

/// Map an identifier to its keyword kind, if reserved.
pub fn keyword_kind(text: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find(|(spelling, _)| *spelling == text)
        .map(|(_, kind)| *kind)
}

pub const FILE_TYPE: &str = "File";
pub const DIRECTORY_TYPE: &str = "Directory";
pub const LIST_TYPE: &str = "List";
pub const MAP_TYPE: &str = "Map";
pub const OPTIONAL_TYPE: &str = "Optional";

/// Identifier-named attributes of a `connect` annotation block.
pub const PROTOCOL_ATTR: &str = "protocol";
pub const ASYNC_ATTR: &str = "async";
