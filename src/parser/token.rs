//! Token kinds and tokens produced by the lexer.

use crate::base::Position;

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================================================
    // KEYWORDS
    // =========================================================================
    System,
    Component,
    Interface,
    Type,
    Enum,
    Field,
    Filetype,
    Schema,
    Requires,
    Provides,
    Connect,
    By,
    From,
    Import,
    Use,
    External,
    Tags,
    Title,
    Description,
    True,
    False,

    // =========================================================================
    // SYMBOLS
    // =========================================================================
    LBrace,
    RBrace,
    LAngle,
    RAngle,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Colon,
    Equals,
    At,
    Slash,
    Arrow,

    // =========================================================================
    // LITERALS
    // =========================================================================
    String,
    Integer,
    Float,
    Identifier,

    Eof,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            Self::System
                | Self::Component
                | Self::Interface
                | Self::Type
                | Self::Enum
                | Self::Field
                | Self::Filetype
                | Self::Schema
                | Self::Requires
                | Self::Provides
                | Self::Connect
                | Self::By
                | Self::From
                | Self::Import
                | Self::Use
                | Self::External
                | Self::Tags
                | Self::Title
                | Self::Description
                | Self::True
                | Self::False
        )
    }

    /// How the kind is named in "expected ..." messages.
    pub fn describe(self) -> &'static str {
        match self {
            Self::System => "'system'",
            Self::Component => "'component'",
            Self::Interface => "'interface'",
            Self::Type => "'type'",
            Self::Enum => "'enum'",
            Self::Field => "'field'",
            Self::Filetype => "'filetype'",
            Self::Schema => "'schema'",
            Self::Requires => "'requires'",
            Self::Provides => "'provides'",
            Self::Connect => "'connect'",
            Self::By => "'by'",
            Self::From => "'from'",
            Self::Import => "'import'",
            Self::Use => "'use'",
            Self::External => "'external'",
            Self::Tags => "'tags'",
            Self::Title => "'title'",
            Self::Description => "'description'",
            Self::True => "'true'",
            Self::False => "'false'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::LAngle => "'<'",
            Self::RAngle => "'>'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::Comma => "','",
            Self::Dot => "'.'",
            Self::Colon => "':'",
            Self::Equals => "'='",
            Self::At => "'@'",
            Self::Slash => "'/'",
            Self::Arrow => "'->'",
            Self::String => "string literal",
            Self::Integer => "integer literal",
            Self::Float => "float literal",
            Self::Identifier => "identifier",
            Self::Eof => "end of input",
        }
    }
}

/// A token with its kind, text, and the position of its first character.
///
/// For string literals `text` holds the decoded content (quotes removed,
/// escapes applied).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            line: position.line,
            column: position.column,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// The token as quoted in error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => TokenKind::Eof.describe().to_string(),
            TokenKind::String => format!("{:?}", self.text),
            _ => format!("'{}'", self.text),
        }
    }
}
