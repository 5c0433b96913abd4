//! Hand-written scanner for `.archml` sources
//!
//! Produces a flat token stream terminated by exactly one EOF token.
//! Whitespace and comments are consumed without producing tokens.

use super::errors::LexerError;
use super::keywords::keyword_kind;
use super::token::{Token, TokenKind};
use crate::base::Position;

/// Tokenize an entire source text.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
    Lexer::new(source).tokenize()
}

/// Scanner state over one source text
pub struct Lexer<'a> {
    source: &'a str,
    /// Byte offset of the next unconsumed character.
    offset: usize,
    position: Position,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            position: Position::start(),
            tokens: Vec::new(),
        }
    }

    /// Run the scanner to completion.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexerError> {
        loop {
            self.skip_trivia()?;
            if self.at_end() {
                break;
            }
            self.scan_token()?;
        }
        self.tokens.push(Token::new(TokenKind::Eof, "", self.position));
        Ok(self.tokens)
    }

    // =========================================================================
    // Character access
    // =========================================================================

    fn at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    fn current(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    fn peek(&self) -> Option<char> {
        self.source[self.offset..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.offset += ch.len_utf8();
        self.position.advance(ch);
        Some(ch)
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<String>, start: Position) {
        self.tokens.push(Token::new(kind, text, start));
    }

    // =========================================================================
    // Trivia
    // =========================================================================

    fn skip_trivia(&mut self) -> Result<(), LexerError> {
        while let Some(ch) = self.current() {
            match (ch, self.peek()) {
                (' ' | '\t' | '\r' | '\n', _) => {
                    self.bump();
                }
                ('/', Some('/')) => self.skip_line_comment(),
                ('/', Some('*')) => self.skip_block_comment()?,
                _ => break,
            }
        }
        Ok(())
    }

    /// `//` up to, not including, the newline.
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.current() {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexerError> {
        let start = self.position;
        self.bump(); // /
        self.bump(); // *
        while let Some(ch) = self.current() {
            if ch == '*' && self.peek() == Some('/') {
                self.bump();
                self.bump();
                return Ok(());
            }
            self.bump();
        }
        Err(LexerError::new("Unterminated block comment", start))
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    fn scan_token(&mut self) -> Result<(), LexerError> {
        let start = self.position;
        let Some(ch) = self.current() else {
            return Ok(());
        };

        if let Some(kind) = single_char_kind(ch) {
            self.bump();
            self.push(kind, ch.to_string(), start);
            return Ok(());
        }

        match ch {
            '-' => {
                if self.peek() == Some('>') {
                    self.bump();
                    self.bump();
                    self.push(TokenKind::Arrow, "->", start);
                    Ok(())
                } else {
                    Err(LexerError::new("Unexpected character: '-'", start))
                }
            }
            '"' => self.scan_string(start),
            c if c.is_ascii_digit() => {
                self.scan_number(start);
                Ok(())
            }
            c if is_ident_start(c) => {
                self.scan_identifier(start);
                Ok(())
            }
            c => Err(LexerError::new(
                format!("Unexpected character: {c:?}"),
                start,
            )),
        }
    }

    fn scan_string(&mut self, start: Position) -> Result<(), LexerError> {
        self.bump(); // opening quote
        let mut value = String::new();
        while let Some(ch) = self.current() {
            match ch {
                '"' => {
                    self.bump();
                    self.push(TokenKind::String, value, start);
                    return Ok(());
                }
                '\n' => return Err(LexerError::new("Unterminated string literal", start)),
                '\\' => {
                    self.bump();
                    let escape_at = self.position;
                    let Some(escaped) = self.current() else {
                        return Err(LexerError::new("Unterminated string literal", start));
                    };
                    let decoded = match escaped {
                        'n' => '\n',
                        't' => '\t',
                        '\\' => '\\',
                        '"' => '"',
                        other => {
                            return Err(LexerError::new(
                                format!("Invalid escape sequence: '\\{other}'"),
                                escape_at,
                            ));
                        }
                    };
                    value.push(decoded);
                    self.bump();
                }
                _ => {
                    value.push(ch);
                    self.bump();
                }
            }
        }
        Err(LexerError::new("Unterminated string literal", start))
    }

    /// Integer, or float when a `.` is followed by at least one digit.
    ///
    /// `42.` yields `Integer("42")`; the dot is scanned as its own token.
    fn scan_number(&mut self, start: Position) {
        let begin = self.offset;
        self.eat_digits();

        let is_float = self.current() == Some('.')
            && self.peek().is_some_and(|c| c.is_ascii_digit());
        if is_float {
            self.bump(); // .
            self.eat_digits();
        }

        let kind = if is_float {
            TokenKind::Float
        } else {
            TokenKind::Integer
        };
        let source = self.source;
        self.push(kind, &source[begin..self.offset], start);
    }

    fn eat_digits(&mut self) {
        while self.current().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
    }

    fn scan_identifier(&mut self, start: Position) {
        let begin = self.offset;
        while self.current().is_some_and(is_ident_continue) {
            self.bump();
        }
        let source = self.source;
        let text = &source[begin..self.offset];
        let kind = keyword_kind(text).unwrap_or(TokenKind::Identifier);
        self.push(kind, text, start);
    }
}

fn single_char_kind(ch: char) -> Option<TokenKind> {
    let kind = match ch {
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        '<' => TokenKind::LAngle,
        '>' => TokenKind::RAngle,
        '[' => TokenKind::LBracket,
        ']' => TokenKind::RBracket,
        ',' => TokenKind::Comma,
        '.' => TokenKind::Dot,
        ':' => TokenKind::Colon,
        '=' => TokenKind::Equals,
        '@' => TokenKind::At,
        '/' => TokenKind::Slash,
        _ => return None,
    };
    Some(kind)
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || unicode_ident::is_xid_start(ch)
}

fn is_ident_continue(ch: char) -> bool {
    unicode_ident::is_xid_continue(ch)
}
