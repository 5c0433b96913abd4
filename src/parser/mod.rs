//! Hand-written front end for `.archml` sources
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer → Vec<Token> (whitespace and comments dropped, always ends in EOF)
//!     ↓
//! Parser (recursive descent) → ArchFile
//! ```
//!
//! Both stages fail fast: the first fault aborts with a [`LexerError`] or
//! [`ParseError`] carrying a 1-based line/column. There is no error recovery.

#[allow(clippy::module_inception)]
mod parser;

mod errors;
pub mod keywords;
mod lexer;
mod token;

pub use errors::{LexerError, ParseError, SyntaxError};
pub use lexer::{Lexer, tokenize};
pub use parser::parse;
pub use token::{Token, TokenKind};
