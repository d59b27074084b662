//! Lexer module for tokenization

pub mod cursor;
pub mod json;
pub mod token;

pub use cursor::Cursor;
pub use token::{Token, TokenKind};
