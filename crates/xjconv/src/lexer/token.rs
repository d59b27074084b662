//! JSON tokens

use crate::error::Span;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    Null,
    True,
    False,
    /// Decoded string contents
    String(String),
    /// Source lexeme, e.g. `1.50` or `-2e3`
    Number(String),
    Eof,
}

impl TokenKind {
    /// Short description used in "expected X, found Y" messages
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::LeftBrace => "'{'",
            Self::RightBrace => "'}'",
            Self::LeftBracket => "'['",
            Self::RightBracket => "']'",
            Self::Colon => "':'",
            Self::Comma => "','",
            Self::Null => "null",
            Self::True => "true",
            Self::False => "false",
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Eof => "EOF",
        }
    }

    /// Returns true if the token can begin a JSON value
    pub const fn starts_value(&self) -> bool {
        !matches!(
            self,
            Self::RightBrace | Self::RightBracket | Self::Colon | Self::Comma | Self::Eof
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
