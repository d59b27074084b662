//! JSON parser building a document tree

use crate::error::{Error, ErrorKind, Result};
use crate::lexer::json::JsonLexer;
use crate::lexer::{Token, TokenKind};
use crate::tree::{Array, Node, Object};

/// Configuration for the JSON parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 10 * 1024 * 1024, // 10 MB default
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// Recursive-descent JSON parser with depth and size limits
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: JsonLexer<'a>,
    config: Config,
    input_len: usize,
    depth: u16,
}

impl<'a> Parser<'a> {
    /// Create a new parser with default configuration
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new parser with custom configuration
    pub const fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            lexer: JsonLexer::new(input),
            config,
            input_len: input.len(),
            depth: 0,
        }
    }

    /// Parse the complete input into a document tree
    pub fn parse(&mut self) -> Result<Node> {
        if self.config.max_size > 0 && self.input_len > self.config.max_size {
            return Err(Error::at(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                self.lexer.position(),
            ));
        }

        let token = self.lexer.next_token()?;
        let node = self.parse_value(token)?;

        let trailing = self.lexer.next_token()?;
        if trailing.kind != TokenKind::Eof {
            return Err(unexpected(&trailing, "end of input"));
        }
        Ok(node)
    }

    fn parse_value(&mut self, token: Token) -> Result<Node> {
        match token.kind {
            TokenKind::LeftBrace => self.parse_object(),
            TokenKind::LeftBracket => self.parse_array(),
            TokenKind::String(s) | TokenKind::Number(s) => Ok(Node::Text(s)),
            TokenKind::True => Ok(Node::Text("true".to_string())),
            TokenKind::False => Ok(Node::Text("false".to_string())),
            TokenKind::Null => Ok(Node::Null),
            _ => Err(unexpected(&token, "value")),
        }
    }

    fn parse_object(&mut self) -> Result<Node> {
        self.enter()?;
        let mut object = Object::new();

        let mut token = self.lexer.next_token()?;
        if token.kind == TokenKind::RightBrace {
            self.depth -= 1;
            return Ok(Node::Object(object));
        }

        loop {
            let key = match token.kind {
                TokenKind::String(key) => key,
                TokenKind::RightBrace => {
                    return Err(Error::new(ErrorKind::TrailingComma, token.span))
                }
                _ => return Err(unexpected(&token, "string key")),
            };

            let colon = self.lexer.next_token()?;
            if colon.kind != TokenKind::Colon {
                return Err(unexpected(&colon, "':'"));
            }

            let value_token = self.lexer.next_token()?;
            let value = self.parse_value(value_token)?;
            object.insert(key, value);

            let separator = self.lexer.next_token()?;
            match separator.kind {
                TokenKind::Comma => token = self.lexer.next_token()?,
                TokenKind::RightBrace => break,
                TokenKind::String(_) => {
                    return Err(Error::new(ErrorKind::MissingComma, separator.span))
                }
                _ => return Err(unexpected(&separator, "',' or '}'")),
            }
        }

        self.depth -= 1;
        Ok(Node::Object(object))
    }

    fn parse_array(&mut self) -> Result<Node> {
        self.enter()?;
        let mut array = Array::new();

        let mut token = self.lexer.next_token()?;
        if token.kind == TokenKind::RightBracket {
            self.depth -= 1;
            return Ok(Node::Array(array));
        }

        loop {
            if token.kind == TokenKind::RightBracket {
                return Err(Error::new(ErrorKind::TrailingComma, token.span));
            }
            array.push(self.parse_value(token)?);

            let separator = self.lexer.next_token()?;
            match separator.kind {
                TokenKind::Comma => token = self.lexer.next_token()?,
                TokenKind::RightBracket => break,
                ref kind if kind.starts_value() => {
                    return Err(Error::new(ErrorKind::MissingComma, separator.span))
                }
                _ => return Err(unexpected(&separator, "',' or ']'")),
            }
        }

        self.depth -= 1;
        Ok(Node::Array(array))
    }

    fn enter(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_add(1);
        if self.config.max_depth > 0 && self.depth > self.config.max_depth {
            return Err(Error::at(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                self.lexer.position(),
            ));
        }
        Ok(())
    }
}

fn unexpected(token: &Token, expected: &str) -> Error {
    Error::new(
        ErrorKind::Expected {
            expected: expected.to_string(),
            found: token.kind.describe().to_string(),
        },
        token.span,
    )
}
