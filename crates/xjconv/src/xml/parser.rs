//! Byte-level XML parser producing an element tree

use indexmap::IndexMap;

use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::lexer::Cursor;
use crate::xml::model::{Content, Document, Element};

/// Configuration for the XML parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
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

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    input: &'a [u8],
    cursor: Cursor<'a>,
    config: Config,
    input_len: usize,
    depth: u16,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser with default configuration
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new XML parser with custom configuration
    pub const fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            input,
            cursor: Cursor::new(input),
            config,
            input_len: input.len(),
            depth: 0,
        }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        if self.config.max_size > 0 && self.input_len > self.config.max_size {
            return Err(Error::at(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                self.cursor.position(),
            ));
        }
        check_chars(self.input)?;

        self.skip_misc()?;
        if self.cursor.current() != Some(b'<') {
            return Err(self.error_here("expected root element"));
        }
        let root = self.parse_element()?;
        self.skip_misc()?;

        if !self.cursor.is_eof() {
            return Err(self.error_here("unexpected content after root element"));
        }

        Ok(Document { root })
    }

    /// Skip whitespace, comments, processing instructions and a doctype
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with(b"<?") {
                self.skip_processing_instruction()?;
            } else if self.cursor.starts_with(b"<!--") {
                self.skip_comment()?;
            } else if self.cursor.starts_with(b"<!DOCTYPE") {
                self.skip_doctype()?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_element(&mut self) -> Result<Element> {
        self.expect_byte(b'<')?;
        self.enter()?;

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        if self.cursor.consume(b'/') {
            self.expect_byte(b'>')?;
            self.depth -= 1;
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
            });
        }

        self.expect_byte(b'>')?;
        let children = self.parse_content(&name)?;
        self.depth -= 1;

        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    fn enter(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_add(1);
        if self.config.max_depth > 0 && self.depth > self.config.max_depth {
            return Err(Error::at(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                self.cursor.position(),
            ));
        }
        Ok(())
    }

    /// Parse element content up to and including the closing tag of `name`
    fn parse_content(&mut self, name: &str) -> Result<Vec<Content>> {
        let mut children = Vec::new();
        loop {
            if self.cursor.is_eof() {
                return Err(Error::at(
                    ErrorKind::UnterminatedElement {
                        name: name.to_string(),
                    },
                    self.cursor.position(),
                ));
            }

            if self.cursor.starts_with(b"</") {
                let pos = self.cursor.position();
                self.cursor.advance_by(2);
                let close_name = self.parse_name()?;
                if close_name != name {
                    return Err(Error::at(
                        ErrorKind::MismatchedTag {
                            expected: name.to_string(),
                            found: close_name,
                        },
                        pos,
                    ));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                // whitespace between child elements is layout, not content
                if children.iter().any(|c| matches!(c, Content::Element(_))) {
                    children.retain(|c| !matches!(c, Content::Text(t) if t.trim().is_empty()));
                }
                return Ok(children);
            }

            if self.cursor.starts_with(b"<!--") {
                self.skip_comment()?;
            } else if self.cursor.starts_with(b"<![CDATA[") {
                let text = self.parse_cdata()?;
                children.push(Content::Text(text));
            } else if self.cursor.starts_with(b"<?") {
                self.skip_processing_instruction()?;
            } else if self.cursor.starts_with(b"<!DOCTYPE") {
                // only reachable for documents wrapped as a fragment
                self.skip_doctype()?;
            } else if self.cursor.starts_with(b"<!") {
                return Err(self.error_here("unexpected markup declaration"));
            } else if self.cursor.current() == Some(b'<') {
                let child = self.parse_element()?;
                children.push(Content::Element(child));
            } else {
                let text = self.parse_text()?;
                children.push(Content::Text(text));
            }
        }
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/' | b'>') => break,
                Some(_) => {}
                None => return Err(self.error_here("unexpected end of input")),
            }

            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(self.error_here("duplicate attribute"));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err(self.error_here("expected quoted attribute value")),
        };
        self.cursor.advance();

        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                return decode_entities(bytes_to_str(raw)?);
            }
            if b == b'<' {
                return Err(self.error_here("'<' is not allowed in attribute values"));
            }
            self.cursor.advance();
        }

        Err(self.error_here("unterminated attribute value"))
    }

    fn parse_text(&mut self) -> Result<String> {
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        decode_entities(bytes_to_str(self.cursor.slice_from(start))?)
    }

    fn parse_cdata(&mut self) -> Result<String> {
        self.cursor.advance_by(b"<![CDATA[".len());
        let start = self.cursor.pos();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(b"]]>") {
                let text = bytes_to_str(self.cursor.slice_from(start))?.to_string();
                self.cursor.advance_by(3);
                return Ok(text);
            }
            self.cursor.advance();
        }
        Err(self.error_here("unterminated CDATA section"))
    }

    fn parse_name(&mut self) -> Result<String> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();

        match self.cursor.current() {
            Some(first) if is_name_start(first) => self.cursor.advance(),
            Some(_) => return Err(Error::at(ErrorKind::InvalidToken, start_pos)),
            None => return Err(self.error_here("expected name")),
        }

        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        bytes_to_str(self.cursor.slice_from(start)).map(str::to_string)
    }

    fn skip_comment(&mut self) -> Result<()> {
        self.cursor.advance_by(b"<!--".len());
        self.skip_until(b"-->")
    }

    fn skip_processing_instruction(&mut self) -> Result<()> {
        self.cursor.advance_by(b"<?".len());
        self.skip_until(b"?>")
    }

    /// Skip a doctype declaration, including any internal subset
    fn skip_doctype(&mut self) -> Result<()> {
        self.cursor.advance_by(b"<!DOCTYPE".len());
        let mut subset_depth = 0usize;
        let mut quote: Option<u8> = None;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match (quote, b) {
                (Some(q), _) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'[') => subset_depth += 1,
                (None, b']') => subset_depth = subset_depth.saturating_sub(1),
                (None, b'>') if subset_depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.error_here("unterminated doctype"))
    }

    fn skip_until(&mut self, pattern: &[u8]) -> Result<()> {
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                self.cursor.advance_by(pattern.len());
                return Ok(());
            }
            self.cursor.advance();
        }
        Err(self.error_here("unterminated markup"))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else {
            Err(self.error_here("unexpected token"))
        }
    }

    fn error_here(&self, message: &str) -> Error {
        Error::with_message(
            ErrorKind::InvalidToken,
            Span::at(self.cursor.position()),
            message.to_string(),
        )
    }
}

fn bytes_to_str(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|_| {
        Error::with_message(
            ErrorKind::InvalidToken,
            Span::empty(),
            "invalid utf-8".to_string(),
        )
    })
}

/// Check whether `c` matches the XML `Char` production
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Reject characters outside the `Char` production, reporting where the first one sits
fn check_chars(input: &[u8]) -> Result<()> {
    // invalid utf-8 is reported once the parser reaches it
    let Ok(text) = std::str::from_utf8(input) else {
        return Ok(());
    };
    let Some((offset, ch)) = text.char_indices().find(|(_, c)| !is_xml_char(*c)) else {
        return Ok(());
    };

    let before = text.get(..offset).unwrap_or_default();
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let line = before.matches('\n').count().saturating_add(1);
    let col = offset.saturating_sub(line_start).saturating_add(1);
    let pos = Pos::new(
        offset,
        u32::try_from(line).unwrap_or(u32::MAX),
        u32::try_from(col).unwrap_or(u32::MAX),
    );
    Err(Error::at(ErrorKind::InvalidChar { ch }, pos))
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

/// Check whether `name` can be written as an XML element name
pub fn is_valid_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    let shape = match bytes.next() {
        Some(first) if is_name_start(first) => bytes.all(is_name_char),
        _ => false,
    };
    shape && name.chars().all(is_xml_char)
}

fn decode_entities(input: &str) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        let (before, after) = rest.split_at(amp);
        result.push_str(before);
        let after = after.get(1..).unwrap_or_default();

        let Some((entity, tail)) = after.split_once(';') else {
            return Err(invalid_entity(after));
        };

        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(entity),
        };

        match decoded {
            Some(ch) => result.push(ch),
            None => return Err(invalid_entity(entity)),
        }
        rest = tail;
    }
    result.push_str(rest);

    Ok(result)
}

fn invalid_entity(entity: &str) -> Error {
    Error::new(
        ErrorKind::InvalidEntity {
            entity: entity.to_string(),
        },
        Span::empty(),
    )
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };
    code.and_then(char::from_u32).filter(|c| is_xml_char(*c))
}
