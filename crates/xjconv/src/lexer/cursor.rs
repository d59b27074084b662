//! Position-tracking reader over raw input bytes

use crate::error::Pos;

/// Forward-only reader over a byte slice that tracks line and column
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    input: &'a [u8],
    offset: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            col: 1,
        }
    }

    /// Byte under the cursor, `None` at end of input
    pub fn current(&self) -> Option<u8> {
        self.input.get(self.offset).copied()
    }

    pub fn starts_with(&self, pattern: &[u8]) -> bool {
        self.remaining().starts_with(pattern)
    }

    /// Step over one byte. Does nothing at end of input.
    pub fn advance(&mut self) {
        let Some(byte) = self.current() else {
            return;
        };
        self.offset += 1;
        if byte == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
    }

    pub fn advance_by(&mut self, count: usize) {
        (0..count).for_each(|_| self.advance());
    }

    /// Skip XML/JSON whitespace (space, tab, CR, LF)
    pub fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.advance();
        }
    }

    /// Step over `expected` if it is the current byte
    pub fn consume(&mut self, expected: u8) -> bool {
        let matched = self.current() == Some(expected);
        if matched {
            self.advance();
        }
        matched
    }

    pub const fn position(&self) -> Pos {
        Pos::new(self.offset, self.line, self.col)
    }

    pub const fn is_eof(&self) -> bool {
        self.offset >= self.input.len()
    }

    pub fn remaining(&self) -> &'a [u8] {
        self.input.get(self.offset..).unwrap_or_default()
    }

    /// Byte offset of the cursor
    pub const fn pos(&self) -> usize {
        self.offset
    }

    /// Input consumed since byte offset `start`
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        self.input.get(start..self.offset).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_column_tracking() {
        let mut cursor = Cursor::new(b"<a>\n  <b/>");
        cursor.advance_by(3);
        assert_eq!(cursor.position(), Pos::new(3, 1, 4));
        cursor.skip_whitespace();
        assert_eq!(cursor.current(), Some(b'<'));
        assert_eq!(cursor.position(), Pos::new(6, 2, 3));
    }

    #[test]
    fn test_consume_only_on_match() {
        let mut cursor = Cursor::new(b"-1");
        assert!(!cursor.consume(b'+'));
        assert!(cursor.consume(b'-'));
        assert_eq!(cursor.current(), Some(b'1'));
    }

    #[test]
    fn test_advance_stops_at_end() {
        let mut cursor = Cursor::new(b"ab");
        cursor.advance_by(5);
        assert!(cursor.is_eof());
        assert_eq!(cursor.current(), None);
        assert_eq!(cursor.pos(), 2);
        assert_eq!(cursor.remaining(), b"");
    }

    #[test]
    fn test_slice_and_lookahead() {
        let mut cursor = Cursor::new(b"<!--note-->");
        assert!(cursor.starts_with(b"<!--"));
        assert!(!cursor.starts_with(b"<![CDATA["));
        let start = cursor.pos();
        cursor.advance_by(4);
        assert_eq!(cursor.slice_from(start), b"<!--");
        assert_eq!(cursor.remaining(), b"note-->");
    }
}
