//! This module contains the stream adapter that feeds the scanner runtime.
//!
//! The adapter turns a blockwise `std::io::Read` into a stream of [Symbol]s:
//! the decoded characters of the input interleaved with the three virtual
//! anchor symbols. Anchors are injected at most once per logical boundary:
//! `Bol` at the start of the input and after every consumed newline, `Eol`
//! right before every newline and before the end of input, `Eof` once at the
//! end of input. The adapter also tracks line/column positions and keeps a
//! pushback stack so the scanner can return over-consumed symbols at a
//! longest-match cut-off.

use std::collections::VecDeque;
use std::io::{self, Read};

use crate::{Position, Result};

/// A virtual anchor symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Anchor {
    /// Beginning of line.
    Bol,
    /// End of line, yielded before the newline or the end of input.
    Eol,
    /// End of input.
    Eof,
}

/// One effective input symbol as seen by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Symbol {
    /// A real character from the input.
    Ch(char),
    /// A virtual anchor injected by the adapter.
    Anchor(Anchor),
}

impl Symbol {
    /// Returns the character if the symbol is a real one.
    #[inline]
    pub(crate) fn char(&self) -> Option<char> {
        match self {
            Symbol::Ch(c) => Some(*c),
            Symbol::Anchor(_) => None,
        }
    }

    /// Returns true if the symbol is an anchor.
    #[inline]
    pub(crate) fn is_anchor(&self) -> bool {
        matches!(self, Symbol::Anchor(_))
    }
}

const CHUNK_SIZE: usize = 4096;

/// The stream adapter.
pub(crate) struct InputStream {
    reader: Box<dyn Read>,
    /// Bytes read from the reader but not yet decoded, at most one partial
    /// UTF-8 sequence.
    undecoded: Vec<u8>,
    /// Decoded characters not yet consumed.
    chars: VecDeque<char>,
    reader_done: bool,
    line: usize,
    column: usize,
    at_bol: bool,
    eol_sent: bool,
    eof_sent: bool,
    /// The next symbol to be delivered, if already generated.
    lookahead: Option<(Symbol, Position)>,
    /// Symbols returned by the scanner after a longest-match cut-off. The top
    /// of the stack is delivered first, before the lookahead slot.
    pushback: Vec<(Symbol, Position)>,
}

impl InputStream {
    /// Creates a new adapter over the given reader.
    pub(crate) fn new(reader: Box<dyn Read>) -> Self {
        Self {
            reader,
            undecoded: Vec::new(),
            chars: VecDeque::new(),
            reader_done: false,
            line: 1,
            column: 0,
            at_bol: true,
            eol_sent: false,
            eof_sent: false,
            lookahead: None,
            pushback: Vec::new(),
        }
    }

    /// Creates an adapter over an in-memory string.
    pub(crate) fn from_str(input: &str) -> Self {
        Self::new(Box::new(io::Cursor::new(input.to_owned().into_bytes())))
    }

    /// Returns the next symbol without consuming it.
    pub(crate) fn peek(&mut self) -> Result<Option<(Symbol, Position)>> {
        self.fill_lookahead()?;
        Ok(self.lookahead)
    }

    /// Consumes the previously peeked symbol.
    pub(crate) fn advance(&mut self) {
        self.lookahead = None;
    }

    /// Returns over-consumed symbols to the stream. `tail` must be in stream
    /// order; the first entry will be the next symbol delivered. A pending
    /// lookahead symbol comes after the tail in stream order, so it moves to
    /// the bottom of the stack first.
    pub(crate) fn push_back(&mut self, tail: &[(Symbol, Position)]) {
        if let Some(entry) = self.lookahead.take() {
            self.pushback.push(entry);
        }
        for &entry in tail.iter().rev() {
            self.pushback.push(entry);
        }
    }

    /// The position of the next symbol to be delivered.
    pub(crate) fn position(&self) -> Position {
        self.lookahead
            .as_ref()
            .or(self.pushback.last())
            .map(|&(_, position)| position)
            .unwrap_or(Position::new(self.line, self.column))
    }

    fn fill_lookahead(&mut self) -> Result<()> {
        if self.lookahead.is_some() {
            return Ok(());
        }
        if let Some(entry) = self.pushback.pop() {
            self.lookahead = Some(entry);
            return Ok(());
        }
        let position = Position::new(self.line, self.column);
        if self.at_bol {
            self.at_bol = false;
            self.lookahead = Some((Symbol::Anchor(Anchor::Bol), position));
            return Ok(());
        }
        match self.peek_char()? {
            Some('\n') if !self.eol_sent => {
                self.eol_sent = true;
                self.lookahead = Some((Symbol::Anchor(Anchor::Eol), position));
            }
            Some(c) => {
                self.chars.pop_front();
                if c == '\n' {
                    self.line += 1;
                    self.column = 0;
                    self.at_bol = true;
                    self.eol_sent = false;
                } else {
                    self.column += 1;
                }
                self.lookahead = Some((Symbol::Ch(c), position));
            }
            None => {
                if !self.eol_sent {
                    self.eol_sent = true;
                    self.lookahead = Some((Symbol::Anchor(Anchor::Eol), position));
                } else if !self.eof_sent {
                    self.eof_sent = true;
                    self.lookahead = Some((Symbol::Anchor(Anchor::Eof), position));
                }
            }
        }
        Ok(())
    }

    fn peek_char(&mut self) -> Result<Option<char>> {
        while self.chars.is_empty() && !self.reader_done {
            let mut chunk = [0u8; CHUNK_SIZE];
            let read = self.reader.read(&mut chunk)?;
            if read == 0 {
                self.reader_done = true;
                if !self.undecoded.is_empty() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "input ends inside a UTF-8 sequence",
                    )
                    .into());
                }
                break;
            }
            self.undecoded.extend_from_slice(&chunk[..read]);
            self.decode_available()?;
        }
        Ok(self.chars.front().copied())
    }

    /// Decodes every complete UTF-8 sequence in the byte buffer, leaving at
    /// most one partial sequence behind.
    fn decode_available(&mut self) -> Result<()> {
        match std::str::from_utf8(&self.undecoded) {
            Ok(valid) => {
                self.chars.extend(valid.chars());
                self.undecoded.clear();
                Ok(())
            }
            Err(error) => {
                let valid_up_to = error.valid_up_to();
                if let Ok(valid) = std::str::from_utf8(&self.undecoded[..valid_up_to]) {
                    self.chars.extend(valid.chars());
                }
                let incomplete = error.error_len().is_none();
                self.undecoded.drain(..valid_up_to);
                if incomplete {
                    Ok(())
                } else {
                    Err(io::Error::new(io::ErrorKind::InvalidData, "input is not valid UTF-8")
                        .into())
                }
            }
        }
    }
}

impl std::fmt::Debug for InputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputStream")
            .field("line", &self.line)
            .field("column", &self.column)
            .field("at_bol", &self.at_bol)
            .field("eol_sent", &self.eol_sent)
            .field("eof_sent", &self.eof_sent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(stream: &mut InputStream) -> Vec<(Symbol, Position)> {
        let mut symbols = Vec::new();
        while let Some(entry) = stream.peek().unwrap() {
            stream.advance();
            symbols.push(entry);
        }
        symbols
    }

    #[test]
    fn test_symbol_sequence_with_newline() {
        let mut stream = InputStream::from_str("a\nb");
        let symbols: Vec<Symbol> = drain(&mut stream).into_iter().map(|(s, _)| s).collect();
        assert_eq!(
            symbols,
            vec![
                Symbol::Anchor(Anchor::Bol),
                Symbol::Ch('a'),
                Symbol::Anchor(Anchor::Eol),
                Symbol::Ch('\n'),
                Symbol::Anchor(Anchor::Bol),
                Symbol::Ch('b'),
                Symbol::Anchor(Anchor::Eol),
                Symbol::Anchor(Anchor::Eof),
            ]
        );
    }

    #[test]
    fn test_symbol_sequence_empty_input() {
        let mut stream = InputStream::from_str("");
        let symbols: Vec<Symbol> = drain(&mut stream).into_iter().map(|(s, _)| s).collect();
        assert_eq!(
            symbols,
            vec![
                Symbol::Anchor(Anchor::Bol),
                Symbol::Anchor(Anchor::Eol),
                Symbol::Anchor(Anchor::Eof),
            ]
        );
    }

    #[test]
    fn test_positions() {
        let mut stream = InputStream::from_str("ab\ncd");
        let entries = drain(&mut stream);
        let chars: Vec<(char, Position)> = entries
            .iter()
            .filter_map(|&(s, p)| s.char().map(|c| (c, p)))
            .collect();
        assert_eq!(
            chars,
            vec![
                ('a', Position::new(1, 0)),
                ('b', Position::new(1, 1)),
                ('\n', Position::new(1, 2)),
                ('c', Position::new(2, 0)),
                ('d', Position::new(2, 1)),
            ]
        );
    }

    #[test]
    fn test_push_back_preserves_order() {
        let mut stream = InputStream::from_str("xyz");
        let mut consumed = Vec::new();
        for _ in 0..3 {
            let entry = stream.peek().unwrap().unwrap();
            stream.advance();
            consumed.push(entry);
        }
        // Return 'y' and 'z'; 'x' stays consumed.
        stream.push_back(&consumed[1..]);
        assert_eq!(stream.position(), consumed[1].1);
        let rest: Vec<Symbol> = drain(&mut stream).into_iter().map(|(s, _)| s).collect();
        assert_eq!(
            rest,
            vec![
                Symbol::Ch('y'),
                Symbol::Ch('z'),
                Symbol::Anchor(Anchor::Eol),
                Symbol::Anchor(Anchor::Eof),
            ]
        );
    }

    #[test]
    fn test_push_back_with_pending_lookahead() {
        let mut stream = InputStream::from_str("xyz");
        let mut consumed = Vec::new();
        // Bol, 'x' and 'y'.
        for _ in 0..3 {
            let entry = stream.peek().unwrap().unwrap();
            stream.advance();
            consumed.push(entry);
        }
        // Peek 'z' without consuming it, then return 'y'. The returned
        // symbol is older and must come out first.
        assert_eq!(stream.peek().unwrap().unwrap().0, Symbol::Ch('z'));
        stream.push_back(&consumed[2..]);
        let rest: Vec<Symbol> = drain(&mut stream).into_iter().map(|(s, _)| s).collect();
        assert_eq!(
            rest,
            vec![
                Symbol::Ch('y'),
                Symbol::Ch('z'),
                Symbol::Anchor(Anchor::Eol),
                Symbol::Anchor(Anchor::Eof),
            ]
        );
    }

    #[test]
    fn test_anchors_fire_once_per_boundary() {
        let mut stream = InputStream::from_str("\n\n");
        let symbols: Vec<Symbol> = drain(&mut stream).into_iter().map(|(s, _)| s).collect();
        let bol_count = symbols
            .iter()
            .filter(|s| **s == Symbol::Anchor(Anchor::Bol))
            .count();
        let eol_count = symbols
            .iter()
            .filter(|s| **s == Symbol::Anchor(Anchor::Eol))
            .count();
        // Three line starts (two of them empty lines), three line ends.
        assert_eq!(bol_count, 3);
        assert_eq!(eol_count, 3);
        assert_eq!(
            symbols
                .iter()
                .filter(|s| **s == Symbol::Anchor(Anchor::Eof))
                .count(),
            1
        );
    }

    #[test]
    fn test_multibyte_input() {
        let mut stream = InputStream::from_str("aßc");
        let chars: Vec<char> = drain(&mut stream)
            .into_iter()
            .filter_map(|(s, _)| s.char())
            .collect();
        assert_eq!(chars, vec!['a', 'ß', 'c']);
    }
}
