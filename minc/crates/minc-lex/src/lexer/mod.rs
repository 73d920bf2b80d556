//! Core lexer implementation.
//!
//! The dispatch loop lives here; identifier, number, literal, and
//! operator scanning are in sibling modules.

mod ident;
mod number;
mod operator;
mod string;

use minc_lir::DataSegment;
use minc_util::SymbolTable;

use crate::cursor::Cursor;
use crate::token::Token;

/// The lexer.
///
/// `next_token` borrows the symbol table (identifier interning) and
/// the data segment (string literal bytes) for the duration of one
/// token; the lexer itself only owns the cursor.
pub struct Lexer<'a> {
    /// Byte cursor over the source.
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `source`.
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Scans and returns the next token.
    ///
    /// Whitespace, `//` comments, and `#` preprocessor lines are
    /// skipped. At end of input this returns [`Token::Eof`] forever.
    pub fn next_token(&mut self, syms: &mut SymbolTable, data: &mut DataSegment) -> Token {
        loop {
            if self.cursor.is_at_end() {
                return Token::Eof;
            }
            match self.cursor.current() {
                // A NUL is the loader's terminator; everything after
                // it is unreachable, exactly like a real end of input.
                0 => return Token::Eof,
                b' ' | b'\t' | b'\r' | b'\n' => self.cursor.advance(),
                b'#' => self.skip_line(),
                b'/' if self.cursor.peek(1) == b'/' => self.skip_line(),
                b'/' => {
                    self.cursor.advance();
                    return Token::Div;
                }
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => return self.lex_ident(syms),
                b'0'..=b'9' => return self.lex_number(),
                b'"' => return self.lex_string(data),
                b'\'' => return self.lex_char(),
                _ => return self.lex_operator(),
            }
        }
    }

    /// Skips to the next newline without consuming it, so the main
    /// loop sees the line boundary.
    fn skip_line(&mut self) {
        while !self.cursor.is_at_end() && self.cursor.current() != b'\n' {
            self.cursor.advance();
        }
    }

    /// Current line number (1-based).
    pub fn line(&self) -> u32 {
        self.cursor.line()
    }

    /// Byte offset of the start of the current line. The source
    /// listing uses this to print completed lines.
    pub fn line_start(&self) -> usize {
        self.cursor.line_start()
    }

    /// The full source the lexer was built over.
    pub fn source(&self) -> &'a [u8] {
        self.cursor.source()
    }

    pub(crate) fn cursor(&mut self) -> &mut Cursor<'a> {
        &mut self.cursor
    }
}
