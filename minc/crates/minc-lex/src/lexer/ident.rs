//! Identifier and keyword scanning.

use minc_util::{ident_hash, SymKind, SymbolTable};

use crate::token::{Token, KEYWORDS};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes `[A-Za-z_][A-Za-z0-9_]*`, interning it into the symbol
    /// table. A hit on a pre-seeded keyword entry yields the keyword
    /// token; everything else yields `Id` with the entry's handle.
    pub(super) fn lex_ident(&mut self, syms: &mut SymbolTable) -> Token {
        let cursor = self.cursor();
        let start = cursor.position();
        while matches!(cursor.current(), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            cursor.advance();
        }
        let name = cursor.slice_from(start);
        let id = syms.intern(name, ident_hash(name));
        let sym = syms.get(id);
        if sym.kind == SymKind::Keyword {
            KEYWORDS[sym.value as usize].1
        } else {
            Token::Id(id)
        }
    }
}
