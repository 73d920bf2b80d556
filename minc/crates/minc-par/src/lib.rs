//! minc-par - Single-pass parser and code generator
//!
//! There is no AST. The parser recognizes declarations, statements, and
//! expressions by recursive descent and emits VM instructions directly
//! into the code buffer as it goes. That choice shapes everything else:
//!
//! - The only forward references allowed are back-patched jumps inside
//!   a function body. Functions and globals must be declared before
//!   use.
//! - "Is this an lvalue" is answered by looking at the instruction
//!   stream: an expression is assignable exactly when the last emitted
//!   instruction is a load (`LC`/`LI`), which assignment rewrites into
//!   a push of the address.
//! - The parser tracks a current type [`Parser::ty`] mirroring the type
//!   of the most recently emitted expression fragment.
//!
//! Expressions use precedence climbing: `expr(level)` parses a prefix
//! production, then keeps consuming operators while their precedence is
//! at least `level`. See [`minc_lex::Prec`] for the ordering.
//!
//! The first error aborts compilation; there is no recovery.

mod expr;
mod items;
mod listing;
mod stmt;

use indexmap::IndexMap;

use minc_lex::{seed_keywords, Lexer, Token};
use minc_lir::{CodeBuf, DataSegment, Op, Program};
use minc_util::{ident_hash, CompileError, DiagKind, SymKind, SymbolId, SymbolTable, Type};

use crate::listing::Listing;

/// Host syscalls pre-declared in every compilation, in opcode order.
/// Each is linked by name: calling `printf(...)` emits the raw `PRTF`
/// opcode stored in the symbol table.
const SYSCALLS: [(&[u8], Op); 9] = [
    (b"open", Op::Open),
    (b"read", Op::Read),
    (b"close", Op::Clos),
    (b"printf", Op::Prtf),
    (b"malloc", Op::Malc),
    (b"free", Op::Free),
    (b"memset", Op::Mset),
    (b"memcmp", Op::Mcmp),
    (b"exit", Op::Exit),
];

/// Compilation options.
#[derive(Debug, Default, Clone)]
pub struct Options {
    /// Print the source and its disassembly to stdout while parsing.
    pub listing: bool,
}

/// Compiles one source buffer into a runnable [`Program`].
pub fn compile(source: &[u8], options: &Options) -> Result<Program, CompileError> {
    let mut parser = Parser::new(source, options);
    parser.advance();
    while parser.tok != Token::Eof {
        parser.parse_declaration()?;
    }
    parser.finish()
}

/// The single-pass parser. Owns every piece of compilation state: the
/// lexer, the symbol table, the code buffer, the data segment, the
/// one-token lookahead, and the current expression type.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    /// One-token lookahead.
    pub(crate) tok: Token,
    pub(crate) syms: SymbolTable,
    pub(crate) code: CodeBuf,
    pub(crate) data: DataSegment,
    /// Type of the most recently emitted expression fragment.
    pub(crate) ty: Type,
    /// Parameter count + 1 of the function being compiled; local slot
    /// offsets are computed relative to it.
    pub(crate) loc: i64,
    /// Handle of `main`, interned up front so the entry point lookup
    /// cannot miss on a hash collision.
    main_id: SymbolId,
    /// Function entry points in definition order.
    pub(crate) labels: IndexMap<usize, String>,
    listing: Option<Listing>,
}

impl<'a> Parser<'a> {
    /// Creates a parser with a pre-seeded symbol table.
    pub fn new(source: &'a [u8], options: &Options) -> Self {
        let mut syms = SymbolTable::new();
        seed_keywords(&mut syms);
        for (name, op) in SYSCALLS {
            syms.define(name, SymKind::Sys, Type::INT, op.word());
        }
        let main_id = syms.intern(b"main", ident_hash(b"main"));

        Self {
            lexer: Lexer::new(source),
            tok: Token::Eof,
            syms,
            code: CodeBuf::new(),
            data: DataSegment::new(),
            ty: Type::INT,
            loc: 0,
            main_id,
            labels: IndexMap::new(),
            listing: options.listing.then(Listing::new),
        }
    }

    /// Advances the one-token lookahead, flushing the source listing
    /// whenever the lexer crosses a line boundary.
    pub(crate) fn advance(&mut self) {
        self.tok = self.lexer.next_token(&mut self.syms, &mut self.data);
        if let Some(listing) = &mut self.listing {
            listing.flush(
                self.lexer.line(),
                self.lexer.line_start(),
                self.lexer.source(),
                &self.code,
                &self.labels,
            );
        }
    }

    /// Builds a diagnostic at the current source line.
    pub(crate) fn fail(&self, kind: DiagKind) -> CompileError {
        CompileError::diag(self.lexer.line(), kind)
    }

    /// Consumes `expected` or fails with `kind`.
    pub(crate) fn expect(&mut self, expected: Token, kind: DiagKind) -> Result<(), CompileError> {
        if self.tok == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.fail(kind))
        }
    }

    /// Emits the load matching the current type: `LC` for char,
    /// `LI` for everything else.
    pub(crate) fn emit_load(&mut self) {
        if self.ty == Type::CHAR {
            self.code.emit(Op::Lc);
        } else {
            self.code.emit(Op::Li);
        }
    }

    /// Emits the store matching the current type.
    pub(crate) fn emit_store(&mut self) {
        if self.ty == Type::CHAR {
            self.code.emit(Op::Sc);
        } else {
            self.code.emit(Op::Si);
        }
    }

    /// Requires the last emitted instruction to be a load and rewrites
    /// it into `PSH` + the same load, leaving both the address and the
    /// loaded value available. Increment and decrement use this shape.
    pub(crate) fn dup_load(&mut self, kind: DiagKind) -> Result<(), CompileError> {
        match self.code.last() {
            Some(op @ (Op::Lc | Op::Li)) => {
                self.code.rewrite_last(Op::Psh);
                self.code.emit(op);
                Ok(())
            }
            _ => Err(self.fail(kind)),
        }
    }

    /// Finishes compilation: flushes the listing tail and resolves the
    /// entry point.
    fn finish(mut self) -> Result<Program, CompileError> {
        if let Some(listing) = &mut self.listing {
            listing.finish(self.lexer.source(), &self.code, &self.labels);
        }
        let main = self.syms.get(self.main_id);
        if main.kind != SymKind::Func {
            return Err(CompileError::MainUndefined);
        }
        let entry = main.value as usize;
        tracing::debug!(
            target: "minc::par",
            code_words = self.code.here(),
            data_bytes = self.data.bytes().len(),
            entry,
            "compilation finished"
        );
        Ok(Program {
            code: self.code.into_words(),
            data: self.data.into_bytes(),
            entry,
            labels: self.labels,
        })
    }
}
