//! Expression parsing and code generation.
//!
//! `expr(level)` implements precedence climbing: parse one prefix
//! production, then keep consuming operators whose precedence is at
//! least `level`, parsing each right operand at the operator's
//! next-tighter level (or the same level for the right-associative
//! assignment and conditional).
//!
//! Code is emitted as the expression is recognized. Binary operators
//! follow one shape: the left value is pushed, the right value lands
//! in the accumulator, and the operator pops its left operand. Pointer
//! arithmetic on pointers to non-char scales the integer side by the
//! word size before the add or subtract.

use minc_lex::{Prec, Token};
use minc_lir::Op;
use minc_util::{CompileError, DiagKind, SymKind, SymbolId, Type, WORD};

use crate::Parser;

impl<'a> Parser<'a> {
    /// Parses an expression at the given minimum precedence level.
    pub(crate) fn expr(&mut self, level: Prec) -> Result<(), CompileError> {
        self.parse_prefix()?;
        while self.tok.prec().is_some_and(|p| p >= level) {
            self.parse_infix()?;
        }
        Ok(())
    }

    /// One prefix production: a literal, a variable or call, a
    /// parenthesized expression or cast, or a unary operator.
    fn parse_prefix(&mut self) -> Result<(), CompileError> {
        match self.tok {
            Token::Eof => Err(self.fail(DiagKind::UnexpectedEof)),

            Token::Num(v) => {
                self.code.emit_imm(Op::Imm, v);
                self.advance();
                self.ty = Type::INT;
                Ok(())
            }

            Token::Str(addr) => {
                self.code.emit_imm(Op::Imm, addr);
                self.advance();
                // Adjacent literals were already laid down back to
                // back by the lexer; consuming the extra tokens is all
                // coalescing takes.
                while matches!(self.tok, Token::Str(_)) {
                    self.advance();
                }
                self.data.align_up();
                self.ty = Type::CHAR.ptr_to();
                Ok(())
            }

            Token::Sizeof => {
                self.advance();
                self.expect(Token::LParen, DiagKind::SizeofOpenParen)?;
                self.ty = Type::INT;
                if self.tok == Token::IntKw {
                    self.advance();
                } else if self.tok == Token::CharKw {
                    self.advance();
                    self.ty = Type::CHAR;
                }
                while self.tok == Token::Mul {
                    self.advance();
                    self.ty = self.ty.ptr_to();
                }
                self.expect(Token::RParen, DiagKind::SizeofCloseParen)?;
                self.code.emit_imm(Op::Imm, self.ty.size());
                self.ty = Type::INT;
                Ok(())
            }

            Token::Id(id) => self.prefix_ident(id),

            Token::LParen => {
                self.advance();
                if self.tok == Token::IntKw || self.tok == Token::CharKw {
                    // Cast: no code, just a new static type for the operand.
                    let mut target = if self.tok == Token::IntKw {
                        Type::INT
                    } else {
                        Type::CHAR
                    };
                    self.advance();
                    while self.tok == Token::Mul {
                        self.advance();
                        target = target.ptr_to();
                    }
                    self.expect(Token::RParen, DiagKind::BadCast)?;
                    self.expr(Prec::Inc)?;
                    self.ty = target;
                } else {
                    self.expr(Prec::Assign)?;
                    self.expect(Token::RParen, DiagKind::CloseParenExpected)?;
                }
                Ok(())
            }

            Token::Mul => {
                self.advance();
                self.expr(Prec::Inc)?;
                self.ty = match self.ty.deref() {
                    Some(inner) => inner,
                    None => return Err(self.fail(DiagKind::BadDereference)),
                };
                self.emit_load();
                Ok(())
            }

            Token::And => {
                self.advance();
                self.expr(Prec::Inc)?;
                // The operand must have ended in a load; dropping it
                // leaves the address in the accumulator.
                match self.code.last() {
                    Some(Op::Lc | Op::Li) => self.code.pop_last(),
                    _ => return Err(self.fail(DiagKind::BadAddressOf)),
                }
                self.ty = self.ty.ptr_to();
                Ok(())
            }

            Token::Not => {
                self.advance();
                self.expr(Prec::Inc)?;
                self.code.emit(Op::Psh);
                self.code.emit_imm(Op::Imm, 0);
                self.code.emit(Op::Eq);
                self.ty = Type::INT;
                Ok(())
            }

            Token::Tilde => {
                self.advance();
                self.expr(Prec::Inc)?;
                self.code.emit(Op::Psh);
                self.code.emit_imm(Op::Imm, -1);
                self.code.emit(Op::Xor);
                self.ty = Type::INT;
                Ok(())
            }

            Token::Add => {
                self.advance();
                self.expr(Prec::Inc)?;
                self.ty = Type::INT;
                Ok(())
            }

            Token::Sub => {
                self.advance();
                if let Token::Num(v) = self.tok {
                    self.code.emit_imm(Op::Imm, v.wrapping_neg());
                    self.advance();
                } else {
                    self.code.emit_imm(Op::Imm, -1);
                    self.code.emit(Op::Psh);
                    self.expr(Prec::Inc)?;
                    self.code.emit(Op::Mul);
                }
                self.ty = Type::INT;
                Ok(())
            }

            Token::Inc | Token::Dec => {
                let inc = self.tok == Token::Inc;
                self.advance();
                self.expr(Prec::Inc)?;
                self.dup_load(DiagKind::BadPreIncLvalue)?;
                self.code.emit(Op::Psh);
                self.code.emit_imm(Op::Imm, self.ty.stride());
                self.code.emit(if inc { Op::Add } else { Op::Sub });
                self.emit_store();
                Ok(())
            }

            _ => Err(self.fail(DiagKind::BadExpression)),
        }
    }

    /// Identifier at expression position: call, constant, or variable.
    fn prefix_ident(&mut self, id: SymbolId) -> Result<(), CompileError> {
        self.advance();

        if self.tok == Token::LParen {
            self.advance();
            let mut nargs: i64 = 0;
            while self.tok != Token::RParen {
                self.expr(Prec::Assign)?;
                self.code.emit(Op::Psh);
                nargs += 1;
                if self.tok == Token::Comma {
                    self.advance();
                }
            }
            self.advance();
            let sym = self.syms.get(id);
            let (kind, ty, value) = (sym.kind, sym.ty, sym.value);
            match kind {
                SymKind::Sys => self.code.emit_word(value),
                SymKind::Func => self.code.emit_imm(Op::Jsr, value),
                _ => return Err(self.fail(DiagKind::BadFunctionCall)),
            }
            if nargs > 0 {
                self.code.emit_imm(Op::Adj, nargs);
            }
            self.ty = ty;
            return Ok(());
        }

        let sym = self.syms.get(id);
        let (kind, ty, value) = (sym.kind, sym.ty, sym.value);
        match kind {
            SymKind::Num => {
                self.code.emit_imm(Op::Imm, value);
                self.ty = Type::INT;
            }
            SymKind::Local => {
                self.code.emit_imm(Op::Lea, self.loc - value);
                self.ty = ty;
                self.emit_load();
            }
            SymKind::Global => {
                self.code.emit_imm(Op::Imm, value);
                self.ty = ty;
                self.emit_load();
            }
            _ => return Err(self.fail(DiagKind::UndefinedVariable)),
        }
        Ok(())
    }

    /// One infix or postfix production at the current token.
    fn parse_infix(&mut self) -> Result<(), CompileError> {
        // Type of the left operand; assignment, pointer arithmetic,
        // and indexing all need it after the right operand ran.
        let t = self.ty;

        match self.tok {
            Token::Assign => {
                self.advance();
                match self.code.last() {
                    Some(Op::Lc | Op::Li) => self.code.rewrite_last(Op::Psh),
                    _ => return Err(self.fail(DiagKind::BadAssignLvalue)),
                }
                self.expr(Prec::Assign)?;
                self.ty = t;
                self.emit_store();
            }

            Token::Cond => {
                self.advance();
                let skip_then = self.code.emit_hole(Op::Bz);
                self.expr(Prec::Assign)?;
                self.expect(Token::Colon, DiagKind::MissingColon)?;
                let skip_else = self.code.emit_hole(Op::Jmp);
                let else_start = self.code.here();
                self.code.patch(skip_then, else_start);
                self.expr(Prec::Cond)?;
                let end = self.code.here();
                self.code.patch(skip_else, end);
            }

            Token::Lor => {
                self.advance();
                let out = self.code.emit_hole(Op::Bnz);
                self.expr(Prec::Lan)?;
                let end = self.code.here();
                self.code.patch(out, end);
                self.ty = Type::INT;
            }

            Token::Lan => {
                self.advance();
                let out = self.code.emit_hole(Op::Bz);
                self.expr(Prec::Or)?;
                let end = self.code.here();
                self.code.patch(out, end);
                self.ty = Type::INT;
            }

            Token::Or => self.binary(Op::Or, Prec::Xor)?,
            Token::Xor => self.binary(Op::Xor, Prec::And)?,
            Token::And => self.binary(Op::And, Prec::Eq)?,
            Token::Eq => self.binary(Op::Eq, Prec::Lt)?,
            Token::Ne => self.binary(Op::Ne, Prec::Lt)?,
            Token::Lt => self.binary(Op::Lt, Prec::Shl)?,
            Token::Gt => self.binary(Op::Gt, Prec::Shl)?,
            Token::Le => self.binary(Op::Le, Prec::Shl)?,
            Token::Ge => self.binary(Op::Ge, Prec::Shl)?,
            Token::Shl => self.binary(Op::Shl, Prec::Add)?,
            Token::Shr => self.binary(Op::Shr, Prec::Add)?,

            Token::Add => {
                self.advance();
                self.code.emit(Op::Psh);
                self.expr(Prec::Mul)?;
                self.ty = t;
                if t.is_word_ptr() {
                    self.code.emit(Op::Psh);
                    self.code.emit_imm(Op::Imm, WORD);
                    self.code.emit(Op::Mul);
                }
                self.code.emit(Op::Add);
            }

            Token::Sub => {
                self.advance();
                self.code.emit(Op::Psh);
                self.expr(Prec::Mul)?;
                if t.is_word_ptr() && t == self.ty {
                    // Pointer difference, in elements.
                    self.code.emit(Op::Sub);
                    self.code.emit(Op::Psh);
                    self.code.emit_imm(Op::Imm, WORD);
                    self.code.emit(Op::Div);
                    self.ty = Type::INT;
                } else if t.is_word_ptr() {
                    self.ty = t;
                    self.code.emit(Op::Psh);
                    self.code.emit_imm(Op::Imm, WORD);
                    self.code.emit(Op::Mul);
                    self.code.emit(Op::Sub);
                } else {
                    self.code.emit(Op::Sub);
                }
            }

            Token::Mul => self.binary(Op::Mul, Prec::Inc)?,
            Token::Div => self.binary(Op::Div, Prec::Inc)?,
            Token::Mod => self.binary(Op::Mod, Prec::Inc)?,

            Token::Inc | Token::Dec => {
                // Postfix: store the adjusted value, then undo the
                // adjustment in the accumulator so the expression
                // yields the original.
                let inc = self.tok == Token::Inc;
                self.dup_load(DiagKind::BadPostIncLvalue)?;
                self.code.emit(Op::Psh);
                self.code.emit_imm(Op::Imm, self.ty.stride());
                self.code.emit(if inc { Op::Add } else { Op::Sub });
                self.emit_store();
                self.code.emit(Op::Psh);
                self.code.emit_imm(Op::Imm, self.ty.stride());
                self.code.emit(if inc { Op::Sub } else { Op::Add });
                self.advance();
            }

            Token::Brak => {
                self.advance();
                self.code.emit(Op::Psh);
                self.expr(Prec::Assign)?;
                self.expect(Token::RBracket, DiagKind::CloseBracketExpected)?;
                let elem = match t.deref() {
                    Some(elem) => elem,
                    None => return Err(self.fail(DiagKind::PointerTypeExpected)),
                };
                if t.is_word_ptr() {
                    self.code.emit(Op::Psh);
                    self.code.emit_imm(Op::Imm, WORD);
                    self.code.emit(Op::Mul);
                }
                self.code.emit(Op::Add);
                self.ty = elem;
                self.emit_load();
            }

            other => {
                return Err(self.fail(DiagKind::UnexpectedToken(format!("{:?}", other))));
            }
        }
        Ok(())
    }

    /// Plain left-associative binary operator: push left, parse right
    /// at `rhs_level`, emit `op`. The result is always int.
    fn binary(&mut self, op: Op, rhs_level: Prec) -> Result<(), CompileError> {
        self.advance();
        self.code.emit(Op::Psh);
        self.expr(rhs_level)?;
        self.code.emit(op);
        self.ty = Type::INT;
        Ok(())
    }
}
