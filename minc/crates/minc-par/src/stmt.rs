//! Statement parsing and code generation.

use minc_lex::{Prec, Token};
use minc_lir::Op;
use minc_util::{CompileError, DiagKind};

use crate::Parser;

impl<'a> Parser<'a> {
    /// Parses one statement.
    pub(crate) fn stmt(&mut self) -> Result<(), CompileError> {
        match self.tok {
            Token::If => {
                self.advance();
                self.expect(Token::LParen, DiagKind::OpenParenExpected)?;
                self.expr(Prec::Assign)?;
                self.expect(Token::RParen, DiagKind::CloseParenExpected)?;

                let skip_then = self.code.emit_hole(Op::Bz);
                self.stmt()?;
                if self.tok == Token::Else {
                    let skip_else = self.code.emit_hole(Op::Jmp);
                    let else_start = self.code.here();
                    self.code.patch(skip_then, else_start);
                    self.advance();
                    self.stmt()?;
                    let end = self.code.here();
                    self.code.patch(skip_else, end);
                } else {
                    let end = self.code.here();
                    self.code.patch(skip_then, end);
                }
                Ok(())
            }

            Token::While => {
                self.advance();
                let top = self.code.here();
                self.expect(Token::LParen, DiagKind::OpenParenExpected)?;
                self.expr(Prec::Assign)?;
                self.expect(Token::RParen, DiagKind::CloseParenExpected)?;

                let out = self.code.emit_hole(Op::Bz);
                self.stmt()?;
                self.code.emit_imm(Op::Jmp, top as i64);
                let end = self.code.here();
                self.code.patch(out, end);
                Ok(())
            }

            Token::Return => {
                self.advance();
                if self.tok != Token::Semi {
                    self.expr(Prec::Assign)?;
                }
                self.code.emit(Op::Lev);
                self.expect(Token::Semi, DiagKind::SemicolonExpected)
            }

            Token::LBrace => {
                self.advance();
                while self.tok != Token::RBrace {
                    self.stmt()?;
                }
                self.advance();
                Ok(())
            }

            Token::Semi => {
                self.advance();
                Ok(())
            }

            _ => {
                self.expr(Prec::Assign)?;
                self.expect(Token::Semi, DiagKind::SemicolonExpected)
            }
        }
    }
}
