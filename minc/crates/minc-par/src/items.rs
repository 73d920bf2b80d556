//! Top-level declarations: enums, globals, and function definitions.
//!
//! A declaration starts with a base type (`int`, `char`, or an `enum`
//! block) followed by declarators. A declarator with `(` after its
//! name is a function definition and is compiled inline; anything else
//! becomes a global occupying one zeroed word of the data segment.
//!
//! Functions register their parameters and locals as shadowing entries
//! in the symbol table. The frame layout falls out of the slot
//! numbering: parameter `i` lives at `bp + (nparams + 1 - i)` words,
//! local `j` at `bp - j`. Both are addressed with `LEA loc - slot`
//! where `loc = nparams + 1`.

use minc_lex::Token;
use minc_lir::Op;
use minc_util::{CompileError, DiagKind, SymKind, SymbolId, Type};

use crate::Parser;

impl<'a> Parser<'a> {
    /// Parses one top-level declaration group, up to and including its
    /// terminating `;` (or the `}` of a function body group).
    pub(crate) fn parse_declaration(&mut self) -> Result<(), CompileError> {
        let mut base = Type::INT;
        if self.tok == Token::IntKw {
            self.advance();
        } else if self.tok == Token::CharKw {
            self.advance();
            base = Type::CHAR;
        } else if self.tok == Token::EnumKw {
            self.parse_enum()?;
        }

        while self.tok != Token::Semi && self.tok != Token::RBrace {
            self.parse_declarator(base)?;
            if self.tok == Token::Comma {
                self.advance();
            }
        }
        self.advance();
        Ok(())
    }

    /// Parses `enum [tag] { A [= N], B, ... }`, binding each member as
    /// a numeric constant. An explicit `= N` resets the counter.
    fn parse_enum(&mut self) -> Result<(), CompileError> {
        self.advance();
        if self.tok != Token::LBrace {
            // Skip the optional tag; the type system does not keep it.
            self.advance();
        }
        if self.tok == Token::LBrace {
            self.advance();
            let mut next_value: i64 = 0;
            while self.tok != Token::RBrace {
                let id = match self.tok {
                    Token::Id(id) => id,
                    _ => return Err(self.fail(DiagKind::BadEnumIdentifier)),
                };
                self.advance();
                if self.tok == Token::Assign {
                    self.advance();
                    match self.tok {
                        Token::Num(v) => next_value = v,
                        _ => return Err(self.fail(DiagKind::BadEnumInitializer)),
                    }
                    self.advance();
                }
                let sym = self.syms.get_mut(id);
                sym.kind = SymKind::Num;
                sym.ty = Type::INT;
                sym.value = next_value;
                next_value += 1;
                if self.tok == Token::Comma {
                    self.advance();
                }
            }
            self.advance();
        }
        Ok(())
    }

    /// Parses one declarator: `*`s, a name, then a function definition
    /// or a global allocation.
    fn parse_declarator(&mut self, base: Type) -> Result<(), CompileError> {
        let mut ty = base;
        while self.tok == Token::Mul {
            self.advance();
            ty = ty.ptr_to();
        }
        let id = match self.tok {
            Token::Id(id) => id,
            _ => return Err(self.fail(DiagKind::BadGlobalDeclaration)),
        };
        if self.syms.get(id).kind != SymKind::Ident {
            return Err(self.fail(DiagKind::DuplicateGlobal));
        }
        self.advance();
        self.syms.get_mut(id).ty = ty;

        if self.tok == Token::LParen {
            self.parse_function(id)
        } else {
            let addr = self.data.alloc_global();
            let sym = self.syms.get_mut(id);
            sym.kind = SymKind::Global;
            sym.value = addr;
            Ok(())
        }
    }

    /// Compiles a function definition inline: parameters, local
    /// declarations, `ENT`, body, `LEV`, then unshadowing.
    fn parse_function(&mut self, id: SymbolId) -> Result<(), CompileError> {
        let entry = self.code.here();
        {
            let sym = self.syms.get_mut(id);
            sym.kind = SymKind::Func;
            sym.value = entry as i64;
        }
        let name = String::from_utf8_lossy(&self.syms.get(id).name).into_owned();
        tracing::debug!(target: "minc::par", function = %name, entry, "compiling function");
        self.labels.insert(entry, name);

        // Parameters, slot-numbered from zero left to right.
        self.advance();
        let mut slot: i64 = 0;
        while self.tok != Token::RParen {
            let mut ty = Type::INT;
            if self.tok == Token::IntKw {
                self.advance();
            } else if self.tok == Token::CharKw {
                self.advance();
                ty = Type::CHAR;
            }
            while self.tok == Token::Mul {
                self.advance();
                ty = ty.ptr_to();
            }
            let param = match self.tok {
                Token::Id(param) => param,
                _ => return Err(self.fail(DiagKind::BadParameterDeclaration)),
            };
            if self.syms.get(param).kind == SymKind::Local {
                return Err(self.fail(DiagKind::DuplicateParameter));
            }
            self.syms.snapshot_local(param, ty, slot);
            slot += 1;
            self.advance();
            if self.tok == Token::Comma {
                self.advance();
            }
        }
        self.advance();

        if self.tok != Token::LBrace {
            return Err(self.fail(DiagKind::BadFunctionDefinition));
        }
        slot += 1;
        self.loc = slot;
        self.advance();

        // Leading local declarations.
        while self.tok == Token::IntKw || self.tok == Token::CharKw {
            let local_base = if self.tok == Token::IntKw {
                Type::INT
            } else {
                Type::CHAR
            };
            self.advance();
            while self.tok != Token::Semi {
                let mut ty = local_base;
                while self.tok == Token::Mul {
                    self.advance();
                    ty = ty.ptr_to();
                }
                let local = match self.tok {
                    Token::Id(local) => local,
                    _ => return Err(self.fail(DiagKind::BadLocalDeclaration)),
                };
                if self.syms.get(local).kind == SymKind::Local {
                    return Err(self.fail(DiagKind::DuplicateLocal));
                }
                slot += 1;
                self.syms.snapshot_local(local, ty, slot);
                self.advance();
                if self.tok == Token::Comma {
                    self.advance();
                }
            }
            self.advance();
        }

        self.code.emit_imm(Op::Ent, slot - self.loc);
        while self.tok != Token::RBrace {
            self.stmt()?;
        }
        self.code.emit(Op::Lev);

        // The body is done; every shadowed binding comes back.
        self.syms.restore_locals();
        Ok(())
    }
}
