//! Compile-time diagnostics.
//!
//! The compiler is single-pass and makes no attempt at recovery: the
//! first problem it meets is reported as `<line>: <message>` and
//! compilation stops. [`DiagKind`] enumerates the fixed message set;
//! [`CompileError`] attaches the source line.

use thiserror::Error;

/// A fatal compile-time error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// A line-tagged diagnostic from the lexer or parser.
    #[error("{line}: {kind}")]
    Diag { line: u32, kind: DiagKind },

    /// The finished program has no `main` function to start from.
    #[error("main() not defined")]
    MainUndefined,
}

impl CompileError {
    /// Builds a line-tagged diagnostic.
    pub fn diag(line: u32, kind: DiagKind) -> Self {
        CompileError::Diag { line, kind }
    }

    /// The diagnostic kind, if this is a line-tagged diagnostic.
    pub fn kind(&self) -> Option<&DiagKind> {
        match self {
            CompileError::Diag { kind, .. } => Some(kind),
            CompileError::MainUndefined => None,
        }
    }
}

/// Every diagnostic the compiler can produce. Messages are fixed
/// strings; only [`DiagKind::UnexpectedToken`] interpolates the
/// offending token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiagKind {
    #[error("unexpected eof in expression")]
    UnexpectedEof,

    #[error("open paren expected in sizeof")]
    SizeofOpenParen,

    #[error("close paren expected in sizeof")]
    SizeofCloseParen,

    #[error("bad function call")]
    BadFunctionCall,

    #[error("undefined variable")]
    UndefinedVariable,

    #[error("bad cast")]
    BadCast,

    #[error("close paren expected")]
    CloseParenExpected,

    #[error("open paren expected")]
    OpenParenExpected,

    #[error("bad dereference")]
    BadDereference,

    #[error("bad address-of")]
    BadAddressOf,

    #[error("bad lvalue in pre-increment")]
    BadPreIncLvalue,

    #[error("bad lvalue in post-increment")]
    BadPostIncLvalue,

    #[error("bad lvalue in assignment")]
    BadAssignLvalue,

    #[error("bad expression")]
    BadExpression,

    #[error("conditional missing colon")]
    MissingColon,

    #[error("close bracket expected")]
    CloseBracketExpected,

    #[error("pointer type expected")]
    PointerTypeExpected,

    #[error("compiler error tk={0}")]
    UnexpectedToken(String),

    #[error("semicolon expected")]
    SemicolonExpected,

    #[error("bad enum identifier")]
    BadEnumIdentifier,

    #[error("bad enum initializer")]
    BadEnumInitializer,

    #[error("bad global declaration")]
    BadGlobalDeclaration,

    #[error("duplicate global definition")]
    DuplicateGlobal,

    #[error("bad parameter declaration")]
    BadParameterDeclaration,

    #[error("duplicate parameter definition")]
    DuplicateParameter,

    #[error("bad function definition")]
    BadFunctionDefinition,

    #[error("bad local declaration")]
    BadLocalDeclaration,

    #[error("duplicate local definition")]
    DuplicateLocal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diag_formats_with_line() {
        let e = CompileError::diag(7, DiagKind::BadAssignLvalue);
        assert_eq!(e.to_string(), "7: bad lvalue in assignment");
    }

    #[test]
    fn test_main_undefined_has_no_line() {
        assert_eq!(CompileError::MainUndefined.to_string(), "main() not defined");
    }

    #[test]
    fn test_unexpected_token_interpolates() {
        let e = CompileError::diag(3, DiagKind::UnexpectedToken("Else".into()));
        assert_eq!(e.to_string(), "3: compiler error tk=Else");
    }
}
