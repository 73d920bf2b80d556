//! minc-lex - Lexer
//!
//! Turns a byte stream into tokens. The lexer is deliberately entangled
//! with two shared stores: identifiers are interned into the symbol
//! table as they are scanned (so keywords and syscalls resolve in one
//! step), and string literal bytes are copied straight into the data
//! segment, with the token carrying the literal's absolute address.
//!
//! The lexer never diagnoses anything. Running off the end of the
//! input in the middle of a literal simply yields `Eof`; surfacing
//! that as an error is the parser's job.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{seed_keywords, Prec, Token, KEYWORDS};
