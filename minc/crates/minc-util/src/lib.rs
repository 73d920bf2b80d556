//! minc-util - Shared compiler infrastructure
//!
//! This crate holds the pieces every other compiler phase leans on:
//!
//! - [`SymbolTable`]: the flat, append-only identifier table with
//!   hash-prefiltered lookup and shadow slots for locals
//! - [`Type`]: the three-valued type lattice (char, int, pointer chains)
//! - [`CompileError`]: line-tagged, fatal compile diagnostics
//!
//! Nothing here depends on the lexer, parser, or VM; those crates all
//! depend on this one.

pub mod error;
pub mod symbol;
pub mod types;

pub use error::{CompileError, DiagKind};
pub use symbol::{ident_hash, SymKind, Symbol, SymbolId, SymbolTable};
pub use types::Type;

/// Machine word size in bytes.
///
/// Used consistently for stack slots, globals, pointer scaling, and the
/// value of `sizeof(int)`. Mixing sizes would break pointer arithmetic.
pub const WORD: i64 = 8;
