//! Flat symbol table with hash-prefiltered interning.
//!
//! All identifiers the lexer sees are interned here. The table is a
//! plain append-only vector: lookup scans linearly but compares the
//! precomputed hash before touching the name bytes, so the common case
//! is one integer compare per entry. Hash collisions are legal; two
//! names only alias if the hash *and* the bytes match.
//!
//! Each entry carries one saved shadow slot. When a function parameter
//! or local shadows an outer binding, the outer (kind, type, value)
//! triple is stashed in the shadow and restored when the function body
//! ends, returning the table to its pre-function state.

use crate::types::Type;

/// Handle to a symbol table entry.
///
/// Handles are stable: the table is append-only and entries never move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Raw index of the entry.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a name currently refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymKind {
    /// Seen but not yet classified by any declaration.
    #[default]
    Ident,
    /// Numeric constant (an enum member).
    Num,
    /// Global variable; `value` is its absolute data address.
    Global,
    /// Local variable or parameter; `value` is its frame slot index.
    Local,
    /// User-defined function; `value` is its code address.
    Func,
    /// Host syscall; `value` is the syscall opcode word.
    Sys,
    /// Reserved word; `value` indexes the lexer's keyword table.
    Keyword,
}

/// The outer binding stashed while a local shadows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shadow {
    pub kind: SymKind,
    pub ty: Type,
    pub value: i64,
}

/// One interned identifier and its current binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Identifier text.
    pub name: Vec<u8>,
    /// Hash computed by [`ident_hash`].
    pub hash: u64,
    /// Current classification.
    pub kind: SymKind,
    /// Declared type (meaningful for variables and functions).
    pub ty: Type,
    /// Kind-dependent payload: constant value, data address, code
    /// address, frame slot, syscall opcode, or keyword index.
    pub value: i64,
    /// Saved outer binding while this name is a local.
    pub shadow: Option<Shadow>,
}

/// Identifier hash used by the lexer and by table pre-seeding.
///
/// Folds the bytes with multiplier 147 starting from the first byte,
/// then mixes in the length: `h = (h << 6) + len`. All arithmetic
/// wraps. The function is fixed; lookups never rely on it being
/// collision-free.
pub fn ident_hash(name: &[u8]) -> u64 {
    let mut bytes = name.iter().copied();
    let mut h = bytes.next().unwrap_or(0) as u64;
    for b in bytes {
        h = h.wrapping_mul(147).wrapping_add(b as u64);
    }
    (h << 6).wrapping_add(name.len() as u64)
}

/// The flat, append-only symbol table.
#[derive(Debug, Default)]
pub struct SymbolTable {
    syms: Vec<Symbol>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self { syms: Vec::new() }
    }

    /// Interns `name`, returning the handle of the existing entry when
    /// both hash and bytes match, or of a fresh unclassified entry
    /// otherwise.
    pub fn intern(&mut self, name: &[u8], hash: u64) -> SymbolId {
        for (i, sym) in self.syms.iter().enumerate() {
            if sym.hash == hash && sym.name == name {
                return SymbolId(i as u32);
            }
        }
        self.syms.push(Symbol {
            name: name.to_vec(),
            hash,
            kind: SymKind::Ident,
            ty: Type::default(),
            value: 0,
            shadow: None,
        });
        SymbolId((self.syms.len() - 1) as u32)
    }

    /// Interns `name` and classifies it in one step. Used when
    /// pre-seeding keywords and syscalls at startup.
    pub fn define(&mut self, name: &[u8], kind: SymKind, ty: Type, value: i64) -> SymbolId {
        let id = self.intern(name, ident_hash(name));
        let sym = &mut self.syms[id.index()];
        sym.kind = kind;
        sym.ty = ty;
        sym.value = value;
        id
    }

    /// Borrows the entry behind a handle.
    #[inline]
    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.syms[id.index()]
    }

    /// Mutably borrows the entry behind a handle.
    #[inline]
    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.syms[id.index()]
    }

    /// Rebinds `id` as a local, stashing the outer (kind, type, value)
    /// triple in the entry's shadow slot first.
    pub fn snapshot_local(&mut self, id: SymbolId, ty: Type, value: i64) {
        let sym = &mut self.syms[id.index()];
        sym.shadow = Some(Shadow {
            kind: sym.kind,
            ty: sym.ty,
            value: sym.value,
        });
        sym.kind = SymKind::Local;
        sym.ty = ty;
        sym.value = value;
    }

    /// Restores the shadow of every entry currently bound as a local.
    ///
    /// Called at function-body end; afterwards the table is identical
    /// to its state before the function's first parameter was
    /// registered.
    pub fn restore_locals(&mut self) {
        for sym in &mut self.syms {
            if sym.kind == SymKind::Local {
                match sym.shadow.take() {
                    Some(outer) => {
                        sym.kind = outer.kind;
                        sym.ty = outer.ty;
                        sym.value = outer.value;
                    }
                    None => {
                        sym.kind = SymKind::Ident;
                        sym.ty = Type::default();
                        sym.value = 0;
                    }
                }
            }
        }
    }

    /// Number of interned entries.
    pub fn len(&self) -> usize {
        self.syms.len()
    }

    /// Returns true if no identifiers have been interned.
    pub fn is_empty(&self) -> bool {
        self.syms.is_empty()
    }

    /// Iterates over all entries in interning order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.syms.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_same_name() {
        let mut t = SymbolTable::new();
        let h = ident_hash(b"foo");
        let a = t.intern(b"foo", h);
        let b = t.intern(b"foo", h);
        assert_eq!(a, b);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_intern_different_names() {
        let mut t = SymbolTable::new();
        let a = t.intern(b"foo", ident_hash(b"foo"));
        let b = t.intern(b"bar", ident_hash(b"bar"));
        assert_ne!(a, b);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_hash_collision_distinct_entries() {
        // Same (fabricated) hash, different bytes: must not alias.
        let mut t = SymbolTable::new();
        let a = t.intern(b"aa", 42);
        let b = t.intern(b"bb", 42);
        assert_ne!(a, b);
        assert_eq!(t.get(a).name, b"aa");
        assert_eq!(t.get(b).name, b"bb");
    }

    #[test]
    fn test_fresh_entry_is_zeroed() {
        let mut t = SymbolTable::new();
        let id = t.intern(b"x", ident_hash(b"x"));
        let s = t.get(id);
        assert_eq!(s.kind, SymKind::Ident);
        assert_eq!(s.value, 0);
        assert!(s.shadow.is_none());
    }

    #[test]
    fn test_snapshot_and_restore() {
        let mut t = SymbolTable::new();
        let id = t.define(b"g", SymKind::Global, Type::INT, 4096);

        t.snapshot_local(id, Type::CHAR, 3);
        assert_eq!(t.get(id).kind, SymKind::Local);
        assert_eq!(t.get(id).value, 3);

        t.restore_locals();
        let s = t.get(id);
        assert_eq!(s.kind, SymKind::Global);
        assert_eq!(s.ty, Type::INT);
        assert_eq!(s.value, 4096);
        assert!(s.shadow.is_none());
    }

    #[test]
    fn test_restore_returns_table_to_prior_state() {
        let mut t = SymbolTable::new();
        t.define(b"open", SymKind::Sys, Type::INT, 30);
        t.define(b"g", SymKind::Global, Type::INT, 8);
        let before: Vec<Symbol> = t.iter().cloned().collect();

        // Register a parameter shadowing the global and a brand-new local.
        let g = t.intern(b"g", ident_hash(b"g"));
        t.snapshot_local(g, Type::INT, 0);
        let n = t.intern(b"n", ident_hash(b"n"));
        t.snapshot_local(n, Type::INT, 2);

        t.restore_locals();
        let after: Vec<Symbol> = t.iter().cloned().collect();
        assert_eq!(&after[..before.len()], &before[..]);
        // The new name survives as an unclassified identifier.
        assert_eq!(t.get(n).kind, SymKind::Ident);
        assert_eq!(t.get(n).value, 0);
    }

    #[test]
    fn test_ident_hash_mixes_length() {
        // Prefix-related names must not trivially collide.
        assert_ne!(ident_hash(b"a"), ident_hash(b"aa"));
        assert_ne!(ident_hash(b"ab"), ident_hash(b"ba"));
    }
}
