//! The `malloc`/`free` heap.
//!
//! A bump allocator over the fixed heap pool. Blocks are rounded up to
//! whole words and tracked in a map so `free` can retire them, but
//! freed space is not reused; the pool only moves forward. That is all
//! the source language's programs need, and it keeps every previously
//! handed-out address stable.

use rustc_hash::FxHashMap;

use minc_lir::layout::WORD;

/// Bump allocator over `[base, base + size)`.
pub struct Heap {
    next: i64,
    end: i64,
    /// Live blocks: address to rounded size.
    blocks: FxHashMap<i64, i64>,
}

impl Heap {
    /// Creates a heap over the given pool.
    pub fn new(base: i64, size: i64) -> Self {
        Self {
            next: base,
            end: base + size,
            blocks: FxHashMap::default(),
        }
    }

    /// Allocates `size` bytes, rounded up to a word multiple, and
    /// returns the address. Returns 0 when the pool is exhausted or
    /// the size is negative.
    pub fn alloc(&mut self, size: i64) -> i64 {
        if size < 0 {
            return 0;
        }
        let rounded = ((size + WORD - 1) & !(WORD - 1)).max(WORD);
        if self.next + rounded > self.end {
            return 0;
        }
        let addr = self.next;
        self.next += rounded;
        self.blocks.insert(addr, rounded);
        addr
    }

    /// Retires a block. Unknown addresses are ignored.
    pub fn free(&mut self, addr: i64) {
        self.blocks.remove(&addr);
    }

    /// Number of live blocks.
    pub fn live_blocks(&self) -> usize {
        self.blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_rounds_to_words() {
        let mut h = Heap::new(1024, 1024);
        let a = h.alloc(3);
        let b = h.alloc(8);
        let c = h.alloc(9);
        assert_eq!(a, 1024);
        assert_eq!(b, 1032);
        assert_eq!(c, 1040);
        assert_eq!(h.live_blocks(), 3);
    }

    #[test]
    fn test_zero_sized_alloc_is_distinct() {
        let mut h = Heap::new(1024, 1024);
        let a = h.alloc(0);
        let b = h.alloc(0);
        assert_ne!(a, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_exhaustion_returns_null() {
        let mut h = Heap::new(1024, 16);
        assert_ne!(h.alloc(16), 0);
        assert_eq!(h.alloc(8), 0);
    }

    #[test]
    fn test_negative_size_returns_null() {
        let mut h = Heap::new(1024, 1024);
        assert_eq!(h.alloc(-1), 0);
    }

    #[test]
    fn test_free_retires_block() {
        let mut h = Heap::new(1024, 1024);
        let a = h.alloc(8);
        h.free(a);
        assert_eq!(h.live_blocks(), 0);
        h.free(a); // double free is ignored
        h.free(9999);
    }
}
