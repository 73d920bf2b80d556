//! The finished compilation artifact.

use indexmap::IndexMap;

/// Everything the VM needs to run a compiled source file.
#[derive(Debug)]
pub struct Program {
    /// Instruction stream: opcodes with inline operands.
    pub code: Vec<i64>,
    /// Data segment image, mapped at [`crate::layout::DATA_BASE`].
    pub data: Vec<u8>,
    /// Code index of `main`'s entry instruction.
    pub entry: usize,
    /// Function entry points in definition order, for disassembly.
    pub labels: IndexMap<usize, String>,
}
