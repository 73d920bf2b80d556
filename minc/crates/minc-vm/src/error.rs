//! Runtime faults.
//!
//! The machine has exactly two planned ways to stop: the `EXIT`
//! syscall (a normal result, not an error) and an unknown instruction.
//! Everything else here covers behavior the instruction set leaves
//! undefined — wild addresses, wild jumps, division by zero — which
//! this implementation turns into terminal faults instead of silently
//! corrupting state.

use thiserror::Error;

/// A terminal runtime fault. The VM cannot continue after any of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VmError {
    /// A fetched word did not decode to an opcode.
    #[error("unknown instruction = {word}! cycle = {cycle}")]
    UnknownInstruction { word: i64, cycle: u64 },

    /// A load or store touched memory outside the machine.
    #[error("bad memory access at address {addr}")]
    BadAddress { addr: i64 },

    /// The program counter left the code buffer.
    #[error("pc out of range: {pc}")]
    BadJump { pc: i64 },

    /// `DIV` or `MOD` with a zero divisor.
    #[error("divide by zero at cycle {cycle}")]
    DivideByZero { cycle: u64 },

    /// The compiled data segment does not fit its pool.
    #[error("data segment of {size} bytes exceeds the {limit} byte pool")]
    DataOverflow { size: usize, limit: usize },
}
