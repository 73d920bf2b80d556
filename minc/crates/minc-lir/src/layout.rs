//! Address-space layout shared by the compiler and the VM.
//!
//! The VM owns one flat byte array carved into fixed pools:
//!
//! ```text
//!   0 .. DATA_BASE          reserved (keeps 0 a null pointer)
//!   DATA_BASE .. +DATA_POOL data segment (strings, globals)
//!   then       .. +HEAP_POOL heap served by malloc
//!   then       .. +STACK_POOL stack, growing downward from the top
//! ```
//!
//! The compiler bakes absolute data addresses into the instruction
//! stream, so `DATA_BASE` must be agreed on before parsing starts.

pub use minc_util::WORD;

/// First valid data address. Nonzero and word-aligned so that address
/// 0 stays an unmapped null pointer.
pub const DATA_BASE: i64 = WORD;

/// Fixed pool sizes, one for each region.
pub const DATA_POOL: i64 = 256 * 1024;
pub const HEAP_POOL: i64 = 256 * 1024;
pub const STACK_POOL: i64 = 256 * 1024;

/// First heap address.
pub const HEAP_BASE: i64 = DATA_BASE + DATA_POOL;

/// One past the last valid address; the stack pointer starts here.
pub const MEM_TOP: i64 = HEAP_BASE + HEAP_POOL + STACK_POOL;
