//! Instruction-stream rendering for the trace sinks.
//!
//! Both the `-s` source listing and the `-d` execution trace print
//! instructions the same way: a four-character mnemonic, followed by
//! the inline operand when the opcode takes one. Words that do not
//! decode to an opcode are printed raw; they can appear when a trace
//! starts mid-operand.

use crate::op::Op;

/// Renders the single instruction starting at `pos` and returns the
/// rendered text together with the position of the next instruction.
pub fn render_at(words: &[i64], pos: usize) -> (String, usize) {
    let word = words[pos];
    match Op::from_word(word) {
        Some(op) if op.has_operand() && pos + 1 < words.len() => {
            (format!("{} {}", op.mnemonic(), words[pos + 1]), pos + 2)
        }
        Some(op) => (op.mnemonic().trim_end().to_string(), pos + 1),
        None => (format!("??? {}", word), pos + 1),
    }
}
