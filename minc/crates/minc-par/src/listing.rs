//! The `-s` source listing sink.
//!
//! Prints each source line as it is consumed, followed by the
//! instructions the parser emitted while on that line. Function entry
//! points get a `name:` label line. Output goes to stdout; the listing
//! replaces execution, so nothing else competes for the stream.

use indexmap::IndexMap;

use minc_lir::disasm::render_at;
use minc_lir::CodeBuf;

/// Incremental listing state: how much source text and how many code
/// words have been printed so far.
pub(crate) struct Listing {
    /// Next line number to print.
    next_line: u32,
    /// Byte offset of the first unprinted source byte.
    src_mark: usize,
    /// Index of the first unprinted code word.
    code_mark: usize,
}

impl Listing {
    pub(crate) fn new() -> Self {
        Self {
            next_line: 1,
            src_mark: 0,
            code_mark: 0,
        }
    }

    /// Called after every token; prints completed lines and the code
    /// emitted for them once the lexer has moved past a line boundary.
    pub(crate) fn flush(
        &mut self,
        current_line: u32,
        current_line_start: usize,
        source: &[u8],
        code: &CodeBuf,
        labels: &IndexMap<usize, String>,
    ) {
        if current_line <= self.next_line {
            return;
        }
        let text = &source[self.src_mark..current_line_start];
        print!("{}: {}", self.next_line, String::from_utf8_lossy(text));
        self.src_mark = current_line_start;
        self.next_line = current_line;
        self.print_code(code.words(), labels);
    }

    /// Prints whatever source and code remain once parsing ends.
    pub(crate) fn finish(
        &mut self,
        source: &[u8],
        code: &CodeBuf,
        labels: &IndexMap<usize, String>,
    ) {
        if self.src_mark < source.len() {
            let text = &source[self.src_mark..];
            print!("{}: {}", self.next_line, String::from_utf8_lossy(text));
            if !text.ends_with(b"\n") {
                println!();
            }
            self.src_mark = source.len();
        }
        self.print_code(code.words(), labels);
    }

    fn print_code(&mut self, words: &[i64], labels: &IndexMap<usize, String>) {
        let mut pos = self.code_mark;
        while pos < words.len() {
            if let Some(name) = labels.get(&pos) {
                println!("{}:", name);
            }
            let (text, next) = render_at(words, pos);
            println!("    {}", text);
            pos = next;
        }
        self.code_mark = words.len();
    }
}
