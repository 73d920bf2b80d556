//! minc-vm - The stack machine
//!
//! A fetch-decode-execute interpreter over the flat instruction stream
//! the compiler produces. Four registers: `pc` (code word index), `sp`
//! and `bp` (byte addresses into one flat memory), and `a`, the
//! accumulator every instruction reads or writes.
//!
//! # Calling convention
//!
//! The caller pushes arguments left to right and `JSR`s; the callee's
//! first instruction is `ENT n`, which saves `bp` and reserves `n`
//! local slots. Argument `i` then sits at `bp + (i + 2)` words (above
//! the saved bp and return pc), local `j` at `bp - j`. `LEV` tears the
//! frame down and the caller pops its arguments with `ADJ`.
//!
//! `main` gets a synthesized outer frame: the VM appends a two-word
//! `PSH; EXIT` halt stub to the code, materializes `argv` in the heap,
//! and pushes `argc`, `argv`, and the stub address as the return pc.
//! When `main` returns, the stub turns its return value into a normal
//! `exit`.

pub mod error;
pub mod heap;
pub mod host;
pub mod memory;
mod printf;

pub use error::VmError;
pub use heap::Heap;
pub use host::{CaptureHost, Host, SysHost};
pub use memory::Memory;

use minc_lir::layout::{DATA_BASE, DATA_POOL, HEAP_BASE, HEAP_POOL, MEM_TOP, WORD};
use minc_lir::{Op, Program};

/// Execution options.
#[derive(Debug, Default, Clone)]
pub struct VmOptions {
    /// Print each instruction before executing it.
    pub trace: bool,
}

/// The virtual machine, loaded and ready to run.
pub struct Vm {
    code: Vec<i64>,
    mem: Memory,
    heap: Heap,
    pc: usize,
    sp: i64,
    bp: i64,
    a: i64,
    cycle: u64,
    trace: bool,
}

impl Vm {
    /// Loads a program and sets up `main`'s initial frame. `args`
    /// become the program's `argc`/`argv`, written into VM memory.
    pub fn new(program: Program, args: &[String], options: &VmOptions) -> Result<Self, VmError> {
        if program.data.len() > DATA_POOL as usize {
            return Err(VmError::DataOverflow {
                size: program.data.len(),
                limit: DATA_POOL as usize,
            });
        }

        let mut code = program.code;
        let halt = code.len();
        code.push(Op::Psh.word());
        code.push(Op::Exit.word());

        let mut mem = Memory::new(MEM_TOP as usize);
        mem.write_bytes(DATA_BASE, &program.data)?;

        // argv strings and pointer array live at the bottom of the heap.
        let mut heap = Heap::new(HEAP_BASE, HEAP_POOL);
        let argc = args.len() as i64;
        let mut ptrs = Vec::with_capacity(args.len());
        for arg in args {
            let addr = heap.alloc(arg.len() as i64 + 1);
            mem.write_bytes(addr, arg.as_bytes())?;
            ptrs.push(addr);
        }
        let argv = heap.alloc(argc.max(1) * WORD);
        for (i, ptr) in ptrs.iter().enumerate() {
            mem.store_word(argv + i as i64 * WORD, *ptr)?;
        }

        let mut vm = Self {
            code,
            mem,
            heap,
            pc: program.entry,
            sp: MEM_TOP,
            bp: MEM_TOP,
            a: 0,
            cycle: 0,
            trace: options.trace,
        };
        vm.push(argc)?;
        vm.push(argv)?;
        vm.push(halt as i64)?;
        Ok(vm)
    }

    /// Runs to completion, returning the program's exit status.
    pub fn run(&mut self, host: &mut dyn Host) -> Result<i64, VmError> {
        loop {
            let word = *self
                .code
                .get(self.pc)
                .ok_or(VmError::BadJump { pc: self.pc as i64 })?;
            self.pc += 1;
            self.cycle += 1;

            let op = Op::from_word(word).ok_or(VmError::UnknownInstruction {
                word,
                cycle: self.cycle,
            })?;

            if self.trace {
                let mut line = format!("{}> {}", self.cycle, op.mnemonic());
                if op.has_operand() {
                    line.push_str(&format!(" {}", self.code.get(self.pc).copied().unwrap_or(0)));
                }
                line.push('\n');
                host.write(line.as_bytes());
            }

            match op {
                Op::Lea => {
                    let off = self.operand()?;
                    self.a = self.bp + off * WORD;
                }
                Op::Imm => self.a = self.operand()?,
                Op::Jmp => {
                    let target = self.operand()?;
                    self.pc = target as usize;
                }
                Op::Jsr => {
                    let target = self.operand()?;
                    self.push(self.pc as i64)?;
                    self.pc = target as usize;
                }
                Op::Bz => {
                    let target = self.operand()?;
                    if self.a == 0 {
                        self.pc = target as usize;
                    }
                }
                Op::Bnz => {
                    let target = self.operand()?;
                    if self.a != 0 {
                        self.pc = target as usize;
                    }
                }
                Op::Ent => {
                    let nlocals = self.operand()?;
                    self.push(self.bp)?;
                    self.bp = self.sp;
                    self.sp -= nlocals * WORD;
                }
                Op::Adj => {
                    let n = self.operand()?;
                    self.sp += n * WORD;
                }
                Op::Lev => {
                    self.sp = self.bp;
                    self.bp = self.pop()?;
                    self.pc = self.pop()? as usize;
                }
                Op::Li => self.a = self.mem.load_word(self.a)?,
                Op::Lc => self.a = self.mem.load_byte(self.a)?,
                Op::Si => {
                    let addr = self.pop()?;
                    self.mem.store_word(addr, self.a)?;
                }
                Op::Sc => {
                    let addr = self.pop()?;
                    self.mem.store_byte(addr, self.a)?;
                    self.a = self.a as u8 as i8 as i64;
                }
                Op::Psh => self.push(self.a)?,

                Op::Or
                | Op::Xor
                | Op::And
                | Op::Eq
                | Op::Ne
                | Op::Lt
                | Op::Gt
                | Op::Le
                | Op::Ge
                | Op::Shl
                | Op::Shr
                | Op::Add
                | Op::Sub
                | Op::Mul
                | Op::Div
                | Op::Mod => {
                    let lhs = self.pop()?;
                    self.a = self.binary(op, lhs, self.a)?;
                }

                Op::Open
                | Op::Read
                | Op::Clos
                | Op::Prtf
                | Op::Malc
                | Op::Free
                | Op::Mset
                | Op::Mcmp
                | Op::Exit => {
                    if let Some(status) = self.syscall(op, host)? {
                        return Ok(status);
                    }
                }
            }
        }
    }

    /// Reads the inline operand of the current instruction.
    fn operand(&mut self) -> Result<i64, VmError> {
        let word = *self
            .code
            .get(self.pc)
            .ok_or(VmError::BadJump { pc: self.pc as i64 })?;
        self.pc += 1;
        Ok(word)
    }

    fn push(&mut self, value: i64) -> Result<(), VmError> {
        self.sp -= WORD;
        self.mem.store_word(self.sp, value)
    }

    fn pop(&mut self) -> Result<i64, VmError> {
        let value = self.mem.load_word(self.sp)?;
        self.sp += WORD;
        Ok(value)
    }

    /// `a = lhs op rhs`, with C semantics on a signed 64-bit word.
    fn binary(&self, op: Op, lhs: i64, rhs: i64) -> Result<i64, VmError> {
        Ok(match op {
            Op::Or => lhs | rhs,
            Op::Xor => lhs ^ rhs,
            Op::And => lhs & rhs,
            Op::Eq => (lhs == rhs) as i64,
            Op::Ne => (lhs != rhs) as i64,
            Op::Lt => (lhs < rhs) as i64,
            Op::Gt => (lhs > rhs) as i64,
            Op::Le => (lhs <= rhs) as i64,
            Op::Ge => (lhs >= rhs) as i64,
            Op::Shl => lhs.wrapping_shl(rhs as u32),
            Op::Shr => lhs.wrapping_shr(rhs as u32),
            Op::Add => lhs.wrapping_add(rhs),
            Op::Sub => lhs.wrapping_sub(rhs),
            Op::Mul => lhs.wrapping_mul(rhs),
            Op::Div => {
                if rhs == 0 {
                    return Err(VmError::DivideByZero { cycle: self.cycle });
                }
                lhs.wrapping_div(rhs)
            }
            Op::Mod => {
                if rhs == 0 {
                    return Err(VmError::DivideByZero { cycle: self.cycle });
                }
                lhs.wrapping_rem(rhs)
            }
            _ => unreachable!("not a binary op: {:?}", op),
        })
    }

    /// Stack argument `k` words above `sp` (0 = rightmost argument).
    fn arg(&self, k: i64) -> Result<i64, VmError> {
        self.mem.load_word(self.sp + k * WORD)
    }

    /// Dispatches one syscall opcode. Returns `Some(status)` for EXIT.
    fn syscall(&mut self, op: Op, host: &mut dyn Host) -> Result<Option<i64>, VmError> {
        match op {
            Op::Open => {
                let path = self.mem.read_cstr(self.arg(1)?)?.to_vec();
                let flags = self.arg(0)?;
                self.a = host.open(&path, flags);
            }
            Op::Read => {
                let fd = self.arg(2)?;
                let buf = self.arg(1)?;
                let count = self.arg(0)?;
                self.a = host.read(fd, self.mem.slice_mut(buf, count)?);
            }
            Op::Clos => {
                let fd = self.arg(0)?;
                self.a = host.close(fd);
            }
            Op::Prtf => {
                // The caller's ADJ follows the call; its operand is the
                // number of words pushed, which locates the arguments.
                let nargs = self.pending_adj();
                let base = self.sp + nargs * WORD;
                let fmt = self.mem.load_word(base - WORD)?;
                let mut args = Vec::new();
                let mut k = 2;
                while k <= nargs.min(7) {
                    args.push(self.mem.load_word(base - k * WORD)?);
                    k += 1;
                }
                let out = printf::format(&self.mem, fmt, &args)?;
                self.a = host.write(&out);
            }
            Op::Malc => {
                let size = self.arg(0)?;
                self.a = self.heap.alloc(size);
            }
            Op::Free => {
                let addr = self.arg(0)?;
                self.heap.free(addr);
            }
            Op::Mset => {
                let buf = self.arg(2)?;
                let byte = self.arg(1)?;
                let count = self.arg(0)?;
                self.mem.slice_mut(buf, count)?.fill(byte as u8);
                self.a = buf;
            }
            Op::Mcmp => {
                let a = self.arg(2)?;
                let b = self.arg(1)?;
                let count = self.arg(0)?;
                self.a = self.mem.compare(a, b, count)?;
            }
            Op::Exit => {
                let status = self.mem.load_word(self.sp)?;
                let line = format!("exit({}) cycle = {}\n", status, self.cycle);
                host.write(line.as_bytes());
                tracing::debug!(target: "minc::vm", status, cycle = self.cycle, "program exit");
                return Ok(Some(status));
            }
            _ => unreachable!("not a syscall: {:?}", op),
        }
        Ok(None)
    }

    /// Operand of the `ADJ` that follows a call, counting the words the
    /// caller pushed. Falls back to 1 (format string only) when no ADJ
    /// was emitted, which can only happen for a malformed zero-argument
    /// call.
    fn pending_adj(&self) -> i64 {
        if self.code.get(self.pc) == Some(&Op::Adj.word()) {
            self.code.get(self.pc + 1).copied().unwrap_or(1)
        } else {
            1
        }
    }

    /// Cycles executed so far.
    pub fn cycles(&self) -> u64 {
        self.cycle
    }
}
