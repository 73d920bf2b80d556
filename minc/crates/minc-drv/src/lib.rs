//! minc-drv - Driver
//!
//! Orchestrates one invocation end to end: read the source file,
//! compile it, and either print the listing (`-s`) or hand the program
//! to the VM and surface its exit status.
//!
//! Exit codes follow the machine's convention: the integer a program
//! passes to `exit` (or returns from `main`) becomes the process exit
//! status, and every failure on the way there — unreadable file,
//! compile diagnostic, `main` missing, runtime fault — is reported and
//! mapped to −1.

use std::path::PathBuf;

use anyhow::Context;

use minc_par::{compile, Options};
use minc_vm::{SysHost, Vm, VmOptions};

/// One driver invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source file to compile.
    pub path: PathBuf,
    /// Print source + disassembly instead of executing.
    pub listing: bool,
    /// Trace every executed instruction.
    pub trace: bool,
    /// Extra arguments passed through to the program's `main`.
    pub program_args: Vec<String>,
}

/// Runs the pipeline, reporting errors to stderr. Returns the process
/// exit code.
pub fn run(config: &Config) -> i32 {
    match try_run(config) {
        Ok(status) => status,
        Err(err) => {
            eprintln!("{:#}", err);
            -1
        }
    }
}

fn try_run(config: &Config) -> anyhow::Result<i32> {
    tracing::debug!(target: "minc::drv", path = %config.path.display(), "reading source");
    let mut source = std::fs::read(&config.path)
        .with_context(|| format!("could not open({})", config.path.display()))?;
    // The lexer stops at the first NUL; terminating the buffer keeps
    // that contract explicit.
    source.push(0);

    let program = compile(&source, &Options { listing: config.listing })?;

    if config.listing {
        return Ok(0);
    }

    // The program sees the source path as argv[0], like any process.
    let mut args = vec![config.path.to_string_lossy().into_owned()];
    args.extend(config.program_args.iter().cloned());

    let mut vm = Vm::new(program, &args, &VmOptions { trace: config.trace })?;
    let status = vm.run(&mut SysHost::new())?;
    Ok(status as i32)
}
