//! minc - compile and run a C-subset source file on the built-in VM.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use minc_drv::Config;

/// Minc - a minimal C-subset compiler with an in-process stack VM
#[derive(Parser, Debug)]
#[command(name = "minc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile and run a C-subset source file", long_about = None)]
struct Cli {
    /// Print the source and generated instructions, then exit without
    /// running
    #[arg(short = 's')]
    src: bool,

    /// Trace every executed instruction
    #[arg(short = 'd')]
    debug: bool,

    /// Source file to compile
    path: PathBuf,

    /// Arguments passed through to the compiled program
    #[arg(trailing_var_arg = true)]
    args: Vec<String>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let config = Config {
        path: cli.path,
        listing: cli.src,
        trace: cli.debug,
        program_args: cli.args,
    };
    std::process::exit(minc_drv::run(&config));
}

/// Initializes logging from `RUST_LOG`, defaulting to warnings only so
/// the compiler's own output streams stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    tracing_subscriber::registry().with(filter).with(layer).init();
}
