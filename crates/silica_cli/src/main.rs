//! Silica CLI — the command-line interface for the Silica logic synthesizer.
//!
//! Provides `silica synth` for running the full synthesis pipeline on a
//! Verilog source file, and `silica check` for parsing and elaborating a
//! design without producing output.

#![warn(missing_docs)]

mod check;
mod pipeline;
mod synth;

use std::process;

use clap::{Parser, Subcommand};

/// Silica — a Verilog-to-BLIF logic synthesizer.
#[derive(Parser, Debug)]
#[command(name = "silica", version, about = "Silica logic synthesizer")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output (per-stage progress).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Synthesize a Verilog source file to BLIF.
    Synth(SynthArgs),
    /// Parse and elaborate a design without writing output.
    Check(CheckArgs),
}

/// Arguments for the `silica synth` subcommand.
#[derive(Parser, Debug)]
pub struct SynthArgs {
    /// Verilog source file to synthesize.
    pub input: String,

    /// Output BLIF path (default: input path with a `.blif` extension).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Top module name (default: the first module in the file).
    #[arg(long)]
    pub top: Option<String>,

    /// Dump per-stage netlist snapshots as JSON.
    #[arg(long)]
    pub dump_debug: bool,
}

/// Arguments for the `silica check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Verilog source file to check.
    pub input: String,

    /// Top module name (default: the first module in the file).
    #[arg(long)]
    pub top: Option<String>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print per-stage progress.
    pub verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Command::Synth(ref args) => synth::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
