//! CLI entry point for the `mic1` assembler and simulator binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use mic1_asm::{assemble_file, parse_literal, AssembleError, Program};
use mic1_core::{Cpu, Diagnostics};
#[cfg(test)]
use proptest as _;
#[cfg(test)]
use tempfile as _;
use thiserror as _;
use tracing_subscriber::EnvFilter;

const DEFAULT_RUN_STEPS: u64 = 1000;

const USAGE_TEXT: &str = "\
Usage: mic1 <command> [options]

Commands:
  build  <input> [-o <output>]                  Assemble source to a word image
  run    <input> [--steps <n>] [--dump <list>]  Assemble and simulate
  disasm <input>                                Assemble and print a listing

Options:
  -o, --output <file>  Output file path (default: input stem + .bin)
  -n, --steps <n>      Subcycles to simulate (default: 1000)
  -d, --dump <list>    Comma-separated addresses or labels to print after the run
  -v, --verbose        Raise the log level (repeat for more); RUST_LOG overrides
  -h, --help           Show this help message

Examples:
  mic1 build program.asm
  mic1 run program.asm --steps 2000 --dump res,status
  mic1 disasm program.asm
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Build(BuildArgs),
    Run(RunArgs),
    Disasm(DisasmArgs),
}

impl Command {
    const fn verbosity(&self) -> u8 {
        match self {
            Self::Build(args) => args.verbosity,
            Self::Run(args) => args.verbosity,
            Self::Disasm(args) => args.verbosity,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct BuildArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    verbosity: u8,
}

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    input: PathBuf,
    steps: u64,
    dump: Vec<String>,
    verbosity: u8,
}

#[derive(Debug, PartialEq, Eq)]
struct DisasmArgs {
    input: PathBuf,
    verbosity: u8,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "build" => parse_build_args(args)
            .map(Command::Build)
            .map(ParseResult::Command),
        "run" => parse_run_args(args)
            .map(Command::Run)
            .map(ParseResult::Command),
        "disasm" => parse_disasm_args(args)
            .map(Command::Disasm)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

/// Options every subcommand accepts, plus the single positional input.
#[derive(Debug, Default)]
struct CommonArgs {
    input: Option<PathBuf>,
    verbosity: u8,
}

impl CommonArgs {
    /// Consumes `arg` if it is a shared option or the input path.
    fn accept(&mut self, arg: OsString) -> Result<(), String> {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--verbose" || arg == "-v" {
            self.verbosity = self.verbosity.saturating_add(1);
            return Ok(());
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if self.input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        self.input = Some(PathBuf::from(arg));
        Ok(())
    }

    fn finish(self) -> Result<(PathBuf, u8), String> {
        let input = self.input.ok_or_else(|| "missing input path".to_string())?;
        Ok((input, self.verbosity))
    }
}

#[allow(clippy::while_let_on_iterator)]
fn parse_build_args(mut args: impl Iterator<Item = OsString>) -> Result<BuildArgs, String> {
    let mut common = CommonArgs::default();
    let mut output: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        if arg == "-o" || arg == "--output" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for -o".to_string())?;
            output = Some(PathBuf::from(value));
            continue;
        }
        common.accept(arg)?;
    }

    let (input, verbosity) = common.finish()?;
    Ok(BuildArgs {
        input,
        output,
        verbosity,
    })
}

#[allow(clippy::while_let_on_iterator)]
fn parse_run_args(mut args: impl Iterator<Item = OsString>) -> Result<RunArgs, String> {
    let mut common = CommonArgs::default();
    let mut steps = DEFAULT_RUN_STEPS;
    let mut dump = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "-n" || arg == "--steps" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --steps".to_string())?;
            let text = value.to_string_lossy();
            steps = text
                .parse()
                .map_err(|_| format!("invalid step count: {text}"))?;
            continue;
        }

        if arg == "-d" || arg == "--dump" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --dump".to_string())?;
            dump.extend(
                value
                    .to_string_lossy()
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string),
            );
            continue;
        }

        common.accept(arg)?;
    }

    let (input, verbosity) = common.finish()?;
    Ok(RunArgs {
        input,
        steps,
        dump,
        verbosity,
    })
}

fn parse_disasm_args(args: impl Iterator<Item = OsString>) -> Result<DisasmArgs, String> {
    let mut common = CommonArgs::default();
    for arg in args {
        common.accept(arg)?;
    }
    let (input, verbosity) = common.finish()?;
    Ok(DisasmArgs { input, verbosity })
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("out");

    let parent = input.parent().unwrap_or_else(|| Path::new(""));

    parent.join(format!("{stem}.bin"))
}

const fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_program(input: &Path) -> Result<Program, i32> {
    assemble_file(input).map_err(|e| {
        report_assemble_error(input, &e);
        1
    })
}

fn report_assemble_error(input: &Path, e: &AssembleError) {
    if e.line().is_some() {
        eprintln!("{}: error: {e}", input.display());
    } else {
        eprintln!("error: {e}");
    }
}

fn run_build(args: BuildArgs) -> Result<(), i32> {
    let program = load_program(&args.input)?;
    let bytes = program.to_be_bytes();

    let output_path = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));

    if let Err(e) = fs::write(&output_path, &bytes) {
        eprintln!("error: failed to write output: {e}");
        return Err(1);
    }

    println!(
        "Assembled {} ({} words) -> {}",
        args.input.display(),
        program.len(),
        output_path.display()
    );

    Ok(())
}

fn resolve_dump_address(program: &Program, item: &str) -> Option<u16> {
    program
        .symbols
        .get(item)
        .map(|symbol| symbol.address)
        .or_else(|| parse_literal(item))
}

fn print_state(cpu: &Cpu) {
    let registers = cpu.registers();
    let line: Vec<String> = registers
        .iter()
        .filter(|(reg, _)| registers.is_writable(*reg))
        .map(|(reg, value)| format!("{}={value:#06X}", reg.name()))
        .collect();
    println!("{}", line.join(" "));

    let flags = cpu.flags();
    println!(
        "N={} Z={} MPC={} subcycle={} MIR: {}",
        u8::from(flags.negative),
        u8::from(flags.zero),
        cpu.mpc(),
        cpu.subcycle().number(),
        cpu.mir()
    );
}

fn print_diagnostics(diag: &Diagnostics) {
    println!(
        "subcycles={} microinstructions={} instructions={}",
        diag.subcycles, diag.microinstructions, diag.instructions
    );
    println!(
        "cache: read {} hit / {} miss, write {} hit / {} miss",
        diag.cache_read_hits, diag.cache_read_misses, diag.cache_write_hits, diag.cache_write_misses
    );
    if let Some(ratio) = diag.cache_hit_ratio() {
        println!("cache hit ratio: {:.1}%", ratio * 100.0);
    }
    if let Some(fault) = diag.last_fault {
        println!(
            "faults={} (last: {fault} at MPC {})",
            diag.fault_count(),
            diag.last_fault_mpc
        );
    } else {
        println!("faults=0");
    }
}

fn run_simulation(args: &RunArgs) -> Result<(), i32> {
    let program = load_program(&args.input)?;

    let mut addresses = Vec::with_capacity(args.dump.len());
    for item in &args.dump {
        let Some(addr) = resolve_dump_address(&program, item) else {
            eprintln!("error: --dump: unknown label or address '{item}'");
            return Err(1);
        };
        addresses.push((item.as_str(), addr));
    }

    let mut cpu = Cpu::default();
    let stored = cpu.load_image(&program.words);
    if stored < program.len() {
        tracing::warn!(
            stored,
            words = program.len(),
            "program truncated to memory size"
        );
    }

    let outcome = cpu.run(args.steps);
    tracing::info!(
        subcycles = outcome.subcycles,
        faults = outcome.faults,
        "run finished"
    );

    print_state(&cpu);
    print_diagnostics(cpu.diagnostics());
    for (item, addr) in addresses {
        let value = cpu.read_word(addr);
        println!(
            "[{item}] m[{addr:#06X}] = {value:#06X} ({})",
            i16::from_ne_bytes(value.to_ne_bytes())
        );
    }

    Ok(())
}

fn run_disasm(args: &DisasmArgs) -> Result<(), i32> {
    let program = load_program(&args.input)?;
    for row in program.listing() {
        let labels = program.labels_at(row.addr);
        let label = if labels.is_empty() {
            String::new()
        } else {
            format!("{}:", labels.join(": "))
        };
        println!("{:04X}: {:04X}  {label:<12} {row}", row.addr, row.word);
    }
    Ok(())
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(command)) => {
            init_tracing(command.verbosity());
            let result = match command {
                Command::Build(args) => run_build(args),
                Command::Run(args) => run_simulation(&args),
                Command::Disasm(args) => run_disasm(&args),
            };
            match result {
                Ok(()) => 0,
                Err(code) => code,
            }
        }
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}
