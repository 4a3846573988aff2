//! PQR5 pipeline simulator CLI.
//!
//! This binary provides a single entry point for the toolchain. It performs:
//! 1. **Run:** Load a program (PQR5 `.bin`, hex text, raw, ELF or assembly source)
//!    and simulate it until the halt instruction retires.
//! 2. **Assemble:** Translate PQR5 assembly into a `.bin` container or hex text.
//! 3. **Disassemble:** List the instructions of a program file.
//!
//! Logging goes to stderr through `tracing-subscriber`; `RUST_LOG` overrides the
//! default level and `--trace` enables the per-stage pipeline trace.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use pqr5_core::common::SimError;
use pqr5_core::config::{BranchPredictorKind, Config};
use pqr5_core::isa::asm::assemble_listing;
use pqr5_core::isa::disasm::disassemble;
use pqr5_core::sim::loader::{self, Program};
use pqr5_core::sim::{RunOutcome, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "pqr5sim",
    author,
    version,
    about = "PQR5 five-stage RV32I pipeline simulator",
    long_about = "Simulate, assemble or disassemble programs for the PQR5 RV32I pipeline.\n\nExamples:\n  pqr5sim run prog.bin\n  pqr5sim run prog.s --trace --predictor gshare\n  pqr5sim asm prog.s -o prog.bin\n  pqr5sim disasm prog.bin"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a program until it halts.
    Run {
        /// Program file (.bin, _hex.txt, raw binary, ELF, or .s/.asm source).
        file: PathBuf,

        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Log every pipeline stage every cycle.
        #[arg(long)]
        trace: bool,

        /// Cycle budget.
        #[arg(long)]
        max_cycles: Option<u64>,

        /// Branch direction predictor.
        #[arg(long, value_enum)]
        predictor: Option<PredictorArg>,

        /// Extra cycles per instruction fetch.
        #[arg(long)]
        imem_latency: Option<u64>,

        /// Extra cycles per data access.
        #[arg(long)]
        dmem_latency: Option<u64>,

        /// Print statistics as JSON instead of tables.
        #[arg(long)]
        json: bool,

        /// Statistics sections to print (summary, core, instruction_mix, branch).
        #[arg(long, value_delimiter = ',')]
        sections: Vec<String>,

        /// Print the register file after the run.
        #[arg(long)]
        dump_regs: bool,
    },

    /// Assemble PQR5 assembly into a program image.
    Asm {
        /// Assembly source.
        input: PathBuf,

        /// Output path (default: input with `.bin`, or `_hex.txt` with `--hex`).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a hex text image instead of the `.bin` container.
        #[arg(long)]
        hex: bool,
    },

    /// Disassemble a program file.
    Disasm {
        /// Program file.
        file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PredictorArg {
    NotTaken,
    Static,
    Gshare,
}

impl From<PredictorArg> for BranchPredictorKind {
    fn from(arg: PredictorArg) -> Self {
        match arg {
            PredictorArg::NotTaken => Self::NotTaken,
            PredictorArg::Static => Self::Static,
            PredictorArg::Gshare => Self::GShare,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let trace = matches!(cli.command, Commands::Run { trace: true, .. });
    init_logging(trace);

    let result = match cli.command {
        Commands::Run {
            file,
            config,
            trace,
            max_cycles,
            predictor,
            imem_latency,
            dmem_latency,
            json,
            sections,
            dump_regs,
        } => {
            let opts = RunOptions {
                trace,
                max_cycles,
                predictor,
                imem_latency,
                dmem_latency,
                json,
                sections,
                dump_regs,
            };
            cmd_run(&file, config.as_deref(), &opts)
        }
        Commands::Asm { input, output, hex } => cmd_asm(&input, output, hex),
        Commands::Disasm { file } => cmd_disasm(&file),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(trace: bool) {
    let default = if trace { "trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

struct RunOptions {
    trace: bool,
    max_cycles: Option<u64>,
    predictor: Option<PredictorArg>,
    imem_latency: Option<u64>,
    dmem_latency: Option<u64>,
    json: bool,
    sections: Vec<String>,
    dump_regs: bool,
}

fn is_source(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("s") || ext.eq_ignore_ascii_case("asm"))
}

fn read_program(path: &Path) -> Result<Program, SimError> {
    if is_source(path) {
        let source = fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        Ok(assemble_listing(&source)?.into_program())
    } else {
        loader::load_file(path)
    }
}

/// Loads the program, applies CLI overrides to the configuration and runs to completion.
fn cmd_run(file: &Path, config: Option<&Path>, opts: &RunOptions) -> Result<ExitCode, SimError> {
    let mut config = match config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    config.general.trace_instructions |= opts.trace;
    if let Some(n) = opts.max_cycles {
        config.general.max_cycles = n;
    }
    if let Some(p) = opts.predictor {
        config.pipeline.branch_predictor = p.into();
    }
    if let Some(n) = opts.imem_latency {
        config.memory.imem_latency = n;
    }
    if let Some(n) = opts.dmem_latency {
        config.memory.dmem_latency = n;
    }

    let program = read_program(file)?;
    let mut sim = Simulator::new(&config);
    sim.load(&program)?;

    let outcome = sim.run();

    let uart = sim.uart_output();
    if !uart.is_empty() && !config.system.uart_echo {
        print!("{uart}");
    }
    if opts.dump_regs {
        println!("{}", sim.regs());
    }
    if opts.json {
        match serde_json::to_string_pretty(&sim.stats) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("error: could not serialize statistics: {e}"),
        }
    } else {
        sim.stats.print_sections(&opts.sections);
    }

    Ok(match outcome {
        RunOutcome::Halted { cycles } => {
            eprintln!("[*] halted after {cycles} cycles");
            ExitCode::SUCCESS
        }
        RunOutcome::CycleLimit => {
            eprintln!("[!] cycle limit reached");
            ExitCode::from(2)
        }
        RunOutcome::Deadlock { pc } => {
            eprintln!("[!] pipeline deadlocked at pc {pc:#010x}");
            ExitCode::from(3)
        }
    })
}

fn cmd_asm(input: &Path, output: Option<PathBuf>, hex: bool) -> Result<ExitCode, SimError> {
    let source = fs::read_to_string(input).map_err(|e| SimError::io(input, e))?;
    let listing = assemble_listing(&source)?;

    let output = output.unwrap_or_else(|| {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        input.with_file_name(if hex {
            format!("{stem}_hex.txt")
        } else {
            format!("{stem}.bin")
        })
    });

    let bytes = if hex {
        loader::write_hex_text(&listing.words).into_bytes()
    } else {
        loader::write_pqr5_bin(listing.base, &listing.words)
    };
    fs::write(&output, bytes).map_err(|e| SimError::io(&output, e))?;

    eprintln!(
        "[*] {} instructions ({} bytes) at {:#010x} -> {}",
        listing.words.len(),
        listing.size_bytes(),
        listing.base,
        output.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_disasm(file: &Path) -> Result<ExitCode, SimError> {
    let program = read_program(file)?;
    let (base, words) = program.words();
    for (i, word) in words.iter().enumerate() {
        let addr = base.wrapping_add((i * 4) as u32);
        let marker = if addr == program.entry { ">" } else { " " };
        println!("{marker}{addr:08x}:  {word:08x}  {}", disassemble(*word));
    }
    Ok(ExitCode::SUCCESS)
}
