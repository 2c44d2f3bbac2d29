//! Command-line front end: disassemble a hex blob, or load it into mock
//! memory and single-step a few instructions through it.
//!
//! Deliberately thin — it only exercises [`cmthumb::Disassembler`],
//! [`cmthumb::Cpu`], [`cmthumb::MemoryBackend`]/[`cmthumb::MockMemory`] and
//! [`cmthumb::Formatter`], the crate's public surface. Grounded on the
//! teacher's `src/main.rs` argument layout, with `clap` derive replacing its
//! `argparse`-based `CmdLineArgs` and `env_logger` replacing its hand-rolled
//! `logger.rs`.

use clap::{Parser, Subcommand};
use log::{error, info};

use cmthumb::{Cpu, Disassembler, Formatter, MemoryBackend, MockMemory};

#[derive(Parser)]
#[command(name = "cmthumb", version, about = "An ARMv7-M Thumb/Thumb-2 disassembler and simulator.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Disassemble a hex-encoded byte string.
    Disasm {
        /// Hex digits, e.g. `0022ff00` (no `0x` prefix, no separators).
        hex: String,
        /// Address of the first byte.
        #[arg(long, default_value_t = 0)]
        base: u32,
    },
    /// Load a hex-encoded image at address 0 and execute `count` instructions
    /// from the reset vector, printing each instruction as it runs.
    Step {
        /// Hex digits making up the image.
        hex: String,
        /// Number of instructions to execute.
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
}

fn parse_hex(hex: &str) -> Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 {
        return Err("hex string must have an even number of digits".into());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string()))
        .collect()
}

fn run_disasm(hex: &str, base: u32) -> Result<(), String> {
    let bytes = parse_hex(hex)?;
    let formatter = Formatter::new();
    for item in Disassembler::new(&bytes, base) {
        match item {
            Ok(instr) => println!("{:#010x}: {}", instr.address, formatter.format(&instr)),
            Err(e) => error!("{e}"),
        }
    }
    Ok(())
}

fn run_step(hex: &str, count: u32) -> Result<(), String> {
    let bytes = parse_hex(hex)?;
    let mut mem = MockMemory::new();
    mem.add_range_with_data(0, bytes);

    let mut cpu = Cpu::new();
    let formatter = Formatter::new();

    for _ in 0..count {
        let pc = cpu.pc();
        let first = mem.read_memory(pc, cmthumb::memory::AccessSize::Halfword) as u16;
        let is_wide = cmthumb::decoder::is_wide_prefix(first);
        let raw = if is_wide {
            let second = mem.read_memory(pc + 2, cmthumb::memory::AccessSize::Halfword) as u16;
            ((first as u32) << 16) | second as u32
        } else {
            first as u32
        };
        let instr = match cmthumb::decoder::decode_one(raw, pc, is_wide) {
            Ok(instr) => instr,
            Err(e) => {
                error!("{e}");
                break;
            }
        };
        println!("{:#010x}: {}", instr.address, formatter.format(&instr));
        if let Err(e) = instr.execute(&mut cpu, &mut mem) {
            error!("execution failed: {e}");
            break;
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Disasm { hex, base } => run_disasm(&hex, base),
        Command::Step { hex, count } => run_step(&hex, count),
    };
    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
    info!("done");
}
