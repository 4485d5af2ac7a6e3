//! opcode-tools CLI
//!
//! Instruction frequency reports for a directory of binaries, and
//! hex/binary conversion of single opcodes.

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use opcode_tools::convert::{process_binary_with_order, process_hex};
use opcode_tools::{
    report, ByteOrder, CsvFormatter, EmptyFilePolicy, JsonFormatter, ObjdumpConfig,
    ObjdumpSource, ReportFormatter, ReporterOptions, RowOrder,
};
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Instruction statistics and opcode conversion for AArch64 work.
#[derive(Parser, Debug)]
#[command(name = "opcode-tools")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (suppress warnings)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count instruction mnemonics in every binary under a directory
    Freq(FreqArgs),
    /// Convert a little-endian hex byte array to big-endian binary
    #[command(name = "hex2bin")]
    HexToBin {
        /// Hex arrays such as "0x20, 0x00, 0x80, 0xd2"; read from stdin if omitted
        input: Vec<String>,
    },
    /// Convert a 32-bit binary opcode to hex bytes
    #[command(name = "bin2hex")]
    BinToHex {
        /// Binary opcodes (spaces and tabs ignored); read from stdin if omitted
        input: Vec<String>,

        /// Emit the most-significant byte first
        #[arg(long)]
        big_endian: bool,
    },
}

#[derive(ClapArgs, Debug)]
struct FreqArgs {
    /// Directory scanned recursively for binaries
    #[arg(default_value = ReporterOptions::DEFAULT_ROOT)]
    root: PathBuf,

    /// Report path ("-" for stdout)
    #[arg(short, long, default_value = ReporterOptions::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "csv")]
    format: OutputFormat,

    /// Row ordering
    #[arg(long, default_value = "name")]
    order: OrderArg,

    /// Report files without instructions as 0% instead of failing
    #[arg(long)]
    allow_empty: bool,

    /// objdump executable
    #[arg(long, env = "OBJDUMP", default_value = ObjdumpConfig::DEFAULT_TOOL)]
    objdump: String,

    /// Section to disassemble
    #[arg(long, default_value = ".text")]
    section: String,

    /// Decode instructions as little-endian (omit -EB)
    #[arg(long)]
    little_endian: bool,

    /// Allow objdump to print mnemonic aliases
    #[arg(long)]
    aliases: bool,

    /// Do not interleave source lines (omit -S)
    #[arg(long)]
    no_source: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Comma-separated values
    Csv,
    /// Pretty-printed JSON
    Json,
}

/// Row ordering options.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    /// Alphabetical by mnemonic
    Name,
    /// Most frequent first
    Frequency,
}

impl From<OrderArg> for RowOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Name => RowOrder::Name,
            OrderArg::Frequency => RowOrder::Frequency,
        }
    }
}

impl FreqArgs {
    fn reporter_options(&self) -> ReporterOptions {
        let policy = if self.allow_empty {
            EmptyFilePolicy::Zero
        } else {
            EmptyFilePolicy::Error
        };
        ReporterOptions::new()
            .with_root(&self.root)
            .with_output(&self.output)
            .with_empty_file_policy(policy)
            .with_row_order(self.order.into())
    }

    fn objdump_config(&self) -> opcode_tools::Result<ObjdumpConfig> {
        let config = ObjdumpConfig {
            tool: self.objdump.clone(),
            section: self.section.clone(),
            big_endian: !self.little_endian,
            no_aliases: !self.aliases,
            interleave_source: !self.no_source,
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    let success = match &args.command {
        Command::Freq(freq) => match run_freq(freq) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                false
            }
        },
        Command::HexToBin { input } => convert_all(input, process_hex),
        Command::BinToHex { input, big_endian } => {
            let order = if *big_endian {
                ByteOrder::Big
            } else {
                ByteOrder::Little
            };
            convert_all(input, |s| process_binary_with_order(s, order))
        }
    };

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn init_logging(args: &Args) {
    let filter = if args.verbose {
        "opcode_tools=debug"
    } else if args.quiet {
        "opcode_tools=error"
    } else {
        "opcode_tools=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

fn run_freq(args: &FreqArgs) -> anyhow::Result<()> {
    let options = args.reporter_options();
    let source = ObjdumpSource::new(args.objdump_config()?);

    let report = report::generate(&source, &options)
        .with_context(|| format!("scanning {}", options.root.display()))?;

    let formatter: Box<dyn ReportFormatter> = match args.format {
        OutputFormat::Csv => Box::new(CsvFormatter::new()),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    };
    report::write_report(&report, formatter.as_ref(), &options)?;
    Ok(())
}

/// Convert each input (or each stdin line) and print the result.
///
/// A failed conversion prints its message and nothing else for that input.
fn convert_all<F>(inputs: &[String], convert: F) -> bool
where
    F: Fn(&str) -> opcode_tools::Result<String>,
{
    let mut success = true;
    let mut handle = |line: &str| match convert(line) {
        Ok(out) => println!("{}", out),
        Err(e) => {
            eprintln!("{}", e);
            success = false;
        }
    };

    if inputs.is_empty() {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) if line.trim().is_empty() => {}
                Ok(line) => handle(&line),
                Err(e) => {
                    eprintln!("Error reading stdin: {}", e);
                    return false;
                }
            }
        }
    } else {
        for input in inputs {
            handle(input);
        }
    }

    success
}
