/// ndstream command-line tool: decode and validate newline-delimited JSON
/// streams from files or stdin without loading them into memory.
///
/// # Command overview
///
/// ```text
/// ndstream <COMMAND> [OPTIONS]
///
/// Commands:
///   decode     Stream every valid record to stdout as JSON, one per line
///   validate   Report every malformed line and a summary
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log decoder progress to stderr (debug level)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                          |
/// |------|--------------------------------------------------|
/// | 0    | Success                                          |
/// | 1    | Error (I/O failure, malformed lines on validate) |
///
/// Logs and diagnostics are written to stderr so stdout can be piped
/// cleanly. `RUST_LOG` overrides the log filter.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use ndstream_decoder::DecoderConfig;
use ndstream_decoder::config::{DEFAULT_BATCH_SIZE, DEFAULT_READ_BUFFER_SIZE};
use tracing_subscriber::EnvFilter;

mod cmd_decode;
mod cmd_validate;
mod input;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The ndstream command-line tool.
#[derive(Parser)]
#[command(name = "ndstream", version, about = "Streaming NDJSON decoder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log decoder progress to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Stream every valid record to stdout, one JSON value per line.
    Decode(DecodeArgs),
    /// Report malformed lines; exit 1 if there are any.
    Validate(ValidateArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Decoder tuning shared by every subcommand.
///
/// ```text
/// ┌────────────────────┬──────────────────────────────────────────────────┐
/// │ Flag               │ Effect                                           │
/// ├────────────────────┼──────────────────────────────────────────────────┤
/// │ --max-record-bytes │ Skip (and report) lines longer than N bytes      │
/// │ --read-buffer      │ Bytes requested from the input per read          │
/// └────────────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DecoderArgs {
    /// Input file. Reads stdin when omitted or `-`.
    pub file: Option<PathBuf>,

    /// Discard lines longer than this many bytes, reporting them instead.
    #[arg(long)]
    pub max_record_bytes: Option<usize>,

    /// Bytes requested from the input per read.
    #[arg(long, default_value_t = DEFAULT_READ_BUFFER_SIZE)]
    pub read_buffer: usize,
}

impl DecoderArgs {
    pub fn config(&self) -> DecoderConfig {
        DecoderConfig {
            max_record_bytes: self.max_record_bytes,
            read_buffer_size: self.read_buffer,
            ..DecoderConfig::default()
        }
    }
}

/// Arguments for `ndstream decode`.
///
/// Values are written as compact JSON, one per line, and stdout is
/// flushed after every batch of up to `--batch-size` values that were
/// ready together. Malformed lines are logged as warnings on stderr.
#[derive(clap::Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub decoder: DecoderArgs,

    /// Pretty-print each value (multi-line output; no longer NDJSON).
    #[arg(long)]
    pub pretty: bool,

    /// Maximum number of values written between flushes.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
}

/// Arguments for `ndstream validate`.
///
/// Prints `line N: message` for every malformed line, then a summary.
#[derive(clap::Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub decoder: DecoderArgs,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Decode(args) => cmd_decode::run(&args).await,
        Commands::Validate(args) => cmd_validate::run(&args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
