// Command-line driver.
//
// Subcommands compress whole files, decompress the stream stored at an
// offset of an image, and list the records of a stream.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::compress::encoder::CompressOptions;
use crate::format::decoder::{Payload, RecordReader};
use crate::format::source::SeekSource;
use crate::format::{Command, MAX_OUTPUT_LEN};
use crate::io::{self, CompressStats, DecompressStats};

// ---------------------------------------------------------------------------
// Offset parsing (decimal or 0x-prefixed hex)
// ---------------------------------------------------------------------------

fn parse_offset(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty offset".into());
    }
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid offset '{s}': {e}"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Run-length/back-reference asset compressor.
#[derive(Parser, Debug)]
#[command(
    name = "halpack",
    version,
    about = "Compress and decompress 64 KiB-bank asset streams",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (errors only).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress a file into one stream.
    Compress(CompressArgs),
    /// Decompress the stream at an offset of an image.
    Decompress(DecompressArgs),
    /// List the records of the stream at an offset of an image.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct CompressArgs {
    /// Skip mirrored and reverse back-reference search.
    #[arg(long)]
    fast: bool,

    /// Search on a single thread.
    #[arg(long = "single-thread")]
    single_thread: bool,

    /// Uncompressed input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Compressed output file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct DecompressArgs {
    /// Address of the stream in the image (decimal or 0x hex).
    #[arg(long, short = 'o', value_parser = parse_offset, default_value = "0")]
    offset: u64,

    /// Image holding the compressed stream.
    #[arg(value_hint = ValueHint::FilePath)]
    image: PathBuf,

    /// Decompressed output file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Address of the stream in the image (decimal or 0x hex).
    #[arg(long, short = 'o', value_parser = parse_offset, default_value = "0")]
    offset: u64,

    /// Image holding the compressed stream.
    #[arg(value_hint = ValueHint::FilePath)]
    image: PathBuf,
}

// ---------------------------------------------------------------------------
// Global options
// ---------------------------------------------------------------------------

struct Options {
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
}

fn log_filter(opts: &Options) -> &'static str {
    if opts.quiet {
        return "error";
    }
    match opts.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn check_output(path: &Path, opts: &Options) -> bool {
    if path.exists() && !opts.force {
        eprintln!(
            "halpack: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return false;
    }
    true
}

fn hex_digest(digest: Option<[u8; 32]>) -> Option<String> {
    digest.map(|d| d.iter().map(|b| format!("{b:02x}")).collect())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_compress(args: &CompressArgs, opts: &Options) -> i32 {
    if !check_output(&args.output, opts) {
        return 1;
    }
    let compress_opts = CompressOptions {
        fast: args.fast,
        parallel: !args.single_thread,
    };
    let stats = match io::compress_file(&args.input, &args.output, compress_opts) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("halpack: {}: {e}", args.input.display());
            return 1;
        }
    };

    if opts.verbose > 0 && !opts.quiet {
        print_compress_stats(&stats);
    }

    if opts.json_output {
        let records: serde_json::Map<String, serde_json::Value> = Command::ALL
            .iter()
            .map(|&c| (c.name().to_string(), stats.commands.records(c).into()))
            .collect();
        let json = serde_json::json!({
            "command": "compress",
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "ratio": stats.commands.ratio(),
            "fast": args.fast,
            "records": records,
            "input_sha256": hex_digest(stats.input_sha256),
        });
        match serde_json::to_string_pretty(&json) {
            Ok(s) => eprintln!("{s}"),
            Err(e) => {
                eprintln!("halpack: json error: {e}");
                return 1;
            }
        }
    }

    0
}

fn print_compress_stats(stats: &CompressStats) {
    eprintln!(
        "halpack: compress: input size: {}, output size: {}, ratio: {:.3}",
        stats.input_size,
        stats.output_size,
        stats.commands.ratio()
    );
    for command in Command::ALL {
        let n = stats.commands.records(command);
        if n > 0 {
            eprintln!(
                "halpack:   {:<16} {n:>6} records {:>6} bytes",
                command.name(),
                stats.commands.produced(command)
            );
        }
    }
}

fn cmd_decompress(args: &DecompressArgs, opts: &Options) -> i32 {
    if !check_output(&args.output, opts) {
        return 1;
    }
    let stats = match io::decompress_file(&args.image, Some(args.offset), &args.output) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!(
                "halpack: {} at {:#X}: {e}",
                args.image.display(),
                args.offset
            );
            return 1;
        }
    };

    if opts.verbose > 0 && !opts.quiet {
        print_decompress_stats(&stats);
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "decompress",
            "start": stats.start,
            "end": stats.end,
            "compressed_size": stats.compressed_size(),
            "output_size": stats.output_size,
            "output_sha256": hex_digest(stats.output_sha256),
        });
        match serde_json::to_string_pretty(&json) {
            Ok(s) => eprintln!("{s}"),
            Err(e) => {
                eprintln!("halpack: json error: {e}");
                return 1;
            }
        }
    }

    0
}

fn print_decompress_stats(stats: &DecompressStats) {
    eprintln!(
        "halpack: decompress: stream {:#X}..{:#X} ({} bytes), output size: {}",
        stats.start,
        stats.end,
        stats.compressed_size(),
        stats.output_size
    );
}

fn cmd_inspect(args: &InspectArgs) -> i32 {
    let file = match File::open(&args.image) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("halpack: {}: {e}", args.image.display());
            return 1;
        }
    };
    let Ok(start) = usize::try_from(args.offset) else {
        eprintln!("halpack: offset {:#X} is out of range", args.offset);
        return 1;
    };

    let reader = RecordReader::new(SeekSource::new(BufReader::new(file)), start);
    let mut produced = 0usize;
    println!("  ADDRESS  COMMAND           LENGTH  OUTPUT  PAYLOAD");
    for record in reader {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                eprintln!("halpack: {e}");
                return 1;
            }
        };
        let payload = match &record.payload {
            Payload::Bytes(b) => format!("{} raw bytes", b.len()),
            Payload::Byte(b) => format!("{b:#04X}"),
            Payload::Word([hi, lo]) => format!("{hi:02X} {lo:02X}"),
            Payload::Offset(off) => format!("@{off:#06X}"),
        };
        println!(
            "  {:#08X} {:<16} {:>7} {:>7}  {payload}",
            record.address,
            record.command.name(),
            record.length,
            produced
        );
        produced += record.output_len();
    }
    println!("  end of stream: {produced} bytes decoded");
    if produced > MAX_OUTPUT_LEN {
        eprintln!("halpack: warning: stream expands past {MAX_OUTPUT_LEN} bytes");
    }
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = Options {
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose,
        json_output: cli.json_output,
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&opts)))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match &cli.command {
        Cmd::Compress(args) => cmd_compress(args, &opts),
        Cmd::Decompress(args) => cmd_decompress(args, &opts),
        Cmd::Inspect(args) => cmd_inspect(args),
    };
    process::exit(exit_code);
}
