// Command-line front end for unswf.
//
// Thin glue around `io::uncompress_file()`: parse two paths, run the
// transcode, report the outcome through the process exit code.

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueHint};

use crate::io;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// SWF CWS-to-FWS transcoder.
#[derive(Parser, Debug)]
#[command(
    name = "unswf",
    version,
    about = "Rewrites zlib-compressed (CWS) SWF files as uncompressed (FWS)"
)]
struct Cli {
    /// Compressed SWF file to read.
    #[arg(short = 'i', long, value_hint = ValueHint::FilePath, default_value = "input.swf")]
    input: PathBuf,

    /// Uncompressed SWF file to write.
    #[arg(short = 'o', long, value_hint = ValueHint::FilePath, default_value = "output.swf")]
    output: PathBuf,

    /// Quiet mode (suppress the summary line).
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Output stats as JSON to stderr.
    #[arg(long = "json")]
    json_output: bool,
}

// ---------------------------------------------------------------------------
// Uncompress command
// ---------------------------------------------------------------------------

fn cmd_uncompress(cli: &Cli) -> i32 {
    let stats = match io::uncompress_file(&cli.input, &cli.output) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("unswf: {e}");
            return 1;
        }
    };

    if !cli.quiet {
        eprintln!(
            "unswf: {} -> {}: {} bytes in, {} bytes out (Flash version {})",
            cli.input.display(),
            cli.output.display(),
            stats.compressed_size,
            stats.output_size,
            stats.version
        );
    }

    if cli.json_output {
        let json = serde_json::json!({
            "input": cli.input.display().to_string(),
            "output": cli.output.display().to_string(),
            "version": stats.version,
            "declared_length": stats.declared_length,
            "compressed_size": stats.compressed_size,
            "output_size": stats.output_size,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, runs the transcode.
pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    process::exit(cmd_uncompress(&cli));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
