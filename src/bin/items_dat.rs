use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use items_dat_lib::codec;
use items_dat_lib::export::{self, Format};

#[derive(Parser)]
#[command(name = "items-dat")]
#[command(about = "Decode, edit and re-encode items.dat files", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an items.dat file to JSON or text
    Decode {
        /// Binary items.dat input
        input: PathBuf,

        /// Output file (.json or .txt); defaults to the input with a .json extension
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encode a JSON, text or items.dat file into items.dat
    Encode {
        /// Input file (.json, .txt or .dat)
        input: PathBuf,

        /// Binary items.dat output
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show the header and version-dependent fields of a file
    Info {
        /// Input file (.dat, .json or .txt)
        input: PathBuf,
    },

    /// Check that decoding and re-encoding reproduces the file byte for byte
    Verify {
        /// Binary items.dat input
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Decode { input, output } => {
            require_format(&input, Format::Dat)?;
            let output = output.unwrap_or_else(|| input.with_extension("json"));
            if Format::from_path(&output)? == Format::Dat {
                bail!("decode writes .json or .txt, not {}", output.display());
            }

            let db = export::load(&input)?;
            export::save(&db, &output)?;
        }
        Commands::Encode { input, output } => {
            require_format(&output, Format::Dat)?;

            let db = export::load(&input)?;
            export::save(&db, &output)?;
        }
        Commands::Info { input } => {
            let summary = export::summarize(&input)?;
            println!("{}", summary);
        }
        Commands::Verify { input } => return verify(&input),
    }

    Ok(ExitCode::SUCCESS)
}

fn require_format(path: &Path, expected: Format) -> Result<()> {
    let found = Format::from_path(path)?;
    if found != expected {
        bail!(
            "expected a .{} file, got {}",
            expected.extension(),
            path.display()
        );
    }
    Ok(())
}

fn verify(input: &Path) -> Result<ExitCode> {
    require_format(input, Format::Dat)?;

    let original =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let db = codec::decode(&original)
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    let reencoded = codec::encode(&db).context("Failed to re-encode")?;

    match codec::first_difference(&original, &reencoded) {
        None => {
            tracing::info!(
                "{}: {} items, {} bytes, round trip is exact",
                input.display(),
                db.items.len(),
                original.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Some(offset) => {
            tracing::error!(
                "{}: first difference at offset 0x{:X} ({} bytes in, {} bytes out)",
                input.display(),
                offset,
                original.len(),
                reencoded.len()
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
