//! Command-line interface for xcmeta.
//!
//! Inspects zipped Xcode archives.

use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use xcmeta::{ArchiveMetadata, MetadataParser, ParseError};

#[derive(Parser)]
#[command(name = "xcmeta")]
#[command(about = "Xcode archive metadata tool")]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print metadata of a zipped .xcarchive
    Inspect {
        /// Zipped archive
        archive: PathBuf,

        /// Print JSON instead of key: value lines
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            let mut cause = e.source();
            while let Some(inner) = cause {
                eprintln!("  Caused by: {}", inner);
                cause = inner.source();
            }
            exit_code(e.as_ref())
        }
    }
}

/// 2 for macOS archives, 1 for every other failure.
fn exit_code(error: &(dyn Error + 'static)) -> ExitCode {
    match error.downcast_ref::<ParseError>() {
        Some(e) if e.is_unsupported_platform() => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Inspect { archive, json } => {
            log::debug!("Inspecting {}", archive.display());
            let meta = MetadataParser::new().parse_xcarchive_data(&archive)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&meta)?);
            } else {
                print_metadata(&meta);
            }
        }
    }

    Ok(())
}

fn print_metadata(meta: &ArchiveMetadata) {
    let info = meta.app_info();
    let families = info
        .device_families()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    println!("Title: {}", info.app_title);
    println!("Bundle ID: {}", info.bundle_id);
    println!("Version: {}", info.version);
    println!("Build: {}", info.build_number);
    println!("Minimum OS: {}", info.min_os_version);
    println!("Device families: {}", families);
    println!("Scheme: {}", meta.scheme());
    println!("Size: {} bytes", meta.file_size_bytes());
}
