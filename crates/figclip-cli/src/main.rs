//! figclip — inspect, extract and re-pack design-tool clipboard HTML.
//!
//! # Usage
//!
//! ```text
//! figclip [--config <FILE>] [--log-level <FILTER>] <COMMAND>
//!
//! Commands:
//!   inspect <INPUT>                        Print a JSON summary of the payload
//!   extract <INPUT> --out-dir <DIR> [--raw] Write meta.json, schema.bin, message.bin
//!   pack --meta <F> --schema <F> --message <F> [--output <F>] [--archive-version <N>] [--level <N>]
//! ```
//!
//! `<INPUT>` may be `-` to read the clipboard HTML from stdin.
//!
//! # Environment variable overrides
//!
//! | Variable          | Description                                  |
//! |-------------------|----------------------------------------------|
//! | `FIGCLIP_CONFIG`  | Path to a TOML config file                   |
//! | `RUST_LOG`        | `tracing` filter, overrides all other levels |
//!
//! Logs go to stderr so stdout can be piped.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use figclip_core::RawDeflate;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::PackInput;
use crate::config::{load_config, AppConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inspect, extract and re-pack design-tool clipboard HTML.
#[derive(Debug, Parser)]
#[command(name = "figclip", version)]
struct Cli {
    /// TOML config file. Defaults to the platform config directory.
    #[arg(long, global = true, env = "FIGCLIP_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is unset, e.g. `debug`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print meta, archive header and per-block sizes as JSON.
    Inspect {
        /// Clipboard HTML file, or `-` for stdin.
        input: PathBuf,
    },

    /// Write the metadata and both blocks to a directory.
    Extract {
        /// Clipboard HTML file, or `-` for stdin.
        input: PathBuf,

        /// Directory to write `meta.json`, `schema.bin` and `message.bin` into.
        #[arg(long, short = 'o')]
        out_dir: PathBuf,

        /// Write blocks still deflated, exactly as stored in the archive.
        #[arg(long)]
        raw: bool,
    },

    /// Build clipboard HTML from metadata and uncompressed blocks.
    Pack {
        /// JSON metadata file.
        #[arg(long)]
        meta: PathBuf,

        /// Uncompressed binary schema.
        #[arg(long)]
        schema: PathBuf,

        /// Uncompressed encoded message.
        #[arg(long)]
        message: PathBuf,

        /// Output file. Prints to stdout when absent.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Archive version to write. Defaults to the configured version.
        #[arg(long)]
        archive_version: Option<u32>,

        /// Deflate level 0-9. Defaults to the configured level.
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=9))]
        level: Option<u32>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    init_logging(cli.log_level.as_deref(), &config);
    debug!(?config, "configuration loaded");

    run(cli.command, &config)
}

/// Installs the stderr `tracing` subscriber.
///
/// `RUST_LOG` wins; otherwise `--log-level`, then the config file level.
fn init_logging(cli_level: Option<&str>, config: &AppConfig) {
    let fallback = cli_level.unwrap_or(config.logging.level.as_str());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

fn run(command: Command, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Command::Inspect { input } => {
            let html = commands::read_text_input(&input)?;
            let compressor = RawDeflate::new(config.compression.level);
            let report = commands::inspect(&html, &compressor)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Extract {
            input,
            out_dir,
            raw,
        } => {
            let html = commands::read_text_input(&input)?;
            let files = commands::extract(
                &html,
                &out_dir,
                raw,
                RawDeflate::new(config.compression.level),
            )?;
            println!("{}", files.meta.display());
            println!("{}", files.schema.display());
            println!("{}", files.message.display());
        }
        Command::Pack {
            meta,
            schema,
            message,
            output,
            archive_version,
            level,
        } => {
            let version = archive_version.unwrap_or(config.archive.version);
            let compressor = RawDeflate::new(level.unwrap_or(config.compression.level));
            let input = PackInput::from_files(&meta, &schema, &message, version)?;
            let html = commands::pack(input, compressor)?;
            match output {
                Some(path) => std::fs::write(&path, html)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{html}"),
            }
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
