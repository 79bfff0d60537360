//! SOS/WCS transcoder CLI.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use sos_transcoder::{build_registry, transcode, InvalidRequest};

#[derive(Parser, Debug)]
#[command(name = "sos-transcoder")]
#[command(about = "Transcode OGC SOS and WCS requests between KVP and XML", long_about = None)]
struct Cli {
    /// Binding configuration (YAML); all built-in bindings when absent
    #[arg(long, env = "SOS_BINDINGS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a request (KVP or XML) as an XML document
    ToXml {
        /// Request file, or `-` for stdin
        input: String,

        /// Rewrite the request for another protocol version
        #[arg(long)]
        to_version: Option<String>,
    },

    /// Write a request (KVP or XML) as a KVP query string
    ToKvp {
        /// Request file, or `-` for stdin
        input: String,

        /// Rewrite the request for another protocol version
        #[arg(long)]
        to_version: Option<String>,
    },

    /// Print the parsed request as JSON
    Inspect {
        /// Request file, or `-` for stdin
        input: String,
    },

    /// List the registered (service, operation, version) bindings
    Bindings,

    /// Prune a SWE result structure to the selected definitions
    Prune {
        /// Result structure file, or `-` for stdin
        input: String,

        /// Definitions to keep
        #[arg(short, long = "definition", required = true)]
        definitions: Vec<String>,
    },
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // stdout carries the transcoded document
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .json()
        .init();

    if let Err(e) = run(cli) {
        if let Some(invalid) = e.downcast_ref::<InvalidRequest>() {
            match invalid.exception_report() {
                Ok(report) => println!("{}", report),
                Err(report_err) => tracing::error!("Failed to render exception report: {}", report_err),
            }
        }
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let registry = build_registry(cli.config.as_deref())?;
    info!(bindings = registry.len(), "Codec registry ready");

    let output = match cli.command {
        Commands::ToXml { input, to_version } => {
            transcode::to_xml(&registry, &read_input(&input)?, to_version.as_deref())?
        }
        Commands::ToKvp { input, to_version } => {
            transcode::to_kvp(&registry, &read_input(&input)?, to_version.as_deref())?
        }
        Commands::Inspect { input } => transcode::inspect(&registry, &read_input(&input)?)?,
        Commands::Bindings => transcode::list_bindings(&registry)?,
        Commands::Prune { input, definitions } => {
            match transcode::prune_structure(&read_input(&input)?, &definitions)? {
                Some(xml) => xml,
                None => anyhow::bail!("No part of the result structure matches the selection"),
            }
        }
    };

    println!("{}", output);
    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read_to_string(input).with_context(|| format!("Failed to read: {:?}", input))
}
