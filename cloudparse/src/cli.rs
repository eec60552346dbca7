///
/// This module implements the full CLI interface for cloudparse—handling
/// command parsing, argument validation, and the main entrypoint.
///
/// All client logic (configuration, transport, polling) lives in the
/// [`cloudparse-core`] crate. This module is strictly CLI glue: ergonomic
/// argument exposure, config resolution and output formatting.
///
/// ## Features
/// - Entry struct [`Cli`] defines all user-facing options and subcommands.
/// - Async entrypoint (`run`) for programmatic invocation and integration
///   testing.
/// - Logging, tracing, and structured error output at CLI level.
///
/// ## How To Use
/// - For command-line users: use the installed `cloudparse` binary with
///   `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed
///   [`Cli`].
///
use crate::load_config::load_config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use cloudparse_core::{CloudParseClient, Document, ParseConfig};
use std::path::PathBuf;

/// CLI for cloudparse: parse documents through the hosted parsing API.
#[derive(Parser)]
#[clap(
    name = "cloudparse",
    version,
    about = "Upload PDFs to the CloudParse API and print the extracted markdown or text"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse one or more files and print the extracted documents
    Parse {
        /// Files to parse (currently PDF only)
        #[clap(required = true)]
        files: Vec<PathBuf>,
        /// Output format: markdown or text
        #[clap(long)]
        format: Option<String>,
        /// Print the documents as a JSON array instead of raw text
        #[clap(long)]
        json: bool,
        /// Path to an optional YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Parse {
            files,
            format,
            json,
            config,
        } => {
            let mut parse_config = match config {
                Some(path) => load_config(path)?,
                None => ParseConfig::from_env()?,
            };
            if let Some(format) = format {
                parse_config.result_type = format.parse()?;
            }
            parse_config.trace_loaded();

            tracing::info!(command = "parse", files = files.len(), "Starting parse run");
            let client = CloudParseClient::new(parse_config)?;

            let batches = client.parse_many(&files).await?;
            for (file, documents) in files.iter().zip(&batches) {
                tracing::info!(
                    file = %file.display(),
                    documents = documents.len(),
                    "Parsed file"
                );
            }

            let documents: Vec<Document> = batches.into_iter().flatten().collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&documents)?);
            } else {
                for document in &documents {
                    println!("{}", document.text);
                }
            }
            Ok(())
        }
    }
}
