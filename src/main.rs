//! CLI entry point for the Concourse resource.
//!
//! Concourse invokes resources as `check`, `in <dest>`, or `out <src>`
//! with a JSON document on stdin and expects exactly one JSON document on
//! stdout. Resource images expose the three entry points as thin wrappers
//! around the matching subcommand here. Diagnostics go to stderr only;
//! stdout belongs to the protocol.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gchat_resource::{failure_output, resource, Operation};

#[derive(Parser)]
#[command(name = "gchat-resource")]
#[command(about = "Concourse resource for Google Chat notifications")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check for new versions (always none)
    Check,

    /// Fetch a version (a no-op for this resource)
    In {
        /// Destination directory supplied by Concourse
        destination: Option<PathBuf>,
    },

    /// Compose and post a notification to the webhook
    Out {
        /// Build sources directory supplied by Concourse
        workspace: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout carries the resource protocol, so all diagnostics go to stderr.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let (operation, workspace) = match cli.command {
        Commands::Check => (Operation::Check, None),
        Commands::In { destination } => (Operation::In, destination),
        Commands::Out { workspace } => (Operation::Out, workspace),
    };
    let workspace = workspace.unwrap_or_default();

    match run(operation, &workspace).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "Resource operation failed, reporting failure to Concourse");
            println!("{}", failure_output());
            ExitCode::FAILURE
        }
    }
}

async fn run(operation: Operation, workspace: &std::path::Path) -> Result<serde_json::Value> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read input document from stdin")?;

    let output = resource::run(operation, &input, workspace).await?;
    Ok(output)
}
