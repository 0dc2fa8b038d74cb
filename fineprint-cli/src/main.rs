// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Fineprint CLI - legal document discovery and summarization from the
//! command line.
//!
//! # Examples
//!
//! ```bash
//! # Find legal document links on a page
//! fineprint scan https://example.com
//!
//! # Score every anchor on a saved HTML file
//! fineprint scan page.html --all
//!
//! # Summarize a terms-of-service document
//! fineprint summarize https://example.com/terms
//!
//! # JSON output
//! fineprint summarize https://example.com/terms --format json --pretty
//!
//! # Cache maintenance
//! fineprint cache stats
//! fineprint cache clear
//!
//! # Configuration
//! fineprint config show
//! fineprint config set model gpt-4o
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{cache, config, scan, summarize};
use fineprint_ai::AnalysisError;
use fineprint_fetch::FetchError;

// ============================================================================
// CLI Definition
// ============================================================================

/// Fineprint CLI - find and summarize the legal fine print.
#[derive(Parser)]
#[command(name = "fineprint")]
#[command(about = "Legal document discovery and summarization CLI")]
#[command(long_about = r#"
Fineprint finds legal document links on web pages and summarizes them.

Document types:
  • Terms of Service (terms)
  • Privacy Policy (privacy)
  • Cookie Policy (cookies)
  • License Agreement (eula)

Examples:
  fineprint scan https://example.com          # Find legal links on a page
  fineprint scan page.html --all              # Score every anchor
  fineprint summarize https://example.com/terms
  fineprint summarize ... --format json       # JSON output for scripting
  fineprint cache stats                       # Cache health
"#)]
#[command(version)]
#[command(author = "Fineprint Contributors")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Scan a page for legal document links.
    #[command(visible_alias = "s")]
    Scan(scan::ScanArgs),

    /// Fetch and summarize a legal document.
    #[command(visible_alias = "sum")]
    Summarize(summarize::SummarizeArgs),

    /// Inspect or clear the summary cache.
    Cache(cache::CacheArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Document or page could not be fetched.
    FetchFailed = 2,
    /// No usable API credentials.
    NoCredentials = 3,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("fineprint=debug,info")
    } else {
        EnvFilter::new("fineprint=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Scan(args) => scan::run(args, &cli).await,
        Commands::Summarize(args) => summarize::run(args, &cli).await,
        Commands::Cache(args) => cache::run(args, &cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            if let Some(analysis) = e.downcast_ref::<AnalysisError>() {
                eprintln!("Error: {}", analysis.user_message());
            } else {
                eprintln!("Error: {}", e);
            }
        }
        std::process::exit(exit_code_for(&e) as i32);
    }

    Ok(())
}

/// Maps an error chain to the documented exit codes.
fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    if let Some(analysis) = error.downcast_ref::<AnalysisError>() {
        return match analysis {
            AnalysisError::NoCredentials | AnalysisError::AuthenticationFailed(_) => {
                ExitCode::NoCredentials
            }
            AnalysisError::DocumentFetch(_) => ExitCode::FetchFailed,
            _ => ExitCode::Error,
        };
    }
    if error.downcast_ref::<FetchError>().is_some() {
        return ExitCode::FetchFailed;
    }
    ExitCode::Error
}
