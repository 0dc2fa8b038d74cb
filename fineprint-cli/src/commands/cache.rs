//! Cache command - inspect and clear the summary cache.

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use fineprint_store::{default_cache_path, JsonFileStorage, SettingsStore, SummaryCache};
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the cache command.
#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands.
#[derive(Subcommand)]
pub enum CacheAction {
    /// Show entry and hit counts.
    Stats,

    /// Remove every cached summary.
    Clear,

    /// Show the cache file location.
    Path,
}

/// Runs the cache command.
pub async fn run(args: &CacheArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        CacheAction::Stats => show_stats(cli).await,
        CacheAction::Clear => clear_cache(cli).await,
        CacheAction::Path => show_path(cli),
    }
}

/// Opens the on-disk cache with the configured expiry, pruning anything
/// already expired.
async fn open_cache() -> Result<SummaryCache> {
    let store = SettingsStore::load_default().await?;
    let settings = store.get().await;

    let cache = SummaryCache::new(Arc::new(JsonFileStorage::default_location()))
        .with_ttl(settings.cache_ttl());
    cache.load().await;
    Ok(cache)
}

async fn show_stats(cli: &Cli) -> Result<()> {
    let cache = open_cache().await?;
    let stats = cache.stats().await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.format_cache_stats(&stats, &default_cache_path())
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&stats)?);
        }
    }

    Ok(())
}

async fn clear_cache(_cli: &Cli) -> Result<()> {
    let cache = open_cache().await?;
    let removed = cache.stats().await.total_entries;
    cache.clear().await;

    info!(removed, "Summary cache cleared");
    println!("Cache cleared ({removed} entries removed)");

    Ok(())
}

fn show_path(cli: &Cli) -> Result<()> {
    let path = default_cache_path();

    match cli.format {
        OutputFormat::Text => println!("{}", path.display()),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "cache_file": path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&value)?);
        }
    }

    Ok(())
}
