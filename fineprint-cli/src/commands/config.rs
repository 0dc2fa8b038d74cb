//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use fineprint_store::{
    default_cache_path, default_config_dir, default_settings_path, SettingsStore,
};
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Set a configuration value.
    Set {
        /// Key: cache-enabled, cache-expiry-days, risk-threshold, model,
        /// base-url, api-key, max-requests, window-secs.
        key: String,
        /// New value. An empty string clears api-key.
        value: String,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Set { key, value } => set_value(key, value, cli).await,
        ConfigAction::Reset => reset_config(cli).await,
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    let settings = store.get().await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_settings(&settings));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = default_settings_path();
    let cache_path = default_cache_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
            println!("Cache file:    {}", cache_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
                "cache_file": cache_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn set_value(key: &str, value: &str, _cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await?;

    match key {
        "cache-enabled" => {
            let enabled: bool = value
                .parse()
                .map_err(|_| anyhow::anyhow!("Expected true or false, got: {value}"))?;
            store.update(|s| s.cache_enabled = enabled).await;
        }
        "cache-expiry-days" => {
            let days: u32 = value
                .parse()
                .map_err(|_| anyhow::anyhow!("Expected a number of days, got: {value}"))?;
            store.update(|s| s.cache_expiry_days = days).await;
        }
        "risk-threshold" => {
            let threshold: f32 = value
                .parse()
                .map_err(|_| anyhow::anyhow!("Expected a number in [0, 1], got: {value}"))?;
            if !(0.0..=1.0).contains(&threshold) {
                anyhow::bail!("Risk threshold must be within [0, 1], got: {threshold}");
            }
            store.update(|s| s.risk_threshold = threshold).await;
        }
        "model" => {
            let model = value.to_string();
            store.update(|s| s.provider.model = model).await;
        }
        "base-url" => {
            let base_url = value.trim_end_matches('/').to_string();
            store.update(|s| s.provider.base_url = base_url).await;
        }
        "api-key" => {
            let api_key = (!value.is_empty()).then(|| value.to_string());
            store.update(|s| s.provider.user_api_key = api_key).await;
        }
        "max-requests" => {
            let max_requests: u32 = value
                .parse()
                .map_err(|_| anyhow::anyhow!("Expected a request count, got: {value}"))?;
            store.update(|s| s.provider.max_requests = max_requests).await;
        }
        "window-secs" => {
            let window_secs: u64 = value
                .parse()
                .map_err(|_| anyhow::anyhow!("Expected a number of seconds, got: {value}"))?;
            store.update(|s| s.provider.window_secs = window_secs).await;
        }
        _ => anyhow::bail!(
            "Unknown key: {key}. Known keys: cache-enabled, cache-expiry-days, \
             risk-threshold, model, base-url, api-key, max-requests, window-secs"
        ),
    }

    store.save().await?;
    info!(key, "Setting updated");
    println!("Set {key}");

    Ok(())
}

async fn reset_config(_cli: &Cli) -> Result<()> {
    let path = default_settings_path();

    if path.exists() {
        tokio::fs::remove_file(&path).await?;
        info!(path = %path.display(), "Settings reset");
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}
