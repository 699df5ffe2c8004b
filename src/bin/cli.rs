//! yhdmz source CLI
//!
//! Runs the adapter's capabilities from the shell and prints JSON.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use yhdmz::{
    Source,
    error::Result,
    models::{Config, FilterSelections},
};

/// yhdmz - anime catalog source adapter
#[derive(Parser, Debug)]
#[command(name = "yhdmz", version, about = "yhdmz anime catalog source adapter")]
struct Cli {
    /// Path to the TOML config (defaults are used if missing)
    #[arg(short, long, default_value = "yhdmz.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show source metadata
    Info,

    /// Show the weekly schedule
    Schedule,

    /// List the filter vocabulary for `home`
    Filters,

    /// Search the catalog by keyword
    Search {
        keyword: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 24)]
        size: usize,
    },

    /// List one page of the catalog
    Home {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 24)]
        size: usize,
        /// Facet selection as key=value (repeatable)
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },

    /// Show an item's detail page
    Detail { url: String },

    /// Resolve resource URLs to playable URLs
    Resolve {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Validate the configuration
    Validate,
}

fn parse_filter(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Load the config file if present. A file that exists but fails to parse
/// is an error, not a silent fallback to defaults.
fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        Ok(Config::default())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging(cli.verbose, "info");
            log::error!("Failed to load {}: {}", cli.config.display(), e);
            return Err(e);
        }
    };
    init_logging(cli.verbose, &config.logging.level);
    log::debug!("Using configuration from {}", cli.config.display());

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    let source = Source::new(config)?;

    match cli.command {
        Command::Info => print_json(&source.descriptor())?,
        Command::Schedule => print_json(&source.schedule().await?)?,
        Command::Filters => print_json(&source.filter_catalog())?,
        Command::Search {
            keyword,
            page,
            size,
        } => print_json(&source.search(page, size, &keyword).await?)?,
        Command::Home {
            page,
            size,
            filters,
        } => {
            let mut selections = FilterSelections::new();
            for (key, value) in filters {
                selections.entry(key).or_default().push(value);
            }
            print_json(&source.home_listing(page, size, &selections).await?)?
        }
        Command::Detail { url } => print_json(&source.detail(&url).await?)?,
        Command::Resolve { urls } => print_json(&source.resolve_resources(&urls).await)?,
        Command::Validate => {
            log::info!("✓ Config OK (source, transport, resolver and selectors)");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let config = load_config(Path::new("/nonexistent/yhdmz.toml")).unwrap();
        assert_eq!(config.resolver.max_depth, 4);
    }

    #[test]
    fn test_malformed_config_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[resolver\nmax_depth = ").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("region = 日本").unwrap(),
            ("region".to_string(), "日本".to_string())
        );
        assert!(parse_filter("region").is_err());
    }
}
