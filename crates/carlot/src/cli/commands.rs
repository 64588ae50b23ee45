//! # CLI Layer
//!
//! Dispatch for the `carlot` binary. This module:
//! - Installs the tracing subscriber (stderr, `CARLOT_LOG`)
//! - Resolves configuration and the draft directory
//! - Routes each command to its handler and prints the result

use super::render;
use super::setup::{Cli, Commands, DraftAction, OutputFormat};
use anyhow::{anyhow, bail, Context, Result};
use carlotapp::config::{CarlotConfig, CONFIG_FILE_NAME};
use carlotapp::draft::fs_backend::FsBackend;
use carlotapp::draft::DraftStore;
use carlotapp::filter::{FilterKey, FilterSet, ListingBrowser};
use carlotapp::model::Listing;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV: &str = "CARLOT_LOG";

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.data_dir.as_deref())?;
    tracing::debug!(data_dir = ?config.data_dir, draft_key = %config.draft_key, "configuration loaded");

    match cli.command {
        Commands::Filter {
            file,
            search,
            city,
            price,
            filters,
            output,
            count,
        } => {
            let mut set = FilterSet::new();
            for (key, value) in [
                (FilterKey::Search, search),
                (FilterKey::City, city),
                (FilterKey::Price, price),
            ] {
                if let Some(value) = value {
                    set.set(key, &value)?;
                }
            }
            for pair in &filters {
                let (key, value) = parse_filter_arg(pair)?;
                set.set(key, value)?;
            }
            handle_filter(&file, set, output, count)
        }
        Commands::Keys => {
            print!("{}", render::filter_keys());
            Ok(())
        }
        Commands::Draft { action } => handle_draft(action, &config),
        Commands::Config => {
            print!("{}", render::config(&config));
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Environment and defaults first; then `carlot.toml` from the data dir.
fn load_config(data_dir: Option<&Path>) -> Result<CarlotConfig> {
    let base = CarlotConfig::load(None)?;
    let dir: PathBuf = match data_dir {
        Some(dir) => dir.to_path_buf(),
        None => base.resolved_data_dir()?,
    };

    let file = dir.join(CONFIG_FILE_NAME);
    let mut config = if file.exists() {
        CarlotConfig::load(Some(&file))
            .with_context(|| format!("reading {}", file.display()))?
    } else {
        base
    };
    if data_dir.is_some() || config.data_dir.is_none() {
        config.data_dir = Some(dir);
    }
    Ok(config)
}

fn parse_filter_arg(pair: &str) -> Result<(FilterKey, &str)> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got {:?}", pair))?;
    Ok((key.trim().parse()?, value))
}

fn handle_filter(file: &Path, filters: FilterSet, output: OutputFormat, count: bool) -> Result<()> {
    let raw = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let listings: Vec<Listing> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", file.display()))?;

    let browser = ListingBrowser::with_filters(listings, filters);
    tracing::debug!(
        candidates = browser.candidates().len(),
        visible = browser.visible().len(),
        "filtered listings"
    );

    if count {
        println!("{}", browser.visible().len());
        return Ok(());
    }
    print!("{}", render::listings(browser.visible(), output)?);
    Ok(())
}

fn handle_draft(action: DraftAction, config: &CarlotConfig) -> Result<()> {
    let dir = config.resolved_data_dir()?;
    let store =
        DraftStore::new(FsBackend::new(dir).with_max_value_bytes(config.max_draft_bytes));

    match action {
        DraftAction::Show { key } => {
            let key = key.unwrap_or_else(|| config.draft_key.clone());
            match store.load_draft(&key) {
                Some(draft) => println!("{}", serde_json::to_string_pretty(&draft)?),
                None => println!("No draft saved under {}", key),
            }
        }
        DraftAction::Clear { key } => {
            let key = key.unwrap_or_else(|| config.draft_key.clone());
            if !store.clear_draft(&key) {
                bail!("could not clear draft {}", key);
            }
            println!("Cleared draft {}", key);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_args_split_on_the_first_equals() {
        let (key, value) = parse_filter_arg("engine-type=petrol=hybrid").unwrap();
        assert_eq!(key, FilterKey::EngineType);
        assert_eq!(value, "petrol=hybrid");
    }

    #[test]
    fn filter_args_need_a_known_key() {
        assert!(parse_filter_arg("colour=red").is_err());
        assert!(parse_filter_arg("color").is_err());
    }

    #[test]
    fn explicit_data_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "first_year = 2001\n").unwrap();

        let config = load_config(Some(dir.path())).unwrap();
        assert_eq!(config.first_year, 2001);
        assert_eq!(config.data_dir.as_deref(), Some(dir.path()));
    }
}
