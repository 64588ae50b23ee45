//! # Configuration
//!
//! Carlot configuration is managed by [`confique`], which layers environment
//! variables over a TOML file over compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `CARLOT_DRAFT_KEY`, `CARLOT_DATA_DIR`, etc.
//! 2. **Config file**: `carlot.toml` in the data directory (or an explicit path).
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `draft_key` | `sell-car-draft` | Storage key of the sell-form draft |
//! | `first_year` | `1970` | Oldest model year offered by the Year tier |
//! | `max_compare_slots` | `3` | Cars the comparison board holds |
//! | `max_draft_bytes` | `5242880` | Largest draft the store accepts |
//! | `data_dir` | OS data dir | Where drafts are stored on disk |

use crate::error::{CarlotError, Result};
use crate::model::LookupOption;
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "carlot.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CarlotConfig {
    /// Storage key of the sell-form draft.
    #[config(env = "CARLOT_DRAFT_KEY", default = "sell-car-draft")]
    pub draft_key: String,

    /// Oldest model year offered by the Year tier.
    #[config(env = "CARLOT_FIRST_YEAR", default = 1970)]
    pub first_year: u16,

    /// Number of cars the comparison board holds.
    #[config(env = "CARLOT_MAX_COMPARE_SLOTS", default = 3)]
    pub max_compare_slots: usize,

    /// Largest serialized draft accepted by the store.
    #[config(env = "CARLOT_MAX_DRAFT_BYTES", default = 5242880)]
    pub max_draft_bytes: usize,

    /// Directory for on-disk drafts. When absent, the OS data directory is used.
    #[config(env = "CARLOT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

impl Default for CarlotConfig {
    fn default() -> Self {
        Self {
            draft_key: "sell-car-draft".to_string(),
            first_year: 1970,
            max_compare_slots: 3,
            max_draft_bytes: 5_242_880,
            data_dir: None,
        }
    }
}

impl CarlotConfig {
    /// Load from the environment, then `file` if it exists, then defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        builder
            .load()
            .map_err(|err| CarlotError::Config(err.to_string()))
    }

    /// Directory drafts live in: the configured one, else the OS data dir.
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        default_data_dir()
            .ok_or_else(|| CarlotError::Config("Could not determine a data directory".to_string()))
    }

    /// Year tier options, newest first, from `current_year` down to `first_year`.
    pub fn year_options(&self, current_year: u16) -> Vec<LookupOption> {
        (self.first_year..=current_year)
            .rev()
            .map(|year| LookupOption::new(year.to_string(), year.to_string()))
            .collect()
    }
}

pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "carlot", "carlot").map(|dirs| dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CarlotConfig::default();
        assert_eq!(config.draft_key, "sell-car-draft");
        assert_eq!(config.max_compare_slots, 3);
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn test_year_options_newest_first() {
        let config = CarlotConfig {
            first_year: 2022,
            ..Default::default()
        };
        let years: Vec<_> = config
            .year_options(2024)
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(years, vec!["2024", "2023", "2022"]);
    }

    #[test]
    fn test_year_options_empty_when_first_year_is_in_the_future() {
        let config = CarlotConfig {
            first_year: 2030,
            ..Default::default()
        };
        assert!(config.year_options(2024).is_empty());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CarlotConfig {
            draft_key: "draft-v2".to_string(),
            data_dir: Some(PathBuf::from("/tmp/carlot")),
            ..Default::default()
        };
        let text = toml::to_string(&config).unwrap();
        let back: CarlotConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_load_reads_file_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "first_year = 1995\nmax_compare_slots = 4\n").unwrap();

        let config = CarlotConfig::load(Some(&path)).unwrap();
        assert_eq!(config.first_year, 1995);
        assert_eq!(config.max_compare_slots, 4);
        assert_eq!(config.max_draft_bytes, 5_242_880);
    }

    #[test]
    fn test_resolved_data_dir_prefers_configured() {
        let config = CarlotConfig {
            data_dir: Some(PathBuf::from("/srv/carlot")),
            ..Default::default()
        };
        assert_eq!(
            config.resolved_data_dir().unwrap(),
            PathBuf::from("/srv/carlot")
        );
    }
}
