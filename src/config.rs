//! Driver configuration.
//!
//! Handles loading configuration from environment variables and .env files.

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

use crate::bible::ChapterLengths;
use crate::commentary::UnparseablePolicy;
use crate::constants::input::DEFAULT_INPUT_DIR;
use crate::constants::output::DEFAULT_OUTPUT_DIR;
use crate::error::{Error, Result};
use crate::services::export::read_json;

/// Configuration for the batch driver.
#[derive(Debug, Clone)]
pub struct Config {
    /// The application name
    app_name: String,
    /// The application version
    app_version: String,
    /// Directory scanned for `*.units.json` and `*.canon.json` files
    pub input_dir: PathBuf,
    /// Directory receiving one sub-directory per work
    pub output_dir: PathBuf,
    /// Optional JSON chapter-length table merged over the built-in one
    pub chapter_lengths_path: Option<PathBuf>,
    /// What to do with references no grammar recognizes
    pub on_unparseable: UnparseablePolicy,
}

impl Config {
    /// Get the application name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Get the application version.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            chapter_lengths_path: None,
            on_unparseable: UnparseablePolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();

        let mut config = Self::default();

        if let Ok(dir) = env::var("HYPOMNEMA_INPUT_DIR") {
            config.input_dir = expand(&dir);
        }

        if let Ok(dir) = env::var("HYPOMNEMA_OUTPUT_DIR") {
            config.output_dir = expand(&dir);
        }

        if let Ok(path) = env::var("HYPOMNEMA_CHAPTER_LENGTHS") {
            let path = expand(&path);
            if !path.is_file() {
                return Err(Error::config(
                    format!("chapter-length table {} not found", path.display()),
                    "Point HYPOMNEMA_CHAPTER_LENGTHS at a JSON file like {\"Jonah\": [17, 10, 10, 11]}",
                ));
            }
            config.chapter_lengths_path = Some(path);
        }

        if let Ok(policy) = env::var("HYPOMNEMA_ON_UNPARSEABLE") {
            config.on_unparseable = policy.parse()?;
        }

        Ok(config)
    }

    /// Built-in chapter lengths, with the configured file's books replacing them.
    pub fn chapter_lengths(&self) -> Result<ChapterLengths> {
        let builtin = ChapterLengths::new_testament();
        let Some(path) = &self.chapter_lengths_path else {
            return Ok(builtin);
        };
        let extra: ChapterLengths = read_json(path)?;
        tracing::info!("Loaded chapter lengths from {}", path.display());
        Ok(builtin.merged_with(extra))
    }
}

/// Expand `~` in a configured path
fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::bible::{Book, Position};

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.app_name(), "hypomnema");
        assert_eq!(config.input_dir, PathBuf::from("texts/sources"));
        assert_eq!(config.on_unparseable, UnparseablePolicy::Reject);
        assert!(config.chapter_lengths().unwrap().contains(Book::Matthew));
    }

    #[test]
    fn test_chapter_lengths_file_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lengths.json");
        fs_err::write(&path, r#"{"Jonah": [17, 10, 10, 11]}"#).unwrap();

        let config = Config { chapter_lengths_path: Some(path), ..Config::default() };
        let table = config.chapter_lengths().unwrap();
        assert_eq!(table.final_position(Book::Jonah).unwrap(), Position::new(4, 11));
        assert!(table.contains(Book::John));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand("~/texts");
        assert!(!expanded.to_string_lossy().starts_with('~') || std::env::var("HOME").is_err());
    }
}
