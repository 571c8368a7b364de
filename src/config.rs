//! Application configuration.
//!
//! Handles loading configuration from environment variables and .env files.

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::bible::resolver::BookResolver;
use crate::constants::files::DEFAULT_BIBLE_DIR;
use crate::error::Result;

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct Config {
    /// The application name
    app_name: String,
    /// The application version
    app_version: String,
    /// Directory holding translation files (`.xml` / `.json`)
    pub bible_path: Option<PathBuf>,
    /// Translation used when none is requested
    pub default_translation: Option<String>,
    /// JSON file of extra book aliases merged over the standard table
    pub book_aliases_path: Option<PathBuf>,
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
            bible_path: None,
            default_translation: None,
            book_aliases_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    #[allow(clippy::unnecessary_wraps)] // Returns Result for forward-compatible API
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();

        // Translations directory: env var override, or the platform data dir
        let bible_path = env::var("VERSEFLOW_BIBLE_PATH").ok().map_or_else(
            || {
                dirs::data_dir()
                    .map(|d| d.join(DEFAULT_BIBLE_DIR))
                    .filter(|p| p.is_dir())
            },
            |path| Some(expand_path(&path)),
        );

        let default_translation = env::var("VERSEFLOW_TRANSLATION")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let book_aliases_path = env::var("VERSEFLOW_BOOK_ALIASES")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(|p| expand_path(&p));

        Ok(Self {
            bible_path,
            default_translation,
            book_aliases_path,
            ..Self::default()
        })
    }

    /// Build the book resolver: the standard table plus the alias overlay,
    /// when one is configured.
    pub fn resolver(&self) -> Result<Arc<BookResolver>> {
        let mut resolver = BookResolver::standard();
        if let Some(path) = &self.book_aliases_path {
            resolver.load_overlay(path)?;
        }
        Ok(Arc::new(resolver))
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.trim()).to_string())
}
