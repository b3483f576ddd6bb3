//! Booru Core Library
//!
//! This crate provides the core logic for a tag-based media library: the
//! tag query language, its compilation to SQLite, keyset pagination and the
//! search executor that ties them together. It is frontend-agnostic; the
//! root crate wraps it in an async command layer.
//!
//! # Features
//!
//! - `tokio-runtime`: Enable async search execution on the tokio blocking pool
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `models`: Data structures (Media, Tag, SearchQuery, MetaFilters, Settings)
//! - `db`: SQLite database layer with DAOs
//! - `services`: Lexer, parser, compiler, pagination and search executor
//! - `paths`: Path provider abstraction (PathProvider trait)
//! - `utils`: Error handling and utilities
//!
//! # Example
//!
//! ```no_run
//! use booru_core::{BooruCore, paths::DefaultPathProvider};
//! use std::sync::Arc;
//!
//! let core = BooruCore::new(Arc::new(DefaultPathProvider::new())).unwrap();
//!
//! let page = core.search().search("cat ~dog -banned", 20, None, None).unwrap();
//! if page.has_more {
//!     let next = core.search().search("cat ~dog -banned", 20, page.last_id, None).unwrap();
//!     println!("{} more", next.media.len());
//! }
//! ```

pub mod db;
pub mod models;
pub mod paths;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use db::{Database, DatabaseStats};
pub use models::{
    AppSettings, Media, MetaFilters, SearchQuery, SearchRequest, SearchResult, Tag, TagCategory,
};
pub use paths::{DefaultPathProvider, PathProvider, SharedPathProvider};
pub use services::{ParseError, SearchService, SettingsManager};
pub use utils::{AppError, AppResult, CommandError};

use parking_lot::RwLock;
use std::sync::Arc;

/// Booru core application context.
///
/// Holds the shared resources every frontend needs.
pub struct BooruCore {
    /// Database connection
    pub db: Arc<Database>,
    /// Path provider for resolving application paths
    pub path_provider: Arc<dyn PathProvider>,
    /// Live settings, shared with the search service
    pub settings: Arc<RwLock<AppSettings>>,
    /// Search executor
    pub search_service: SearchService,
}

impl BooruCore {
    /// Create a new BooruCore instance.
    ///
    /// Loads settings from the provider's settings path (defaults when the
    /// file is missing), then opens and initializes the database.
    pub fn new(path_provider: Arc<dyn PathProvider>) -> AppResult<Self> {
        let settings = SettingsManager::new(path_provider.as_ref())?.load()?;
        Self::with_settings(path_provider, settings)
    }

    /// Create a new BooruCore instance with already-loaded settings.
    pub fn with_settings(
        path_provider: Arc<dyn PathProvider>,
        settings: AppSettings,
    ) -> AppResult<Self> {
        let db = Database::open_with_provider(path_provider.as_ref(), &settings.database)?;
        db.init()?;
        let db = Arc::new(db);

        let settings = Arc::new(RwLock::new(settings));
        let search_service = SearchService::new(db.clone(), settings.clone());

        tracing::info!("Booru core ready: {:?}", db.path());

        Ok(Self {
            db,
            path_provider,
            settings,
            search_service,
        })
    }

    /// Get the database reference.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Get the path provider reference.
    pub fn paths(&self) -> &Arc<dyn PathProvider> {
        &self.path_provider
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> AppSettings {
        self.settings.read().clone()
    }

    /// Replace the live settings. Affects subsequent searches only.
    pub fn update_settings(&self, settings: AppSettings) {
        *self.settings.write() = settings;
    }

    /// Get the search service reference.
    pub fn search(&self) -> &SearchService {
        &self.search_service
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateMedia, CreateTag};
    use tempfile::TempDir;

    #[test]
    fn test_booru_core_creation() {
        let tmp = TempDir::new().unwrap();
        let path_provider = Arc::new(DefaultPathProvider::with_base_dir(tmp.path().to_path_buf()));

        let core = BooruCore::new(path_provider).unwrap();

        let stats = core.database().stats().unwrap();
        assert_eq!(stats.media_count, 0);
        assert!(core.paths().database_path().exists());
        assert_eq!(core.settings(), AppSettings::default());
    }

    #[test]
    fn test_invalid_settings_file_fails_startup() {
        let tmp = TempDir::new().unwrap();
        let path_provider = Arc::new(DefaultPathProvider::with_base_dir(tmp.path().to_path_buf()));

        let settings_path = path_provider.settings_path();
        std::fs::create_dir_all(settings_path.parent().unwrap()).unwrap();
        std::fs::write(
            &settings_path,
            r#"{"database":{"cacheSizeKb":-9223372036854775808}}"#,
        )
        .unwrap();

        assert!(matches!(
            BooruCore::new(path_provider.clone()),
            Err(AppError::Config(_))
        ));
        assert!(!path_provider.database_path().exists());
    }

    #[test]
    fn test_settings_update_reaches_search() {
        let tmp = TempDir::new().unwrap();
        let path_provider = Arc::new(DefaultPathProvider::with_base_dir(tmp.path().to_path_buf()));
        let core = BooruCore::new(path_provider).unwrap();

        for i in 0..5 {
            let id = core.db.create_media(&CreateMedia::image(format!("h{}", i))).unwrap();
            core.db.add_tags_to_media(id, &[CreateTag::general("cat")]).unwrap();
        }

        let mut settings = core.settings();
        settings.search.max_page_size = 3;
        settings.search.default_page_size = 3;
        core.update_settings(settings);

        let page = core.search().search("cat", 100, None, None).unwrap();
        assert_eq!(page.media.len(), 3);
        assert_eq!(page.total_count, 5);
        assert!(page.has_more);
    }
}
