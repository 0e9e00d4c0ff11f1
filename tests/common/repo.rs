//! Temporary data repositories

use soundcomparisons::{Config, Curator, Database};
use std::path::PathBuf;
use tempfile::TempDir;

/// A soundcomparisons-data checkout in a temporary directory
pub struct TestRepo {
    /// Owns the directory; dropped with the repo
    pub dir: TempDir,
    /// Curator rooted at `dir`
    pub curator: Curator,
}

impl TestRepo {
    /// Empty repository with default settings
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Empty repository with settings adjusted by `adjust`
    ///
    /// `repos`, the database path and the sound directory always point into
    /// the temporary directory.
    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = Config::with_repos(dir.path());
        config.database.path = dir.path().join("soundcomparisons.sqlite");
        config.download.sound_dir = dir.path().join("sound");
        adjust(&mut config);

        std::fs::create_dir_all(config.soundfiles_dir()).unwrap();
        let curator = Curator::new(config).unwrap();
        Self { dir, curator }
    }

    /// The curator's configuration
    pub fn config(&self) -> &Config {
        self.curator.config()
    }

    /// Write `catalog.json`
    pub fn write_catalog(&self, json: &str) {
        std::fs::write(self.config().catalog_path(), json).unwrap();
    }

    /// Write `ServerSndFilesChecksums.txt`
    pub fn write_server_listing(&self, text: &str) {
        std::fs::write(self.config().server_checksums_path(), text).unwrap();
    }

    /// Write `valid_soundfilepaths.txt`
    pub fn write_valid_listing(&self, text: &str) {
        std::fs::write(self.config().valid_soundfilepaths_path(), text).unwrap();
    }

    /// Create the database snapshot with the schema and no rows
    pub async fn create_database(&self) -> Database {
        Database::create(&self.config().database.path).await.unwrap()
    }

    /// Path below the sound directory
    pub fn sound_file(&self, variety: &str, file: &str) -> PathBuf {
        self.config().download.sound_dir.join(variety).join(file)
    }
}
