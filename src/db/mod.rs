//! Database layer for soundcomparisons
//!
//! Read access to a SQLite snapshot of the Sound Comparisons relational
//! database: studies, languages, words, transcriptions and the UI
//! translations.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`schema`] - opening snapshots, creating the schema
//! - [`sound`] - languages, words and transcriptions ([`SoundDataSource`](crate::valid_paths::SoundDataSource))
//! - [`translations`] - UI translation tables

use sqlx::sqlite::SqlitePool;

mod schema;
mod sound;
mod translations;

/// Database handle for soundcomparisons
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Close all connections of the pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
