//! # soundcomparisons
//!
//! Curation library for the sound files of the Sound Comparisons website.
//!
//! Sound files live in three places that drift apart over time: the
//! relational database says which recordings *should* exist, the media store
//! catalog says which objects *do* exist, and the web server holds the files
//! actually served. This crate derives the first, indexes the second, reads a
//! checksum listing of the third, and reports every difference.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - No CLI, the batch commands are methods on [`Curator`]
//! - **Deterministic** - Identical inputs produce byte-identical outputs
//! - **Fail-fast on inputs** - A missing or malformed input aborts before anything is written
//! - **Lenient on data** - Anomalous rows and names are logged and skipped
//!
//! ## Quick Start
//!
//! ```no_run
//! use soundcomparisons::{Config, Curator, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::with_repos("../soundcomparisons-data");
//!     let curator = Curator::new(config)?;
//!
//!     let db = Database::open(&curator.config().database.path).await?;
//!     curator.write_valid_soundfilepaths(&db).await?;
//!
//!     let report = curator.write_modified_soundfiles().await?;
//!     println!("{:?}", report.summary());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Media store catalog snapshot and lookups
pub mod catalog;
/// Configuration types
pub mod config;
/// Batch command facade
pub mod curator;
/// Relational database snapshot
pub mod db;
/// Sound file download from the media store
pub mod download;
/// Error types
pub mod error;
/// Media URL localisation for offline copies
pub mod media_urls;
/// Language export with cross-study consistency check
pub mod languages;
/// Reconciliation of catalog, server and valid paths
pub mod reconcile;
/// Retry logic with exponential backoff
pub mod retry;
/// Server checksum listing
pub mod server_listing;
/// Sound file naming grammar
pub mod soundfile_name;
/// UI translation bundles
pub mod translations;
/// Relational row types
pub mod types;
/// Utility functions
pub mod utils;
/// Valid sound file paths
pub mod valid_paths;

// Re-export commonly used types
pub use catalog::{Bitstream, CatalogIndex, CatalogObject, MediaCatalog, UploadPlan};
pub use config::Config;
pub use curator::Curator;
pub use db::Database;
pub use download::{DownloadSummary, SoundfileSelection};
pub use error::{DatabaseError, DownloadError, Error, InvalidNameError, Result};
pub use languages::LanguageExport;
pub use reconcile::{ReconciliationReport, ReportSummary, reconcile};
pub use server_listing::ServerChecksumRecord;
pub use soundfile_name::SoundfileName;
pub use translations::TranslationBundle;
pub use valid_paths::{Derivation, SoundDataSource, SoundRows, ValidPathSet};
