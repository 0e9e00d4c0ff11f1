//! Curation facade
//!
//! [`Curator`] bundles the configuration and an HTTP client, and offers one
//! method per batch command of the curation workflow:
//!
//! - [`write_valid_soundfilepaths`](Curator::write_valid_soundfilepaths)
//! - [`write_modified_soundfiles`](Curator::write_modified_soundfiles)
//! - [`download_soundfiles`](Curator::download_soundfiles) and
//!   [`download_study_soundfiles`](Curator::download_study_soundfiles)
//! - [`write_translations`](Curator::write_translations)
//! - [`write_languages`](Curator::write_languages)
//! - [`plan_upload`](Curator::plan_upload)

use crate::catalog::{MediaCatalog, UploadPlan};
use crate::config::Config;
use crate::db::Database;
use crate::download::{DownloadSummary, SoundfileSelection, download_soundfiles};
use crate::error::{Error, Result};
use crate::languages::LanguageExport;
use crate::reconcile::{ReconciliationReport, reconcile};
use crate::server_listing::read_server_listing;
use crate::translations::{TranslationBundle, write_translations};
use crate::valid_paths::{Derivation, SoundDataSource, ValidPathSet, derive_from_source};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timeout for a single request to the media store
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Entry point for the curation commands (cloneable, the config is shared)
#[derive(Clone)]
pub struct Curator {
    config: Arc<Config>,
    client: reqwest::Client,
}

impl Curator {
    /// Validate `config` and set up the HTTP client
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("soundcomparisons/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Derive the valid sound file paths from `source` and write the listing
    pub async fn write_valid_soundfilepaths(
        &self,
        source: &dyn SoundDataSource,
    ) -> Result<Derivation> {
        let derivation = derive_from_source(source).await?;

        let path = self.config.valid_soundfilepaths_path();
        derivation.paths.write_listing(&path)?;

        info!(
            source = source.name(),
            paths = derivation.paths.len(),
            anomalies = derivation.stats.anomalies,
            "valid sound file paths updated"
        );
        Ok(derivation)
    }

    /// Reconcile catalog, server listing and valid paths into `modified.json`
    ///
    /// All three inputs are read before anything is written, so a missing or
    /// malformed input leaves the previous report in place.
    pub async fn write_modified_soundfiles(&self) -> Result<ReconciliationReport> {
        let config = Arc::clone(&self.config);

        tokio::task::spawn_blocking(move || -> Result<ReconciliationReport> {
            let valid = ValidPathSet::read_listing(&config.valid_soundfilepaths_path())?;
            let catalog = load_catalog(&config)?;
            let server = read_server_listing(&config.server_checksums_path())?;

            let report = reconcile(&valid, catalog.index(), &server);
            report.write(&config.modified_report_path())?;
            Ok(report)
        })
        .await
        .map_err(|e| Error::Other(format!("reconciliation task panicked: {}", e)))?
    }

    /// Load `catalog.json`, or `catalog.json.zip` if the former is absent
    pub fn load_catalog(&self) -> Result<MediaCatalog> {
        load_catalog(&self.config)
    }

    /// Download the sound files selected by `items` into the sound directory
    ///
    /// See [`SoundfileSelection::resolve`] for how items are interpreted.
    pub async fn download_soundfiles<S: AsRef<str>>(&self, items: &[S]) -> Result<DownloadSummary> {
        let catalog = self.load_catalog()?;
        let selection =
            SoundfileSelection::resolve(catalog.index(), items, &self.config.download.extensions);
        self.download_selection(&catalog, &selection).await
    }

    /// Download sound files selected through the database
    ///
    /// Each item is a study name, a `LanguageIx` (eleven or more digits) or
    /// anything [`download_soundfiles`](Self::download_soundfiles) accepts.
    /// Studies and languages select every sound file whose variety is one of
    /// their `FilePathPart`s. Unknown `LanguageIx`s are logged and skipped.
    pub async fn download_study_soundfiles<S: AsRef<str>>(
        &self,
        db: &Database,
        items: &[S],
    ) -> Result<DownloadSummary> {
        let studies = db.study_names().await?;
        let catalog = self.load_catalog()?;
        let index = catalog.index();

        let mut resolved: Vec<&str> = Vec::new();
        for item in items.iter().map(AsRef::as_ref) {
            let parts = if studies.iter().any(|name| name == item) {
                db.file_path_parts_for_study(item).await?
            } else if is_language_ix(item) {
                let part = match item.parse::<i64>() {
                    Ok(ix) => db.file_path_part_for_language(ix).await?,
                    Err(_) => None,
                };
                match part {
                    Some(part) => vec![part],
                    None => {
                        warn!(language_ix = item, "unknown LanguageIx, skipping");
                        continue;
                    }
                }
            } else {
                resolved.push(item);
                continue;
            };

            for part in parts {
                let names = index.names_for_variety(&part);
                if names.is_empty() {
                    warn!(item, variety = %part, "no sound files in the catalog for variety");
                }
                debug!(item, variety = %part, names = names.len(), "resolved variety");
                resolved.extend(names);
            }
        }

        let selection =
            SoundfileSelection::resolve(index, &resolved, &self.config.download.extensions);
        self.download_selection(&catalog, &selection).await
    }

    async fn download_selection(
        &self,
        catalog: &MediaCatalog,
        selection: &SoundfileSelection,
    ) -> Result<DownloadSummary> {
        download_soundfiles(
            &self.client,
            catalog.index(),
            selection,
            &self.config.download.sound_dir,
            &self.config,
        )
        .await
    }

    /// Write one translation bundle per UI translation in `db`
    pub async fn write_translations(&self, db: &Database) -> Result<Vec<TranslationBundle>> {
        write_translations(db, &self.config.translations_dir()).await
    }

    /// Export the languages of all studies to `cldf/`
    ///
    /// # Errors
    ///
    /// [`Error::InconsistentLanguages`] without writing anything if a
    /// language carries different data in different studies.
    pub async fn write_languages(&self, db: &Database) -> Result<LanguageExport> {
        let rows = db.languages().await?;
        let export = LanguageExport::from_rows(&rows)?;
        export.write(&self.config.cldf_dir())?;
        Ok(export)
    }

    /// Compare the sound files in `dir` with the catalog
    pub fn plan_upload(&self, dir: &Path) -> Result<UploadPlan> {
        let catalog = self.load_catalog()?;
        UploadPlan::for_directory(catalog.index(), dir)
    }
}

/// `LanguageIx`s are written with at least eleven digits
fn is_language_ix(item: &str) -> bool {
    item.len() >= 11 && item.bytes().all(|b| b.is_ascii_digit())
}

fn load_catalog(config: &Config) -> Result<MediaCatalog> {
    let json = config.catalog_path();
    if json.is_file() {
        return MediaCatalog::load(&json);
    }

    let zipped = config.zipped_catalog_path();
    if zipped.is_file() {
        return MediaCatalog::load(&zipped);
    }

    Err(Error::MissingInput {
        what: "media catalog",
        path: json,
    })
}
