//! Configuration types for soundcomparisons

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Sound file extensions handled by the media catalog, with their mimetypes
pub const SOUNDFILE_MIMETYPES: [(&str, &str); 3] = [
    ("mp3", "audio/mpeg"),
    ("ogg", "audio/ogg"),
    ("wav", "audio/wav"),
];

/// Relational database snapshot settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite snapshot of the Sound Comparisons database (default: "soundcomparisons.sqlite")
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Media store (CDSTAR) connection settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CdstarConfig {
    /// Service base URL (default: "https://cdstar.shh.mpg.de")
    #[serde(default = "default_cdstar_url")]
    pub url: String,

    /// Username for authenticated access
    #[serde(default)]
    pub user: Option<String>,

    /// Password for authenticated access
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for CdstarConfig {
    fn default() -> Self {
        Self {
            url: default_cdstar_url(),
            user: None,
            password: None,
        }
    }
}

/// Sound file download settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Target directory for downloaded sound files (default: "./sound")
    #[serde(default = "default_sound_dir")]
    pub sound_dir: PathBuf,

    /// Extensions downloaded when a request names none (default: mp3, ogg, wav)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Maximum concurrent bitstream fetches (default: 4)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            sound_dir: default_sound_dir(),
            extensions: default_extensions(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// Retry configuration for transient failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Main configuration for [`Curator`](crate::Curator)
///
/// All file locations except the database and the download directory are
/// derived from `repos`, the root of the soundcomparisons-data repository:
///
/// ```text
/// {repos}/soundfiles/catalog.json[.zip]
/// {repos}/soundfiles/valid_soundfilepaths.txt
/// {repos}/soundfiles/ServerSndFilesChecksums.txt
/// {repos}/soundfiles/modified.json
/// {repos}/translations/{BrowserMatch}/translations.json
/// {repos}/cldf/languages.csv
/// {repos}/cldf/x_study_languages.csv
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Root of the soundcomparisons-data repository (default: ".")
    #[serde(default = "default_repos")]
    pub repos: PathBuf,

    /// Relational database snapshot
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Media store connection
    #[serde(default)]
    pub cdstar: CdstarConfig,

    /// Sound file downloads
    #[serde(default)]
    pub download: DownloadConfig,

    /// Retry behavior for network fetches
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repos: default_repos(),
            database: DatabaseConfig::default(),
            cdstar: CdstarConfig::default(),
            download: DownloadConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Create a configuration rooted at the given data repository
    pub fn with_repos(repos: impl Into<PathBuf>) -> Self {
        Self {
            repos: repos.into(),
            ..Default::default()
        }
    }

    /// Directory holding the sound file catalog and listings
    pub fn soundfiles_dir(&self) -> PathBuf {
        self.repos.join("soundfiles")
    }

    /// Catalog snapshot (`catalog.json`)
    pub fn catalog_path(&self) -> PathBuf {
        self.soundfiles_dir().join("catalog.json")
    }

    /// Zipped catalog snapshot, used when `catalog.json` is absent
    pub fn zipped_catalog_path(&self) -> PathBuf {
        self.soundfiles_dir().join("catalog.json.zip")
    }

    /// Listing of valid sound file paths
    pub fn valid_soundfilepaths_path(&self) -> PathBuf {
        self.soundfiles_dir().join("valid_soundfilepaths.txt")
    }

    /// `md5sum` listing of the sound files on the web server
    pub fn server_checksums_path(&self) -> PathBuf {
        self.soundfiles_dir().join("ServerSndFilesChecksums.txt")
    }

    /// Reconciliation report
    pub fn modified_report_path(&self) -> PathBuf {
        self.soundfiles_dir().join("modified.json")
    }

    /// Directory of the CLDF exports (`languages.csv`, `x_study_languages.csv`)
    pub fn cldf_dir(&self) -> PathBuf {
        self.repos.join("cldf")
    }

    /// Root directory of the translation bundles
    pub fn translations_dir(&self) -> PathBuf {
        self.repos.join("translations")
    }

    /// Check the settings that cannot be caught by deserialization
    pub fn validate(&self) -> Result<()> {
        if self.download.max_concurrent == 0 {
            return Err(Error::Config {
                message: "max_concurrent must be at least 1".to_string(),
                key: Some("download.max_concurrent".to_string()),
            });
        }

        if self.download.extensions.is_empty() {
            return Err(Error::Config {
                message: "at least one download extension is required".to_string(),
                key: Some("download.extensions".to_string()),
            });
        }

        if let Some(ext) = self
            .download
            .extensions
            .iter()
            .find(|ext| mimetype_for(ext).is_none())
        {
            return Err(Error::Config {
                message: format!("unsupported sound file extension: {}", ext),
                key: Some("download.extensions".to_string()),
            });
        }

        url::Url::parse(&self.cdstar.url).map_err(|e| Error::Config {
            message: format!("invalid CDSTAR url {}: {}", self.cdstar.url, e),
            key: Some("cdstar.url".to_string()),
        })?;

        Ok(())
    }
}

/// Mimetype for a supported sound file extension (case-insensitive)
pub fn mimetype_for(extension: &str) -> Option<&'static str> {
    SOUNDFILE_MIMETYPES
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, mimetype)| *mimetype)
}

/// Whether `extension` names a supported sound file format
pub fn is_soundfile_extension(extension: &str) -> bool {
    mimetype_for(extension).is_some()
}

fn default_repos() -> PathBuf {
    PathBuf::from(".")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("soundcomparisons.sqlite")
}

fn default_cdstar_url() -> String {
    "https://cdstar.shh.mpg.de".to_string()
}

fn default_sound_dir() -> PathBuf {
    PathBuf::from("./sound")
}

fn default_extensions() -> Vec<String> {
    SOUNDFILE_MIMETYPES
        .iter()
        .map(|(ext, _)| ext.to_string())
        .collect()
}

fn default_max_concurrent() -> usize {
    4
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
