//! Sound file download from the media store
//!
//! A download request is a list of free-form items. Each item is resolved
//! against the [`CatalogIndex`]:
//!
//! - `mp3`, `ogg` or `wav` restricts the encodings fetched,
//! - an object UID selects that object,
//! - an exact sound file name selects that name,
//! - anything else selects every name starting with it.
//!
//! The selected bitstreams are written to `{out_dir}/{variety}/{bitstream id}`.
//! Files already present with the catalog checksum are left alone.

use crate::catalog::{Bitstream, CatalogIndex, CatalogObject, bitstream_url, matching_bitstreams};
use crate::config::{Config, mimetype_for};
use crate::error::{DownloadError, Error, Result};
use crate::retry::with_retry;
use crate::soundfile_name::SoundfileName;
use crate::utils::{file_md5, md5_hex, write_atomic_async};
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Sound files and encodings selected for download
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoundfileSelection {
    names: BTreeSet<SoundfileName>,
    mimetypes: Vec<&'static str>,
}

impl SoundfileSelection {
    /// Resolve request items against the catalog
    ///
    /// `default_extensions` applies when no item is an extension token.
    /// Items matching nothing are logged and skipped.
    pub fn resolve<S: AsRef<str>>(
        index: &CatalogIndex,
        items: &[S],
        default_extensions: &[String],
    ) -> Self {
        let mut names = BTreeSet::new();
        let mut mimetypes: Vec<&'static str> = Vec::new();

        for item in items.iter().map(AsRef::as_ref) {
            if let Some(mimetype) = mimetype_for(item) {
                if !mimetypes.contains(&mimetype) {
                    mimetypes.push(mimetype);
                }
                continue;
            }

            let by_uid = index.get_by_id(item).and_then(CatalogObject::name);
            let candidates: Vec<&str> = if let Some(name) = by_uid {
                vec![name]
            } else if index.get_by_name(item).is_some() {
                vec![item]
            } else {
                index.soundfile_names(item)
            };

            if candidates.is_empty() {
                warn!(item, "nothing in the catalog matches item, skipping");
                continue;
            }

            for candidate in candidates {
                match SoundfileName::parse(candidate) {
                    Ok(name) => {
                        names.insert(name);
                    }
                    Err(e) => warn!(item, error = %e, "skipping item"),
                }
            }
        }

        if mimetypes.is_empty() {
            mimetypes = default_extensions
                .iter()
                .filter_map(|ext| mimetype_for(ext))
                .collect();
        }

        debug!(names = names.len(), ?mimetypes, "resolved download selection");
        Self { names, mimetypes }
    }

    /// Selected names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &SoundfileName> {
        self.names.iter()
    }

    /// Mimetypes of the encodings to fetch
    pub fn mimetypes(&self) -> &[&'static str] {
        &self.mimetypes
    }

    /// Number of selected names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing was selected
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Outcome of a download run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Bitstreams fetched and written
    pub downloaded: usize,
    /// Bitstreams already present with the catalog checksum
    pub skipped: usize,
}

#[derive(Debug)]
struct BitstreamJob {
    url: String,
    target: PathBuf,
    checksum: Option<String>,
}

impl BitstreamJob {
    fn new(
        base_url: &str,
        object: &CatalogObject,
        bitstream: &Bitstream,
        out_dir: &Path,
        variety: &str,
    ) -> Self {
        // only MD5 checksums can be verified
        let checksum = bitstream
            .checksum_algorithm
            .eq_ignore_ascii_case("md5")
            .then(|| bitstream.checksum.to_ascii_lowercase());
        Self {
            url: bitstream_url(base_url, object, bitstream),
            target: out_dir.join(variety).join(&bitstream.id),
            checksum,
        }
    }
}

enum Fetched {
    Downloaded,
    Skipped,
}

/// Download the selected bitstreams into `out_dir`
///
/// At most `config.download.max_concurrent` fetches are in flight. Each
/// fetch is retried according to `config.retry`. The first failure is
/// returned once all fetches have finished; files written before it stay.
///
/// # Errors
///
/// [`DownloadError::HttpStatus`] for a non-success response that is not
/// recovered by retrying, [`DownloadError::ChecksumMismatch`] when the
/// received content differs from the catalog, and I/O errors writing files.
pub async fn download_soundfiles(
    client: &reqwest::Client,
    index: &CatalogIndex,
    selection: &SoundfileSelection,
    out_dir: &Path,
    config: &Config,
) -> Result<DownloadSummary> {
    let mut jobs = Vec::new();
    for name in selection.names() {
        let Some(object) = index.get_by_stem(name.stem()) else {
            warn!(name = %name, "selected name is no longer in the catalog");
            continue;
        };
        for bitstream in matching_bitstreams(object, selection.mimetypes()) {
            jobs.push(BitstreamJob::new(
                &config.cdstar.url,
                object,
                bitstream,
                out_dir,
                name.variety(),
            ));
        }
    }

    info!(
        names = selection.len(),
        bitstreams = jobs.len(),
        ?out_dir,
        "downloading sound files"
    );

    let results: Vec<Result<Fetched>> = stream::iter(jobs)
        .map(move |job| async move { fetch_bitstream(client, &job, config).await })
        .buffer_unordered(config.download.max_concurrent.max(1))
        .collect()
        .await;

    let mut summary = DownloadSummary::default();
    let mut first_error = None;
    for result in results {
        match result {
            Ok(Fetched::Downloaded) => summary.downloaded += 1,
            Ok(Fetched::Skipped) => summary.skipped += 1,
            Err(e) => {
                warn!(error = %e, "bitstream download failed");
                first_error.get_or_insert(e);
            }
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }

    info!(
        downloaded = summary.downloaded,
        skipped = summary.skipped,
        "sound file download complete"
    );
    Ok(summary)
}

async fn fetch_bitstream(
    client: &reqwest::Client,
    job: &BitstreamJob,
    config: &Config,
) -> Result<Fetched> {
    if let Some(expected) = &job.checksum {
        if local_md5(&job.target).await?.as_deref() == Some(expected.as_str()) {
            debug!(file = ?job.target, "up to date, skipping");
            return Ok(Fetched::Skipped);
        }
    }

    let body = with_retry(&config.retry, || fetch_body(client, &job.url, config)).await?;

    if let Some(expected) = &job.checksum {
        let actual = md5_hex(&body);
        if actual != *expected {
            return Err(Error::Download(DownloadError::ChecksumMismatch {
                path: job.target.clone(),
                expected: expected.clone(),
                actual,
            }));
        }
    }

    write_atomic_async(&job.target, &body).await?;
    debug!(url = %job.url, file = ?job.target, bytes = body.len(), "downloaded bitstream");
    Ok(Fetched::Downloaded)
}

/// MD5 of an existing file, hashed off the async runtime
async fn local_md5(path: &Path) -> Result<Option<String>> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<Option<String>> {
        if path.is_file() {
            file_md5(&path).map(Some)
        } else {
            Ok(None)
        }
    })
    .await
    .map_err(|e| Error::Other(format!("checksum task panicked: {}", e)))?
}

async fn fetch_body(client: &reqwest::Client, url: &str, config: &Config) -> Result<Vec<u8>> {
    let mut request = client.get(url);
    if let Some(user) = &config.cdstar.user {
        request = request.basic_auth(user, config.cdstar.password.as_ref());
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Download(DownloadError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }));
    }

    Ok(response.bytes().await?.to_vec())
}
