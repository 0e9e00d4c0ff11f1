//! Upload planning
//!
//! Decides, for every sound file in a local directory, whether it has to be
//! uploaded to the media store. Performing the upload is left to the caller.

use super::CatalogIndex;
use crate::config::mimetype_for;
use crate::error::Result;
use crate::soundfile_name::SoundfileName;
use crate::utils::file_md5;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What to do with a local file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UploadAction {
    /// No bitstream with this extension exists yet
    Create,
    /// The stored bitstream has the same checksum
    Skip,
    /// The stored bitstream differs and must be deleted before uploading
    Replace {
        /// Id of the bitstream to replace
        bitstream_id: String,
    },
}

/// Decision for one local file
#[derive(Debug, Clone, Serialize)]
pub struct PlannedUpload {
    /// Sound file name (with extension)
    pub name: SoundfileName,
    /// Local file
    pub file: PathBuf,
    /// Mimetype to upload with
    pub mimetype: &'static str,
    /// MD5 of the local file
    pub md5: String,
    /// Catalog object already holding this stem, if any
    pub object_id: Option<String>,
    /// Decision
    pub action: UploadAction,
}

/// Upload decisions for a directory, ordered by file name
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadPlan {
    /// One entry per supported sound file
    pub files: Vec<PlannedUpload>,
}

impl UploadPlan {
    /// Plan the upload of the sound files in `dir`
    ///
    /// Files are grouped by stem. Stems that are not sound file names and
    /// files with unsupported extensions are ignored.
    pub fn for_directory(index: &CatalogIndex, dir: &Path) -> Result<Self> {
        let mut by_stem: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            by_stem.entry(stem.to_string()).or_default().push(path);
        }

        let mut plan = Self::default();
        for (stem, mut files) in by_stem {
            let Ok(sfn) = SoundfileName::parse(&stem) else {
                debug!(%stem, "not a sound file name, skipping");
                continue;
            };
            files.sort();

            let object = index.get_by_name(sfn.stem());
            for file in files {
                let Some(ext) = file.extension().and_then(|e| e.to_str()) else {
                    continue;
                };
                let Some(mimetype) = mimetype_for(ext) else {
                    continue;
                };

                let md5 = file_md5(&file)?;
                let action = match object.and_then(|obj| {
                    obj.bitstreams
                        .iter()
                        .find(|bs| has_extension(&bs.id, ext))
                }) {
                    None => UploadAction::Create,
                    Some(bs) if bs.checksum == md5 => UploadAction::Skip,
                    Some(bs) => UploadAction::Replace {
                        bitstream_id: bs.id.clone(),
                    },
                };

                debug!(file = ?file, ?action, "planned upload");
                plan.files.push(PlannedUpload {
                    name: sfn.with_extension(ext),
                    file,
                    mimetype,
                    md5,
                    object_id: object.map(|obj| obj.id.clone()),
                    action,
                });
            }
        }

        info!(
            ?dir,
            files = plan.files.len(),
            pending = plan.pending().count(),
            "planned sound file upload"
        );
        Ok(plan)
    }

    /// Files that need uploading (everything not skipped)
    pub fn pending(&self) -> impl Iterator<Item = &PlannedUpload> {
        self.files
            .iter()
            .filter(|f| f.action != UploadAction::Skip)
    }

    /// Stems with no catalog object yet, which need a new object
    pub fn new_objects(&self) -> Vec<&str> {
        let mut stems: Vec<&str> = self
            .files
            .iter()
            .filter(|f| f.object_id.is_none())
            .map(|f| f.name.stem())
            .collect();
        stems.dedup();
        stems
    }
}

fn has_extension(bitstream_id: &str, ext: &str) -> bool {
    bitstream_id
        .rsplit_once('.')
        .is_some_and(|(_, e)| e.eq_ignore_ascii_case(ext))
}
