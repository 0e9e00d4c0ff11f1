//! Media catalog
//!
//! A read-only snapshot of the objects held by the CDSTAR media store, as
//! written by `cdstarcat` to `soundfiles/catalog.json` (optionally zipped as
//! `catalog.json.zip`). Each object carries a `name` metadata field, which is
//! expected to be a [`SoundfileName`](crate::SoundfileName) stem, and a list
//! of bitstreams (one per encoding).
//!
//! ## Submodules
//!
//! - [`index`] - lookup by id, name and stem
//! - [`upload`] - planning which local files need uploading

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

pub mod index;
pub mod upload;

pub use index::{CatalogIndex, bitstream_url, matching_bitstreams};
pub use upload::{PlannedUpload, UploadAction, UploadPlan};

/// One encoded file attached to a catalog object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bitstream {
    /// Bitstream id, the file name (`stem.ext`)
    #[serde(rename = "bitstreamid")]
    pub id: String,
    /// Mimetype, e.g. `audio/mpeg`
    #[serde(rename = "content-type")]
    pub mimetype: String,
    /// Content checksum
    pub checksum: String,
    /// Algorithm of `checksum`
    #[serde(rename = "checksum-algorithm", default = "default_checksum_algorithm")]
    pub checksum_algorithm: String,
    /// Size in bytes
    #[serde(default)]
    pub filesize: u64,
    /// Creation time (milliseconds since the epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    /// Last modification time (milliseconds since the epoch)
    #[serde(
        rename = "last-modified",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<i64>,
}

impl Bitstream {
    /// File extension of the bitstream id, if any
    pub fn extension(&self) -> Option<&str> {
        self.id.rsplit_once('.').map(|(_, ext)| ext)
    }
}

/// Object metadata
///
/// Only `name` is interpreted; everything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Sound file stem the object stores
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Remaining metadata fields (`collection`, `type`, `path`, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An object of the media store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogObject {
    /// Object UID, e.g. `EAEA0-0000-3A1B-047F-0`
    #[serde(default)]
    pub id: String,
    /// Object metadata
    #[serde(default)]
    pub metadata: ObjectMetadata,
    /// Encoded files
    #[serde(default)]
    pub bitstreams: Vec<Bitstream>,
}

impl CatalogObject {
    /// Create an object with a name and no bitstreams
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: ObjectMetadata {
                name: Some(name.into()),
                extra: serde_json::Map::new(),
            },
            bitstreams: Vec::new(),
        }
    }

    /// Add a bitstream, builder style
    pub fn with_bitstream(
        mut self,
        id: impl Into<String>,
        mimetype: impl Into<String>,
        checksum: impl Into<String>,
    ) -> Self {
        self.bitstreams.push(Bitstream {
            id: id.into(),
            mimetype: mimetype.into(),
            checksum: checksum.into(),
            checksum_algorithm: default_checksum_algorithm(),
            filesize: 0,
            created: None,
            last_modified: None,
        });
        self
    }

    /// The `name` metadata field
    pub fn name(&self) -> Option<&str> {
        self.metadata.name.as_deref()
    }

    /// Bitstream with the given id
    pub fn bitstream(&self, id: &str) -> Option<&Bitstream> {
        self.bitstreams.iter().find(|bs| bs.id == id)
    }
}

/// Catalog snapshot with a lazily built index
///
/// The index is built on first use and reused until
/// [`invalidate_index`](Self::invalidate_index) or [`upsert`](Self::upsert)
/// is called. Reads after an external change to the store are stale until
/// then.
#[derive(Debug, Default)]
pub struct MediaCatalog {
    path: Option<PathBuf>,
    objects: BTreeMap<String, Arc<CatalogObject>>,
    index: OnceLock<CatalogIndex>,
}

impl MediaCatalog {
    /// Build a catalog from objects; a later object replaces an earlier one with the same id
    pub fn from_objects(objects: impl IntoIterator<Item = CatalogObject>) -> Self {
        Self {
            path: None,
            objects: objects
                .into_iter()
                .map(|obj| (obj.id.clone(), Arc::new(obj)))
                .collect(),
            index: OnceLock::new(),
        }
    }

    /// Load a catalog snapshot from `catalog.json` or `catalog.json.zip`
    ///
    /// # Errors
    ///
    /// [`Error::MissingInput`] if the file does not exist, and
    /// [`Error::InvalidCatalog`] if it is not a catalog.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::MissingInput {
                what: "media catalog",
                path: path.to_path_buf(),
            });
        }

        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        let text = if is_zip {
            read_zipped_json(path)?
        } else {
            std::fs::read_to_string(path)?
        };

        let mut catalog = Self::from_json(&text).map_err(|e| Error::InvalidCatalog {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        catalog.path = Some(path.to_path_buf());

        info!(?path, objects = catalog.len(), "loaded media catalog");
        Ok(catalog)
    }

    /// Parse the `uid -> object` JSON map; the map key is authoritative for the id
    pub fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, CatalogObject> = serde_json::from_str(text)?;
        Ok(Self::from_objects(raw.into_iter().map(|(uid, mut obj)| {
            obj.id = uid;
            obj
        })))
    }

    /// Serialize as the `uid -> object` JSON map
    pub fn to_json(&self) -> Result<String> {
        let map: BTreeMap<&str, &CatalogObject> = self
            .objects
            .iter()
            .map(|(id, obj)| (id.as_str(), obj.as_ref()))
            .collect();
        Ok(serde_json::to_string_pretty(&map)?)
    }

    /// Path the catalog was loaded from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the catalog has no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in id order
    pub fn objects(&self) -> impl Iterator<Item = &CatalogObject> {
        self.objects.values().map(AsRef::as_ref)
    }

    /// The index over the current objects, built on first call
    pub fn index(&self) -> &CatalogIndex {
        self.index.get_or_init(|| {
            debug!(objects = self.objects.len(), "building catalog index");
            CatalogIndex::from_shared(self.objects.values().cloned())
        })
    }

    /// Drop the cached index; the next [`index`](Self::index) call rebuilds it
    pub fn invalidate_index(&mut self) {
        if self.index.take().is_some() {
            debug!("catalog index invalidated");
        }
    }

    /// Insert or replace an object and invalidate the index
    pub fn upsert(&mut self, object: CatalogObject) {
        self.objects.insert(object.id.clone(), Arc::new(object));
        self.invalidate_index();
    }
}

/// Read the first JSON entry of a zipped catalog
fn read_zipped_json(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let json_index = (0..archive.len()).find(|&i| {
        archive
            .by_index(i)
            .map(|entry| !entry.is_dir() && entry.name().ends_with(".json"))
            .unwrap_or(false)
    });

    let Some(i) = json_index else {
        return Err(Error::InvalidCatalog {
            path: path.to_path_buf(),
            reason: "archive contains no JSON file".to_string(),
        });
    };

    let mut entry = archive.by_index(i)?;
    let mut text = String::new();
    entry.read_to_string(&mut text)?;
    Ok(text)
}

fn default_checksum_algorithm() -> String {
    "MD5".to_string()
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const CATALOG_JSON: &str = r#"{
        "EAEA0-0000-3A1B-047F-0": {
            "metadata": {
                "collection": "soundcomparisons",
                "name": "Oce_Van_Mal_Nth_WNth_MaluaBay_Marasup_Dl_626_leaf_lif",
                "type": "soundfile"
            },
            "bitstreams": [
                {
                    "bitstreamid": "Oce_Van_Mal_Nth_WNth_MaluaBay_Marasup_Dl_626_leaf_lif.mp3",
                    "content-type": "audio/mpeg",
                    "checksum": "aaa",
                    "checksum-algorithm": "MD5",
                    "filesize": 8777,
                    "created": 1532340813000,
                    "last-modified": 1532340813000
                },
                {
                    "bitstreamid": "Oce_Van_Mal_Nth_WNth_MaluaBay_Marasup_Dl_626_leaf_lif.ogg",
                    "content-type": "audio/ogg",
                    "checksum": "bbb",
                    "checksum-algorithm": "MD5",
                    "filesize": 7342
                },
                {
                    "bitstreamid": "Oce_Van_Mal_Nth_WNth_MaluaBay_Marasup_Dl_626_leaf_lif.wav",
                    "content-type": "audio/wav",
                    "checksum": "ccc"
                }
            ]
        },
        "EAEA0-0000-0000-0001-0": {
            "metadata": {"name": "Eng_101_house"},
            "bitstreams": []
        }
    }"#;

    fn write_zip(path: &Path, entry_name: &str, content: &str) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file(entry_name, zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(content.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_load_json_catalog() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, CATALOG_JSON).unwrap();

        let catalog = MediaCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.path(), Some(path.as_path()));

        let index = catalog.index();
        assert!(index.contains("EAEA0-0000-3A1B-047F-0"));
        let obj = index
            .get("Oce_Van_Mal_Nth_WNth_MaluaBay_Marasup_Dl_626_leaf_lif")
            .unwrap();
        assert_eq!(obj.id, "EAEA0-0000-3A1B-047F-0");
        assert_eq!(obj.bitstreams.len(), 3);
        assert_eq!(obj.bitstreams[0].filesize, 8777);
        assert_eq!(obj.bitstreams[0].last_modified, Some(1532340813000));
        assert_eq!(obj.bitstreams[2].checksum_algorithm, "MD5");
        assert_eq!(
            obj.metadata.extra.get("collection").and_then(|v| v.as_str()),
            Some("soundcomparisons")
        );
        assert_eq!(matching_bitstreams(obj, &[]).len(), 3);
    }

    #[test]
    fn test_load_zipped_catalog() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json.zip");
        write_zip(&path, "catalog.json", CATALOG_JSON);

        let catalog = MediaCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.index().contains("EAEA0-0000-3A1B-047F-0"));
        let obj = catalog
            .index()
            .get("Oce_Van_Mal_Nth_WNth_MaluaBay_Marasup_Dl_626_leaf_lif")
            .unwrap();
        assert_eq!(matching_bitstreams(obj, &[]).len(), 3);
    }

    #[test]
    fn test_zip_without_json_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json.zip");
        write_zip(&path, "README.txt", "nothing here");

        let err = MediaCatalog::load(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidCatalog { .. }));
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        let err = MediaCatalog::load(&dir.path().join("catalog.json")).unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));

        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let err = MediaCatalog::load(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidCatalog { .. }));
    }

    #[test]
    fn test_index_is_cached_until_invalidated() {
        let mut catalog = MediaCatalog::from_objects([CatalogObject::new("O1", "Eng_101_house")]);

        let first: *const CatalogIndex = catalog.index();
        let second: *const CatalogIndex = catalog.index();
        assert_eq!(first, second);
        assert!(!catalog.index().contains("Eng_200_water"));

        catalog.upsert(CatalogObject::new("O2", "Eng_200_water"));
        assert!(catalog.index().contains("Eng_200_water"));
        assert!(catalog.index().contains("O2"));
        assert_eq!(catalog.len(), 2);

        catalog.invalidate_index();
        assert_eq!(catalog.index().len(), 2);
    }

    #[test]
    fn test_json_round_trip_keeps_unknown_metadata() {
        let catalog = MediaCatalog::from_json(CATALOG_JSON).unwrap();
        let text = catalog.to_json().unwrap();
        let back = MediaCatalog::from_json(&text).unwrap();

        let a: Vec<&CatalogObject> = catalog.objects().collect();
        let b: Vec<&CatalogObject> = back.objects().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bitstream_extension() {
        let obj = CatalogObject::new("O1", "Eng_101_house")
            .with_bitstream("Eng_101_house.mp3", "audio/mpeg", "aaa")
            .with_bitstream("README", "text/plain", "bbb");
        assert_eq!(obj.bitstreams[0].extension(), Some("mp3"));
        assert_eq!(obj.bitstreams[1].extension(), None);
        assert!(obj.bitstream("Eng_101_house.mp3").is_some());
        assert!(obj.bitstream("Eng_101_house.ogg").is_none());
    }
}
