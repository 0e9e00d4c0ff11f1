//! Lookup views over catalog objects

use super::{Bitstream, CatalogObject};
use crate::config::SOUNDFILE_MIMETYPES;
use crate::soundfile_name::SoundfileName;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;
use tracing::{debug, warn};

/// In-memory index over catalog objects
///
/// Every object is reachable by id. Objects whose `name` parses as a
/// [`SoundfileName`] are additionally reachable by name and by stem; the rest
/// are logged and kept in the id view only. When several objects share a
/// name, the one with the greatest id wins the name and stem views (all of
/// them remain reachable by id).
#[derive(Debug, Default, Clone)]
pub struct CatalogIndex {
    by_id: BTreeMap<String, Arc<CatalogObject>>,
    by_name: BTreeMap<String, (SoundfileName, Arc<CatalogObject>)>,
    by_stem: HashMap<SoundfileName, Arc<CatalogObject>>,
    unparsable: Vec<String>,
}

impl CatalogIndex {
    /// Build the index; a later object replaces an earlier one with the same id
    pub fn new(objects: impl IntoIterator<Item = CatalogObject>) -> Self {
        Self::from_shared(objects.into_iter().map(Arc::new))
    }

    pub(crate) fn from_shared(objects: impl IntoIterator<Item = Arc<CatalogObject>>) -> Self {
        let by_id: BTreeMap<String, Arc<CatalogObject>> = objects
            .into_iter()
            .map(|obj| (obj.id.clone(), obj))
            .collect();

        let mut by_name = BTreeMap::new();
        let mut by_stem = HashMap::new();
        let mut unparsable = Vec::new();

        for (id, obj) in &by_id {
            let Some(name) = obj.name() else {
                warn!(object = %id, "catalog object has no name");
                unparsable.push(id.clone());
                continue;
            };
            match SoundfileName::parse(name) {
                Ok(sfn) => {
                    by_stem.insert(sfn.clone(), Arc::clone(obj));
                    by_name.insert(name.to_string(), (sfn, Arc::clone(obj)));
                }
                Err(e) => {
                    warn!(object = %id, error = %e, "catalog object name is not a sound file name");
                    unparsable.push(id.clone());
                }
            }
        }

        debug!(
            objects = by_id.len(),
            names = by_name.len(),
            unparsable = unparsable.len(),
            "built catalog index"
        );

        Self {
            by_id,
            by_name,
            by_stem,
            unparsable,
        }
    }

    /// Look up an object by id, falling back to its name
    pub fn get(&self, key: &str) -> Option<&CatalogObject> {
        self.get_by_id(key).or_else(|| self.get_by_name(key))
    }

    /// Whether `key` is an object id or a name in the index
    pub fn contains(&self, key: &str) -> bool {
        self.by_id.contains_key(key) || self.by_name.contains_key(key)
    }

    /// Look up an object by id
    pub fn get_by_id(&self, id: &str) -> Option<&CatalogObject> {
        self.by_id.get(id).map(AsRef::as_ref)
    }

    /// Look up an object by its exact `name`
    pub fn get_by_name(&self, name: &str) -> Option<&CatalogObject> {
        self.by_name.get(name).map(|(_, obj)| obj.as_ref())
    }

    /// Look up an object by canonical stem, ignoring any extension in its name
    pub fn get_by_stem(&self, stem: &str) -> Option<&CatalogObject> {
        self.by_stem.get(stem).map(AsRef::as_ref)
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the index has no objects
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// All objects in id order
    pub fn iter(&self) -> impl Iterator<Item = &CatalogObject> {
        self.by_id.values().map(AsRef::as_ref)
    }

    /// Ids of objects without a parsable name
    pub fn unparsable(&self) -> &[String] {
        &self.unparsable
    }

    /// Sorted names starting with `prefix`
    pub fn soundfile_names(&self, prefix: &str) -> Vec<&str> {
        self.by_name
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .map(|(name, _)| name.as_str())
            .take_while(|name| name.starts_with(prefix))
            .collect()
    }

    /// Sorted names whose variety is exactly `variety`
    pub fn names_for_variety(&self, variety: &str) -> Vec<&str> {
        self.by_name
            .iter()
            .filter(|(_, (sfn, _))| sfn.variety() == variety)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Bitstreams of `object` with one of `mimetypes`
///
/// An empty `mimetypes` selects all sound file mimetypes. If nothing matches,
/// the first bitstream is returned, so any object with bitstreams yields at
/// least one.
pub fn matching_bitstreams<'a>(object: &'a CatalogObject, mimetypes: &[&str]) -> Vec<&'a Bitstream> {
    let wanted = |mimetype: &str| {
        if mimetypes.is_empty() {
            SOUNDFILE_MIMETYPES.iter().any(|(_, m)| *m == mimetype)
        } else {
            mimetypes.iter().any(|m| *m == mimetype)
        }
    };

    let matching: Vec<&Bitstream> = object
        .bitstreams
        .iter()
        .filter(|bs| wanted(bs.mimetype.as_str()))
        .collect();

    if matching.is_empty() {
        object.bitstreams.first().into_iter().collect()
    } else {
        matching
    }
}

/// Download URL of a bitstream: `{base}/bitstreams/{object id}/{bitstream id}`
pub fn bitstream_url(base: &str, object: &CatalogObject, bitstream: &Bitstream) -> String {
    format!(
        "{}/bitstreams/{}/{}",
        base.trim_end_matches('/'),
        object.id,
        bitstream.id
    )
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CatalogIndex {
        CatalogIndex::new([
            CatalogObject::new("O1", "Eng_101_house")
                .with_bitstream("Eng_101_house.mp3", "audio/mpeg", "aaa")
                .with_bitstream("Eng_101_house.ogg", "audio/ogg", "bbb"),
            CatalogObject::new("O2", "Eng_102_tree"),
            CatalogObject::new("O3", "Ger_101_haus"),
            CatalogObject::new("O4", "not-a-soundfile"),
            CatalogObject::new("O5", "Eng_Old_103_stone"),
        ])
    }

    #[test]
    fn test_get_by_id_or_name() {
        let index = sample();
        assert_eq!(index.get("O1").unwrap().name(), Some("Eng_101_house"));
        assert_eq!(index.get("Eng_101_house").unwrap().id, "O1");
        assert!(index.contains("O3"));
        assert!(index.contains("Ger_101_haus"));
        assert!(!index.contains("Ger_102_baum"));
        assert!(index.get("Ger_102_baum").is_none());
    }

    #[test]
    fn test_unparsable_name_kept_by_id_only() {
        let index = sample();
        assert_eq!(index.len(), 5);
        assert!(index.contains("O4"));
        assert!(!index.contains("not-a-soundfile"));
        assert!(index.get_by_name("not-a-soundfile").is_none());
        assert_eq!(index.unparsable(), ["O4".to_string()]);
    }

    #[test]
    fn test_object_without_name() {
        let mut nameless = CatalogObject::new("O9", "x");
        nameless.metadata.name = None;
        let index = CatalogIndex::new([nameless]);
        assert!(index.contains("O9"));
        assert_eq!(index.unparsable(), ["O9".to_string()]);
        assert!(index.soundfile_names("").is_empty());
    }

    #[test]
    fn test_lookup_by_stem_ignores_extension() {
        let index = CatalogIndex::new([CatalogObject::new("O1", "Eng_101_house.mp3")]);
        assert_eq!(index.get_by_stem("Eng_101_house").unwrap().id, "O1");
        assert!(index.get_by_name("Eng_101_house").is_none());
        assert!(index.get_by_name("Eng_101_house.mp3").is_some());
    }

    #[test]
    fn test_duplicate_names_greatest_id_wins() {
        let index = CatalogIndex::new([
            CatalogObject::new("B", "Eng_400_moon"),
            CatalogObject::new("A", "Eng_400_moon"),
        ]);
        assert_eq!(index.get("Eng_400_moon").unwrap().id, "B");
        assert_eq!(index.get_by_stem("Eng_400_moon").unwrap().id, "B");
        assert!(index.contains("A"));
    }

    #[test]
    fn test_soundfile_names_by_prefix() {
        let index = sample();
        assert_eq!(
            index.soundfile_names("Eng_"),
            vec!["Eng_101_house", "Eng_102_tree", "Eng_Old_103_stone"]
        );
        assert_eq!(index.soundfile_names("Eng_10"), vec!["Eng_101_house", "Eng_102_tree"]);
        assert_eq!(index.soundfile_names("").len(), 4);
        assert!(index.soundfile_names("Fre").is_empty());
    }

    #[test]
    fn test_names_for_variety() {
        let index = sample();
        assert_eq!(index.names_for_variety("Eng"), vec!["Eng_101_house", "Eng_102_tree"]);
        assert_eq!(index.names_for_variety("Eng_Old"), vec!["Eng_Old_103_stone"]);
        assert!(index.names_for_variety("En").is_empty());
    }

    #[test]
    fn test_matching_bitstreams() {
        let obj = CatalogObject::new("O1", "Eng_101_house")
            .with_bitstream("Eng_101_house.mp3", "audio/mpeg", "aaa")
            .with_bitstream("Eng_101_house.ogg", "audio/ogg", "bbb");

        let ids = |bs: Vec<&Bitstream>| bs.iter().map(|b| b.id.clone()).collect::<Vec<_>>();
        assert_eq!(matching_bitstreams(&obj, &[]).len(), 2);
        assert_eq!(
            ids(matching_bitstreams(&obj, &["audio/ogg"])),
            vec!["Eng_101_house.ogg"]
        );
        // nothing matches: fall back to the first bitstream
        assert_eq!(
            ids(matching_bitstreams(&obj, &["audio/wav"])),
            vec!["Eng_101_house.mp3"]
        );

        let empty = CatalogObject::new("O2", "Eng_102_tree");
        assert!(matching_bitstreams(&empty, &[]).is_empty());
    }

    #[test]
    fn test_bitstream_url() {
        let obj = CatalogObject::new("EAEA0-1", "Eng_101_house")
            .with_bitstream("Eng_101_house.mp3", "audio/mpeg", "aaa");
        let bs = &obj.bitstreams[0];
        let expected = "https://cdstar.shh.mpg.de/bitstreams/EAEA0-1/Eng_101_house.mp3";
        assert_eq!(bitstream_url("https://cdstar.shh.mpg.de", &obj, bs), expected);
        assert_eq!(bitstream_url("https://cdstar.shh.mpg.de/", &obj, bs), expected);
    }
}
