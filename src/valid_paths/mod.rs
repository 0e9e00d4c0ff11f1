//! Valid sound file paths
//!
//! The authoritative set of sound files that *should* exist, derived from the
//! relational data (see [`derive`]) or read back from the persisted listing
//! `valid_soundfilepaths.txt`.
//!
//! ## Submodules
//!
//! - [`derive`] - naming algorithm over language, word and transcription rows
//! - [`source`] - the relational data source seam

use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

pub mod derive;
pub mod source;

pub use derive::{Derivation, DerivationStats, derive_valid_paths};
pub use source::{SoundDataSource, SoundRows, derive_from_source};

/// Set of valid `folder/stem` paths
///
/// Membership is decided by the stem alone (the last path segment), since the
/// folder is redundant with the stem's variety prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidPathSet {
    paths: BTreeSet<String>,
    stems: HashSet<String>,
}

impl ValidPathSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `folder/stem` path (or a bare stem)
    ///
    /// Returns `false` if the path was already present.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        self.stems.insert(stem_of(&path).to_string());
        self.paths.insert(path)
    }

    /// Whether `stem` is a valid sound file stem
    pub fn contains(&self, stem: &str) -> bool {
        self.stems.contains(stem)
    }

    /// Number of distinct paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Paths in case-sensitive lexicographic order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Render the persisted listing: one path per line, sorted case-insensitively
    pub fn to_listing(&self) -> String {
        let mut paths: Vec<&str> = self.iter().collect();
        // sort is stable, so ties keep their case-sensitive order
        paths.sort_by_key(|p| p.to_lowercase());
        paths.join("\n")
    }

    /// Parse a persisted listing; blank lines are ignored
    pub fn from_listing(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Read `valid_soundfilepaths.txt`
    ///
    /// A missing file is fatal for the caller's run.
    pub fn read_listing(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::MissingInput {
                what: "valid sound file paths",
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let set = Self::from_listing(&text);
        tracing::debug!(?path, count = set.len(), "read valid sound file paths");
        Ok(set)
    }

    /// Write `valid_soundfilepaths.txt`, creating parent directories as needed
    pub fn write_listing(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_listing())?;
        tracing::info!(?path, count = self.len(), "wrote valid sound file paths");
        Ok(())
    }
}

impl FromIterator<String> for ValidPathSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        for path in iter {
            set.insert(path);
        }
        set
    }
}

impl<'a> FromIterator<&'a str> for ValidPathSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

fn stem_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_membership_by_stem() {
        let set: ValidPathSet = ["Eng/Eng_101_house", "Ger/Ger_101_haus"].into_iter().collect();
        assert!(set.contains("Eng_101_house"));
        assert!(set.contains("Ger_101_haus"));
        assert!(!set.contains("Eng/Eng_101_house"));
        assert!(!set.contains("Eng_102_tree"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_listing_sorted_case_insensitively() {
        let set: ValidPathSet = ["b/b_100_x", "A/A_100_x", "a/a_100_y", "C/C_100_x"]
            .into_iter()
            .collect();
        assert_eq!(
            set.to_listing(),
            "A/A_100_x\na/a_100_y\nb/b_100_x\nC/C_100_x"
        );
    }

    #[test]
    fn test_from_listing_uses_last_segment() {
        let set = ValidPathSet::from_listing("Eng/Eng_101_house\n\n  Ger/Ger_101_haus  \nFre_101_maison\n");
        assert_eq!(set.len(), 3);
        assert!(set.contains("Eng_101_house"));
        assert!(set.contains("Ger_101_haus"));
        assert!(set.contains("Fre_101_maison"));
    }

    #[test]
    fn test_write_then_read_listing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("soundfiles").join("valid_soundfilepaths.txt");

        let set: ValidPathSet = ["Eng/Eng_101_house", "Eng/Eng_101_house_lex2"]
            .into_iter()
            .collect();
        set.write_listing(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Eng/Eng_101_house\nEng/Eng_101_house_lex2");

        let back = ValidPathSet::read_listing(&path).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_read_missing_listing() {
        let dir = TempDir::new().unwrap();
        let err = ValidPathSet::read_listing(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));
    }
}
