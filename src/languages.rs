//! Language export
//!
//! A language may belong to several studies, with one `Languages` row per
//! study. The export writes each language once to `cldf/languages.csv` and
//! the language-to-study mapping to `cldf/x_study_languages.csv`. Languages
//! whose rows differ between studies must be cleaned up first, so the export
//! refuses to write anything while such conflicts exist.

use crate::error::{Error, Result};
use crate::types::LanguageRow;
use crate::utils::write_atomic;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{info, warn};

/// File name of the language table
pub const LANGUAGES_CSV: &str = "languages.csv";

/// File name of the language-to-study mapping
pub const STUDY_LANGUAGES_CSV: &str = "x_study_languages.csv";

/// One language, shared by all of its studies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LanguageRecord {
    /// Language index
    pub language_ix: i64,
    /// Path prefix of its sound files
    pub file_path_part: String,
    /// Display name
    pub short_name: Option<String>,
}

/// Membership of a language in a study
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StudyLanguage {
    /// Language index
    pub language_ix: i64,
    /// Study name
    pub study_name: String,
}

/// Languages and their studies, ordered by `LanguageIx`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageExport {
    /// Distinct languages
    pub languages: Vec<LanguageRecord>,
    /// Language-to-study mapping, ordered by language then study
    pub study_languages: Vec<StudyLanguage>,
}

impl LanguageExport {
    /// Collapse per-study language rows into one record per language
    ///
    /// # Errors
    ///
    /// [`Error::InconsistentLanguages`] if any `LanguageIx` has a different
    /// `FilePathPart` or `ShortName` in different studies. Every conflicting
    /// row is logged before returning.
    pub fn from_rows(rows: &[LanguageRow]) -> Result<Self> {
        let mut by_ix: BTreeMap<i64, Vec<&LanguageRow>> = BTreeMap::new();
        for row in rows {
            by_ix.entry(row.language_ix).or_default().push(row);
        }

        let mut export = Self::default();
        let mut conflicts = Vec::new();

        for (language_ix, group) in by_ix {
            let variants: BTreeSet<(&str, Option<&str>)> = group
                .iter()
                .map(|row| (row.file_path_part.as_str(), row.short_name.as_deref()))
                .collect();

            if variants.len() > 1 {
                for row in &group {
                    warn!(
                        language_ix,
                        study = %row.study,
                        file_path_part = %row.file_path_part,
                        short_name = row.short_name.as_deref().unwrap_or(""),
                        "language data differs across studies"
                    );
                }
                conflicts.push(language_ix);
                continue;
            }

            let first = group[0];
            export.languages.push(LanguageRecord {
                language_ix,
                file_path_part: first.file_path_part.clone(),
                short_name: first.short_name.clone(),
            });

            let studies: BTreeSet<&str> = group.iter().map(|row| row.study.as_str()).collect();
            export
                .study_languages
                .extend(studies.into_iter().map(|study| StudyLanguage {
                    language_ix,
                    study_name: study.to_string(),
                }));
        }

        if !conflicts.is_empty() {
            return Err(Error::InconsistentLanguages {
                language_ixs: conflicts,
            });
        }
        Ok(export)
    }

    /// Write both CSV files into `dir`, creating it if needed
    pub fn write(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        write_atomic(&dir.join(LANGUAGES_CSV), to_csv(&self.languages)?)?;
        write_atomic(&dir.join(STUDY_LANGUAGES_CSV), to_csv(&self.study_languages)?)?;

        info!(
            ?dir,
            languages = self.languages.len(),
            memberships = self.study_languages.len(),
            "wrote language export"
        );
        Ok(())
    }
}

fn to_csv<T: Serialize>(records: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(ix: i64, study: &str, path: &str, short_name: Option<&str>) -> LanguageRow {
        LanguageRow {
            language_ix: ix,
            study: study.to_string(),
            file_path_part: path.to_string(),
            short_name: short_name.map(str::to_string),
        }
    }

    #[test]
    fn test_shared_language_exported_once() {
        let rows = vec![
            row(11111230301, "Germanic", "Gmc_Eng_Std", Some("English")),
            row(11111230301, "Europe", "Gmc_Eng_Std", Some("English")),
            row(13111230301, "Romance", "Rom_Ita_Std", None),
        ];
        let export = LanguageExport::from_rows(&rows).unwrap();

        assert_eq!(export.languages.len(), 2);
        assert_eq!(export.languages[0].file_path_part, "Gmc_Eng_Std");
        assert_eq!(
            export.study_languages,
            vec![
                StudyLanguage {
                    language_ix: 11111230301,
                    study_name: "Europe".to_string()
                },
                StudyLanguage {
                    language_ix: 11111230301,
                    study_name: "Germanic".to_string()
                },
                StudyLanguage {
                    language_ix: 13111230301,
                    study_name: "Romance".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_conflicting_language_data_is_rejected() {
        let rows = vec![
            row(11111230301, "Germanic", "Gmc_Eng_Std", Some("English")),
            row(11111230301, "Europe", "Gmc_Eng_Std", Some("Standard English")),
            row(11111230302, "Germanic", "Gmc_Ger_Std", Some("German")),
            row(13111230301, "Romance", "Rom_Ita_Std", None),
            row(13111230301, "Europe", "Rom_Ita_Tsc", None),
        ];
        let err = LanguageExport::from_rows(&rows).unwrap_err();
        match err {
            Error::InconsistentLanguages { language_ixs } => {
                assert_eq!(language_ixs, vec![11111230301, 13111230301])
            }
            other => panic!("expected inconsistent languages, got {:?}", other),
        }
    }

    #[test]
    fn test_write_csv_files() {
        let rows = vec![
            row(11111230301, "Germanic", "Gmc_Eng_Std", Some("English")),
            row(13111230301, "Romance", "Rom_Ita_Std", None),
        ];
        let dir = TempDir::new().unwrap();
        let cldf = dir.path().join("cldf");

        LanguageExport::from_rows(&rows).unwrap().write(&cldf).unwrap();

        assert_eq!(
            std::fs::read_to_string(cldf.join(LANGUAGES_CSV)).unwrap(),
            "LanguageIx,FilePathPart,ShortName\n\
             11111230301,Gmc_Eng_Std,English\n\
             13111230301,Rom_Ita_Std,\n"
        );
        assert_eq!(
            std::fs::read_to_string(cldf.join(STUDY_LANGUAGES_CSV)).unwrap(),
            "LanguageIx,StudyName\n11111230301,Germanic\n13111230301,Romance\n"
        );
    }
}
