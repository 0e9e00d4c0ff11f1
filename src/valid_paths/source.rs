//! Relational data source for the valid-path derivation

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{LanguageRow, TranscriptionRow, WordRow};

use super::derive::{Derivation, derive_valid_paths};

/// Read-only access to the language, word and transcription rows
///
/// Implemented by [`Database`](crate::db::Database) for the SQLite snapshot
/// and by [`SoundRows`] for rows that are already in memory.
///
/// # Errors
///
/// Implementations return an error if the rows cannot be fetched or a row is
/// missing an expected column; no defaults are substituted.
#[async_trait]
pub trait SoundDataSource: Send + Sync {
    /// All languages of all studies
    async fn languages(&self) -> Result<Vec<LanguageRow>>;

    /// All words of all studies
    async fn words(&self) -> Result<Vec<WordRow>>;

    /// All transcriptions
    async fn transcriptions(&self) -> Result<Vec<TranscriptionRow>>;

    /// Human-readable name for logging
    fn name(&self) -> &str;
}

/// Rows held in memory
#[derive(Debug, Clone, Default)]
pub struct SoundRows {
    /// Language rows
    pub languages: Vec<LanguageRow>,
    /// Word rows
    pub words: Vec<WordRow>,
    /// Transcription rows
    pub transcriptions: Vec<TranscriptionRow>,
}

impl SoundRows {
    /// Derive the valid paths of these rows
    pub fn derive(&self) -> Result<Derivation> {
        derive_valid_paths(&self.languages, &self.words, &self.transcriptions)
    }
}

#[async_trait]
impl SoundDataSource for SoundRows {
    async fn languages(&self) -> Result<Vec<LanguageRow>> {
        Ok(self.languages.clone())
    }

    async fn words(&self) -> Result<Vec<WordRow>> {
        Ok(self.words.clone())
    }

    async fn transcriptions(&self) -> Result<Vec<TranscriptionRow>> {
        Ok(self.transcriptions.clone())
    }

    fn name(&self) -> &str {
        "in-memory rows"
    }
}

/// Fetch all rows from `source` and derive the valid paths
pub async fn derive_from_source(source: &dyn SoundDataSource) -> Result<Derivation> {
    tracing::debug!(source = source.name(), "fetching rows for valid path derivation");

    let languages = source.languages().await?;
    let words = source.words().await?;
    let transcriptions = source.transcriptions().await?;

    tracing::debug!(
        languages = languages.len(),
        words = words.len(),
        transcriptions = transcriptions.len(),
        "fetched relational rows"
    );

    derive_valid_paths(&languages, &words, &transcriptions)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_derive_from_in_memory_source() {
        let rows = SoundRows {
            languages: vec![LanguageRow {
                language_ix: 11111230301,
                study: "Germanic".to_string(),
                file_path_part: "Gmc_Eng_Std".to_string(),
                short_name: None,
            }],
            words: vec![WordRow {
                study: "Germanic".to_string(),
                ix_elicitation: 101,
                ix_morphological_instance: 0,
                sound_file_word_identifier_text: "_101_house".to_string(),
            }],
            transcriptions: vec![TranscriptionRow {
                language_ix: 11111230301,
                ix_elicitation: 101,
                ix_morphological_instance: 0,
                alternative_lexem_ix: 0,
                alternative_phonetic_realisation_ix: 2,
            }],
        };

        let via_source = derive_from_source(&rows).await.unwrap();
        let direct = rows.derive().unwrap();
        assert_eq!(via_source.paths, direct.paths);
        assert!(via_source.paths.contains("Gmc_Eng_Std_101_house"));
        assert!(via_source.paths.contains("Gmc_Eng_Std_101_house_pron2"));
    }
}
