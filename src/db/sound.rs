//! Studies, languages, words and transcriptions.

use crate::types::{LanguageRow, TranscriptionRow, WordRow};
use crate::valid_paths::SoundDataSource;
use crate::{Error, Result};
use async_trait::async_trait;

use super::Database;

impl Database {
    /// Names of all studies, sorted
    pub async fn study_names(&self) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT Name FROM Studies ORDER BY Name")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Sqlx)
    }

    /// Distinct `FilePathPart`s of the languages of `study`, sorted
    pub async fn file_path_parts_for_study(&self, study: &str) -> Result<Vec<String>> {
        sqlx::query_scalar(
            r#"
            SELECT DISTINCT FilePathPart
            FROM Languages
            WHERE study = ?
            ORDER BY FilePathPart
            "#,
        )
        .bind(study)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// `FilePathPart` of the language `language_ix`, if any study has it
    pub async fn file_path_part_for_language(&self, language_ix: i64) -> Result<Option<String>> {
        sqlx::query_scalar(
            r#"
            SELECT FilePathPart
            FROM Languages
            WHERE LanguageIx = ?
            ORDER BY study
            LIMIT 1
            "#,
        )
        .bind(language_ix)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// Insert a study
    pub async fn insert_study(&self, name: &str) -> Result<()> {
        sqlx::query("INSERT INTO Studies (Name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(Error::Sqlx)?;
        Ok(())
    }

    /// Insert a language
    pub async fn insert_language(&self, language: &LanguageRow) -> Result<()> {
        sqlx::query(
            "INSERT INTO Languages (LanguageIx, study, FilePathPart, ShortName) VALUES (?, ?, ?, ?)",
        )
        .bind(language.language_ix)
        .bind(&language.study)
        .bind(&language.file_path_part)
        .bind(&language.short_name)
        .execute(&self.pool)
        .await
        .map_err(Error::Sqlx)?;
        Ok(())
    }

    /// Insert a word
    pub async fn insert_word(&self, word: &WordRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO Words (
                study, IxElicitation, IxMorphologicalInstance, SoundFileWordIdentifierText
            )
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&word.study)
        .bind(word.ix_elicitation)
        .bind(word.ix_morphological_instance)
        .bind(&word.sound_file_word_identifier_text)
        .execute(&self.pool)
        .await
        .map_err(Error::Sqlx)?;
        Ok(())
    }

    /// Insert a transcription
    pub async fn insert_transcription(&self, transcription: &TranscriptionRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO Transcriptions (
                LanguageIx, IxElicitation, IxMorphologicalInstance,
                AlternativeLexemIx, AlternativePhoneticRealisationIx
            )
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(transcription.language_ix)
        .bind(transcription.ix_elicitation)
        .bind(transcription.ix_morphological_instance)
        .bind(transcription.alternative_lexem_ix)
        .bind(transcription.alternative_phonetic_realisation_ix)
        .execute(&self.pool)
        .await
        .map_err(Error::Sqlx)?;
        Ok(())
    }
}

#[async_trait]
impl SoundDataSource for Database {
    async fn languages(&self) -> Result<Vec<LanguageRow>> {
        sqlx::query_as::<_, LanguageRow>(
            r#"
            SELECT LanguageIx, study, FilePathPart, ShortName
            FROM Languages
            ORDER BY study, LanguageIx
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    async fn words(&self) -> Result<Vec<WordRow>> {
        sqlx::query_as::<_, WordRow>(
            r#"
            SELECT study, IxElicitation, IxMorphologicalInstance, SoundFileWordIdentifierText
            FROM Words
            ORDER BY study, IxElicitation, IxMorphologicalInstance
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    async fn transcriptions(&self) -> Result<Vec<TranscriptionRow>> {
        sqlx::query_as::<_, TranscriptionRow>(
            r#"
            SELECT LanguageIx, IxElicitation, IxMorphologicalInstance,
                   AlternativeLexemIx, AlternativePhoneticRealisationIx
            FROM Transcriptions
            ORDER BY LanguageIx, IxElicitation, IxMorphologicalInstance,
                     AlternativeLexemIx, AlternativePhoneticRealisationIx
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    fn name(&self) -> &str {
        "sqlite snapshot"
    }
}
