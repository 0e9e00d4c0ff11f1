//! Relational row types shared by the database layer and the valid-path deriver

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A language (variety) of a study
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LanguageRow {
    /// Language index, unique across studies
    #[sqlx(rename = "LanguageIx")]
    pub language_ix: i64,
    /// Study this language belongs to
    pub study: String,
    /// Path prefix of all sound files of this language
    #[sqlx(rename = "FilePathPart")]
    pub file_path_part: String,
    /// Display name of the language
    #[sqlx(rename = "ShortName")]
    #[serde(default)]
    pub short_name: Option<String>,
}

/// An elicited word of a study
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct WordRow {
    /// Study this word belongs to
    pub study: String,
    /// Elicitation index
    #[sqlx(rename = "IxElicitation")]
    pub ix_elicitation: i64,
    /// Morphological instance index
    #[sqlx(rename = "IxMorphologicalInstance")]
    pub ix_morphological_instance: i64,
    /// `_{word_id}_{gloss}` part of the sound file name
    #[sqlx(rename = "SoundFileWordIdentifierText")]
    pub sound_file_word_identifier_text: String,
}

impl WordRow {
    /// Key joining words with transcriptions
    pub fn key(&self) -> (i64, i64) {
        (self.ix_elicitation, self.ix_morphological_instance)
    }
}

/// A transcription of a word in a language
///
/// `alternative_lexem_ix` and `alternative_phonetic_realisation_ix` are 0 for
/// the basic form; values above 1 number alternate lexemes and pronunciations.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TranscriptionRow {
    /// Language index
    #[sqlx(rename = "LanguageIx")]
    pub language_ix: i64,
    /// Elicitation index
    #[sqlx(rename = "IxElicitation")]
    pub ix_elicitation: i64,
    /// Morphological instance index
    #[sqlx(rename = "IxMorphologicalInstance")]
    pub ix_morphological_instance: i64,
    /// Alternate lexeme number (0 = basic form)
    #[sqlx(rename = "AlternativeLexemIx")]
    pub alternative_lexem_ix: i64,
    /// Alternate pronunciation number (0 = basic form)
    #[sqlx(rename = "AlternativePhoneticRealisationIx")]
    pub alternative_phonetic_realisation_ix: i64,
}

impl TranscriptionRow {
    /// Key joining transcriptions with words
    pub fn word_key(&self) -> (i64, i64) {
        (self.ix_elicitation, self.ix_morphological_instance)
    }
}

/// A UI translation (one per target language)
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TranslationRow {
    /// Translation id
    #[sqlx(rename = "TranslationId")]
    pub translation_id: i64,
    /// Human-readable name, e.g. "English"
    #[sqlx(rename = "TranslationName")]
    pub translation_name: String,
    /// Browser language tag the translation applies to, e.g. "en"
    #[sqlx(rename = "BrowserMatch")]
    pub browser_match: String,
    /// Whether the translation is offered on the site
    #[sqlx(rename = "Active")]
    pub active: bool,
}

/// Static translation entry: `Req` key to text
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StaticTranslationRow {
    /// Lookup key
    #[sqlx(rename = "Req")]
    pub req: String,
    /// Translated text
    #[sqlx(rename = "Trans")]
    pub trans: String,
    /// Whether the text contains markup
    #[sqlx(rename = "IsHtml")]
    pub is_html: bool,
}

/// Dynamic translation entry: `Category` + `Field` key to text
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DynamicTranslationRow {
    /// Category of the translated object
    #[sqlx(rename = "Category")]
    pub category: String,
    /// Field within the category
    #[sqlx(rename = "Field")]
    pub field: String,
    /// Translated text
    #[sqlx(rename = "Trans")]
    pub trans: String,
}

impl DynamicTranslationRow {
    /// Bundle key, the concatenation of category and field
    pub fn key(&self) -> String {
        format!("{}{}", self.category, self.field)
    }
}
