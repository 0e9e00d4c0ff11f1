//! Relational rows, catalog snapshots and server listings for tests
//!
//! One study ("Germanic") with one language (`Eng`) and two words. The
//! derived valid paths are:
//!
//! ```text
//! Eng/Eng_101_house
//! Eng/Eng_101_house_lex2
//! Eng/Eng_102_tree
//! ```

use soundcomparisons::types::{LanguageRow, TranscriptionRow, WordRow};
use soundcomparisons::{Database, SoundRows};

/// Study of all fixture rows
pub const STUDY: &str = "Germanic";

/// Valid path listing derived from [`sound_rows`]
pub const VALID_LISTING: &str = "Eng/Eng_101_house\nEng/Eng_101_house_lex2\nEng/Eng_102_tree";

/// Catalog snapshot in the `uid -> object` layout written by cdstarcat
///
/// - `O1` is on the server with a different checksum
/// - `O2` is valid but missing from the server
/// - `O3` and `O4` share a name and a checksum, neither valid nor on the server
pub const CATALOG_JSON: &str = r#"{
    "O1": {
        "metadata": {"name": "Eng_101_house", "collection": "soundcomparisons"},
        "bitstreams": [
            {"bitstreamid": "Eng_101_house.mp3", "content-type": "audio/mpeg", "checksum": "aaa"}
        ]
    },
    "O2": {
        "metadata": {"name": "Eng_102_tree"},
        "bitstreams": [
            {"bitstreamid": "Eng_102_tree.mp3", "content-type": "audio/mpeg", "checksum": "bbb"}
        ]
    },
    "O3": {
        "metadata": {"name": "Eng_999_ghost"},
        "bitstreams": [
            {"bitstreamid": "Eng_999_ghost.mp3", "content-type": "audio/mpeg", "checksum": "ccc"}
        ]
    },
    "O4": {
        "metadata": {"name": "Eng_999_ghost"},
        "bitstreams": [
            {"bitstreamid": "Eng_999_ghost.mp3", "content-type": "audio/mpeg", "checksum": "ccc"}
        ]
    }
}"#;

/// `md5sum` output of the live sound directory
///
/// - `Eng_101_house.mp3` differs from the catalog
/// - `Eng_101_house_lex2.ogg` is valid and not catalogued
/// - `Eng_555_stray.mp3` is neither valid nor catalogued
pub const SERVER_LISTING: &str = "\
fff  /srv/soundcomparisons/sound/Eng/Eng_101_house.mp3
ddd  /srv/soundcomparisons/sound/Eng/Eng_101_house_lex2.ogg
eee  /srv/soundcomparisons/sound/Eng/Eng_555_stray.mp3
";

/// Language, word and transcription rows of the fixture study
pub fn sound_rows() -> SoundRows {
    SoundRows {
        languages: vec![LanguageRow {
            language_ix: 1,
            study: STUDY.to_string(),
            file_path_part: "Eng".to_string(),
            short_name: Some("English".to_string()),
        }],
        words: vec![word(101, "_101_house"), word(102, "_102_tree")],
        transcriptions: vec![
            transcription(101, 0, 0),
            transcription(101, 2, 0),
            // reserved index, skipped with a warning
            transcription(102, 1, 0),
        ],
    }
}

fn word(ix_elicitation: i64, identifier: &str) -> WordRow {
    WordRow {
        study: STUDY.to_string(),
        ix_elicitation,
        ix_morphological_instance: 0,
        sound_file_word_identifier_text: identifier.to_string(),
    }
}

fn transcription(ix_elicitation: i64, lex: i64, pron: i64) -> TranscriptionRow {
    TranscriptionRow {
        language_ix: 1,
        ix_elicitation,
        ix_morphological_instance: 0,
        alternative_lexem_ix: lex,
        alternative_phonetic_realisation_ix: pron,
    }
}

/// Store [`sound_rows`] in `db`
pub async fn populate_sound_tables(db: &Database) {
    let rows = sound_rows();
    db.insert_study(STUDY).await.unwrap();
    for language in &rows.languages {
        db.insert_language(language).await.unwrap();
    }
    for word in &rows.words {
        db.insert_word(word).await.unwrap();
    }
    for transcription in &rows.transcriptions {
        db.insert_transcription(transcription).await.unwrap();
    }
}
