//! Derivation of valid sound file paths from relational rows
//!
//! Every (language, word) pair of a study has a base recording
//! `FilePathPart/FilePathPart + SoundFileWordIdentifierText`. Transcriptions
//! with alternate lexemes or pronunciations add suffixed recordings:
//!
//! | AlternativeLexemIx | AlternativePhoneticRealisationIx | suffix            |
//! |--------------------|----------------------------------|-------------------|
//! | 0                  | 0                                | (base form)       |
//! | L > 1              | 0                                | `_lex{L}`         |
//! | 0                  | P > 1                            | `_pron{P}`        |
//! | L > 1              | P > 1                            | `_lex{L}_pron{P}` |
//!
//! An index of exactly 1 is reserved for "no alternate" and should never
//! appear; such rows are logged and contribute nothing.

use crate::error::{Error, Result};
use crate::types::{LanguageRow, TranscriptionRow, WordRow};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

use super::ValidPathSet;

/// Counters describing one derivation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivationStats {
    /// Base stems emitted for (language, word) pairs
    pub base_stems: usize,
    /// Suffixed stems emitted for alternate transcriptions
    pub alternate_stems: usize,
    /// Transcriptions of the basic form (both indices 0)
    pub basis_rows: usize,
    /// Transcriptions with a reserved index of 1
    pub anomalies: usize,
    /// (LanguageIx, IxElicitation, IxMorphologicalInstance) with alternates but no basic form
    pub alternates_without_basis: BTreeSet<(i64, i64, i64)>,
}

/// Result of a derivation: the valid paths plus diagnostics
#[derive(Debug, Clone, Default)]
pub struct Derivation {
    /// All valid `folder/stem` paths
    pub paths: ValidPathSet,
    /// Diagnostics
    pub stats: DerivationStats,
}

/// What a transcription row contributes
#[derive(Debug, Clone, PartialEq, Eq)]
enum Alternate {
    Basis,
    Suffix(String),
    Anomaly,
}

fn classify(row: &TranscriptionRow) -> Result<Alternate> {
    let lex = row.alternative_lexem_ix;
    let pron = row.alternative_phonetic_realisation_ix;

    if lex < 0 || pron < 0 {
        return Err(Error::Data(format!(
            "negative alternate index (lex {}, pron {}) for LanguageIx {} IxElicitation {} IxMorphologicalInstance {}",
            lex, pron, row.language_ix, row.ix_elicitation, row.ix_morphological_instance
        )));
    }

    Ok(match (lex, pron) {
        (0, 0) => Alternate::Basis,
        (l, 0) if l > 1 => Alternate::Suffix(format!("_lex{}", l)),
        (0, p) if p > 1 => Alternate::Suffix(format!("_pron{}", p)),
        (l, p) if l > 1 && p > 1 => Alternate::Suffix(format!("_lex{}_pron{}", l, p)),
        _ => Alternate::Anomaly,
    })
}

fn base_path(language: &LanguageRow, word: &WordRow) -> String {
    format!(
        "{0}/{0}{1}",
        language.file_path_part, word.sound_file_word_identifier_text
    )
}

/// Derive the valid sound file paths
///
/// The result does not depend on the order of the input rows.
///
/// # Errors
///
/// Returns [`Error::Data`] for a transcription with a negative alternate index.
pub fn derive_valid_paths(
    languages: &[LanguageRow],
    words: &[WordRow],
    transcriptions: &[TranscriptionRow],
) -> Result<Derivation> {
    let mut words_by_study: HashMap<&str, Vec<&WordRow>> = HashMap::new();
    let mut words_by_key: HashMap<(i64, i64), Vec<&WordRow>> = HashMap::new();
    for word in words {
        words_by_study
            .entry(word.study.as_str())
            .or_default()
            .push(word);
        words_by_key.entry(word.key()).or_default().push(word);
    }

    let mut languages_by_ix: HashMap<i64, Vec<&LanguageRow>> = HashMap::new();
    for language in languages {
        languages_by_ix
            .entry(language.language_ix)
            .or_default()
            .push(language);
    }

    let mut paths = ValidPathSet::new();
    let mut stats = DerivationStats::default();

    for language in languages {
        let Some(study_words) = words_by_study.get(language.study.as_str()) else {
            continue;
        };
        for word in study_words {
            if paths.insert(base_path(language, word)) {
                stats.base_stems += 1;
            }
        }
    }

    let mut with_basis = BTreeSet::new();
    let mut with_alternates = BTreeSet::new();

    for row in transcriptions {
        let key = (
            row.language_ix,
            row.ix_elicitation,
            row.ix_morphological_instance,
        );

        let suffix = match classify(row)? {
            Alternate::Anomaly => {
                warn!(
                    language_ix = row.language_ix,
                    ix_elicitation = row.ix_elicitation,
                    ix_morphological_instance = row.ix_morphological_instance,
                    lex = row.alternative_lexem_ix,
                    pron = row.alternative_phonetic_realisation_ix,
                    "alternate index 1 is reserved, skipping transcription"
                );
                stats.anomalies += 1;
                continue;
            }
            Alternate::Basis => {
                stats.basis_rows += 1;
                with_basis.insert(key);
                continue;
            }
            Alternate::Suffix(suffix) => {
                with_alternates.insert(key);
                suffix
            }
        };

        let word_key = row.word_key();
        for language in languages_by_ix.get(&row.language_ix).into_iter().flatten() {
            for word in words_by_key.get(&word_key).into_iter().flatten() {
                if word.study != language.study {
                    continue;
                }
                if paths.insert(format!("{}{}", base_path(language, word), suffix)) {
                    stats.alternate_stems += 1;
                }
            }
        }
    }

    stats.alternates_without_basis = with_alternates.difference(&with_basis).copied().collect();
    for (language_ix, ix_elicitation, ix_morphological_instance) in &stats.alternates_without_basis {
        debug!(
            language_ix,
            ix_elicitation,
            ix_morphological_instance,
            "alternate transcriptions without a basic form"
        );
    }

    info!(
        valid_paths = paths.len(),
        base_stems = stats.base_stems,
        alternate_stems = stats.alternate_stems,
        anomalies = stats.anomalies,
        "derived valid sound file paths"
    );

    Ok(Derivation { paths, stats })
}
