//! Sound file naming grammar
//!
//! Every recording in the archive is stored under a name of the form
//!
//! ```text
//! {variety}_{word_id}_{word}[_lex{N}][_pron{N}][.{extension}]
//! ```
//!
//! where `variety` is the language path prefix (`FilePathPart`), `word_id` has at
//! least three digits and `word` is the gloss. The variety is matched
//! non-greedily, so it ends at the *first* run of three or more digits bounded
//! by underscores.

use crate::error::InvalidNameError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

const NAME_PATTERN: &str =
    r"(?P<variety>.+?)_(?P<word_id>\d{3,})_(?P<word>[^.]+)\.?(?P<extension>.+)?";

#[allow(clippy::expect_used)]
fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // NAME_PATTERN is a constant, compilation cannot fail at runtime
    RE.get_or_init(|| Regex::new(NAME_PATTERN).expect("NAME_PATTERN compiles"))
}

/// A validated sound file identifier
///
/// Equality, hashing and ordering use the canonical stem
/// (`variety_word_id_word`), so two names that differ only in their extension
/// compare equal.
///
/// # Examples
///
/// ```
/// use soundcomparisons::SoundfileName;
///
/// let name: SoundfileName = "Eng_101_house.mp3".parse().unwrap();
/// assert_eq!(name.variety(), "Eng");
/// assert_eq!(name.word_id(), "101");
/// assert_eq!(name.word(), "house");
/// assert_eq!(name.extension(), Some("mp3"));
/// assert_eq!(name.to_string(), "Eng_101_house");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SoundfileName {
    stem: String,
    variety: String,
    word_id: String,
    word: String,
    extension: String,
}

impl SoundfileName {
    /// Parse `input` against the naming grammar
    pub fn parse(input: &str) -> Result<Self, InvalidNameError> {
        let caps = name_regex()
            .captures(input)
            .ok_or_else(|| InvalidNameError {
                input: input.to_string(),
            })?;

        let group = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        };

        let variety = group("variety");
        let word_id = group("word_id");
        let word = group("word");
        let extension = group("extension");
        let stem = format!("{}_{}_{}", variety, word_id, word);

        Ok(Self {
            stem,
            variety,
            word_id,
            word,
            extension,
        })
    }

    /// Canonical stem, `variety_word_id_word`
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Language path prefix
    pub fn variety(&self) -> &str {
        &self.variety
    }

    /// Numeric word identifier (at least three digits)
    pub fn word_id(&self) -> &str {
        &self.word_id
    }

    /// Gloss, including any `_lexN` / `_pronN` suffix
    pub fn word(&self) -> &str {
        &self.word
    }

    /// File extension, `None` when the name denotes a stem
    pub fn extension(&self) -> Option<&str> {
        if self.extension.is_empty() {
            None
        } else {
            Some(&self.extension)
        }
    }

    /// `word_id_word`, the title under which the recording is tagged
    pub fn word_key(&self) -> String {
        format!("{}_{}", self.word_id, self.word)
    }

    /// File name: the stem plus the extension, if any
    pub fn file_name(&self) -> String {
        match self.extension() {
            Some(ext) => format!("{}.{}", self.stem, ext),
            None => self.stem.clone(),
        }
    }

    /// Same name with a different extension
    pub fn with_extension(&self, extension: &str) -> Self {
        Self {
            extension: extension.to_string(),
            ..self.clone()
        }
    }

    /// Alternate lexeme and pronunciation indices encoded in the word suffix
    ///
    /// `house_lex2_pron3` yields `(Some(2), Some(3))`, `house` yields `(None, None)`.
    pub fn alternates(&self) -> (Option<u32>, Option<u32>) {
        let mut lex = None;
        let mut pron = None;
        for part in self.word.rsplit('_') {
            if let Some(n) = part.strip_prefix("pron").and_then(|n| n.parse().ok()) {
                if pron.is_none() && lex.is_none() {
                    pron = Some(n);
                    continue;
                }
            }
            if let Some(n) = part.strip_prefix("lex").and_then(|n| n.parse().ok()) {
                if lex.is_none() {
                    lex = Some(n);
                    continue;
                }
            }
            break;
        }
        (lex, pron)
    }
}

impl fmt::Display for SoundfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stem)
    }
}

impl FromStr for SoundfileName {
    type Err = InvalidNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for SoundfileName {
    type Error = InvalidNameError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SoundfileName {
    type Error = InvalidNameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<SoundfileName> for String {
    fn from(name: SoundfileName) -> Self {
        name.file_name()
    }
}

impl AsRef<str> for SoundfileName {
    fn as_ref(&self) -> &str {
        &self.stem
    }
}

// Hash and Eq use the stem alone, so lookups by `&str` are consistent
impl Borrow<str> for SoundfileName {
    fn borrow(&self) -> &str {
        &self.stem
    }
}

impl PartialEq for SoundfileName {
    fn eq(&self, other: &Self) -> bool {
        self.stem == other.stem
    }
}

impl Eq for SoundfileName {}

impl Hash for SoundfileName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.stem.hash(state);
    }
}

impl PartialOrd for SoundfileName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SoundfileName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.stem.cmp(&other.stem)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_parse_stem() {
        let sfn = SoundfileName::parse("abc_123_def").unwrap();
        assert_eq!(sfn.variety(), "abc");
        assert_eq!(sfn.word_id(), "123");
        assert_eq!(sfn.word(), "def");
        assert_eq!(sfn.extension(), None);
        assert_eq!(sfn.stem(), "abc_123_def");
    }

    #[test]
    fn test_parse_rejects_missing_word_id() {
        assert!(SoundfileName::parse("abc").is_err());
        assert!(SoundfileName::parse("abc_12_def").is_err());
        assert!(SoundfileName::parse("abc_123").is_err());
        assert!(SoundfileName::parse("_123_def").is_err());
        assert!(SoundfileName::parse("").is_err());

        let err = "abc".parse::<SoundfileName>().unwrap_err();
        assert_eq!(err.input, "abc");
    }

    #[test]
    fn test_parse_with_extension() {
        let sfn = SoundfileName::parse("Eng_101_house.mp3").unwrap();
        assert_eq!(sfn.extension(), Some("mp3"));
        assert_eq!(sfn.to_string(), "Eng_101_house");
        assert_eq!(sfn.file_name(), "Eng_101_house.mp3");
    }

    #[test]
    fn test_variety_ends_at_first_word_id() {
        let sfn =
            SoundfileName::parse("Clt_Bryth_Wel_Dyfed_Pem_Maenclochog_Dl_909_praised_maalato")
                .unwrap();
        assert_eq!(sfn.variety(), "Clt_Bryth_Wel_Dyfed_Pem_Maenclochog_Dl");
        assert_eq!(sfn.word_id(), "909");
        assert_eq!(sfn.word(), "praised_maalato");

        // Digit runs that are too short stay part of the variety
        let sfn = SoundfileName::parse("Ger_12_Low_0626_leaf").unwrap();
        assert_eq!(sfn.variety(), "Ger_12_Low");
        assert_eq!(sfn.word_id(), "0626");
    }

    #[test]
    fn test_round_trip_law() {
        let stems = [
            "Eng_101_house",
            "Oce_Van_Mal_Nth_WNth_MaluaBay_Marasup_Dl_626_leaf_lif",
            "Eng_200_water_lex2",
            "Eng_200_water_pron4",
            "Eng_200_water_lex2_pron5",
            "Rom_Ita_Sic_1234_night",
        ];
        for stem in stems {
            assert_eq!(SoundfileName::parse(stem).unwrap().to_string(), stem);
            for ext in ["mp3", "ogg", "wav"] {
                let file = format!("{}.{}", stem, ext);
                assert_eq!(SoundfileName::parse(&file).unwrap().to_string(), stem);
            }
        }
    }

    #[test]
    fn test_equality_ignores_extension() {
        let a = SoundfileName::parse("Eng_101_house.mp3").unwrap();
        let b = SoundfileName::parse("Eng_101_house.ogg").unwrap();
        let c = SoundfileName::parse("Eng_101_house").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);

        let set: BTreeSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_ordering_is_case_sensitive_lexicographic() {
        let mut names: Vec<SoundfileName> = ["eng_101_a", "Eng_101_b", "Eng_100_z"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        names.sort();
        let rendered: Vec<String> = names.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["Eng_100_z", "Eng_101_b", "eng_101_a"]);
    }

    #[test]
    fn test_alternates() {
        let parse = |s: &str| SoundfileName::parse(s).unwrap().alternates();
        assert_eq!(parse("Eng_101_house"), (None, None));
        assert_eq!(parse("Eng_101_house_lex3"), (Some(3), None));
        assert_eq!(parse("Eng_101_house_pron4"), (None, Some(4)));
        assert_eq!(parse("Eng_101_house_lex2_pron5"), (Some(2), Some(5)));
        assert_eq!(parse("Eng_101_lexicon"), (None, None));
    }

    #[test]
    fn test_word_key_and_with_extension() {
        let sfn = SoundfileName::parse("Eng_101_house").unwrap();
        assert_eq!(sfn.word_key(), "101_house");
        let mp3 = sfn.with_extension("mp3");
        assert_eq!(mp3.file_name(), "Eng_101_house.mp3");
        assert_eq!(mp3, sfn);
    }

    #[test]
    fn test_serde_as_string() {
        let sfn = SoundfileName::parse("Eng_101_house.ogg").unwrap();
        let json = serde_json::to_string(&sfn).unwrap();
        assert_eq!(json, "\"Eng_101_house.ogg\"");

        let back: SoundfileName = serde_json::from_str(&json).unwrap();
        assert_eq!(back.extension(), Some("ogg"));

        assert!(serde_json::from_str::<SoundfileName>("\"abc\"").is_err());
    }
}
