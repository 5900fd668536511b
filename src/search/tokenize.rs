//! Language-aware tokenization and stemming.
//!
//! The tokenizer is resolved once from the configured languages and frozen into the
//! index. The same [`TokenizerSpec`] is shipped to the client so queries are split
//! and stemmed exactly like indexed text.

use crate::error::ConfigError;
use ahash::AHashSet;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use unicode_segmentation::UnicodeSegmentation;

/// Default splitting pattern: runs of whitespace and hyphens.
pub const DEFAULT_SEPARATOR: &str = r"[\s\-]+";

/// Common English stop words filtered out when English is configured.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "he",
    "if", "in", "into", "is", "it", "its", "no", "not", "of", "on", "or", "she", "such", "that",
    "the", "their", "then", "there", "these", "they", "this", "to", "was", "we", "will", "with",
];

const GERMAN_STOP_WORDS: &[&str] = &[
    "aber", "als", "am", "an", "auch", "auf", "aus", "bei", "bis", "das", "dass", "dem", "den",
    "der", "des", "die", "ein", "eine", "einem", "einen", "einer", "es", "für", "im", "in", "ist",
    "mit", "nach", "nicht", "oder", "sich", "sie", "sind", "über", "um", "und", "von", "vor",
    "wie", "wird", "zu", "zum", "zur",
];

const FRENCH_STOP_WORDS: &[&str] = &[
    "au", "aux", "avec", "ce", "ces", "dans", "de", "des", "du", "elle", "en", "est", "et", "il",
    "ils", "la", "le", "les", "leur", "mais", "ne", "nous", "ou", "par", "pas", "pour", "qui",
    "que", "sa", "se", "ses", "son", "sont", "sur", "un", "une", "vous",
];

const SPANISH_STOP_WORDS: &[&str] = &[
    "al", "como", "con", "de", "del", "el", "en", "es", "esta", "este", "la", "las", "lo", "los",
    "más", "no", "o", "para", "pero", "por", "que", "se", "sin", "su", "sus", "un", "una", "y",
];

const ITALIAN_STOP_WORDS: &[&str] = &[
    "a", "al", "alla", "che", "con", "da", "dei", "del", "della", "di", "e", "è", "gli", "i",
    "il", "in", "la", "le", "lo", "ma", "non", "per", "si", "su", "un", "una", "uno",
];

const PORTUGUESE_STOP_WORDS: &[&str] = &[
    "a", "ao", "as", "com", "da", "das", "de", "do", "dos", "e", "em", "é", "na", "nas", "no",
    "nos", "o", "os", "para", "por", "que", "se", "um", "uma",
];

const DUTCH_STOP_WORDS: &[&str] = &[
    "aan", "als", "bij", "dat", "de", "die", "een", "en", "het", "in", "is", "met", "niet", "of",
    "om", "op", "te", "van", "voor", "zijn",
];

const JAPANESE_STOP_WORDS: &[&str] = &[
    "の", "に", "は", "を", "た", "が", "で", "て", "と", "し", "れ", "さ", "ある", "いる", "も",
    "する", "から", "な", "こと", "として",
];

/// How a language splits running text into words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segmentation {
    /// Words are delimited by whitespace; a custom separator may override the split.
    Whitespace,
    /// Logographic or complex scripts; split on Unicode word boundaries (UAX #29).
    Script,
}

/// A supported index language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Arabic,
    Chinese,
    Danish,
    Dutch,
    English,
    Finnish,
    French,
    German,
    Greek,
    Hindi,
    Hungarian,
    Italian,
    Japanese,
    Norwegian,
    Portuguese,
    Romanian,
    Russian,
    Spanish,
    Swedish,
    Tamil,
    Thai,
    Turkish,
    Vietnamese,
}

impl Language {
    /// Every supported language, in code order.
    pub const ALL: &'static [Self] = &[
        Self::Arabic,
        Self::Danish,
        Self::German,
        Self::Greek,
        Self::English,
        Self::Spanish,
        Self::Finnish,
        Self::French,
        Self::Hindi,
        Self::Hungarian,
        Self::Italian,
        Self::Japanese,
        Self::Dutch,
        Self::Norwegian,
        Self::Portuguese,
        Self::Romanian,
        Self::Russian,
        Self::Swedish,
        Self::Tamil,
        Self::Thai,
        Self::Turkish,
        Self::Vietnamese,
        Self::Chinese,
    ];

    /// ISO 639-1 code used in configuration and artifacts.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Arabic => "ar",
            Self::Chinese => "zh",
            Self::Danish => "da",
            Self::Dutch => "nl",
            Self::English => "en",
            Self::Finnish => "fi",
            Self::French => "fr",
            Self::German => "de",
            Self::Greek => "el",
            Self::Hindi => "hi",
            Self::Hungarian => "hu",
            Self::Italian => "it",
            Self::Japanese => "ja",
            Self::Norwegian => "no",
            Self::Portuguese => "pt",
            Self::Romanian => "ro",
            Self::Russian => "ru",
            Self::Spanish => "es",
            Self::Swedish => "sv",
            Self::Tamil => "ta",
            Self::Thai => "th",
            Self::Turkish => "tr",
            Self::Vietnamese => "vi",
        }
    }

    /// Snowball algorithm for this language, if one exists.
    pub const fn stemmer(self) -> Option<Algorithm> {
        match self {
            Self::Arabic => Some(Algorithm::Arabic),
            Self::Danish => Some(Algorithm::Danish),
            Self::Dutch => Some(Algorithm::Dutch),
            Self::English => Some(Algorithm::English),
            Self::Finnish => Some(Algorithm::Finnish),
            Self::French => Some(Algorithm::French),
            Self::German => Some(Algorithm::German),
            Self::Greek => Some(Algorithm::Greek),
            Self::Hungarian => Some(Algorithm::Hungarian),
            Self::Italian => Some(Algorithm::Italian),
            Self::Norwegian => Some(Algorithm::Norwegian),
            Self::Portuguese => Some(Algorithm::Portuguese),
            Self::Romanian => Some(Algorithm::Romanian),
            Self::Russian => Some(Algorithm::Russian),
            Self::Spanish => Some(Algorithm::Spanish),
            Self::Swedish => Some(Algorithm::Swedish),
            Self::Tamil => Some(Algorithm::Tamil),
            Self::Turkish => Some(Algorithm::Turkish),
            Self::Chinese | Self::Hindi | Self::Japanese | Self::Thai | Self::Vietnamese => None,
        }
    }

    /// Words dropped by the stop-word filter; empty when no list ships for the language.
    pub const fn stop_words(self) -> &'static [&'static str] {
        match self {
            Self::English => STOP_WORDS,
            Self::German => GERMAN_STOP_WORDS,
            Self::French => FRENCH_STOP_WORDS,
            Self::Spanish => SPANISH_STOP_WORDS,
            Self::Italian => ITALIAN_STOP_WORDS,
            Self::Portuguese => PORTUGUESE_STOP_WORDS,
            Self::Dutch => DUTCH_STOP_WORDS,
            Self::Japanese => JAPANESE_STOP_WORDS,
            _ => &[],
        }
    }

    pub const fn segmentation(self) -> Segmentation {
        match self {
            Self::Chinese | Self::Japanese | Self::Thai => Segmentation::Script,
            _ => Segmentation::Whitespace,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();

        // Aliases that older configurations used; fail loudly instead of guessing.
        let replacement = match code.as_str() {
            "jp" => Some("ja"),
            "du" => Some("nl"),
            _ => None,
        };
        if let Some(replacement) = replacement {
            return Err(ConfigError::DeprecatedLanguage { code, replacement });
        }

        Self::ALL
            .iter()
            .copied()
            .find(|language| language.code() == code)
            .ok_or(ConfigError::UnsupportedLanguage(code))
    }
}

impl Serialize for Language {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Which tokenizer variant a configuration resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TokenizerKind {
    /// English only; no extra registration.
    Default,
    /// A single non-English language.
    Language { language: Language },
    /// Several languages composed into one pipeline.
    MultiLanguage { languages: Vec<Language> },
}

/// Serializable description of a tokenizer, recorded in the index and the client config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizerSpec {
    pub kind: TokenizerKind,
    pub languages: Vec<Language>,
    /// Custom split pattern; `None` means [`DEFAULT_SEPARATOR`].
    pub separator: Option<String>,
    pub stop_words: bool,
    pub stemming: bool,
    /// Language registrations applied before any document is added.
    pub registrations: Vec<String>,
}

impl TokenizerSpec {
    /// Validates a language selection and separator override.
    pub fn new(
        languages: &[Language],
        separator: Option<&str>,
        stop_words: bool,
        stemming: bool,
    ) -> Result<Self, ConfigError> {
        let mut unique: Vec<Language> = Vec::with_capacity(languages.len());
        for language in languages {
            if !unique.contains(language) {
                unique.push(*language);
            }
        }

        let kind = match unique.as_slice() {
            [] => return Err(ConfigError::NoLanguage),
            [Language::English] => TokenizerKind::Default,
            [language] => TokenizerKind::Language {
                language: *language,
            },
            many => TokenizerKind::MultiLanguage {
                languages: many.to_vec(),
            },
        };

        if let Some(separator) = separator {
            if let Some(language) = unique
                .iter()
                .find(|language| language.segmentation() == Segmentation::Script)
            {
                return Err(ConfigError::SeparatorNotSupported(language.code()));
            }
            Regex::new(separator).map_err(|e| ConfigError::InvalidSeparator(e.to_string()))?;
        }

        let mut registrations: Vec<String> = unique
            .iter()
            .filter(|language| **language != Language::English)
            .map(|language| format!("language:{}", language.code()))
            .collect();
        if let TokenizerKind::MultiLanguage { languages } = &kind {
            let codes: Vec<&str> = languages.iter().map(|language| language.code()).collect();
            registrations.push(format!("multi:{}", codes.join("+")));
        }

        Ok(Self {
            kind,
            languages: unique,
            separator: separator.map(str::to_string),
            stop_words,
            stemming,
            registrations,
        })
    }

    /// English-only spec with the default pipeline.
    pub fn english() -> Self {
        Self {
            kind: TokenizerKind::Default,
            languages: vec![Language::English],
            separator: None,
            stop_words: true,
            stemming: true,
            registrations: vec![],
        }
    }
}

/// How raw text is cut into candidate tokens.
#[derive(Debug)]
enum Segmenter {
    Separator(Regex),
    UnicodeWords,
}

/// Token filters shared by every tokenizer variant.
pub struct Pipeline {
    segmenter: Segmenter,
    stop_words: AHashSet<&'static str>,
    stemmers: Vec<(Language, Stemmer)>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stemmers: Vec<&str> = self.stemmers.iter().map(|(l, _)| l.code()).collect();
        f.debug_struct("Pipeline")
            .field("segmenter", &self.segmenter)
            .field("stop_words", &self.stop_words.len())
            .field("stemmers", &stemmers)
            .finish()
    }
}

impl Pipeline {
    fn from_spec(spec: &TokenizerSpec) -> Result<Self, ConfigError> {
        let segmenter = if spec
            .languages
            .iter()
            .any(|language| language.segmentation() == Segmentation::Script)
        {
            Segmenter::UnicodeWords
        } else {
            let pattern = spec.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR);
            let regex =
                Regex::new(pattern).map_err(|e| ConfigError::InvalidSeparator(e.to_string()))?;
            Segmenter::Separator(regex)
        };

        let stemmers = if spec.stemming {
            spec.languages
                .iter()
                .filter_map(|language| {
                    language
                        .stemmer()
                        .map(|algorithm| (*language, Stemmer::create(algorithm)))
                })
                .collect()
        } else {
            vec![]
        };

        Ok(Self {
            segmenter,
            stop_words: if spec.stop_words {
                spec.languages
                    .iter()
                    .flat_map(|language| language.stop_words().iter().copied())
                    .collect()
            } else {
                AHashSet::new()
            },
            stemmers,
        })
    }

    fn run(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        match &self.segmenter {
            Segmenter::Separator(regex) => regex
                .split(&lowered)
                .filter_map(|raw| self.filter(raw))
                .collect(),
            Segmenter::UnicodeWords => lowered
                .unicode_words()
                .filter_map(|raw| self.filter(raw))
                .collect(),
        }
    }

    /// Trims, drops stop words, then stems through every configured language in order.
    fn filter(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim_matches(|c: char| !c.is_alphanumeric());
        if trimmed.is_empty() {
            return None;
        }
        if self.stop_words.contains(trimmed) {
            return None;
        }

        let mut term = trimmed.to_string();
        for (_, stemmer) in &self.stemmers {
            term = stemmer.stem(&term).into_owned();
        }
        (!term.is_empty()).then_some(term)
    }
}

/// A resolved tokenizer, one variant per [`TokenizerKind`].
#[derive(Debug)]
pub enum Tokenizer {
    Default(Pipeline),
    Language(Language, Pipeline),
    Multi(Vec<Language>, Pipeline),
}

impl Tokenizer {
    /// Compiles a validated spec. Specs read back from disk are re-validated here.
    pub fn from_spec(spec: &TokenizerSpec) -> Result<Self, ConfigError> {
        let checked = TokenizerSpec::new(
            &spec.languages,
            spec.separator.as_deref(),
            spec.stop_words,
            spec.stemming,
        )?;
        let pipeline = Pipeline::from_spec(&checked)?;

        Ok(match checked.kind {
            TokenizerKind::Default => Self::Default(pipeline),
            TokenizerKind::Language { language } => Self::Language(language, pipeline),
            TokenizerKind::MultiLanguage { languages } => Self::Multi(languages, pipeline),
        })
    }

    /// Splits text into index terms.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        match self {
            Self::Default(pipeline)
            | Self::Language(_, pipeline)
            | Self::Multi(_, pipeline) => pipeline.run(text),
        }
    }

    pub fn languages(&self) -> Vec<Language> {
        match self {
            Self::Default(_) => vec![Language::English],
            Self::Language(language, _) => vec![*language],
            Self::Multi(languages, _) => languages.clone(),
        }
    }
}
