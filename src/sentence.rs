//! Sentence-boundary detection for the chunked translator.
//!
//! The chunker only ever cuts text between sentences, so the quality of the
//! boundary detector decides how natural each translation request reads.
//! Detection is a capability behind the [`SentenceSplitter`] trait: the
//! workflow builds one splitter up front (see [`RuleBasedSplitter::for_language`])
//! and passes it down as `&dyn SentenceSplitter`, so tests and library users
//! can swap in their own.
//!
//! ## Rules
//!
//! [`RuleBasedSplitter`] takes its boundary candidates from the `sakurs-core`
//! [`SentenceProcessor`], which handles terminators, decimals, quotations and
//! English abbreviations. Closing quotes or brackets right after a boundary
//! stay with the sentence they close. A candidate is then dropped when the
//! sentence it would close ends in `.` after a word from the selected
//! language's abbreviation table (`z.B.`, `Mio.`, `bzw.`, `cf.`, `blz.`).

use serde::{Deserialize, Serialize};
use sakurs_core::{Config, Input, SentenceProcessor};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Splits a paragraph into an ordered sequence of sentences.
///
/// Implementations must return every non-whitespace character of the input
/// exactly once, in order. Returned sentences are trimmed.
pub trait SentenceSplitter: Send + Sync {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Which abbreviation table a [`RuleBasedSplitter`] is initialised with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SentenceLanguage {
    English,
    German,
    French,
    Dutch,
    /// Union of every table; the default for mixed-language archives.
    #[default]
    Auto,
}

impl FromStr for SentenceLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "de" | "german" => Ok(Self::German),
            "fr" | "french" => Ok(Self::French),
            "nl" | "dutch" => Ok(Self::Dutch),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unsupported sentence language '{other}'")),
        }
    }
}

const ENGLISH_ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "st", "jr", "sr", "inc", "ltd", "co", "corp", "etc", "e.g",
    "i.e", "vs", "no", "nos", "fig", "vol", "p", "pp", "approx", "jan", "feb", "mar", "apr", "jun",
    "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

const GERMAN_ABBREVIATIONS: &[&str] = &[
    "bzw", "z.b", "d.h", "u.a", "usw", "vgl", "nr", "ca", "mio", "mrd", "abs", "art", "bd", "inkl",
    "ggf", "evtl", "jh", "sog", "u.ä", "o.ä", "dr", "prof", "str", "tsd", "einschl", "rd", "lt",
    "gem", "bzgl", "z.t",
];

const FRENCH_ABBREVIATIONS: &[&str] = &[
    "m", "mm", "mme", "mlle", "cf", "p.ex", "av", "bd", "fr", "chap", "éd", "vol", "env", "art",
    "etc", "no", "mio", "mrd", "c.-à-d", "resp",
];

const DUTCH_ABBREVIATIONS: &[&str] = &[
    "bv", "nl", "enz", "blz", "dhr", "mevr", "o.a", "d.w.z", "nr", "jl", "mln", "mld", "art", "z.g",
];

/// Abbreviation-aware splitter for European-language prose.
pub struct RuleBasedSplitter {
    processor: SentenceProcessor,
    abbreviations: HashSet<String>,
}

impl fmt::Debug for RuleBasedSplitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleBasedSplitter")
            .field("abbreviations", &self.abbreviations.len())
            .finish_non_exhaustive()
    }
}

impl RuleBasedSplitter {
    /// Initialise a splitter with the abbreviation table of `language`.
    pub fn for_language(language: SentenceLanguage) -> Self {
        let tables: &[&[&str]] = match language {
            SentenceLanguage::English => &[ENGLISH_ABBREVIATIONS],
            SentenceLanguage::German => &[GERMAN_ABBREVIATIONS],
            SentenceLanguage::French => &[FRENCH_ABBREVIATIONS],
            SentenceLanguage::Dutch => &[DUTCH_ABBREVIATIONS],
            SentenceLanguage::Auto => &[
                ENGLISH_ABBREVIATIONS,
                GERMAN_ABBREVIATIONS,
                FRENCH_ABBREVIATIONS,
                DUTCH_ABBREVIATIONS,
            ],
        };
        let abbreviations = tables
            .iter()
            .flat_map(|t| t.iter())
            .map(|a| a.to_string())
            .collect();
        Self {
            processor: boundary_processor(),
            abbreviations,
        }
    }

    /// Add extra abbreviations (without the trailing period, any case).
    pub fn with_abbreviations<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.abbreviations
            .extend(extra.into_iter().map(|s| s.as_ref().to_lowercase()));
        self
    }

    /// Whether `candidate` ends in a period that belongs to an abbreviation.
    fn ends_with_abbreviation(&self, candidate: &str) -> bool {
        let body = candidate.trim_end().trim_end_matches(is_closer);
        let Some(word) = body.strip_suffix('.') else {
            return false;
        };
        if word.ends_with(['.', '!', '?']) {
            return false;
        }
        let word = word
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or("")
            .trim_start_matches(|c: char| !c.is_alphanumeric());
        !word.is_empty() && self.abbreviations.contains(&word.to_lowercase())
    }

    /// Cut `text` at the given byte offsets, dropping offsets that do not
    /// fall on a char boundary and those that would split after an
    /// abbreviation. Every non-whitespace byte of `text` ends up in exactly
    /// one returned sentence.
    pub fn sentences_at<'a>(&self, text: &'a str, offsets: &[usize]) -> Vec<&'a str> {
        let mut offsets = offsets.to_vec();
        offsets.sort_unstable();
        offsets.dedup();

        let mut sentences = Vec::new();
        let mut start = 0;
        for offset in offsets {
            if offset <= start || offset > text.len() || !text.is_char_boundary(offset) {
                continue;
            }
            let end = offset
                + text[offset..]
                    .chars()
                    .take_while(|&c| is_closer(c))
                    .map(char::len_utf8)
                    .sum::<usize>();
            let candidate = &text[start..end];
            if self.ends_with_abbreviation(candidate) {
                continue;
            }
            let sentence = candidate.trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }

        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail);
        }
        sentences
    }
}

impl Default for RuleBasedSplitter {
    fn default() -> Self {
        Self::for_language(SentenceLanguage::default())
    }
}

/// Single-threaded processor: paragraphs are short and the workflow is
/// sequential anyway.
fn boundary_processor() -> SentenceProcessor {
    Config::builder()
        .language("en")
        .and_then(|builder| builder.threads(Some(1)).build())
        .and_then(SentenceProcessor::with_config)
        .unwrap_or_else(|e| {
            warn!("Sentence processor config rejected ({e}); using defaults");
            SentenceProcessor::new()
        })
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '»' | '«' | '”' | '’' | '“')
}

impl SentenceSplitter for RuleBasedSplitter {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let offsets: Vec<usize> = match self.processor.process(Input::from_text(text)) {
            Ok(output) => output.boundaries.iter().map(|b| b.offset).collect(),
            Err(e) => {
                warn!("Sentence detection failed ({e}); keeping the paragraph whole");
                Vec::new()
            }
        };
        self.sentences_at(text, &offsets)
    }
}
