//! Chunked translation under a per-request byte budget.
//!
//! Translation services reject requests above a size cap, and cutting text
//! at arbitrary byte offsets ruins translations. This stage packs whole
//! sentences into chunks that stay strictly below the budget:
//!
//! ```text
//! sentences:  [s1][s2][s3][  s4 (oversized)  ][s5]
//!              └─chunk A─┘ │                   └ chunk C (trailing)
//!                          └ word by word: degenerate tokens pass through,
//!                            words >= budget become the sentinel
//! ```
//!
//! ## Output shape
//!
//! Every translated chunk is appended with one leading space, so a paragraph
//! translated in one request comes back as `" <translation>"`. Words from an
//! oversized sentence are appended with no separator at all, while the
//! sentinel gets a leading space. Both quirks are kept as-is; downstream
//! consumers and existing outputs depend on them.

use crate::error::TranslatorError;
use crate::sentence::SentenceSplitter;
use crate::translator::Translator;
use tracing::{debug, warn};

/// Default per-request budget in UTF-8 bytes.
///
/// A safety margin under the nominal 50 000-byte upload cap of the web
/// translator.
pub const DEFAULT_CHUNK_LIMIT_BYTES: usize = 5000;

/// Replacement text for a single word that alone exceeds the budget.
pub const OMITTED_WORD_SENTINEL: &str = "<<Omitted Word >= 5000bytes>>";

/// Tokens copied through verbatim instead of being translated.
pub const DEGENERATE_TOKENS: [&str; 5] = ["", " ", "\n\n", "_", "-"];

/// The byte limit every submitted chunk must stay strictly below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBudget {
    limit: usize,
}

impl ChunkBudget {
    /// Create a budget; `None` for a zero limit, which no text could satisfy.
    pub fn new(limit: usize) -> Option<Self> {
        (limit > 0).then_some(Self { limit })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn fits(&self, bytes: usize) -> bool {
        bytes < self.limit
    }
}

impl Default for ChunkBudget {
    fn default() -> Self {
        Self {
            limit: DEFAULT_CHUNK_LIMIT_BYTES,
        }
    }
}

/// Whether `token` is passed through without a translation call.
pub fn is_degenerate(token: &str) -> bool {
    DEGENERATE_TOKENS.contains(&token)
}

/// Translate one paragraph, sentence-chunked under `budget`.
///
/// Empty input (or input that is only a degenerate token) produces an empty
/// string without calling the translator. Any translator failure on
/// non-empty input is returned unchanged.
pub async fn translate_paragraph(
    text: &str,
    splitter: &dyn SentenceSplitter,
    translator: &dyn Translator,
    budget: ChunkBudget,
) -> Result<String, TranslatorError> {
    let mut translated = String::new();
    let mut chunk = String::new();

    for sentence in splitter.split(text) {
        let candidate = if chunk.is_empty() {
            sentence.len()
        } else {
            chunk.len() + 1 + sentence.len()
        };

        if budget.fits(candidate) {
            if !chunk.is_empty() {
                chunk.push(' ');
            }
            chunk.push_str(sentence);
            continue;
        }

        if !chunk.is_empty() {
            debug!("Flushing chunk of {} bytes", chunk.len());
            let result = translator.translate(&chunk).await?;
            translated.push(' ');
            translated.push_str(&result);
            chunk.clear();
        }

        if budget.fits(sentence.len()) {
            chunk.push_str(sentence);
        } else {
            warn!(
                "Sentence of {} bytes exceeds the {}-byte budget; translating word by word",
                sentence.len(),
                budget.limit()
            );
            translate_words(sentence, translator, budget, &mut translated).await?;
        }
    }

    let trailing = chunk.trim();
    if !is_degenerate(trailing) {
        debug!("Flushing trailing chunk of {} bytes", chunk.len());
        let result = translator.translate(&chunk).await?;
        translated.push(' ');
        translated.push_str(&result);
    }

    Ok(translated)
}

/// Word-level fallback for a sentence that alone exceeds the budget.
async fn translate_words(
    sentence: &str,
    translator: &dyn Translator,
    budget: ChunkBudget,
    out: &mut String,
) -> Result<(), TranslatorError> {
    for word in sentence.split(' ') {
        if is_degenerate(word) {
            out.push_str(word);
        } else if !budget.fits(word.len()) {
            out.push(' ');
            out.push_str(OMITTED_WORD_SENTINEL);
        } else {
            out.push_str(&translator.translate(word).await?);
        }
    }
    Ok(())
}

/// Translate normalised page text paragraph by paragraph.
///
/// Paragraphs are separated by `"\n\n"`; the result has exactly as many
/// paragraphs, in the same order.
pub async fn translate_page_text(
    text: &str,
    splitter: &dyn SentenceSplitter,
    translator: &dyn Translator,
    budget: ChunkBudget,
) -> Result<String, TranslatorError> {
    let mut paragraphs = Vec::new();
    for paragraph in text.split("\n\n") {
        paragraphs.push(translate_paragraph(paragraph, splitter, translator, budget).await?);
    }
    Ok(paragraphs.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::RuleBasedSplitter;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::Mutex;

    /// Records every request and answers with `"<EN:text>"`.
    #[derive(Default)]
    struct Recording {
        requests: Mutex<Vec<String>>,
    }

    impl Recording {
        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Translator for Recording {
        async fn translate(&self, text: &str) -> Result<String, TranslatorError> {
            self.requests.lock().unwrap().push(text.to_string());
            Ok(format!("<EN:{text}>"))
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    /// Fails every request, like an unreachable service.
    struct Unreachable;

    #[async_trait]
    impl Translator for Unreachable {
        async fn translate(&self, _text: &str) -> Result<String, TranslatorError> {
            Err(TranslatorError::Http {
                backend: "unreachable".into(),
                detail: "connection refused".into(),
            })
        }

        fn name(&self) -> &str {
            "unreachable"
        }
    }

    async fn run(text: &str, t: &Recording) -> String {
        translate_paragraph(text, &RuleBasedSplitter::default(), t, ChunkBudget::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn short_paragraph_is_one_request() {
        let t = Recording::default();
        let out = run("Ich liebe Python. Ich liebe Rust.", &t).await;
        assert_eq!(out, " <EN:Ich liebe Python. Ich liebe Rust.>");
        assert_eq!(t.requests(), vec!["Ich liebe Python. Ich liebe Rust."]);
    }

    #[tokio::test]
    async fn underscore_alone_yields_nothing() {
        let t = Recording::default();
        assert_eq!(run("_", &t).await, "");
        assert!(t.requests().is_empty());
    }

    #[tokio::test]
    async fn degenerate_tokens_are_never_translated() {
        for token in DEGENERATE_TOKENS {
            let t = Recording::default();
            let out = run(token, &t).await;
            assert!(out.trim().is_empty() || out.trim() == token, "{token:?} -> {out:?}");
            assert!(t.requests().is_empty(), "{token:?} was sent for translation");
        }
    }

    #[tokio::test]
    async fn empty_input_against_failing_service_is_ok() {
        let out = translate_paragraph(
            "",
            &RuleBasedSplitter::default(),
            &Unreachable,
            ChunkBudget::default(),
        )
        .await
        .unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn non_empty_input_against_failing_service_errors() {
        let result = translate_paragraph(
            "Die Bank wuchs.",
            &RuleBasedSplitter::default(),
            &Unreachable,
            ChunkBudget::default(),
        )
        .await;
        assert!(matches!(result, Err(TranslatorError::Http { .. })));
    }

    #[tokio::test]
    async fn five_thousand_byte_word_becomes_sentinel() {
        let t = Recording::default();
        let out = run(&"a".repeat(5000), &t).await;
        assert_eq!(out, " <<Omitted Word >= 5000bytes>>");
        assert!(t.requests().is_empty());
    }

    #[tokio::test]
    async fn long_embedded_token_is_omitted() {
        let t = Recording::default();
        let text = format!("Ich liebe{}Python. Ich liebe Python.", "a".repeat(6000));
        let out = run(&text, &t).await;
        assert!(out.find(OMITTED_WORD_SENTINEL).unwrap() > 0, "{out}");
        // "Ich" is translated on its own, glued to the output with no space.
        assert!(out.starts_with("<EN:Ich> <<Omitted"), "{out}");
        assert!(out.ends_with(" <EN:Ich liebe Python.>"), "{out}");
    }

    #[tokio::test]
    async fn oversized_sentence_words_are_concatenated() {
        let t = Recording::default();
        let budget = ChunkBudget::new(10).unwrap();
        let out = translate_paragraph(
            "Der Jahresabschluss _ wurde",
            &RuleBasedSplitter::default(),
            &t,
            budget,
        )
        .await
        .unwrap();
        assert_eq!(out, "<EN:Der> <<Omitted Word >= 5000bytes>>_<EN:wurde>");
        assert_eq!(t.requests(), vec!["Der", "wurde"]);
    }

    #[tokio::test]
    async fn chunk_flushes_before_reaching_limit() {
        let t = Recording::default();
        let budget = ChunkBudget::new(22).unwrap();
        // 10 + 1 + 10 = 21 < 22 fits; adding a third would not.
        let out = translate_paragraph(
            "Satz eins. Satz zwei. Satz drei.",
            &RuleBasedSplitter::default(),
            &t,
            budget,
        )
        .await
        .unwrap();
        assert_eq!(t.requests(), vec!["Satz eins. Satz zwei.", "Satz drei."]);
        assert_eq!(out, " <EN:Satz eins. Satz zwei.> <EN:Satz drei.>");
    }

    #[tokio::test]
    async fn paragraphs_are_preserved() {
        let t = Recording::default();
        let text = "Erster Absatz.\n\nZweiter Absatz.\n\n";
        let out = translate_page_text(text, &RuleBasedSplitter::default(), &t, ChunkBudget::default())
            .await
            .unwrap();
        assert_eq!(out.split("\n\n").count(), text.split("\n\n").count());
        assert_eq!(out, " <EN:Erster Absatz.>\n\n <EN:Zweiter Absatz.>\n\n");
    }

    #[test]
    fn zero_budget_is_rejected() {
        assert!(ChunkBudget::new(0).is_none());
        assert_eq!(ChunkBudget::default().limit(), 5000);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn no_request_reaches_the_limit(
            sentences in proptest::collection::vec("[A-Za-zäöü]{1,60}( [a-zäöü]{1,60}){0,8}\\.", 1..40),
            limit in 8usize..400,
        ) {
            let text = sentences.join(" ");
            let t = Recording::default();
            let budget = ChunkBudget::new(limit).unwrap();
            tokio_test::block_on(translate_paragraph(
                &text,
                &RuleBasedSplitter::for_language(crate::sentence::SentenceLanguage::English),
                &t,
                budget,
            ))
            .unwrap();
            for request in t.requests() {
                prop_assert!(request.len() < limit, "{} bytes >= {}", request.len(), limit);
            }
        }

        #[test]
        fn paragraph_count_is_preserved(
            paragraphs in proptest::collection::vec(
                prop_oneof![
                    Just(String::new()),
                    Just("_".to_string()),
                    Just("-".to_string()),
                    "[A-Z][a-z]{1,12}( [a-z]{1,12}){0,6}\\.",
                    "[a-z]{30,80}",
                ],
                1..8,
            ),
            limit in 8usize..60,
        ) {
            let text = paragraphs.join("\n\n");
            let t = Recording::default();
            let out = tokio_test::block_on(translate_page_text(
                &text,
                &RuleBasedSplitter::default(),
                &t,
                ChunkBudget::new(limit).unwrap(),
            ))
            .unwrap();
            prop_assert_eq!(out.split("\n\n").count(), text.split("\n\n").count());
        }

        #[test]
        fn oversized_word_is_replaced_without_a_request(
            unit in proptest::sample::select(vec!['a', 'ä', '€', '𝄞']),
            min_len in 5000usize..8000,
        ) {
            let mut word = String::new();
            while word.len() < min_len {
                word.push(unit);
            }
            let t = Recording::default();
            let out = tokio_test::block_on(translate_paragraph(
                &word,
                &RuleBasedSplitter::default(),
                &t,
                ChunkBudget::default(),
            ))
            .unwrap();
            prop_assert_eq!(out, format!(" {OMITTED_WORD_SENTINEL}"));
            prop_assert!(t.requests().is_empty());
        }
    }
}
