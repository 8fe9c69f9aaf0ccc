//! File and batch translation entry points.
//!
//! One file moves through a fixed sequence:
//!
//! ```text
//! destination ─▶ validate ─▶ extract ─▶ per page: normalize → translate → append ─▶ save
//! ```
//!
//! Pages are handled strictly in source order because the page-number
//! accumulator flows from one page to the next. Translation requests are
//! awaited one at a time. The output is written once, atomically, after the
//! last page; any error before that leaves no file behind.

use crate::config::TranslationConfig;
use crate::discovery::{create_destination_dir, output_path_for};
use crate::error::ReportError;
use crate::pipeline::chunk::{translate_page_text, ChunkBudget};
use crate::pipeline::layout::PageLayout;
use crate::pipeline::normalize::{normalize, PageNumber};
use crate::pipeline::write::TranslatedDocument;
use crate::pipeline::{extract, input};
use crate::progress::ProgressCallback;
use crate::sentence::{RuleBasedSplitter, SentenceSplitter};
use crate::translator::{resolve_translator, Translator};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Where translated PDFs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Every output goes straight into this directory as `<stem>.pdf`.
    Directory(PathBuf),
    /// Outputs mirror the source tree under `<root>/output/`.
    Mirror { root: PathBuf },
}

impl Destination {
    /// Resolve (and create) the directory the translation of `source` goes to.
    pub fn dir_for(&self, source: &Path) -> Result<PathBuf, ReportError> {
        match self {
            Destination::Directory(dir) => Ok(dir.clone()),
            Destination::Mirror { root } => create_destination_dir(root, source),
        }
    }
}

/// Counters for one translated file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslationStats {
    pub total_pages: usize,
    /// Pages with text that went through the translator.
    pub translated_pages: usize,
    /// Pages with nothing to translate after normalisation.
    pub empty_pages: usize,
    pub duration_ms: u64,
}

/// A successfully translated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationOutput {
    pub source: PathBuf,
    pub output: PathBuf,
    pub stats: TranslationStats,
}

/// Outcome of one file in a batch.
#[derive(Debug)]
pub struct FileReport {
    pub source: PathBuf,
    pub result: Result<TranslationOutput, ReportError>,
}

/// Outcome of a whole batch; one entry per input, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &TranslationOutput> {
        self.files.iter().filter_map(|f| f.result.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Path, &ReportError)> {
        self.files
            .iter()
            .filter_map(|f| f.result.as_ref().err().map(|e| (f.source.as_path(), e)))
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }
}

/// Normalise and translate already-extracted page texts, in order.
///
/// Returns the assembled document without saving it. The page-number
/// accumulator starts at [`PageNumber::Unknown`]. Labels are
/// `"{index}/{total}"` regardless of the detected page numbers.
pub async fn process_pages(
    raw_pages: &[String],
    splitter: &dyn SentenceSplitter,
    translator: &dyn Translator,
    budget: ChunkBudget,
    progress: Option<&ProgressCallback>,
) -> Result<(TranslatedDocument, TranslationStats), ReportError> {
    let total = raw_pages.len();
    let mut document = TranslatedDocument::new();
    let mut stats = TranslationStats {
        total_pages: total,
        ..Default::default()
    };
    let mut page_number = PageNumber::Unknown;

    for (idx, raw) in raw_pages.iter().enumerate() {
        let page_num = idx + 1;
        if let Some(cb) = progress {
            cb.on_page_start(page_num, total);
        }

        let normalized = normalize(raw, page_number);
        page_number = normalized.page_number;
        debug!("Page {}/{}: source page number {}", page_num, total, page_number);

        let translated = if normalized.text.is_empty() {
            stats.empty_pages += 1;
            String::new()
        } else {
            stats.translated_pages += 1;
            translate_page_text(&normalized.text, splitter, translator, budget)
                .await
                .map_err(|source| ReportError::Translation {
                    page: page_num,
                    source,
                })?
        };

        document.append_page(&translated, format!("{page_num}/{total}"));
        if let Some(cb) = progress {
            cb.on_page_complete(page_num, total, translated.len());
        }
    }

    Ok((document, stats))
}

/// Translate one PDF with an already-resolved translator and splitter.
pub async fn translate_file_with(
    source: &Path,
    destination: &Destination,
    config: &TranslationConfig,
    splitter: &dyn SentenceSplitter,
    translator: &dyn Translator,
) -> Result<TranslationOutput, ReportError> {
    let start = Instant::now();
    info!("Translating {}", source.display());

    let dest_dir = destination.dir_for(source)?;
    let source = input::resolve_local(source)?;
    let output = output_path_for(&dest_dir, &source);

    let raw_pages = extract::extract_pages(&source, config.password.as_deref()).await?;
    let progress = config.progress_callback.as_ref();
    if let Some(cb) = progress {
        cb.on_file_start(&source, raw_pages.len());
    }

    let (document, mut stats) =
        process_pages(&raw_pages, splitter, translator, config.budget(), progress).await?;

    document
        .save(&output, PageLayout::a4(config.font_size))
        .await?;
    stats.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Wrote {} ({} pages, {} translated, {}ms)",
        output.display(),
        stats.total_pages,
        stats.translated_pages,
        stats.duration_ms
    );
    if let Some(cb) = progress {
        cb.on_file_complete(&source, &output);
    }

    Ok(TranslationOutput {
        source,
        output,
        stats,
    })
}

fn build_translator(config: &TranslationConfig) -> Result<Arc<dyn Translator>, ReportError> {
    resolve_translator(config).map_err(|e| ReportError::InvalidConfig(e.to_string()))
}

/// Translate one PDF into `destination`.
///
/// This is the single-file entry point: it builds the translator and the
/// sentence splitter described by `config`, then runs the full workflow.
pub async fn translate_file(
    source: impl AsRef<Path>,
    destination: &Destination,
    config: &TranslationConfig,
) -> Result<TranslationOutput, ReportError> {
    let translator = build_translator(config)?;
    let splitter = RuleBasedSplitter::for_language(config.sentence_language);
    let source = source.as_ref();
    let result = translate_file_with(source, destination, config, &splitter, translator.as_ref()).await;
    if let (Err(e), Some(cb)) = (&result, config.progress_callback.as_ref()) {
        cb.on_file_error(source, &e.to_string());
    }
    result
}

/// Translate every file in `sources`, one after another.
///
/// A failing file is recorded and the batch moves on; only a translator that
/// cannot be built at all aborts the batch up front.
pub async fn translate_batch<P: AsRef<Path>>(
    sources: &[P],
    destination: &Destination,
    config: &TranslationConfig,
) -> Result<BatchReport, ReportError> {
    let translator = build_translator(config)?;
    let splitter = RuleBasedSplitter::for_language(config.sentence_language);
    info!(
        "Translating {} file(s) with '{}' into '{}'",
        sources.len(),
        translator.name(),
        config.target_language
    );

    let mut report = BatchReport::default();
    for source in sources {
        let source = source.as_ref();
        let result =
            translate_file_with(source, destination, config, &splitter, translator.as_ref()).await;
        if let Err(ref e) = result {
            error!("Failed to translate {}: {}", source.display(), e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_file_error(source, &e.to_string());
            }
        }
        report.files.push(FileReport {
            source: source.to_path_buf(),
            result,
        });
    }

    info!(
        "Batch complete: {} succeeded, {} failed",
        report.success_count(),
        report.failure_count()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranslatorError;
    use crate::progress::TranslationProgressCallback;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Upper;

    #[async_trait]
    impl Translator for Upper {
        async fn translate(&self, text: &str) -> Result<String, TranslatorError> {
            Ok(text.to_uppercase())
        }

        fn name(&self) -> &str {
            "upper"
        }
    }

    /// Succeeds `ok` times, then fails every call.
    struct FailsAfter {
        ok: AtomicUsize,
    }

    #[async_trait]
    impl Translator for FailsAfter {
        async fn translate(&self, text: &str) -> Result<String, TranslatorError> {
            if self
                .ok
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                Ok(text.to_string())
            } else {
                Err(TranslatorError::Status {
                    backend: "test".into(),
                    status: 503,
                })
            }
        }

        fn name(&self) -> &str {
            "fails-after"
        }
    }

    #[derive(Default)]
    struct Events(Mutex<Vec<String>>);

    impl TranslationProgressCallback for Events {
        fn on_page_start(&self, page_num: usize, total_pages: usize) {
            self.0.lock().unwrap().push(format!("start {page_num}/{total_pages}"));
        }

        fn on_page_complete(&self, page_num: usize, total_pages: usize, _len: usize) {
            self.0.lock().unwrap().push(format!("done {page_num}/{total_pages}"));
        }
    }

    fn pages(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn pages_are_labelled_by_position() {
        let raw = pages(&[
            "13\ndes Produktionspotentials anzusehen.",
            "",
            "Der Umsatz stieg.",
        ]);
        let (doc, stats) = process_pages(
            &raw,
            &RuleBasedSplitter::default(),
            &Upper,
            ChunkBudget::default(),
            None,
        )
        .await
        .unwrap();

        let labels: Vec<_> = doc.pages().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["1/3", "2/3", "3/3"]);
        assert_eq!(doc.pages()[0].text, " DES PRODUKTIONSPOTENTIALS ANZUSEHEN.");
        assert_eq!(doc.pages()[1].text, "");
        assert_eq!(stats.translated_pages, 2);
        assert_eq!(stats.empty_pages, 1);
    }

    #[tokio::test]
    async fn failure_aborts_with_page_number() {
        let raw = pages(&["Erste Seite.", "Zweite Seite."]);
        let translator = FailsAfter {
            ok: AtomicUsize::new(1),
        };
        let err = process_pages(
            &raw,
            &RuleBasedSplitter::default(),
            &translator,
            ChunkBudget::default(),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ReportError::Translation { page: 2, .. }));
    }

    #[tokio::test]
    async fn empty_pages_never_reach_the_translator() {
        let raw = pages(&["", "", ""]);
        let translator = FailsAfter {
            ok: AtomicUsize::new(0),
        };
        let (doc, _) = process_pages(
            &raw,
            &RuleBasedSplitter::default(),
            &translator,
            ChunkBudget::default(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(doc.len(), 3);
    }

    #[tokio::test]
    async fn progress_events_are_ordered() {
        let events = Arc::new(Events::default());
        let cb: ProgressCallback = events.clone();
        process_pages(
            &pages(&["a.", "b."]),
            &RuleBasedSplitter::default(),
            &Upper,
            ChunkBudget::default(),
            Some(&cb),
        )
        .await
        .unwrap();
        assert_eq!(
            *events.0.lock().unwrap(),
            vec!["start 1/2", "done 1/2", "start 2/2", "done 2/2"]
        );
    }

    #[tokio::test]
    async fn batch_records_failures_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let not_pdf = dir.path().join("notes.pdf");
        std::fs::write(&not_pdf, b"plain text").unwrap();
        let missing = dir.path().join("missing.pdf");

        let config = TranslationConfig::builder()
            .translator(Arc::new(Upper))
            .build()
            .unwrap();
        let destination = Destination::Directory(dir.path().join("out"));

        let report = translate_batch(&[&not_pdf, &missing], &destination, &config)
            .await
            .unwrap();
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.failure_count(), 2);
        assert!(matches!(
            report.files[0].result,
            Err(ReportError::NotAPdf { .. })
        ));
        assert!(matches!(
            report.files[1].result,
            Err(ReportError::FileNotFound { .. })
        ));
        assert!(!dir.path().join("out/notes.pdf").exists());
    }

    #[tokio::test]
    async fn mirror_destination_validates_before_reading() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let file = outside.path().join("x.pdf");
        std::fs::write(&file, b"%PDF-1.4").unwrap();

        let config = TranslationConfig::builder()
            .translator(Arc::new(Upper))
            .build()
            .unwrap();
        let destination = Destination::Mirror {
            root: root.path().to_path_buf(),
        };
        let err = translate_file(&file, &destination, &config).await.unwrap_err();
        assert!(matches!(err, ReportError::NotUnderDestination { .. }));
    }
}
