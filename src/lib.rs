//! # report-translate
//!
//! Translate scanned PDF reports (annual reports, balance-sheet commentary)
//! and re-render them as plain PDFs, one output page per source page.
//!
//! ## Why this crate?
//!
//! Archives of historical financial reports are searchable only in the
//! language they were printed in. Translation services cap request sizes
//! and translate badly when text is cut mid-sentence or still carries the
//! line breaks of a narrow print column. This crate rebuilds paragraphs,
//! packs whole sentences into requests below a byte budget, and writes a
//! document whose page labels point back at the source.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      validate path and %PDF magic
//!  ├─ 2. Extract    text per page via pdfium, ruled tables dropped (spawn_blocking)
//!  ├─ 3. Normalize  leading page number stripped, paragraphs rebuilt
//!  ├─ 4. Translate  sentence chunks below the byte budget, one request at a time
//!  └─ 5. Write      Latin-1 text, A4 pages, "Page i/n" footers, atomic save
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use report_translate::{translate_file, Destination, TranslationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TranslationConfig::builder().target_language("en").build()?;
//!     let out = translate_file(
//!         "sources/1978-geschaeftsbericht.pdf",
//!         &Destination::Directory("translated".into()),
//!         &config,
//!     )
//!     .await?;
//!     eprintln!("wrote {} ({} pages)", out.output.display(), out.stats.total_pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | The `report-translate` binary (clap + indicatif + tracing-subscriber) |
//! | `server` | off     | The `report-translate-health` liveness service (axum) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! report-translate = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod discovery;
pub mod error;
#[cfg(feature = "server")]
pub mod health;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod sentence;
pub mod translator;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{TranslationConfig, TranslationConfigBuilder, TranslatorBackend};
pub use discovery::{create_destination_dir, find_pdfs, output_path_for};
pub use error::{ReportError, TranslatorError};
pub use pipeline::chunk::{translate_paragraph, ChunkBudget, OMITTED_WORD_SENTINEL};
pub use pipeline::normalize::{normalize, NormalizedPage, PageNumber};
pub use pipeline::write::TranslatedDocument;
pub use progress::{NoopProgressCallback, ProgressCallback, TranslationProgressCallback};
pub use sentence::{RuleBasedSplitter, SentenceLanguage, SentenceSplitter};
pub use translator::{resolve_translator, Translator};
pub use workflow::{
    process_pages, translate_batch, translate_file, BatchReport, Destination, FileReport,
    TranslationOutput, TranslationStats,
};
