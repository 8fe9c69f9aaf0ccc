//! Progress-callback trait for per-file and per-page translation events.
//!
//! Inject an [`Arc<dyn TranslationProgressCallback>`] via
//! [`crate::config::TranslationConfigBuilder::progress_callback`] to receive
//! events as the workflow moves through a batch. The CLI uses this to drive
//! its progress bar; library callers can forward events anywhere.
//!
//! # Example
//!
//! ```rust
//! use report_translate::{TranslationProgressCallback, TranslationConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PageCounter(AtomicUsize);
//!
//! impl TranslationProgressCallback for PageCounter {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, translated_len: usize) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({} bytes)", page_num, total_pages, translated_len);
//!     }
//! }
//!
//! let config = TranslationConfig::builder()
//!     .progress_callback(Arc::new(PageCounter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the workflow as it processes files and pages.
///
/// Pages are processed strictly in order, so events for one file never
/// interleave. All methods default to no-ops.
pub trait TranslationProgressCallback: Send + Sync {
    /// Called once per file, after extraction, before any page is translated.
    fn on_file_start(&self, path: &Path, total_pages: usize) {
        let _ = (path, total_pages);
    }

    /// Called before a page is normalised and translated (1-indexed).
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after a page has been translated and appended.
    ///
    /// `translated_len` is the byte length of the translated text; zero for
    /// pages that had nothing to translate.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, translated_len: usize) {
        let _ = (page_num, total_pages, translated_len);
    }

    /// Called once the output PDF has been saved.
    fn on_file_complete(&self, path: &Path, output: &Path) {
        let _ = (path, output);
    }

    /// Called when a file is abandoned; nothing was written for it.
    fn on_file_error(&self, path: &Path, error: &str) {
        let _ = (path, error);
    }
}

/// A no-op implementation; the default when no callback is configured.
pub struct NoopProgressCallback;

impl TranslationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::TranslationConfig`].
pub type ProgressCallback = Arc<dyn TranslationProgressCallback>;
