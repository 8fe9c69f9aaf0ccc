//! Error types for the report-translate library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ReportError`] — **Fatal for one file**: the file cannot be turned
//!   into a translated PDF (bad destination, unreadable source, translation
//!   failure, write failure). Returned as `Err(ReportError)` from the
//!   workflow functions. The batch runner records it and moves on to the
//!   next file.
//!
//! * [`TranslatorError`] — a single request to the translation capability
//!   failed. The chunked translator propagates it unchanged; the workflow
//!   wraps it in [`ReportError::Translation`] together with the page that
//!   was being translated.
//!
//! Extraction anomalies (empty pages) and oversized content (sentinel
//! substitution) are handled locally and never show up here.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the report-translate workflow.
#[derive(Debug, Error)]
pub enum ReportError {
    // ── Configuration errors ─────────────────────────────────────────────
    /// Destination root does not exist.
    #[error("The destination directory '{path}' does not exist locally.")]
    DestinationMissing { path: PathBuf },

    /// The source file is not located under the destination root.
    #[error("The file path '{file}' is not relative to the destination directory '{root}'.")]
    NotUnderDestination { file: PathBuf, root: PathBuf },

    /// The path exists but is not a regular file.
    #[error("The file path '{path}' does not resolve to a file.")]
    NotAFile { path: PathBuf },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium-render returned an error while reading a specific page.
    #[error("Text extraction failed for page {page}: {detail}")]
    ExtractionFailed { page: usize, detail: String },

    // ── Translation errors ────────────────────────────────────────────────
    /// The translation capability failed on non-empty input.
    #[error("Translation failed on page {page}: {source}")]
    Translation {
        page: usize,
        #[source]
        source: TranslatorError,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// pdfium could not lay out or serialise the translated document.
    #[error("Failed to render output PDF '{path}': {detail}")]
    RenderFailed { path: PathBuf, detail: String },

    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first run.\n\
If the auto-download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failed request to the translation capability.
#[derive(Debug, Clone, Error)]
pub enum TranslatorError {
    /// Transport-level failure (DNS, TLS, connection reset).
    #[error("HTTP request to '{backend}' failed: {detail}")]
    Http { backend: String, detail: String },

    /// The request did not complete within the configured timeout.
    #[error("Translation request to '{backend}' timed out after {secs}s")]
    Timeout { backend: String, secs: u64 },

    /// The service answered with a non-success status code.
    #[error("Translation service '{backend}' returned HTTP {status}")]
    Status { backend: String, status: u16 },

    /// The response body did not have the expected shape.
    #[error("Malformed response from '{backend}': {detail}")]
    MalformedResponse { backend: String, detail: String },

    /// The LLM provider returned an error.
    #[error("LLM provider error: {0}")]
    Provider(String),

    /// The configured provider is not initialised (missing API key etc.).
    #[error("Translation provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },
}
