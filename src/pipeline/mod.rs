//! Pipeline stages for report translation.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the pdfium-bound stages stay at the edges.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ normalize ──▶ chunk ──▶ write
//! (%PDF)    (pdfium,    (page no.,   (budget,   (layout,
//!            tables)     paragraphs)  translate) atomic save)
//! ```
//!
//! 1. [`input`]     — validate the source path and PDF magic bytes
//! 2. [`extract`]   — raw text per page via pdfium; ruled tables are dropped
//!    using the geometry in [`tables`]
//! 3. [`normalize`] — strip the leading page number and rebuild paragraphs
//! 4. [`chunk`]     — sentence-chunked translation under the byte budget;
//!    the only stage with network I/O
//! 5. [`write`]     — Latin-1 fallback, wrapping via [`layout`], and the
//!    atomic PDF save

pub mod chunk;
pub mod extract;
pub mod input;
pub mod layout;
pub mod normalize;
pub mod tables;
pub mod write;
