//! Output document assembly and serialisation.
//!
//! [`TranslatedDocument`] collects translated page texts in memory; nothing
//! touches pdfium until [`TranslatedDocument::save`]. Saving is atomic: the
//! PDF bytes go to a temporary sibling file that is renamed over the target,
//! so an aborted run never leaves a partial file behind. Dropping the
//! [`TranslatedDocument::save`] future before the rename (Ctrl-C in the CLI)
//! discards the temporary file even though the blocking render keeps running.

use super::extract::bind_pdfium;
use super::layout::{paginate, text_width, to_latin1_lossy, PageLayout, FOOTER_FONT_SIZE};
use crate::error::ReportError;
use pdfium_render::prelude::*;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// One translated source page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedPage {
    /// Footer label, `"{index}/{total}"`.
    pub label: String,
    pub text: String,
}

/// One page as it will be drawn: footer label plus body lines.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPage {
    pub label: String,
    pub lines: Vec<String>,
}

/// The translated document under construction.
#[derive(Debug, Clone, Default)]
pub struct TranslatedDocument {
    pages: Vec<TranslatedPage>,
}

impl TranslatedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one page of translated text with its footer label.
    pub fn append_page(&mut self, text: &str, label: impl Into<String>) {
        self.pages.push(TranslatedPage {
            label: label.into(),
            text: text.to_string(),
        });
    }

    pub fn pages(&self) -> &[TranslatedPage] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Encode, wrap and paginate every page.
    ///
    /// A source page whose text overflows continues on further output pages
    /// carrying the same label.
    pub fn layout_pages(&self, layout: &PageLayout) -> Vec<OutputPage> {
        self.pages
            .iter()
            .flat_map(|page| {
                paginate(&to_latin1_lossy(&page.text), layout)
                    .into_iter()
                    .map(|lines| OutputPage {
                        label: to_latin1_lossy(&page.label),
                        lines,
                    })
            })
            .collect()
    }

    /// Render the document and write it atomically to `path`.
    pub async fn save(&self, path: &Path, layout: PageLayout) -> Result<(), ReportError> {
        if self.pages.is_empty() {
            return Err(ReportError::RenderFailed {
                path: path.to_path_buf(),
                detail: "document has no pages".into(),
            });
        }
        let pages = self.layout_pages(&layout);
        let target = path.to_path_buf();
        info!(
            "Saving {} source page(s) as {} output page(s) to {}",
            self.pages.len(),
            pages.len(),
            target.display()
        );

        let guard = AbandonOnDrop(Arc::new(AtomicBool::new(true)));
        let wanted = Arc::clone(&guard.0);
        let result = tokio::task::spawn_blocking(move || {
            let bytes = render_blocking(&pages, &layout, &target)?;
            write_atomic(&bytes, &target, &wanted)
        })
        .await
        .map_err(|e| ReportError::Internal(format!("Save task panicked: {}", e)))?;
        drop(guard);
        result
    }
}

/// Clears the flag when the owning future is dropped.
struct AbandonOnDrop(Arc<AtomicBool>);

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Write `bytes` through a temporary sibling and rename it over `path`.
///
/// `wanted` is checked right before the rename; once it is false the
/// temporary file is removed and nothing appears at `path`.
fn write_atomic(bytes: &[u8], path: &Path, wanted: &AtomicBool) -> Result<(), ReportError> {
    let write_failed = |e: std::io::Error| ReportError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent).map_err(write_failed)?;

    // Dropped (and removed) on any error before `persist`.
    let mut tmp = tempfile::Builder::new()
        .prefix(".report-translate-")
        .suffix(".pdf.tmp")
        .tempfile_in(parent)
        .map_err(write_failed)?;
    tmp.write_all(&bytes).map_err(write_failed)?;
    tmp.as_file().sync_all().map_err(write_failed)?;
    if !wanted.load(Ordering::SeqCst) {
        debug!("Save of {} abandoned before rename", path.display());
        return Err(ReportError::Internal("save abandoned".into()));
    }
    tmp.persist(path).map_err(|e| write_failed(e.error))?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn render_blocking(
    pages: &[OutputPage],
    layout: &PageLayout,
    path: &Path,
) -> Result<Vec<u8>, ReportError> {
    let render_failed = |e: PdfiumError| ReportError::RenderFailed {
        path: path.to_path_buf(),
        detail: format!("{:?}", e),
    };

    let pdfium = bind_pdfium()?;
    let mut document = pdfium.create_new_pdf().map_err(render_failed)?;
    let body_font = document.fonts_mut().helvetica();
    let footer_font = document.fonts_mut().helvetica_oblique();

    for (idx, output) in pages.iter().enumerate() {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::a4())
            .map_err(render_failed)?;

        for (line_no, line) in output.lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            page.objects_mut()
                .create_text_object(
                    PdfPoints::new(layout.margin()),
                    PdfPoints::new(layout.line_baseline(line_no)),
                    line,
                    body_font,
                    PdfPoints::new(layout.font_size),
                )
                .map_err(render_failed)?;
        }

        let footer = format!("Page {}", output.label);
        let footer_x = (layout.page_width() - text_width(&footer, FOOTER_FONT_SIZE)) / 2.0;
        page.objects_mut()
            .create_text_object(
                PdfPoints::new(footer_x),
                PdfPoints::new(layout.footer_baseline()),
                &footer,
                footer_font,
                PdfPoints::new(FOOTER_FONT_SIZE),
            )
            .map_err(render_failed)?;
        debug!("Laid out output page {} ({})", idx + 1, footer);
    }

    document.save_to_bytes().map_err(render_failed)
}
