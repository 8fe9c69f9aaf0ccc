//! Text extraction: pull the raw text of every page via pdfium.
//!
//! Each page yields one raw string with ruled tables removed (see
//! [`super::tables`]). pdfium reports line breaks as `\r\n`; they are
//! folded to `\n` here so normalization only ever sees one line ending.
//!
//! All pdfium calls run inside `spawn_blocking`; the C library is not
//! async-safe and text extraction on a 200-page scan is CPU-heavy.

use super::tables::{
    detect_table_regions, edges_from_path, filter_table_text, PositionedChar, Rect,
};
use crate::error::ReportError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Bind to the pdfium library, downloading it on first use.
pub fn bind_pdfium() -> Result<Pdfium, ReportError> {
    pdfium_auto::bind_pdfium_silent().map_err(|e| ReportError::PdfiumBindingFailed(e.to_string()))
}

/// Map a pdfium load failure onto the password / corruption variants.
pub(crate) fn load_error(path: &Path, password: Option<&str>, e: PdfiumError) -> ReportError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            ReportError::WrongPassword {
                path: path.to_path_buf(),
            }
        } else {
            ReportError::PasswordRequired {
                path: path.to_path_buf(),
            }
        }
    } else {
        ReportError::CorruptPdf {
            path: path.to_path_buf(),
            detail: err_str,
        }
    }
}

/// Extract the raw text of every page, in page order.
pub async fn extract_pages(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<Vec<String>, ReportError> {
    let path: PathBuf = pdf_path.to_path_buf();
    let password = password.map(str::to_string);

    tokio::task::spawn_blocking(move || extract_pages_blocking(&path, password.as_deref()))
        .await
        .map_err(|e| ReportError::Internal(format!("Extraction task panicked: {}", e)))?
}

fn extract_pages_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<Vec<String>, ReportError> {
    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| load_error(pdf_path, password, e))?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut texts = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let text = page_text(&page, idx + 1)?;
        debug!("Extracted page {} ({} bytes)", idx + 1, text.len());
        texts.push(text);
    }
    Ok(texts)
}

fn to_rect(rect: &PdfRect) -> Rect {
    Rect::new(
        rect.left().value,
        rect.bottom().value,
        rect.right().value,
        rect.top().value,
    )
}

/// Ruling edges from every path object on the page.
fn page_edges(page: &PdfPage) -> Vec<super::tables::Edge> {
    page.objects()
        .iter()
        .filter(|object| matches!(object, PdfPageObject::Path(_)))
        .filter_map(|object| object.bounds().ok())
        .flat_map(|quad| edges_from_path(to_rect(&quad.to_rect())))
        .collect()
}

fn page_text(page: &PdfPage, page_num: usize) -> Result<String, ReportError> {
    let text = page.text().map_err(|e| ReportError::ExtractionFailed {
        page: page_num,
        detail: format!("{:?}", e),
    })?;

    let regions = detect_table_regions(&page_edges(page));
    let raw = if regions.is_empty() {
        text.all()
    } else {
        debug!("Page {}: dropping text inside {} table(s)", page_num, regions.len());
        let chars: Vec<PositionedChar> = text
            .chars()
            .iter()
            .filter_map(|c| {
                let ch = c.unicode_char()?;
                let bounds = c
                    .loose_bounds()
                    .ok()
                    .map(|b| to_rect(&b))
                    .filter(|r| r.width() > 0.0 && r.height() > 0.0);
                Some(PositionedChar { ch, bounds })
            })
            .collect();
        filter_table_text(&chars, &regions)
    };

    if raw.trim().is_empty() {
        warn!("Page {} has no extractable text", page_num);
    }
    Ok(raw.replace("\r\n", "\n").replace('\r', "\n"))
}
