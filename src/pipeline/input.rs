//! Input validation: make sure a source path is a readable PDF before pdfium
//! sees it.
//!
//! Checking the `%PDF` magic bytes up front turns "someone dropped a .docx in
//! the archive folder" into a clear [`ReportError::NotAPdf`] instead of an
//! opaque pdfium load failure.

use crate::error::ReportError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local file: it must exist, be readable and start with `%PDF`.
pub fn resolve_local(path: &Path) -> Result<PathBuf, ReportError> {
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(ReportError::FileNotFound { path });
    }
    if !path.is_file() {
        return Err(ReportError::NotAFile { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_err() || &magic != b"%PDF" {
                return Err(ReportError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ReportError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ReportError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}
