//! Source discovery and output-tree mirroring.
//!
//! Reports live in an archive tree such as
//! `sources/Geschaeftsberichte/1978/report.pdf`, next to folders of reports
//! that already exist in English. [`find_pdfs`] selects the PDFs to
//! translate and [`create_destination_dir`] recreates their folder structure
//! under `<root>/output/` so translations land in a parallel tree.

use crate::error::ReportError;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Name of the mirrored output tree under the destination root.
pub const OUTPUT_DIR_NAME: &str = "output";

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
}

fn has_excluded_component(path: &Path, excluded: &str) -> bool {
    !excluded.is_empty()
        && path
            .components()
            .any(|c| matches!(c, Component::Normal(name) if name == excluded))
}

/// Collect the PDFs named by `desired`, each entry relative to `root`.
///
/// A desired entry that is a regular file is taken as-is. A directory is
/// walked recursively in file-name order, keeping every `.pdf` whose folder
/// (relative to `root`) has no component equal to `excluded_dir`. An empty
/// `excluded_dir` excludes nothing. Entries that do not exist are skipped
/// with a warning.
pub fn find_pdfs<S: AsRef<str>>(root: &Path, desired: &[S], excluded_dir: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for entry in desired {
        let start = root.join(entry.as_ref());
        if start.is_file() {
            found.push(start);
            continue;
        }
        if !start.is_dir() {
            warn!("Skipping '{}': no such file or directory", start.display());
            continue;
        }

        for item in WalkDir::new(&start)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = item.path();
            if !item.file_type().is_file() || !is_pdf(path) {
                continue;
            }
            let folder = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .unwrap_or(Path::new(""));
            if has_excluded_component(folder, excluded_dir) {
                debug!("Excluded: {}", path.display());
                continue;
            }
            found.push(path.to_path_buf());
        }
    }

    found
}

/// Recreate the folder of `file` under `<root>/output/` and return it.
///
/// Only directories are created; no file is copied. Fails fast when `root`
/// does not exist, when `file` is not under `root`, or when `file` is not a
/// regular file. Repeated calls are harmless.
pub fn create_destination_dir(root: &Path, file: &Path) -> Result<PathBuf, ReportError> {
    if !root.exists() {
        return Err(ReportError::DestinationMissing {
            path: root.to_path_buf(),
        });
    }

    let relative = file
        .strip_prefix(root)
        .map_err(|_| ReportError::NotUnderDestination {
            file: file.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    if !file.is_file() {
        return Err(ReportError::NotAFile {
            path: file.to_path_buf(),
        });
    }

    let parent = relative.parent().unwrap_or(Path::new(""));
    let dest = root.join(OUTPUT_DIR_NAME).join(parent);
    std::fs::create_dir_all(&dest).map_err(|e| ReportError::OutputWriteFailed {
        path: dest.clone(),
        source: e,
    })?;
    debug!("Destination directory ready: {}", dest.display());
    Ok(dest)
}

/// `<dest_dir>/<stem of source>.pdf`
pub fn output_path_for(dest_dir: &Path, source: &Path) -> PathBuf {
    let stem = source.file_stem().unwrap_or(source.as_os_str());
    let mut name = stem.to_os_string();
    name.push(".pdf");
    dest_dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"%PDF-1.4").unwrap();
    }

    fn archive() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("reports/1978/b.pdf"));
        touch(&root.join("reports/1978/a.pdf"));
        touch(&root.join("reports/English/1978/a.pdf"));
        touch(&root.join("reports/1979/notes.txt"));
        touch(&root.join("single.pdf"));
        dir
    }

    fn relative(root: &Path, paths: Vec<PathBuf>) -> Vec<String> {
        paths
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn excluded_folder_is_skipped() {
        let dir = archive();
        let found = find_pdfs(dir.path(), &["reports"], "English");
        assert_eq!(
            relative(dir.path(), found),
            vec!["reports/1978/a.pdf", "reports/1978/b.pdf"]
        );
    }

    #[test]
    fn empty_exclusion_keeps_everything() {
        let dir = archive();
        let found = find_pdfs(dir.path(), &[""], "");
        assert_eq!(
            relative(dir.path(), found),
            vec![
                "reports/1978/a.pdf",
                "reports/1978/b.pdf",
                "reports/English/1978/a.pdf",
                "single.pdf",
            ]
        );
    }

    #[test]
    fn files_are_taken_directly() {
        let dir = archive();
        let found = find_pdfs(dir.path(), &["single.pdf", "missing"], "English");
        assert_eq!(relative(dir.path(), found), vec!["single.pdf"]);
    }

    #[test]
    fn mirror_creates_folders_but_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sub/hello.txt");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, "Content").unwrap();

        let dest = create_destination_dir(dir.path(), &file).unwrap();
        assert_eq!(dest, dir.path().join("output/sub"));
        assert!(dest.is_dir());
        assert!(!dest.join("hello.txt").exists());

        // idempotent
        assert_eq!(create_destination_dir(dir.path(), &file).unwrap(), dest);
    }

    #[test]
    fn mirror_rejects_missing_root() {
        let err = create_destination_dir(Path::new("/no/such/root"), Path::new("/no/such/root/a.pdf"))
            .unwrap_err();
        assert!(matches!(err, ReportError::DestinationMissing { .. }));
    }

    #[test]
    fn mirror_rejects_foreign_file() {
        let root = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let file = other.path().join("x.pdf");
        fs::write(&file, b"%PDF").unwrap();
        let err = create_destination_dir(root.path(), &file).unwrap_err();
        assert!(matches!(err, ReportError::NotUnderDestination { .. }));
    }

    #[test]
    fn mirror_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let err = create_destination_dir(dir.path(), &sub).unwrap_err();
        assert!(matches!(err, ReportError::NotAFile { .. }));
        assert!(!dir.path().join(OUTPUT_DIR_NAME).exists());
    }

    #[test]
    fn output_name_uses_source_stem() {
        assert_eq!(
            output_path_for(Path::new("/out"), Path::new("/src/1978-bericht.pdf")),
            PathBuf::from("/out/1978-bericht.pdf")
        );
    }
}
