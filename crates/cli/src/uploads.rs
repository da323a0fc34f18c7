//! Collect documents named on the command line.

use docqa_core::AppResult;
use docqa_knowledge::{DocumentFormat, UploadedDocument};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read every named file, and every PDF or DOCX found under named directories.
///
/// Files named explicitly are passed through whatever their extension, so an
/// unsupported file is reported by the extractor instead of silently dropped.
pub fn collect_uploads(paths: &[PathBuf]) -> AppResult<Vec<UploadedDocument>> {
    let mut documents = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_supported(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();

            tracing::debug!("Found {} documents under {:?}", found.len(), path);
            for file in found {
                documents.push(UploadedDocument::from_path(&file)?);
            }
        } else {
            documents.push(UploadedDocument::from_path(path)?);
        }
    }

    Ok(documents)
}

fn is_supported(path: &Path) -> bool {
    path.file_name()
        .map(|n| DocumentFormat::from_name(&n.to_string_lossy()).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::AppError;
    use tempfile::TempDir;

    #[test]
    fn test_directory_walk_keeps_documents_only() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(temp.path().join("b.pdf"), b"pdf").unwrap();
        std::fs::write(nested.join("a.DOCX"), b"docx").unwrap();
        std::fs::write(temp.path().join("notes.txt"), b"text").unwrap();

        let documents = collect_uploads(&[temp.path().to_path_buf()]).unwrap();
        let names: Vec<_> = documents.iter().map(|d| d.name.as_str()).collect();

        assert_eq!(names, vec!["b.pdf", "a.DOCX"]);
    }

    #[test]
    fn test_explicit_file_is_kept_whatever_its_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        std::fs::write(&path, b"text").unwrap();

        let documents = collect_uploads(&[path]).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].bytes, b"text");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = collect_uploads(&[temp.path().join("missing.pdf")]);
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
